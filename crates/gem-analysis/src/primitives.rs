//! Reference solids.
//!
//! Closed, consistently wound triangle soups for the shapes the classifier
//! distinguishes: a cuboid (metal body or princess), a UV sphere (round), an
//! ellipsoid (oval) and an n-sided bipyramid (marquise and emerald stand-ins).
//! Corners shared between triangles are computed once, so they coincide
//! exactly as they would in an exported STL.

use std::f64::consts::PI;

use nalgebra::{Point3, Similarity3};

use crate::types::{Triangle, TriangleMesh};

/// Axis-aligned cuboid with 12 outward-facing triangles.
///
/// # Example
///
/// ```
/// use gem_analysis::primitives::cuboid;
///
/// let body = cuboid([0.0, 0.0, 0.0], [20.0, 16.0, 12.0]);
/// assert_eq!(body.triangle_count(), 12);
/// ```
pub fn cuboid(center: [f64; 3], size: [f64; 3]) -> TriangleMesh {
    let [cx, cy, cz] = center;
    let [hx, hy, hz] = size.map(|s| s / 2.0);

    let v = [
        Point3::new(cx - hx, cy - hy, cz - hz),
        Point3::new(cx + hx, cy - hy, cz - hz),
        Point3::new(cx + hx, cy + hy, cz - hz),
        Point3::new(cx - hx, cy + hy, cz - hz),
        Point3::new(cx - hx, cy - hy, cz + hz),
        Point3::new(cx + hx, cy - hy, cz + hz),
        Point3::new(cx + hx, cy + hy, cz + hz),
        Point3::new(cx - hx, cy + hy, cz + hz),
    ];

    let faces: [[usize; 3]; 12] = [
        [0, 2, 1],
        [0, 3, 2], // bottom
        [4, 5, 6],
        [4, 6, 7], // top
        [0, 1, 5],
        [0, 5, 4], // front
        [3, 7, 6],
        [3, 6, 2], // back
        [0, 4, 7],
        [0, 7, 3], // left
        [1, 2, 6],
        [1, 6, 5], // right
    ];

    faces
        .iter()
        .map(|&[a, b, c]| Triangle::new(v[a], v[b], v[c]))
        .collect()
}

/// UV sphere with `segments` meridians and `rings` latitude bands.
pub fn uv_sphere(center: [f64; 3], radius: f64, segments: usize, rings: usize) -> TriangleMesh {
    ellipsoid(center, [radius; 3], segments, rings)
}

/// Ellipsoid tessellated like [`uv_sphere`], poles on the Z axis.
///
/// `segments` must be at least 3 and `rings` at least 2.
pub fn ellipsoid(
    center: [f64; 3],
    radii: [f64; 3],
    segments: usize,
    rings: usize,
) -> TriangleMesh {
    let [cx, cy, cz] = center;
    let [rx, ry, rz] = radii;

    let top = Point3::new(cx, cy, cz + rz);
    let bottom = Point3::new(cx, cy, cz - rz);

    // grid[i - 1][j] is the corner on latitude ring i, meridian j
    let grid: Vec<Vec<Point3<f64>>> = (1..rings)
        .map(|i| {
            let theta = PI * i as f64 / rings as f64;
            (0..segments)
                .map(|j| {
                    let phi = 2.0 * PI * j as f64 / segments as f64;
                    Point3::new(
                        cx + rx * theta.sin() * phi.cos(),
                        cy + ry * theta.sin() * phi.sin(),
                        cz + rz * theta.cos(),
                    )
                })
                .collect()
        })
        .collect();
    let p = |i: usize, j: usize| grid[i - 1][j];

    let mut triangles = Vec::with_capacity(2 * segments * (rings - 1));
    for j in 0..segments {
        let j2 = (j + 1) % segments;
        triangles.push(Triangle::new(top, p(1, j), p(1, j2)));
        for i in 1..rings - 1 {
            let (a, b, c, d) = (p(i, j), p(i + 1, j), p(i + 1, j2), p(i, j2));
            triangles.push(Triangle::new(a, b, c));
            triangles.push(Triangle::new(a, c, d));
        }
        triangles.push(Triangle::new(p(rings - 1, j), bottom, p(rings - 1, j2)));
    }

    TriangleMesh::from_triangles(triangles)
}

/// Double pyramid along the X axis.
///
/// A `sides`-gon girdle with radii `ry`, `rz` in the YZ plane through
/// `center`, and apexes at `center ± half_length` along X.
pub fn bipyramid(
    center: [f64; 3],
    sides: usize,
    half_length: f64,
    ry: f64,
    rz: f64,
) -> TriangleMesh {
    let [cx, cy, cz] = center;
    let girdle: Vec<Point3<f64>> = (0..sides)
        .map(|k| {
            let phi = 2.0 * PI * k as f64 / sides as f64;
            Point3::new(cx, cy + ry * phi.cos(), cz + rz * phi.sin())
        })
        .collect();
    let front = Point3::new(cx + half_length, cy, cz);
    let back = Point3::new(cx - half_length, cy, cz);

    let mut triangles = Vec::with_capacity(2 * sides);
    for k in 0..sides {
        let (p, q) = (girdle[k], girdle[(k + 1) % sides]);
        triangles.push(Triangle::new(front, p, q));
        triangles.push(Triangle::new(back, q, p));
    }

    TriangleMesh::from_triangles(triangles)
}

/// Apply a rotation, translation and uniform scale to every corner.
pub fn transform(mesh: &TriangleMesh, similarity: &Similarity3<f64>) -> TriangleMesh {
    mesh.triangles
        .iter()
        .map(|t| Triangle {
            vertices: t.vertices.map(|v| similarity * v),
        })
        .collect()
}

/// Concatenate several solids into one soup, in order.
pub fn merge_all<'a>(parts: impl IntoIterator<Item = &'a TriangleMesh>) -> TriangleMesh {
    let mut merged = TriangleMesh::new();
    for part in parts {
        merged.merge(part);
    }
    merged
}
