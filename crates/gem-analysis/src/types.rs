//! Core mesh data types.
//!
//! A [`TriangleMesh`] is a triangle soup exactly as an STL decoder produces it:
//! an ordered list of triangles, each carrying its own three corner positions.
//! There is no shared vertex index; connectivity is recovered later from
//! coincident coordinates.

use nalgebra::{Point3, Vector3};
use serde::Serialize;

use crate::error::{GemError, GemResult};

/// A triangle with three corner positions.
///
/// Coordinates are typically in millimeters but the analysis is unit-agnostic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// Corner positions in decoder order.
    pub vertices: [Point3<f64>; 3],
}

impl Triangle {
    /// Create a triangle from three corners.
    #[inline]
    pub fn new(a: Point3<f64>, b: Point3<f64>, c: Point3<f64>) -> Self {
        Self {
            vertices: [a, b, c],
        }
    }

    /// Create a triangle from raw coordinate arrays.
    #[inline]
    pub fn from_coords(a: [f64; 3], b: [f64; 3], c: [f64; 3]) -> Self {
        Self::new(Point3::from(a), Point3::from(b), Point3::from(c))
    }

    /// Unnormalized normal (`(b - a) x (c - a)`), length equals twice the area.
    #[inline]
    pub fn scaled_normal(&self) -> Vector3<f64> {
        let [a, b, c] = &self.vertices;
        (b - a).cross(&(c - a))
    }

    /// Unit normal following the right-hand rule, or `None` for degenerate triangles.
    pub fn normal(&self) -> Option<Vector3<f64>> {
        let n = self.scaled_normal();
        let len = n.norm();
        if len > f64::EPSILON * self.max_edge_length().powi(2) && len > 0.0 {
            Some(n / len)
        } else {
            None
        }
    }

    /// Triangle area.
    #[inline]
    pub fn area(&self) -> f64 {
        self.scaled_normal().norm() * 0.5
    }

    /// True if the corners are collinear or coincident.
    pub fn is_degenerate(&self) -> bool {
        self.normal().is_none()
    }

    fn max_edge_length(&self) -> f64 {
        let [a, b, c] = &self.vertices;
        (b - a).norm().max((c - b).norm()).max((a - c).norm())
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    /// Minimum corner.
    pub min: Point3<f64>,
    /// Maximum corner.
    pub max: Point3<f64>,
}

impl BoundingBox {
    /// Bounding box of a set of points, or `None` when empty.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3<f64>>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut bounds = Self {
            min: first,
            max: first,
        };
        for p in iter {
            bounds.include(p);
        }
        Some(bounds)
    }

    /// Grow the box to contain `p`.
    pub fn include(&mut self, p: &Point3<f64>) {
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
    }

    /// Edge lengths along X, Y and Z.
    #[inline]
    pub fn dimensions(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Length of the box diagonal.
    #[inline]
    pub fn diagonal(&self) -> f64 {
        self.dimensions().norm()
    }

    /// Box volume.
    #[inline]
    pub fn volume(&self) -> f64 {
        let d = self.dimensions();
        d.x * d.y * d.z
    }

    /// Box center.
    #[inline]
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }
}

/// A decoded triangle soup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    /// Triangles in decoder order.
    pub triangles: Vec<Triangle>,
}

impl TriangleMesh {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh from decoded triangles.
    pub fn from_triangles(triangles: Vec<Triangle>) -> Self {
        Self { triangles }
    }

    /// Create a mesh from a non-indexed position buffer.
    ///
    /// The buffer holds nine floats per triangle (`x0 y0 z0 x1 y1 z1 x2 y2 z2`),
    /// the layout of a viewer's non-indexed geometry position attribute.
    ///
    /// # Example
    ///
    /// ```
    /// use gem_analysis::TriangleMesh;
    ///
    /// let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
    /// let mesh = TriangleMesh::from_positions(&positions).unwrap();
    /// assert_eq!(mesh.triangle_count(), 1);
    /// ```
    pub fn from_positions(positions: &[f32]) -> GemResult<Self> {
        if positions.len() % 9 != 0 {
            return Err(GemError::MalformedPositions {
                len: positions.len(),
            });
        }

        let triangles = positions
            .chunks_exact(9)
            .map(|c| {
                let p = |i: usize| {
                    Point3::new(f64::from(c[i]), f64::from(c[i + 1]), f64::from(c[i + 2]))
                };
                Triangle::new(p(0), p(3), p(6))
            })
            .collect();

        Ok(Self { triangles })
    }

    /// Number of triangles.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// True if the mesh has no triangles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Bounding box over all corners, or `None` for an empty mesh.
    pub fn bounds(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.triangles.iter().flat_map(|t| t.vertices.iter()))
    }

    /// Append all triangles of another mesh.
    pub fn merge(&mut self, other: &TriangleMesh) {
        self.triangles.extend_from_slice(&other.triangles);
    }

    /// Check that every coordinate is finite.
    pub fn check_finite(&self) -> GemResult<()> {
        for (index, tri) in self.triangles.iter().enumerate() {
            for v in &tri.vertices {
                for (name, value) in [("x", v.x), ("y", v.y), ("z", v.z)] {
                    if !value.is_finite() {
                        return Err(GemError::invalid_coordinate(index, name, value));
                    }
                }
            }
        }
        Ok(())
    }
}

impl FromIterator<Triangle> for TriangleMesh {
    fn from_iter<I: IntoIterator<Item = Triangle>>(iter: I) -> Self {
        Self {
            triangles: iter.into_iter().collect(),
        }
    }
}
