//! Per-island geometric descriptors.
//!
//! [`describe_island`] is a pure function of one island's triangles. It
//! measures the axis-aligned bounds, counts, volume and surface area, builds
//! the facet-angle profile from the dihedral angles between neighbouring
//! triangles, and computes rotation-normalized shape measures from the
//! surface-area-weighted covariance of the island.
//!
//! # Rotation normalization
//!
//! Shape decisions must not depend on how the model is oriented in its file.
//! The principal spreads (square roots of the covariance eigenvalues) are
//! invariant under rotation and translation, and scale linearly with the
//! model, so ratios between them are the aspect measures the classifier uses.
//! Weighting by area makes them depend on the surface, not on how densely it
//! is tessellated.

use hashbrown::HashSet;
use nalgebra::{Matrix3, SymmetricEigen, Vector3};
use serde::Serialize;

use crate::adjacency::KeyedAdjacency;
use crate::params::{AnalysisParams, FacetAngleBuckets};
use crate::partition::{Island, VertexQuantizer};
use crate::types::{BoundingBox, TriangleMesh};

/// Distribution of dihedral angles between neighbouring triangles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FacetAngleProfile {
    /// Angles below the near-flat bound.
    pub flat: usize,
    /// Angles between the near-flat and sharp bounds.
    pub moderate: usize,
    /// Angles at or above the sharp bound.
    pub sharp: usize,
    /// Edges used by a single triangle.
    pub boundary_edges: usize,
    /// Edges used by more than two triangles.
    pub non_manifold_edges: usize,
    /// Manifold edges whose two triangles disagree on winding.
    pub inconsistent_windings: usize,
}

impl FacetAngleProfile {
    /// Number of measured angles.
    pub fn total(&self) -> usize {
        self.flat + self.moderate + self.sharp
    }

    /// Fraction of near-flat angles, 0 when nothing was measured.
    pub fn flat_fraction(&self) -> f64 {
        self.fraction(self.flat)
    }

    /// Fraction of moderate angles, 0 when nothing was measured.
    pub fn moderate_fraction(&self) -> f64 {
        self.fraction(self.moderate)
    }

    /// Fraction of sharp angles, 0 when nothing was measured.
    pub fn sharp_fraction(&self) -> f64 {
        self.fraction(self.sharp)
    }

    /// True if every edge is shared by exactly two triangles.
    pub fn is_closed(&self) -> bool {
        self.boundary_edges == 0 && self.non_manifold_edges == 0
    }

    fn fraction(&self, count: usize) -> f64 {
        match self.total() {
            0 => 0.0,
            total => count as f64 / total as f64,
        }
    }

    fn record(&mut self, angle_degrees: f64, buckets: &FacetAngleBuckets) {
        if angle_degrees < buckets.flat_max_degrees {
            self.flat += 1;
        } else if angle_degrees >= buckets.sharp_min_degrees {
            self.sharp += 1;
        } else {
            self.moderate += 1;
        }
    }
}

/// Rotation-normalized extent of an island.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PrincipalShape {
    /// Principal spreads `[a, b, c]`, descending.
    pub spreads: [f64; 3],
    /// Principal axes matching `spreads`, unit length.
    pub axes: [Vector3<f64>; 3],
    /// Bounding-box extents measured along `axes`.
    pub extents: [f64; 3],
}

impl PrincipalShape {
    /// Volume of the bounding box in the principal frame.
    pub fn box_volume(&self) -> f64 {
        self.extents.iter().product()
    }

    /// `a / b`: elongation of the longest axis over the middle one.
    pub fn elongation(&self) -> f64 {
        ratio(self.spreads[0], self.spreads[1])
    }

    /// `b / c`: aspect of the cross-section perpendicular to the longest axis.
    pub fn cross_section_aspect(&self) -> f64 {
        ratio(self.spreads[1], self.spreads[2])
    }

    /// `a / c`: overall anisotropy, 1 for a cube or sphere.
    pub fn anisotropy(&self) -> f64 {
        ratio(self.spreads[0], self.spreads[2])
    }

    /// `c / a`: 0 for flat sheets, 1 for isotropic solids.
    pub fn thickness_ratio(&self) -> f64 {
        if self.spreads[0] > 0.0 {
            self.spreads[2] / self.spreads[0]
        } else {
            0.0
        }
    }
}

fn ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 { num / den } else { f64::INFINITY }
}

/// Read-only summary of one island.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IslandDescriptor {
    /// Axis-aligned bounding box in model coordinates.
    pub bounds: BoundingBox,
    /// Number of triangles.
    pub triangle_count: usize,
    /// Number of distinct vertex keys.
    pub vertex_count: usize,
    /// Signed volume; the sign follows the winding.
    pub signed_volume: f64,
    /// Total triangle area.
    pub surface_area: f64,
    /// Dihedral angle distribution.
    pub facet_angles: FacetAngleProfile,
    /// Rotation-normalized extent.
    pub principal: PrincipalShape,
    /// True if the island has too few triangles to form a closed solid.
    pub low_confidence: bool,
}

impl IslandDescriptor {
    /// Absolute volume estimate.
    pub fn volume(&self) -> f64 {
        self.signed_volume.abs()
    }

    /// Bounding-box volume used to rank islands, measured in the principal
    /// frame so it does not change when the model is rotated.
    pub fn bounding_volume(&self) -> f64 {
        self.principal.box_volume()
    }
}

/// Describe one island of `mesh`.
///
/// # Example
///
/// ```
/// use gem_analysis::AnalysisParams;
/// use gem_analysis::features::describe_island;
/// use gem_analysis::partition::partition_islands;
/// use gem_analysis::primitives::cuboid;
///
/// let mesh = cuboid([0.0, 0.0, 0.0], [2.0, 2.0, 2.0]);
/// let params = AnalysisParams::default();
/// let partition = partition_islands(&mesh, &params);
///
/// let d = describe_island(&mesh, &partition.islands[0], &partition.quantizer, &params);
/// assert_eq!(d.vertex_count, 8);
/// assert!((d.volume() - 8.0).abs() < 1e-9);
/// ```
pub fn describe_island(
    mesh: &TriangleMesh,
    island: &Island,
    quantizer: &VertexQuantizer,
    params: &AnalysisParams,
) -> IslandDescriptor {
    let triangles = &island.triangles;

    let bounds = BoundingBox::from_points(
        triangles
            .iter()
            .flat_map(|&t| mesh.triangles[t as usize].vertices.iter()),
    )
    .unwrap_or(BoundingBox {
        min: nalgebra::Point3::origin(),
        max: nalgebra::Point3::origin(),
    });
    let origin = bounds.center().coords;
    let low_confidence = triangles.len() < params.rules.min_triangles;

    let mut keys = HashSet::with_capacity(triangles.len());
    let mut signed_volume = 0.0;
    let mut surface_area = 0.0;
    for &t in triangles {
        let tri = &mesh.triangles[t as usize];
        for v in &tri.vertices {
            keys.insert(quantizer.key(v));
        }
        let [a, b, c] = tri.vertices.map(|v| v.coords - origin);
        signed_volume += a.dot(&b.cross(&c)) / 6.0;
        surface_area += tri.area();
    }
    // Too few triangles to enclose anything
    if low_confidence {
        signed_volume = 0.0;
    }

    let facet_angles = facet_angle_profile(mesh, triangles, quantizer, &params.facet_angles);
    let principal = principal_shape(mesh, triangles, origin, &bounds);

    IslandDescriptor {
        bounds,
        triangle_count: triangles.len(),
        vertex_count: keys.len(),
        signed_volume,
        surface_area,
        facet_angles,
        principal,
        low_confidence,
    }
}

/// Bucket the dihedral angle of every edge shared by exactly two triangles.
///
/// The angle is measured between the two face normals, so coplanar neighbours
/// give 0 and a cube edge gives 90. If the neighbours traverse the shared edge
/// in the same direction their windings disagree, and one normal is flipped
/// before measuring. Degenerate triangles have no normal and are skipped.
pub fn facet_angle_profile(
    mesh: &TriangleMesh,
    triangles: &[u32],
    quantizer: &VertexQuantizer,
    buckets: &FacetAngleBuckets,
) -> FacetAngleProfile {
    let adjacency = KeyedAdjacency::build(mesh, triangles, quantizer);

    let mut profile = FacetAngleProfile {
        boundary_edges: adjacency.boundary_edge_count(),
        non_manifold_edges: adjacency.non_manifold_edge_count(),
        ..FacetAngleProfile::default()
    };

    for (first, second) in adjacency.manifold_pairs() {
        let n1 = mesh.triangles[first.triangle as usize].normal();
        let n2 = mesh.triangles[second.triangle as usize].normal();
        let (Some(n1), Some(mut n2)) = (n1, n2) else {
            continue;
        };
        if first.forward == second.forward {
            profile.inconsistent_windings += 1;
            n2 = -n2;
        }
        let angle = n1.dot(&n2).clamp(-1.0, 1.0).acos().to_degrees();
        profile.record(angle, buckets);
    }

    profile
}

/// Principal spreads, axes and principal-frame extents.
///
/// Covariance is integrated over the triangle surfaces relative to `origin`.
/// Islands with no area fall back to the coordinate axes and zero spreads.
fn principal_shape(
    mesh: &TriangleMesh,
    triangles: &[u32],
    origin: Vector3<f64>,
    bounds: &BoundingBox,
) -> PrincipalShape {
    let mut total_area = 0.0;
    let mut first_moment = Vector3::zeros();
    let mut second_moment = Matrix3::zeros();

    for &t in triangles {
        let tri = &mesh.triangles[t as usize];
        let area = tri.area();
        if area <= 0.0 {
            continue;
        }
        let [a, b, c] = tri.vertices.map(|v| v.coords - origin);
        let sum = a + b + c;
        total_area += area;
        first_moment += sum * (area / 3.0);
        // Exact integral of x x^T over the triangle
        second_moment += (a * a.transpose() + b * b.transpose() + c * c.transpose()
            + sum * sum.transpose())
            * (area / 12.0);
    }

    if total_area <= 0.0 {
        let d = bounds.dimensions();
        return PrincipalShape {
            spreads: [0.0; 3],
            axes: [Vector3::x(), Vector3::y(), Vector3::z()],
            extents: [d.x, d.y, d.z],
        };
    }

    let mean = first_moment / total_area;
    let covariance = second_moment / total_area - mean * mean.transpose();
    let eigen = SymmetricEigen::new(covariance);

    let mut order = [0usize, 1, 2];
    order.sort_by(|&i, &j| eigen.eigenvalues[j].total_cmp(&eigen.eigenvalues[i]));

    let spreads = order.map(|i| eigen.eigenvalues[i].max(0.0).sqrt());
    let axes = order.map(|i| eigen.eigenvectors.column(i).into_owned());

    let mut min = [f64::INFINITY; 3];
    let mut max = [f64::NEG_INFINITY; 3];
    for &t in triangles {
        for v in &mesh.triangles[t as usize].vertices {
            let local = v.coords - origin;
            for (k, axis) in axes.iter().enumerate() {
                let d = local.dot(axis);
                min[k] = min[k].min(d);
                max[k] = max[k].max(d);
            }
        }
    }
    let extents = [0, 1, 2].map(|k| max[k] - min[k]);

    PrincipalShape {
        spreads,
        axes,
        extents,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::partition_islands;
    use crate::primitives::{bipyramid, cuboid, uv_sphere};
    use crate::types::Triangle;
    use approx::assert_relative_eq;

    fn describe_single(mesh: &TriangleMesh) -> IslandDescriptor {
        let params = AnalysisParams::default();
        let partition = partition_islands(mesh, &params);
        assert_eq!(partition.island_count(), 1);
        describe_island(mesh, &partition.islands[0], &partition.quantizer, &params)
    }

    #[test]
    fn test_cube_descriptor() {
        let d = describe_single(&cuboid([1.0, 2.0, 3.0], [2.0, 2.0, 2.0]));

        assert_eq!(d.triangle_count, 12);
        assert_eq!(d.vertex_count, 8);
        assert_relative_eq!(d.volume(), 8.0, epsilon = 1e-9);
        assert_relative_eq!(d.surface_area, 24.0, epsilon = 1e-9);
        assert_relative_eq!(d.bounds.min.x, 0.0);
        assert_relative_eq!(d.bounds.max.z, 4.0);
        assert!(!d.low_confidence);

        // Face diagonals are coplanar, cube edges are right angles
        assert_eq!(d.facet_angles.flat, 6);
        assert_eq!(d.facet_angles.moderate, 0);
        assert_eq!(d.facet_angles.sharp, 12);
        assert!(d.facet_angles.is_closed());
        assert_eq!(d.facet_angles.inconsistent_windings, 0);

        assert_relative_eq!(d.principal.anisotropy(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_sliver_on_cube_edge_keeps_angle() {
        let mut mesh = cuboid([0.0, 0.0, 0.0], [2.0, 2.0, 2.0]);
        mesh.triangles.push(Triangle::from_coords(
            [-1.0, -1.0, -1.0],
            [-1.0, -1.0, -1.0],
            [1.0, -1.0, -1.0],
        ));
        let d = describe_single(&mesh);

        assert_eq!(d.facet_angles.sharp, 12);
        assert_eq!(d.facet_angles.non_manifold_edges, 0);
        assert!(d.facet_angles.is_closed());
    }

    #[test]
    fn test_cuboid_principal_extents() {
        let d = describe_single(&cuboid([0.0, 0.0, 0.0], [20.0, 16.0, 12.0]));
        assert!(d.principal.spreads[0] > d.principal.spreads[1]);
        assert!(d.principal.spreads[1] > d.principal.spreads[2]);
        assert_relative_eq!(d.principal.extents[0], 20.0, epsilon = 1e-6);
        assert_relative_eq!(d.principal.extents[1], 16.0, epsilon = 1e-6);
        assert_relative_eq!(d.principal.extents[2], 12.0, epsilon = 1e-6);
        assert_relative_eq!(d.bounding_volume(), 3840.0, epsilon = 1e-6);
    }

    #[test]
    fn test_sphere_is_smooth_and_isotropic() {
        let d = describe_single(&uv_sphere([0.0, 0.0, 0.0], 1.5, 32, 16));
        assert_eq!(d.facet_angles.flat, d.facet_angles.total());
        assert!(d.facet_angles.is_closed());
        assert!(d.principal.anisotropy() < 1.01);
        // Inscribed polyhedron volume is slightly below the sphere's
        let sphere_volume = 4.0 / 3.0 * std::f64::consts::PI * 1.5f64.powi(3);
        assert!(d.volume() < sphere_volume);
        assert!(d.volume() > 0.95 * sphere_volume);
    }

    #[test]
    fn test_elongated_bipyramid_is_moderate() {
        let d = describe_single(&bipyramid([0.0, 0.0, 0.0], 8, 3.0, 1.0, 1.0));
        assert_eq!(d.facet_angles.moderate, 24);
        assert_eq!(d.facet_angles.total(), 24);
        assert!(d.principal.elongation() > 2.5);
        assert!(d.principal.cross_section_aspect() < 1.01);
    }

    #[test]
    fn test_flipped_triangle_does_not_change_profile() {
        let mut mesh = cuboid([0.0, 0.0, 0.0], [2.0, 2.0, 2.0]);
        mesh.triangles[3].vertices.swap(1, 2);
        let d = describe_single(&mesh);
        assert_eq!(d.facet_angles.flat, 6);
        assert_eq!(d.facet_angles.sharp, 12);
        assert_eq!(d.facet_angles.inconsistent_windings, 3);
    }

    #[test]
    fn test_open_fan_has_zero_volume() {
        // Three faces of a corner tetrahedron; the slanted face is missing
        let mesh = TriangleMesh::from_triangles(vec![
            Triangle::from_coords([0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]),
            Triangle::from_coords([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
            Triangle::from_coords([0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ]);
        let d = describe_single(&mesh);
        assert!(d.low_confidence);
        assert_eq!(d.signed_volume, 0.0);
        assert_eq!(d.facet_angles.boundary_edges, 3);
        assert!(d.surface_area > 1.4);
    }

    #[test]
    fn test_small_island_is_low_confidence() {
        let mesh = TriangleMesh::from_triangles(vec![
            Triangle::from_coords([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            Triangle::from_coords([1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]),
        ]);
        let d = describe_single(&mesh);
        assert!(d.low_confidence);
        assert_eq!(d.vertex_count, 4);
        assert_relative_eq!(d.volume(), 0.0, epsilon = 1e-12);
        assert_eq!(d.facet_angles.flat, 1);
        assert_eq!(d.facet_angles.boundary_edges, 4);
        assert!(d.principal.thickness_ratio() < 1e-6);
    }

    #[test]
    fn test_zero_area_island() {
        let mesh = TriangleMesh::from_triangles(vec![Triangle::from_coords(
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [2.0, 0.0, 0.0],
        )]);
        let d = describe_single(&mesh);
        assert_eq!(d.surface_area, 0.0);
        assert_eq!(d.principal.spreads, [0.0; 3]);
        assert_eq!(d.facet_angles.total(), 0);
    }
}
