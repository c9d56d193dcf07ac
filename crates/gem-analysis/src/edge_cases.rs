//! Edge case tests for analysis robustness.
//!
//! Unusual inputs must produce a result or a typed error, never a panic.

#[cfg(test)]
mod tests {
    use crate::classify::{GemShape, Role, classify_islands};
    use crate::features::{describe_island, facet_angle_profile};
    use crate::partition::{VertexQuantizer, partition_islands};
    use crate::primitives::{cuboid, merge_all, transform, uv_sphere};
    use crate::result::aggregate;
    use crate::{
        AnalysisParams, AnalysisWarning, DegenerateReason, GemAnalyzer, Triangle, TriangleMesh,
    };
    use nalgebra::{Similarity3, Vector3};

    fn body() -> TriangleMesh {
        cuboid([0.0, 0.0, 0.0], [20.0, 16.0, 12.0])
    }

    fn flipped(mesh: &TriangleMesh, every: usize) -> TriangleMesh {
        mesh.triangles
            .iter()
            .enumerate()
            .map(|(i, t)| {
                if i % every == 0 {
                    let [a, b, c] = t.vertices;
                    Triangle::new(a, c, b)
                } else {
                    *t
                }
            })
            .collect()
    }

    // ==================== Empty Mesh Tests ====================

    #[test]
    fn test_empty_mesh_partition() {
        let partition = partition_islands(&TriangleMesh::new(), &AnalysisParams::default());
        assert_eq!(partition.island_count(), 0);
        assert!(!partition.is_connected());
    }

    #[test]
    fn test_empty_mesh_classify_and_aggregate() {
        let classes = classify_islands(&[], &AnalysisParams::default().rules);
        assert!(classes.is_empty());
        assert!(!aggregate(&classes).is_gem_present());
    }

    #[test]
    fn test_empty_facet_profile() {
        let profile = facet_angle_profile(
            &TriangleMesh::new(),
            &[],
            &VertexQuantizer::with_step(1e-6),
            &AnalysisParams::default().facet_angles,
        );
        assert_eq!(profile.total(), 0);
        assert_eq!(profile.flat_fraction(), 0.0);
    }

    #[test]
    fn test_empty_mesh_analyze_or_default() {
        let result = GemAnalyzer::new().analyze_or_default(&TriangleMesh::new());
        assert!(!result.is_gem_present());
        assert!(result.shape_names().is_empty());
    }

    // ==================== Single Triangle Tests ====================

    #[test]
    fn test_single_triangle_is_body() {
        let mesh = TriangleMesh::from_triangles(vec![Triangle::from_coords(
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
        )]);
        let report = GemAnalyzer::new().analyze_detailed(&mesh).unwrap();
        assert_eq!(report.islands.len(), 1);
        assert_eq!(report.islands[0].classification.role, Role::Body);
        assert!(!report.result.is_gem_present());
    }

    #[test]
    fn test_single_triangle_descriptor() {
        let mesh = TriangleMesh::from_triangles(vec![Triangle::from_coords(
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
        )]);
        let params = AnalysisParams::default();
        let partition = partition_islands(&mesh, &params);
        let d = describe_island(&mesh, &partition.islands[0], &partition.quantizer, &params);
        assert_eq!(d.vertex_count, 3);
        assert_eq!(d.facet_angles.boundary_edges, 3);
        assert!(d.low_confidence);
        assert_eq!(d.volume(), 0.0);
    }

    // ==================== Degenerate Geometry Tests ====================

    #[test]
    fn test_only_point_triangles() {
        let mesh = TriangleMesh::from_triangles(vec![
            Triangle::from_coords([0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 0.0]),
            Triangle::from_coords([5.0, 0.0, 0.0], [5.0, 0.0, 0.0], [5.0, 0.0, 0.0]),
        ]);
        let report = GemAnalyzer::new().analyze_detailed(&mesh).unwrap();

        // Both islands have zero volume; the first one is the body
        assert_eq!(report.islands[0].classification.role, Role::Body);
        assert_eq!(report.result.shape_names(), &[GemShape::Unknown]);
        assert_eq!(
            report.warnings,
            vec![AnalysisWarning::DegenerateGeometry {
                island: 1,
                reason: DegenerateReason::TooFewTriangles { count: 1 },
            }]
        );
    }

    #[test]
    fn test_flat_gem_is_too_thin() {
        let slab = cuboid([5.0, 0.0, 0.0], [2.0, 2.0, 1e-3]);
        let mesh = merge_all([&body(), &slab]);
        let report = GemAnalyzer::new().analyze_detailed(&mesh).unwrap();

        assert_eq!(report.result.shape_names(), &[GemShape::Unknown]);
        assert!(matches!(
            report.warnings.as_slice(),
            [AnalysisWarning::DegenerateGeometry {
                island: 1,
                reason: DegenerateReason::TooThin { .. },
            }]
        ));
    }

    // ==================== Topology Tests ====================

    #[test]
    fn test_gem_touching_body_merges_into_it() {
        // The stone's corner coincides with the body's corner
        let stone = cuboid([11.0, 9.0, 7.0], [2.0, 2.0, 2.0]);
        let mesh = merge_all([&body(), &stone]);
        let report = GemAnalyzer::new().analyze_detailed(&mesh).unwrap();

        assert_eq!(report.islands.len(), 1);
        assert!(!report.result.is_gem_present());
    }

    #[test]
    fn test_open_gem_still_classified_as_gem() {
        let mut stone = cuboid([3.0, 3.0, 2.0], [2.0, 2.0, 2.0]);
        stone.triangles.pop();
        let mesh = merge_all([&body(), &stone]);
        let report = GemAnalyzer::new().analyze_detailed(&mesh).unwrap();

        assert!(report.result.is_gem_present());
        let gem = report.gems().next().unwrap();
        assert_eq!(gem.descriptor.facet_angles.boundary_edges, 3);
        assert!(!gem.descriptor.facet_angles.is_closed());
    }

    #[test]
    fn test_inconsistent_winding_does_not_change_shape() {
        let stone = uv_sphere([-4.0, -3.0, 0.0], 1.5, 32, 16);
        let mesh = merge_all([&body(), &flipped(&stone, 2)]);
        let report = GemAnalyzer::new().analyze_detailed(&mesh).unwrap();

        assert_eq!(report.result.shape_names(), &[GemShape::Round]);
        let gem = report.gems().next().unwrap();
        assert!(gem.descriptor.facet_angles.inconsistent_windings > 0);
    }

    #[test]
    fn test_inside_out_body() {
        let inverted = flipped(&body(), 1);
        let stone = cuboid([3.0, 3.0, 2.0], [2.0, 2.0, 2.0]);
        let mesh = merge_all([&inverted, &stone]);
        let report = GemAnalyzer::new().analyze_detailed(&mesh).unwrap();

        let body = report.body().unwrap();
        assert!(body.descriptor.signed_volume < 0.0);
        assert_eq!(body.descriptor.facet_angles.inconsistent_windings, 0);
        assert_eq!(report.result.shape_names(), &[GemShape::Princess]);
    }

    #[test]
    fn test_repeated_shapes_reported_once() {
        let a = cuboid([3.0, 3.0, 2.0], [2.0, 2.0, 2.0]);
        let b = cuboid([-3.0, 3.0, 2.0], [2.0, 2.0, 2.0]);
        let mesh = merge_all([&body(), &a, &b]);
        let report = GemAnalyzer::new().analyze_detailed(&mesh).unwrap();

        assert_eq!(report.gems().count(), 2);
        assert_eq!(report.result.shape_names(), &[GemShape::Princess]);
    }

    // ==================== Extreme Coordinate Tests ====================

    #[test]
    fn test_far_from_origin() {
        let stone = cuboid([3.0, 3.0, 2.0], [2.0, 2.0, 2.0]);
        let scene = merge_all([&body(), &stone]);
        let far = transform(
            &scene,
            &Similarity3::new(Vector3::new(1e6, -2e6, 5e5), Vector3::zeros(), 1.0),
        );
        let result = GemAnalyzer::new().analyze(&far).unwrap();
        assert_eq!(result.shape_names(), &[GemShape::Princess]);
    }

    #[test]
    fn test_non_finite_positions_rejected() {
        let positions = [0.0, 0.0, f32::NAN, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let mesh = TriangleMesh::from_positions(&positions).unwrap();
        assert!(GemAnalyzer::new().analyze(&mesh).is_err());
    }
}
