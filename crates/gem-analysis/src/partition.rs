//! Connectivity partitioning of a triangle soup into islands.
//!
//! STL triangles do not share vertex indices, only coincident coordinates.
//! Every corner is therefore quantized into a [`VertexKey`], and two triangles
//! are connected if they share at least one key. An island is a maximal set of
//! connected triangles; the islands of a mesh partition its triangles with no
//! overlap and no omission.

use hashbrown::HashMap;
use nalgebra::Point3;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{GemError, GemResult};
use crate::params::AnalysisParams;
use crate::types::TriangleMesh;

/// A corner position quantized to the partition tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VertexKey([i64; 3]);

impl VertexKey {
    /// Raw quantized coordinates.
    pub fn cells(&self) -> [i64; 3] {
        self.0
    }
}

/// Maps positions to [`VertexKey`]s with a fixed quantization step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexQuantizer {
    step: f64,
}

impl VertexQuantizer {
    /// Quantizer with an explicit absolute step.
    pub fn with_step(step: f64) -> Self {
        Self { step }
    }

    /// Quantizer whose step is `vertex_tolerance` times the mesh diagonal,
    /// bounded below by `min_absolute_tolerance`.
    pub fn for_mesh(mesh: &TriangleMesh, params: &AnalysisParams) -> Self {
        let diagonal = mesh.bounds().map(|b| b.diagonal()).unwrap_or(0.0);
        let step = (diagonal * params.vertex_tolerance).max(params.min_absolute_tolerance);
        Self { step }
    }

    /// Absolute quantization step.
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Quantize a position.
    #[inline]
    pub fn key(&self, p: &Point3<f64>) -> VertexKey {
        VertexKey([
            (p.x / self.step).round() as i64,
            (p.y / self.step).round() as i64,
            (p.z / self.step).round() as i64,
        ])
    }
}

/// A maximal set of triangles connected through shared vertex keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Island {
    /// Triangle indices into the source mesh, ascending.
    pub triangles: Vec<u32>,
}

impl Island {
    /// Number of triangles.
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    /// True if the island has no triangles.
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Index of the first triangle, which fixes the island's position in the partition.
    pub fn first_triangle(&self) -> Option<u32> {
        self.triangles.first().copied()
    }
}

/// Result of connectivity partitioning.
#[derive(Debug, Clone)]
pub struct Partition {
    /// Islands in order of their first-encountered triangle.
    pub islands: Vec<Island>,
    /// Quantizer used to build the vertex keys.
    pub quantizer: VertexQuantizer,
}

impl Partition {
    /// Number of islands.
    pub fn island_count(&self) -> usize {
        self.islands.len()
    }

    /// True if the mesh is a single connected solid.
    pub fn is_connected(&self) -> bool {
        self.islands.len() == 1
    }

    /// Island index for every triangle, or `None` if the partition is inconsistent.
    pub fn triangle_assignment(&self, triangle_count: usize) -> Option<Vec<usize>> {
        let mut assignment = vec![usize::MAX; triangle_count];
        for (island_idx, island) in self.islands.iter().enumerate() {
            for &t in &island.triangles {
                let slot = assignment.get_mut(t as usize)?;
                if *slot != usize::MAX {
                    return None;
                }
                *slot = island_idx;
            }
        }
        assignment.iter().all(|&i| i != usize::MAX).then_some(assignment)
    }

    /// Check that the islands cover `triangle_count` triangles exactly once.
    pub fn verify(&self, triangle_count: usize) -> GemResult<()> {
        let mut seen = vec![false; triangle_count];
        for (island_idx, island) in self.islands.iter().enumerate() {
            if island.is_empty() {
                return Err(GemError::internal_inconsistency(format!(
                    "island {} has no triangles",
                    island_idx
                )));
            }
            for &t in &island.triangles {
                match seen.get_mut(t as usize) {
                    None => {
                        return Err(GemError::internal_inconsistency(format!(
                            "island {} references triangle {} but the mesh has {} triangles",
                            island_idx, t, triangle_count
                        )));
                    }
                    Some(true) => {
                        return Err(GemError::internal_inconsistency(format!(
                            "triangle {} belongs to more than one island",
                            t
                        )));
                    }
                    Some(slot) => *slot = true,
                }
            }
        }

        if let Some(missing) = seen.iter().position(|&s| !s) {
            return Err(GemError::internal_inconsistency(format!(
                "triangle {} belongs to no island",
                missing
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for Partition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Island Partition:")?;
        writeln!(f, "  Islands: {}", self.islands.len())?;
        writeln!(f, "  Vertex tolerance: {:.3e}", self.quantizer.step())?;
        for (i, island) in self.islands.iter().enumerate() {
            writeln!(f, "    Island {}: {} triangles", i, island.len())?;
        }
        Ok(())
    }
}

/// Union-find over triangle indices. The smaller index always becomes the
/// root, so roots are the first triangle of their island.
struct DisjointSet {
    parent: Vec<u32>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n as u32).collect(),
        }
    }

    fn find(&mut self, mut x: u32) -> u32 {
        while self.parent[x as usize] != x {
            let grandparent = self.parent[self.parent[x as usize] as usize];
            self.parent[x as usize] = grandparent;
            x = grandparent;
        }
        x
    }

    fn union(&mut self, a: u32, b: u32) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra < rb {
            self.parent[rb as usize] = ra;
        } else if rb < ra {
            self.parent[ra as usize] = rb;
        }
    }
}

/// Partition a mesh into islands of triangles connected through shared vertex keys.
///
/// Degenerate triangles join whichever island their keys belong to. An empty
/// mesh yields an empty partition.
///
/// # Example
///
/// ```
/// use gem_analysis::{AnalysisParams, Triangle, TriangleMesh};
/// use gem_analysis::partition::partition_islands;
///
/// let mesh = TriangleMesh::from_triangles(vec![
///     Triangle::from_coords([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
///     Triangle::from_coords([1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]),
///     Triangle::from_coords([9.0, 9.0, 9.0], [8.0, 9.0, 9.0], [9.0, 8.0, 9.0]),
/// ]);
///
/// let partition = partition_islands(&mesh, &AnalysisParams::default());
/// assert_eq!(partition.island_count(), 2);
/// assert_eq!(partition.islands[0].triangles, vec![0, 1]);
/// ```
pub fn partition_islands(mesh: &TriangleMesh, params: &AnalysisParams) -> Partition {
    let quantizer = VertexQuantizer::for_mesh(mesh, params);
    let triangle_count = mesh.triangle_count();

    if triangle_count == 0 {
        return Partition {
            islands: Vec::new(),
            quantizer,
        };
    }

    let mut sets = DisjointSet::new(triangle_count);
    let mut first_owner: HashMap<VertexKey, u32> = HashMap::with_capacity(triangle_count * 3 / 2);

    for (idx, tri) in mesh.triangles.iter().enumerate() {
        let idx = idx as u32;
        for v in &tri.vertices {
            let key = quantizer.key(v);
            match first_owner.get(&key) {
                Some(&owner) => sets.union(idx, owner),
                None => {
                    first_owner.insert(key, idx);
                }
            }
        }
    }

    let mut island_of_root: HashMap<u32, usize> = HashMap::new();
    let mut islands: Vec<Island> = Vec::new();
    for idx in 0..triangle_count as u32 {
        let root = sets.find(idx);
        let island_idx = *island_of_root.entry(root).or_insert_with(|| {
            islands.push(Island {
                triangles: Vec::new(),
            });
            islands.len() - 1
        });
        islands[island_idx].triangles.push(idx);
    }

    info!(
        "Found {} island(s) in mesh with {} triangles",
        islands.len(),
        triangle_count
    );
    if islands.len() > 1 {
        debug!(
            "Island sizes: {:?}",
            islands.iter().map(Island::len).collect::<Vec<_>>()
        );
    }

    Partition { islands, quantizer }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Triangle;

    fn tri(a: [f64; 3], b: [f64; 3], c: [f64; 3]) -> Triangle {
        Triangle::from_coords(a, b, c)
    }

    #[test]
    fn test_empty_mesh() {
        let partition = partition_islands(&TriangleMesh::new(), &AnalysisParams::default());
        assert_eq!(partition.island_count(), 0);
        assert!(partition.verify(0).is_ok());
    }

    #[test]
    fn test_two_disjoint_triangles() {
        let mesh = TriangleMesh::from_triangles(vec![
            tri([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            tri([10.0, 0.0, 0.0], [11.0, 0.0, 0.0], [10.0, 1.0, 0.0]),
        ]);
        let partition = partition_islands(&mesh, &AnalysisParams::default());
        assert_eq!(partition.island_count(), 2);
        assert!(!partition.is_connected());
        assert!(partition.verify(2).is_ok());
    }

    #[test]
    fn test_single_shared_vertex_connects() {
        let mesh = TriangleMesh::from_triangles(vec![
            tri([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            tri([1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [2.0, 1.0, 0.0]),
        ]);
        let partition = partition_islands(&mesh, &AnalysisParams::default());
        assert!(partition.is_connected());
    }

    #[test]
    fn test_decoder_noise_within_tolerance_merges() {
        // Diagonal is ~1.4, so the step is ~1.4e-6
        let mesh = TriangleMesh::from_triangles(vec![
            tri([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            tri([1.0 + 1e-9, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0 - 1e-9, 0.0]),
        ]);
        let partition = partition_islands(&mesh, &AnalysisParams::default());
        assert!(partition.is_connected());
    }

    #[test]
    fn test_gap_beyond_tolerance_separates() {
        let mesh = TriangleMesh::from_triangles(vec![
            tri([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            tri([1.001, 0.0, 0.0], [1.0, 1.0, 0.0], [0.5, 1.0, 0.0]),
        ]);
        let partition = partition_islands(&mesh, &AnalysisParams::default());
        assert_eq!(partition.island_count(), 2);

        // A coarse tolerance welds the gap
        let coarse = AnalysisParams::default().with_vertex_tolerance(1e-2);
        assert!(partition_islands(&mesh, &coarse).is_connected());
    }

    #[test]
    fn test_transitive_connection_keeps_first_order() {
        // Triangle 0 and 2 only meet through triangle 3
        let mesh = TriangleMesh::from_triangles(vec![
            tri([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            tri([20.0, 0.0, 0.0], [21.0, 0.0, 0.0], [20.0, 1.0, 0.0]),
            tri([5.0, 0.0, 0.0], [6.0, 0.0, 0.0], [5.0, 1.0, 0.0]),
            tri([1.0, 0.0, 0.0], [5.0, 0.0, 0.0], [3.0, 2.0, 0.0]),
        ]);
        let partition = partition_islands(&mesh, &AnalysisParams::default());
        assert_eq!(partition.island_count(), 2);
        assert_eq!(partition.islands[0].triangles, vec![0, 2, 3]);
        assert_eq!(partition.islands[1].triangles, vec![1]);
    }

    #[test]
    fn test_degenerate_triangle_joins_island() {
        let mesh = TriangleMesh::from_triangles(vec![
            tri([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            // Collinear, shares a corner with triangle 0
            tri([1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [3.0, 0.0, 0.0]),
            // All three corners coincide
            tri([7.0, 7.0, 7.0], [7.0, 7.0, 7.0], [7.0, 7.0, 7.0]),
        ]);
        let partition = partition_islands(&mesh, &AnalysisParams::default());
        assert_eq!(partition.island_count(), 2);
        assert_eq!(partition.islands[0].triangles, vec![0, 1]);
        assert_eq!(partition.islands[1].triangles, vec![2]);
        assert!(partition.verify(3).is_ok());
    }

    #[test]
    fn test_verify_detects_out_of_range_triangle() {
        let partition = Partition {
            islands: vec![Island {
                triangles: vec![0, 5],
            }],
            quantizer: VertexQuantizer::with_step(1e-6),
        };
        let err = partition.verify(2).unwrap_err();
        assert!(matches!(err, GemError::InternalInconsistency { .. }));
        assert!(partition.triangle_assignment(2).is_none());
    }

    #[test]
    fn test_verify_detects_overlap_and_omission() {
        let overlapping = Partition {
            islands: vec![
                Island {
                    triangles: vec![0, 1],
                },
                Island {
                    triangles: vec![1, 2],
                },
            ],
            quantizer: VertexQuantizer::with_step(1e-6),
        };
        assert!(overlapping.verify(3).is_err());

        let incomplete = Partition {
            islands: vec![Island {
                triangles: vec![0, 2],
            }],
            quantizer: VertexQuantizer::with_step(1e-6),
        };
        let err = incomplete.verify(3).unwrap_err();
        assert!(err.to_string().contains("triangle 1 belongs to no island"));
    }

    #[test]
    fn test_triangle_assignment() {
        let mesh = TriangleMesh::from_triangles(vec![
            tri([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            tri([10.0, 0.0, 0.0], [11.0, 0.0, 0.0], [10.0, 1.0, 0.0]),
            tri([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0]),
        ]);
        let partition = partition_islands(&mesh, &AnalysisParams::default());
        assert_eq!(partition.triangle_assignment(3), Some(vec![0, 1, 0]));
    }
}
