//! Edge adjacency over quantized vertex keys.
//!
//! Triangles in a soup carry no shared indices, so an edge is identified by
//! the unordered pair of [`VertexKey`]s of its end points. Each use of an edge
//! records the triangle and the direction it traverses the edge, which lets
//! callers detect winding disagreements between neighbours.

use hashbrown::HashMap;

use crate::partition::{VertexKey, VertexQuantizer};
use crate::types::TriangleMesh;

/// One triangle's use of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeUse {
    /// Triangle index in the source mesh.
    pub triangle: u32,
    /// True if the triangle traverses the edge from the smaller key to the larger.
    pub forward: bool,
}

/// Edge-to-triangle incidence for a set of triangles.
#[derive(Debug, Clone, Default)]
pub struct KeyedAdjacency {
    /// Triangle uses per undirected edge `(smaller key, larger key)`.
    pub edge_uses: HashMap<(VertexKey, VertexKey), Vec<EdgeUse>>,
}

impl KeyedAdjacency {
    /// Build adjacency for the given triangles of `mesh`.
    ///
    /// Triangles with fewer than three distinct keys are skipped: their edges
    /// are either collapsed or doubled over one another.
    pub fn build(
        mesh: &TriangleMesh,
        triangles: &[u32],
        quantizer: &VertexQuantizer,
    ) -> Self {
        let mut edge_uses: HashMap<(VertexKey, VertexKey), Vec<EdgeUse>> =
            HashMap::with_capacity(triangles.len() * 3 / 2);

        for &t in triangles {
            let tri = &mesh.triangles[t as usize];
            let keys = tri.vertices.map(|v| quantizer.key(&v));
            if keys[0] == keys[1] || keys[1] == keys[2] || keys[2] == keys[0] {
                continue;
            }
            for (a, b) in [(0, 1), (1, 2), (2, 0)] {
                let (ka, kb) = (keys[a], keys[b]);
                let forward = ka < kb;
                let edge = if forward { (ka, kb) } else { (kb, ka) };
                edge_uses.entry(edge).or_default().push(EdgeUse {
                    triangle: t,
                    forward,
                });
            }
        }

        Self { edge_uses }
    }

    /// Number of distinct edges.
    pub fn edge_count(&self) -> usize {
        self.edge_uses.len()
    }

    /// Edges used by exactly two triangles.
    pub fn manifold_pairs(&self) -> impl Iterator<Item = (EdgeUse, EdgeUse)> + '_ {
        self.edge_uses.values().filter_map(|uses| match uses.as_slice() {
            [a, b] => Some((*a, *b)),
            _ => None,
        })
    }

    /// Number of edges used by a single triangle.
    pub fn boundary_edge_count(&self) -> usize {
        self.edge_uses.values().filter(|u| u.len() == 1).count()
    }

    /// Number of edges used by more than two triangles.
    pub fn non_manifold_edge_count(&self) -> usize {
        self.edge_uses.values().filter(|u| u.len() > 2).count()
    }
}
