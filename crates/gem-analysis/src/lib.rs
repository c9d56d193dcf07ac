//! Gemstone detection and shape classification for jewelry triangle meshes.
//!
//! A decoded STL model of a ring or pendant is a triangle soup: the metal body
//! and every set stone are separate closed solids that never share a vertex.
//! This crate recovers those solids, decides which one is the body, and labels
//! the rest with a cut name.
//!
//! # Pipeline
//!
//! - **Partition** ([`partition`]): group triangles into islands through
//!   quantized vertex positions
//! - **Describe** ([`features`]): bounds, volume, dihedral angle histogram and
//!   rotation-normalized extents per island
//! - **Classify** ([`classify`]): largest island is the body, every other island
//!   is a gem labelled `round`, `princess`, `emerald`, `marquise`, `oval` or
//!   `unknown`
//! - **Aggregate**: [`AnalysisResult`] with `isGemPresent` and the distinct
//!   `shapeNames` in first-seen order
//!
//! # Units and Scale
//!
//! The analysis is unit-agnostic. Vertex matching uses a tolerance relative to
//! the mesh bounding-box diagonal, and every classification rule compares
//! ratios, so a model exported in millimeters, meters or inches gives the same
//! answer. Rotating or translating the model does not change the answer either.
//!
//! # Quick Start
//!
//! ```
//! use gem_analysis::{GemAnalyzer, GemShape};
//! use gem_analysis::primitives::{cuboid, merge_all, uv_sphere};
//!
//! let band = cuboid([0.0, 0.0, 0.0], [20.0, 16.0, 12.0]);
//! let stone = uv_sphere([-4.0, -3.0, 0.0], 1.5, 32, 16);
//! let mesh = merge_all([&band, &stone]);
//!
//! let result = GemAnalyzer::new().analyze(&mesh).unwrap();
//! assert!(result.is_gem_present());
//! assert_eq!(result.shape_names(), &[GemShape::Round]);
//! ```
//!
//! # Viewer Geometry Buffers
//!
//! ```
//! use gem_analysis::{TriangleMesh, analyze_mesh};
//!
//! // Non-indexed xyz positions, nine floats per triangle
//! let positions: Vec<f32> = vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
//! let mesh = TriangleMesh::from_positions(&positions).unwrap();
//! let result = analyze_mesh(&mesh).unwrap();
//! assert!(!result.is_gem_present());
//! ```
//!
//! # Logging
//!
//! The crate logs through `tracing`. Install a subscriber and set
//! `RUST_LOG=gem_analysis=debug` to see per-island decisions; see
//! [`tracing_ext`].

mod error;
mod params;
mod result;
pub mod tracing_ext;
mod types;

#[cfg(test)]
mod edge_cases;

pub mod adjacency;
pub mod analyzer;
pub mod classify;
pub mod features;
pub mod partition;
pub mod primitives;
pub mod session;

// Re-export core types at crate root
pub use error::{
    AnalysisWarning, DegenerateReason, ErrorCode, GemError, GemResult, RecoverySuggestion,
};
pub use params::{
    AnalysisParams, DEFAULT_FLAT_MAX_DEGREES, DEFAULT_MIN_ABSOLUTE_TOLERANCE,
    DEFAULT_SHARP_MIN_DEGREES, DEFAULT_VERTEX_TOLERANCE, FacetAngleBuckets, ShapeRules,
};
pub use types::{BoundingBox, Triangle, TriangleMesh};

pub use analyzer::{GemAnalyzer, analyze_mesh};
pub use classify::{Classification, GemShape, Role};
pub use features::{FacetAngleProfile, IslandDescriptor, PrincipalShape};
pub use partition::{Island, Partition};
pub use result::{AnalysisReport, AnalysisResult, IslandSummary, aggregate};
pub use session::{AnalysisOutcome, AnalysisSession};
