//! Tracing extensions for gem analysis.
//!
//! Structured logging and timing for the analysis pipeline, built on the
//! `tracing` ecosystem:
//!
//! - **Timing**: [`OperationTimer`] logs elapsed time when dropped
//! - **Island state**: descriptor summaries at debug and trace level
//! - **Results**: one info line per finished analysis
//!
//! # Usage
//!
//! Install a subscriber in the application:
//!
//! ```rust,ignore
//! use tracing_subscriber::{fmt, prelude::*, EnvFilter};
//!
//! tracing_subscriber::registry()
//!     .with(fmt::layer())
//!     .with(EnvFilter::from_default_env())
//!     .init();
//!
//! // RUST_LOG=gem_analysis=debug for per-island output
//! ```
//!
//! # Log Levels
//!
//! - **ERROR**: fatal analysis errors
//! - **WARN**: degenerate islands, errors swallowed by `analyze_or_default`
//! - **INFO**: per-analysis summaries, timing
//! - **DEBUG**: per-island classification, partition details
//! - **TRACE**: full descriptors

use std::time::Instant;

use tracing::{Span, debug, info, trace};

use crate::features::IslandDescriptor;
use crate::result::AnalysisResult;
use crate::types::TriangleMesh;

/// A timer that logs its duration on drop.
///
/// # Example
///
/// ```
/// use gem_analysis::tracing_ext::OperationTimer;
///
/// fn expensive_operation() {
///     let _timer = OperationTimer::new("expensive_operation");
///     // ... do work ...
/// } // logged here
/// # expensive_operation();
/// ```
pub struct OperationTimer {
    name: &'static str,
    start: Instant,
    span: Span,
}

impl OperationTimer {
    /// Create a new operation timer.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!("gem_operation", operation = name);
        debug!(target: "gem_analysis::timing", operation = name, "Starting operation");
        Self {
            name,
            start: Instant::now(),
            span,
        }
    }

    /// Create a timer that also records the mesh size.
    pub fn for_mesh(name: &'static str, mesh: &TriangleMesh) -> Self {
        let triangles = mesh.triangle_count();
        let span = tracing::info_span!("gem_operation", operation = name, triangles);
        debug!(
            target: "gem_analysis::timing",
            operation = name,
            triangles,
            "Starting operation"
        );
        Self {
            name,
            start: Instant::now(),
            span,
        }
    }

    /// Milliseconds since the timer was created.
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// The span opened for this operation.
    pub fn span(&self) -> &Span {
        &self.span
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        let elapsed_ms = self.elapsed_ms();
        info!(
            target: "gem_analysis::timing",
            operation = self.name,
            elapsed_ms = format!("{:.2}", elapsed_ms),
            "Operation completed"
        );
    }
}

/// Log an island descriptor at debug level.
pub fn log_island_stats(index: usize, descriptor: &IslandDescriptor) {
    let dims = descriptor.bounds.dimensions();
    let [a, b, c] = descriptor.principal.spreads;

    debug!(
        target: "gem_analysis::island_state",
        island = index,
        triangles = descriptor.triangle_count,
        vertices = descriptor.vertex_count,
        dimensions = format!("{:.3} x {:.3} x {:.3}", dims.x, dims.y, dims.z),
        spreads = format!("{:.4} / {:.4} / {:.4}", a, b, c),
        closed = descriptor.facet_angles.is_closed(),
        "Island state"
    );
}

/// Log an island descriptor at trace level, with every field.
pub fn log_island_stats_detailed(index: usize, descriptor: &IslandDescriptor) {
    let angles = &descriptor.facet_angles;
    let [ea, eb, ec] = descriptor.principal.extents;

    trace!(
        target: "gem_analysis::island_state",
        island = index,
        triangles = descriptor.triangle_count,
        vertices = descriptor.vertex_count,
        volume = format!("{:.6}", descriptor.volume()),
        surface_area = format!("{:.6}", descriptor.surface_area),
        extents = format!("{:.4} x {:.4} x {:.4}", ea, eb, ec),
        flat = angles.flat,
        moderate = angles.moderate,
        sharp = angles.sharp,
        boundary_edges = angles.boundary_edges,
        non_manifold_edges = angles.non_manifold_edges,
        inconsistent_windings = angles.inconsistent_windings,
        low_confidence = descriptor.low_confidence,
        "Detailed island state"
    );
}

/// Log a finished analysis.
pub fn log_analysis_result(result: &AnalysisResult, islands: usize, elapsed_ms: f64) {
    info!(
        target: "gem_analysis::result",
        islands,
        is_gem_present = result.is_gem_present(),
        shapes = result.shape_labels().join(","),
        elapsed_ms = format!("{:.2}", elapsed_ms),
        "Analysis completed"
    );
}
