//! The analysis pipeline.
//!
//! Mesh → islands → descriptors → classifications → result, in one
//! synchronous pass. Islands are described in parallel; everything else runs
//! on the calling thread. The mesh is only read.

use rayon::prelude::*;
use tracing::{debug, error, warn};

use crate::classify::classify_islands;
use crate::error::{AnalysisWarning, GemResult};
use crate::features::{IslandDescriptor, describe_island};
use crate::params::AnalysisParams;
use crate::partition::partition_islands;
use crate::result::{AnalysisReport, AnalysisResult, IslandSummary, aggregate};
use crate::tracing_ext::{
    OperationTimer, log_analysis_result, log_island_stats, log_island_stats_detailed,
};
use crate::types::TriangleMesh;

/// Runs gem analyses with a fixed set of parameters.
///
/// # Example
///
/// ```
/// use gem_analysis::GemAnalyzer;
/// use gem_analysis::primitives::{cuboid, merge_all};
///
/// let body = cuboid([0.0, 0.0, 0.0], [20.0, 16.0, 12.0]);
/// let stone = cuboid([3.0, 3.0, 2.0], [2.0, 2.0, 2.0]);
/// let mesh = merge_all([&body, &stone]);
///
/// let result = GemAnalyzer::new().analyze(&mesh).unwrap();
/// assert!(result.is_gem_present());
/// assert_eq!(result.shape_labels(), vec!["princess"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct GemAnalyzer {
    params: AnalysisParams,
}

impl GemAnalyzer {
    /// Analyzer with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Analyzer with custom parameters, validated up front.
    pub fn with_params(params: AnalysisParams) -> GemResult<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    /// Parameters in use.
    pub fn params(&self) -> &AnalysisParams {
        &self.params
    }

    /// Analyze a mesh and return the presentation-facing result.
    pub fn analyze(&self, mesh: &TriangleMesh) -> GemResult<AnalysisResult> {
        self.analyze_detailed(mesh).map(AnalysisReport::into_result)
    }

    /// Analyze a mesh and return the result with per-island details.
    ///
    /// # Errors
    ///
    /// - [`GemError::InvalidCoordinate`](crate::GemError::InvalidCoordinate)
    ///   if any corner is NaN or infinite.
    /// - [`GemError::InternalInconsistency`](crate::GemError::InternalInconsistency)
    ///   if the partition does not cover every triangle exactly once.
    pub fn analyze_detailed(&self, mesh: &TriangleMesh) -> GemResult<AnalysisReport> {
        let timer = OperationTimer::for_mesh("analyze", mesh);

        mesh.check_finite()?;

        if mesh.is_empty() {
            debug!("Mesh has no triangles, reporting no gems");
            return Ok(AnalysisReport {
                result: AnalysisResult::no_gems(),
                islands: Vec::new(),
                warnings: vec![AnalysisWarning::EmptyMesh],
                vertex_step: 0.0,
            });
        }

        let partition = partition_islands(mesh, &self.params);
        partition.verify(mesh.triangle_count())?;

        let descriptors: Vec<IslandDescriptor> = partition
            .islands
            .par_iter()
            .map(|island| describe_island(mesh, island, &partition.quantizer, &self.params))
            .collect();
        for (index, descriptor) in descriptors.iter().enumerate() {
            log_island_stats(index, descriptor);
            log_island_stats_detailed(index, descriptor);
        }

        let classifications = classify_islands(&descriptors, &self.params.rules);
        let result = aggregate(&classifications);

        let warnings: Vec<AnalysisWarning> = classifications
            .iter()
            .enumerate()
            .filter_map(|(island, c)| {
                c.degenerate
                    .map(|reason| AnalysisWarning::DegenerateGeometry { island, reason })
            })
            .collect();

        let islands = partition
            .islands
            .into_iter()
            .zip(descriptors)
            .zip(classifications)
            .enumerate()
            .map(|(index, ((island, descriptor), classification))| IslandSummary {
                index,
                triangles: island.triangles,
                descriptor,
                classification,
            })
            .collect::<Vec<_>>();

        log_analysis_result(&result, islands.len(), timer.elapsed_ms());

        Ok(AnalysisReport {
            result,
            islands,
            warnings,
            vertex_step: partition.quantizer.step(),
        })
    }

    /// Analyze a mesh, resolving any fatal error to a result with no gems.
    ///
    /// The error is logged; callers that must always show something use this.
    pub fn analyze_or_default(&self, mesh: &TriangleMesh) -> AnalysisResult {
        match self.analyze(mesh) {
            Ok(result) => result,
            Err(e) if e.is_internal() => {
                error!(code = %e.code(), "Gem analysis failed: {}", e);
                AnalysisResult::no_gems()
            }
            Err(e) => {
                warn!(code = %e.code(), "Gem analysis unavailable: {}", e);
                AnalysisResult::no_gems()
            }
        }
    }
}

/// Analyze a mesh with default parameters.
pub fn analyze_mesh(mesh: &TriangleMesh) -> GemResult<AnalysisResult> {
    GemAnalyzer::new().analyze(mesh)
}
