//! Analysis results handed to the presentation layer.

use serde::Serialize;

use crate::classify::{Classification, GemShape};
use crate::error::AnalysisWarning;
use crate::features::IslandDescriptor;

/// Outcome of one analysis: whether gems exist and which shapes they have.
///
/// Immutable once built; serializes as
/// `{"isGemPresent": true, "shapeNames": ["round", "princess"]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    is_gem_present: bool,
    shape_names: Vec<GemShape>,
}

impl AnalysisResult {
    /// Result with no gems, used for empty meshes and unavailable analyses.
    pub fn no_gems() -> Self {
        Self::default()
    }

    /// True if at least one island is a gem.
    pub fn is_gem_present(&self) -> bool {
        self.is_gem_present
    }

    /// Distinct gem shapes in order of first detection.
    pub fn shape_names(&self) -> &[GemShape] {
        &self.shape_names
    }

    /// Shape labels as strings, in order of first detection.
    pub fn shape_labels(&self) -> Vec<&'static str> {
        self.shape_names.iter().map(GemShape::as_str).collect()
    }
}

impl std::fmt::Display for AnalysisResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_gem_present {
            write!(f, "gems detected: {}", self.shape_labels().join(", "))
        } else {
            write!(f, "no gems detected")
        }
    }
}

/// Fold per-island classifications into an [`AnalysisResult`].
///
/// Duplicate shapes collapse to their first occurrence; `unknown` is kept.
///
/// # Example
///
/// ```
/// use gem_analysis::{Classification, GemShape, aggregate};
///
/// let result = aggregate(&[
///     Classification::body(),
///     Classification::gem(GemShape::Round),
///     Classification::gem(GemShape::Unknown),
///     Classification::gem(GemShape::Round),
/// ]);
/// assert!(result.is_gem_present());
/// assert_eq!(result.shape_labels(), vec!["round", "unknown"]);
/// ```
pub fn aggregate(classifications: &[Classification]) -> AnalysisResult {
    let mut shape_names: Vec<GemShape> = Vec::new();
    let mut is_gem_present = false;

    for class in classifications.iter().filter(|c| c.is_gem()) {
        is_gem_present = true;
        let shape = class.shape.unwrap_or(GemShape::Unknown);
        if !shape_names.contains(&shape) {
            shape_names.push(shape);
        }
    }

    AnalysisResult {
        is_gem_present,
        shape_names,
    }
}

/// One island's descriptor and verdict.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IslandSummary {
    /// Island position in the partition.
    pub index: usize,
    /// Triangle indices into the source mesh.
    pub triangles: Vec<u32>,
    /// Geometric descriptor.
    pub descriptor: IslandDescriptor,
    /// Role and shape.
    pub classification: Classification,
}

/// Detailed outcome: the result plus everything that led to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    /// The presentation-facing result.
    pub result: AnalysisResult,
    /// Per-island details in partition order.
    pub islands: Vec<IslandSummary>,
    /// Non-fatal conditions met during the analysis.
    pub warnings: Vec<AnalysisWarning>,
    /// Absolute vertex quantization step used for partitioning.
    pub vertex_step: f64,
}

impl AnalysisReport {
    /// The body island, if the mesh was not empty.
    pub fn body(&self) -> Option<&IslandSummary> {
        self.islands.iter().find(|i| !i.classification.is_gem())
    }

    /// Gem islands in partition order.
    pub fn gems(&self) -> impl Iterator<Item = &IslandSummary> {
        self.islands.iter().filter(|i| i.classification.is_gem())
    }

    /// Consume the report, keeping only the result.
    pub fn into_result(self) -> AnalysisResult {
        self.result
    }
}
