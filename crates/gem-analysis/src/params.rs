//! Analysis parameters.
//!
//! Every threshold the partitioner, feature extractor and classifier use lives
//! here with a documented default. The defaults are tuned on the reference
//! solids in [`crate::primitives`]; validate them against real models and
//! override them from TOML or JSON:
//!
//! ```toml
//! vertex_tolerance = 1e-5
//!
//! [facet_angles]
//! flat_max_degrees = 15.0
//!
//! [rules]
//! near_equal_ratio = 1.2
//! ```
//!
//! Missing keys keep their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GemError, GemResult};

/// Vertex Key quantization step, relative to the mesh bounding-box diagonal.
///
/// Too small a value splits one solid into spurious islands wherever the
/// decoder left floating-point noise; too large a value merges separate solids
/// that nearly touch.
pub const DEFAULT_VERTEX_TOLERANCE: f64 = 1e-6;

/// Lower bound on the absolute quantization step.
pub const DEFAULT_MIN_ABSOLUTE_TOLERANCE: f64 = 1e-12;

/// Dihedral angles below this are near-flat (degrees).
pub const DEFAULT_FLAT_MAX_DEGREES: f64 = 20.0;

/// Dihedral angles at or above this are sharp (degrees).
pub const DEFAULT_SHARP_MIN_DEGREES: f64 = 60.0;

/// Bucket boundaries for the facet-angle profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FacetAngleBuckets {
    /// Upper bound (exclusive) of the near-flat bucket, in degrees.
    pub flat_max_degrees: f64,
    /// Lower bound (inclusive) of the sharp bucket, in degrees.
    pub sharp_min_degrees: f64,
}

impl Default for FacetAngleBuckets {
    fn default() -> Self {
        Self {
            flat_max_degrees: DEFAULT_FLAT_MAX_DEGREES,
            sharp_min_degrees: DEFAULT_SHARP_MIN_DEGREES,
        }
    }
}

/// Thresholds of the shape decision table.
///
/// Ratios compare the principal spreads `a >= b >= c` of an island.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShapeRules {
    /// Islands with fewer triangles are low-confidence and labeled `unknown`.
    pub min_triangles: usize,
    /// Islands with `c / a` below this are too thin to classify.
    pub min_thickness_ratio: f64,
    /// Two spreads whose ratio is at most this count as equal.
    pub near_equal_ratio: f64,
    /// Sharp-facet fraction a princess must exceed.
    pub princess_min_sharp_fraction: f64,
    /// Moderate-facet fraction at which the profile counts as moderate-dominated.
    pub moderate_dominance: f64,
    /// Minimum `a / b` for a marquise.
    pub marquise_min_elongation: f64,
    /// Near-flat fraction required for round and oval.
    pub round_min_flat_fraction: f64,
}

impl Default for ShapeRules {
    fn default() -> Self {
        Self {
            min_triangles: 4,
            min_thickness_ratio: 0.02,
            near_equal_ratio: 1.15,
            princess_min_sharp_fraction: 0.6,
            moderate_dominance: 0.5,
            marquise_min_elongation: 2.0,
            round_min_flat_fraction: 0.6,
        }
    }
}

/// Parameters for a complete analysis.
///
/// # Example
///
/// ```
/// use gem_analysis::AnalysisParams;
///
/// let params = AnalysisParams::default().with_vertex_tolerance(1e-5);
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisParams {
    /// Vertex Key quantization step relative to the mesh diagonal.
    pub vertex_tolerance: f64,
    /// Lower bound on the absolute quantization step.
    pub min_absolute_tolerance: f64,
    /// Facet-angle bucket boundaries.
    pub facet_angles: FacetAngleBuckets,
    /// Shape decision thresholds.
    pub rules: ShapeRules,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            vertex_tolerance: DEFAULT_VERTEX_TOLERANCE,
            min_absolute_tolerance: DEFAULT_MIN_ABSOLUTE_TOLERANCE,
            facet_angles: FacetAngleBuckets::default(),
            rules: ShapeRules::default(),
        }
    }
}

impl AnalysisParams {
    /// Set the relative vertex tolerance.
    pub fn with_vertex_tolerance(mut self, tolerance: f64) -> Self {
        self.vertex_tolerance = tolerance;
        self
    }

    /// Set the facet-angle buckets.
    pub fn with_facet_angles(mut self, facet_angles: FacetAngleBuckets) -> Self {
        self.facet_angles = facet_angles;
        self
    }

    /// Set the shape rules.
    pub fn with_rules(mut self, rules: ShapeRules) -> Self {
        self.rules = rules;
        self
    }

    /// Check that every threshold is in range and consistent.
    pub fn validate(&self) -> GemResult<()> {
        positive("vertex_tolerance", self.vertex_tolerance)?;
        positive("min_absolute_tolerance", self.min_absolute_tolerance)?;

        let angles = &self.facet_angles;
        if !(angles.flat_max_degrees > 0.0 && angles.flat_max_degrees <= 180.0) {
            return Err(GemError::invalid_params(
                "flat_max_degrees",
                format!("{} is outside (0, 180]", angles.flat_max_degrees),
            ));
        }
        if !(angles.sharp_min_degrees >= angles.flat_max_degrees
            && angles.sharp_min_degrees <= 180.0)
        {
            return Err(GemError::invalid_params(
                "sharp_min_degrees",
                format!(
                    "{} must lie between flat_max_degrees ({}) and 180",
                    angles.sharp_min_degrees, angles.flat_max_degrees
                ),
            ));
        }

        let rules = &self.rules;
        if rules.min_triangles == 0 {
            return Err(GemError::invalid_params("min_triangles", "must be at least 1"));
        }
        fraction("min_thickness_ratio", rules.min_thickness_ratio)?;
        fraction("princess_min_sharp_fraction", rules.princess_min_sharp_fraction)?;
        fraction("moderate_dominance", rules.moderate_dominance)?;
        fraction("round_min_flat_fraction", rules.round_min_flat_fraction)?;
        at_least_one("near_equal_ratio", rules.near_equal_ratio)?;
        at_least_one("marquise_min_elongation", rules.marquise_min_elongation)?;
        if rules.marquise_min_elongation <= rules.near_equal_ratio {
            return Err(GemError::invalid_params(
                "marquise_min_elongation",
                format!(
                    "{} must exceed near_equal_ratio ({})",
                    rules.marquise_min_elongation, rules.near_equal_ratio
                ),
            ));
        }

        Ok(())
    }

    /// Parse parameters from a TOML string.
    pub fn from_toml(toml_str: &str) -> GemResult<Self> {
        toml::from_str(toml_str).map_err(|e| GemError::config_parse(e.to_string()))
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> GemResult<String> {
        toml::to_string_pretty(self).map_err(|e| GemError::config_parse(e.to_string()))
    }

    /// Parse parameters from a JSON string.
    pub fn from_json(json_str: &str) -> GemResult<Self> {
        serde_json::from_str(json_str).map_err(|e| GemError::config_parse(e.to_string()))
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> GemResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| GemError::config_parse(e.to_string()))
    }

    /// Load and validate parameters from a `.toml` or `.json` file.
    pub fn from_file(path: impl AsRef<Path>) -> GemResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| GemError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        let params = if is_json {
            Self::from_json(&contents)?
        } else {
            Self::from_toml(&contents)?
        };
        params.validate()?;
        Ok(params)
    }
}

fn positive(name: &'static str, value: f64) -> GemResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(GemError::invalid_params(name, format!("{} must be positive", value)))
    }
}

fn fraction(name: &'static str, value: f64) -> GemResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(GemError::invalid_params(name, format!("{} is outside [0, 1]", value)))
    }
}

fn at_least_one(name: &'static str, value: f64) -> GemResult<()> {
    if value.is_finite() && value >= 1.0 {
        Ok(())
    } else {
        Err(GemError::invalid_params(name, format!("{} must be at least 1.0", value)))
    }
}
