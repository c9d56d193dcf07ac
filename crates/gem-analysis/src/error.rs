//! Error types for gem analysis with rich diagnostics.
//!
//! Geometric ambiguity never produces an error: islands that are too small or
//! too thin to classify fall through to an `unknown` shape and are reported as
//! [`AnalysisWarning`]s. Only contract violations are fatal:
//!
//! - `GEM-1xxx`: input errors (malformed buffers, non-finite coordinates)
//! - `GEM-2xxx`: analysis errors (partition contract violations)
//! - `GEM-3xxx`: configuration errors (parameter files, thresholds)
//!
//! # Example
//!
//! ```
//! use gem_analysis::GemError;
//!
//! let err = GemError::invalid_coordinate(3, "z", f64::NAN);
//! assert_eq!(err.code().as_str(), "GEM-1002");
//! ```

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias for gem analysis operations.
pub type GemResult<T> = Result<T, GemError>;

/// Machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Input errors (1xxx)
    /// GEM-1001: Flat position buffer is not a whole number of triangles
    MalformedPositions = 1001,
    /// GEM-1002: Triangle corner has NaN or Infinity coordinate
    InvalidCoordinate = 1002,

    // Analysis errors (2xxx)
    /// GEM-2001: Partition does not cover the mesh exactly once
    InternalInconsistency = 2001,

    // Configuration errors (3xxx)
    /// GEM-3001: Threshold values are out of range or contradict each other
    InvalidParams = 3001,
    /// GEM-3002: Failed to read a parameter file
    ConfigRead = 3002,
    /// GEM-3003: Failed to parse a parameter file
    ConfigParse = 3003,
}

impl ErrorCode {
    /// Returns the error code as a string in the format `GEM-XXXX`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::MalformedPositions => "GEM-1001",
            ErrorCode::InvalidCoordinate => "GEM-1002",
            ErrorCode::InternalInconsistency => "GEM-2001",
            ErrorCode::InvalidParams => "GEM-3001",
            ErrorCode::ConfigRead => "GEM-3002",
            ErrorCode::ConfigParse => "GEM-3003",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Recovery suggestions for analysis errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoverySuggestion {
    /// Re-export the model from the original software.
    ReexportFile,
    /// Adjust analysis parameters.
    AdjustParameters { parameters: Vec<(String, String)> },
    /// Check the parameter file.
    CheckConfigFile { checks: Vec<String> },
    /// The failure is a bug in the analyzer; treat gem information as unavailable.
    ReportBug,
}

impl std::fmt::Display for RecoverySuggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecoverySuggestion::ReexportFile => {
                write!(f, "Try re-exporting the model as binary STL")
            }
            RecoverySuggestion::AdjustParameters { parameters } => {
                let params: Vec<String> = parameters
                    .iter()
                    .map(|(k, v)| format!("{} = {}", k, v))
                    .collect();
                write!(f, "Try adjusting: {}", params.join(", "))
            }
            RecoverySuggestion::CheckConfigFile { checks } => {
                write!(f, "Check the parameter file for: {}", checks.join(", "))
            }
            RecoverySuggestion::ReportBug => {
                write!(
                    f,
                    "Gem information is unavailable for this model; please report the issue"
                )
            }
        }
    }
}

/// Errors that abort a single analysis call.
#[derive(Debug, Error, Diagnostic)]
pub enum GemError {
    /// Flat position buffer length is not a multiple of nine.
    #[error("position buffer has {len} floats, which is not a multiple of 9")]
    #[diagnostic(
        code(gem::input::positions),
        help("Pass a non-indexed buffer with three xyz corners per triangle.")
    )]
    MalformedPositions { len: usize },

    /// Triangle corner with NaN or infinite coordinate.
    #[error("invalid coordinate in triangle {triangle_index}: {coordinate} is {value}")]
    #[diagnostic(
        code(gem::input::coordinate),
        help("The decoder produced non-finite values. Re-export the model from the original software.")
    )]
    InvalidCoordinate {
        triangle_index: usize,
        coordinate: &'static str,
        value: f64,
    },

    /// The partition produced an island that does not match the mesh.
    #[error("internal inconsistency: {details}")]
    #[diagnostic(
        code(gem::analysis::inconsistency),
        help("This is an analyzer bug. Treat gem information as unavailable for this model.")
    )]
    InternalInconsistency { details: String },

    /// Analysis parameters are out of range.
    #[error("invalid analysis parameter `{parameter}`: {details}")]
    #[diagnostic(code(gem::config::invalid))]
    InvalidParams {
        parameter: &'static str,
        details: String,
    },

    /// Failed to read a parameter file.
    #[error("failed to read parameters from {path}")]
    #[diagnostic(
        code(gem::config::read),
        help("Check that the file exists and is readable.")
    )]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse a parameter file.
    #[error("failed to parse parameters: {details}")]
    #[diagnostic(
        code(gem::config::parse),
        help("Parameter files are TOML or JSON; unknown keys are rejected.")
    )]
    ConfigParse { details: String },
}

impl GemError {
    /// Returns the machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            GemError::MalformedPositions { .. } => ErrorCode::MalformedPositions,
            GemError::InvalidCoordinate { .. } => ErrorCode::InvalidCoordinate,
            GemError::InternalInconsistency { .. } => ErrorCode::InternalInconsistency,
            GemError::InvalidParams { .. } => ErrorCode::InvalidParams,
            GemError::ConfigRead { .. } => ErrorCode::ConfigRead,
            GemError::ConfigParse { .. } => ErrorCode::ConfigParse,
        }
    }

    /// Returns a recovery suggestion for this error.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self {
            GemError::MalformedPositions { .. } | GemError::InvalidCoordinate { .. } => {
                RecoverySuggestion::ReexportFile
            }
            GemError::InternalInconsistency { .. } => RecoverySuggestion::ReportBug,
            GemError::InvalidParams { parameter, .. } => RecoverySuggestion::AdjustParameters {
                parameters: vec![((*parameter).into(), "see the default parameters".into())],
            },
            GemError::ConfigRead { .. } => RecoverySuggestion::CheckConfigFile {
                checks: vec!["file exists".into(), "file permissions".into()],
            },
            GemError::ConfigParse { .. } => RecoverySuggestion::CheckConfigFile {
                checks: vec!["TOML/JSON syntax".into(), "parameter names".into()],
            },
        }
    }

    /// Returns true if this error is a contract violation rather than bad input.
    pub fn is_internal(&self) -> bool {
        matches!(self, GemError::InternalInconsistency { .. })
    }

    /// Create an InvalidCoordinate error.
    pub fn invalid_coordinate(triangle_index: usize, coordinate: &'static str, value: f64) -> Self {
        GemError::InvalidCoordinate {
            triangle_index,
            coordinate,
            value,
        }
    }

    /// Create an InternalInconsistency error.
    pub fn internal_inconsistency(details: impl Into<String>) -> Self {
        GemError::InternalInconsistency {
            details: details.into(),
        }
    }

    /// Create an InvalidParams error.
    pub fn invalid_params(parameter: &'static str, details: impl Into<String>) -> Self {
        GemError::InvalidParams {
            parameter,
            details: details.into(),
        }
    }

    /// Create a ConfigParse error.
    pub fn config_parse(details: impl Into<String>) -> Self {
        GemError::ConfigParse {
            details: details.into(),
        }
    }
}

/// Why an island could not be classified confidently.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DegenerateReason {
    /// Too few triangles to form a closed solid.
    TooFewTriangles { count: usize },
    /// All triangles have zero area.
    ZeroArea,
    /// No edge is shared by exactly two triangles, so no facet angle exists.
    NoFacetAngles,
    /// The smallest principal spread is negligible next to the largest.
    TooThin { thickness_ratio: f64 },
}

impl std::fmt::Display for DegenerateReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DegenerateReason::TooFewTriangles { count } => {
                write!(f, "only {} triangle(s), cannot form a closed solid", count)
            }
            DegenerateReason::ZeroArea => write!(f, "zero surface area"),
            DegenerateReason::NoFacetAngles => write!(f, "no shared edges between facets"),
            DegenerateReason::TooThin { thickness_ratio } => {
                write!(f, "too thin (thickness ratio {:.4})", thickness_ratio)
            }
        }
    }
}

/// Non-fatal conditions recorded during an analysis.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(tag = "warning", rename_all = "snake_case")]
pub enum AnalysisWarning {
    /// The mesh had no triangles; the result reports no gems.
    EmptyMesh,
    /// A gem island was too small or thin; its shape is `unknown`.
    DegenerateGeometry {
        island: usize,
        reason: DegenerateReason,
    },
}

impl std::fmt::Display for AnalysisWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisWarning::EmptyMesh => write!(f, "mesh has no triangles"),
            AnalysisWarning::DegenerateGeometry { island, reason } => {
                write!(f, "island {}: {}", island, reason)
            }
        }
    }
}
