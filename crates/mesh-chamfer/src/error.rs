//! Error types for chamfering operations with rich diagnostics.
//!
//! Follows the same conventions as `mesh_facet::FacetError`: machine-
//! readable `CHAMFER-XXXX` codes, recovery suggestions, and miette
//! terminal display. Upstream facet errors pass through transparently.
//!
//! # Error Codes
//!
//! - `CHAMFER-1xxx`: input validation errors (rejected before any work)
//! - `CHAMFER-2xxx`: geometry errors found during extrusion

use miette::Diagnostic;
use thiserror::Error;

use mesh_facet::FacetError;

/// Result type alias for chamfering operations.
pub type ChamferResult<T> = Result<T, ChamferError>;

/// Machine-readable error codes for chamfering operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChamferErrorCode {
    // Input validation errors (1xxx)
    /// CHAMFER-1001: No faces were given to extrude
    EmptyFaceSet = 1001,
    /// CHAMFER-1002: Extrusion parameter outside its valid range
    InvalidParams = 1002,
    /// CHAMFER-1003: Face perimeter has fewer than three vertices
    TooFewVertices = 1003,

    // Geometry errors (2xxx)
    /// CHAMFER-2001: Face normal or perimeter is degenerate
    DegenerateFace = 2001,

    /// CHAMFER-9xxx: wrapped upstream facet error
    Facet = 9001,
}

impl ChamferErrorCode {
    /// Returns the error code as a string in the format `CHAMFER-XXXX`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChamferErrorCode::EmptyFaceSet => "CHAMFER-1001",
            ChamferErrorCode::InvalidParams => "CHAMFER-1002",
            ChamferErrorCode::TooFewVertices => "CHAMFER-1003",
            ChamferErrorCode::DegenerateFace => "CHAMFER-2001",
            ChamferErrorCode::Facet => "CHAMFER-9001",
        }
    }
}

impl std::fmt::Display for ChamferErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Recovery suggestions for chamfering errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ChamferRecoverySuggestion {
    /// Adjust a parameter into its valid range.
    AdjustParameter {
        name: &'static str,
        valid_range: &'static str,
    },
    /// Rebuild the faces through reconstruction before extruding.
    ReconstructFirst,
    /// No specific suggestion.
    None,
}

impl std::fmt::Display for ChamferRecoverySuggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChamferRecoverySuggestion::AdjustParameter { name, valid_range } => {
                write!(f, "Adjust `{}` into the range {}", name, valid_range)
            }
            ChamferRecoverySuggestion::ReconstructFirst => {
                write!(
                    f,
                    "Rebuild the faces with mesh_facet::reconstruct_polygons before extruding"
                )
            }
            ChamferRecoverySuggestion::None => write!(f, "No specific suggestion available"),
        }
    }
}

/// Errors that can occur during chamfering and extrusion.
#[derive(Debug, Error)]
pub enum ChamferError {
    /// No faces were given to extrude.
    ///
    /// Diagnostic code `chamfer::validation::empty`.
    #[error("no faces to extrude")]
    EmptyFaceSet,

    /// An extrusion parameter is outside its valid range.
    ///
    /// Diagnostic code `chamfer::validation::params`.
    #[error("invalid parameter `{name}` = {value}: {details}")]
    InvalidParams {
        name: &'static str,
        value: f64,
        details: String,
    },

    /// A face perimeter has fewer than three vertices.
    ///
    /// Diagnostic code `chamfer::validation::perimeter`.
    #[error("face {face_index} has only {count} perimeter vertices, need at least 3")]
    TooFewVertices { face_index: usize, count: usize },

    /// A face normal or perimeter is degenerate.
    ///
    /// Diagnostic code `chamfer::geometry::degenerate`.
    #[error("face {face_index} is degenerate: {details}")]
    DegenerateFace { face_index: usize, details: String },

    /// Wrapped upstream facet error.
    #[error(transparent)]
    Facet(#[from] FacetError),
}

// Hand-written rather than derived: `#[diagnostic(transparent)]` forwards
// with plain method-call syntax, which resolves to `FacetError`'s inherent
// `code()` instead of `Diagnostic::code()` and fails to type-check. This
// impl mirrors what the derive would generate, with qualified calls for
// the transparent `Facet` variant.
impl Diagnostic for ChamferError {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        match self {
            ChamferError::EmptyFaceSet => Some(Box::new("chamfer::validation::empty")),
            ChamferError::InvalidParams { .. } => Some(Box::new("chamfer::validation::params")),
            ChamferError::TooFewVertices { .. } => {
                Some(Box::new("chamfer::validation::perimeter"))
            }
            ChamferError::DegenerateFace { .. } => Some(Box::new("chamfer::geometry::degenerate")),
            ChamferError::Facet(inner) => Diagnostic::code(inner),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        match self {
            ChamferError::EmptyFaceSet => Some(Box::new(
                "Reconstruction may have produced no polygons; check the merge report.",
            )),
            ChamferError::InvalidParams { .. } => Some(Box::new(
                "Thickness and chamfer depth must be positive, and the chamfer depth must leave material: chamfer_depth < thickness.",
            )),
            ChamferError::TooFewVertices { .. } => Some(Box::new(
                "Such faces usually come from degenerate merges; drop or rebuild them.",
            )),
            ChamferError::DegenerateFace { .. } => Some(Box::new(
                "The face has no usable plane; its normal is near zero or its perimeter self-overlaps.",
            )),
            ChamferError::Facet(inner) => Diagnostic::help(inner),
        }
    }

    fn severity(&self) -> Option<miette::Severity> {
        match self {
            ChamferError::Facet(inner) => Diagnostic::severity(inner),
            _ => None,
        }
    }

    fn url<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        match self {
            ChamferError::Facet(inner) => Diagnostic::url(inner),
            _ => None,
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            ChamferError::Facet(inner) => Diagnostic::source_code(inner),
            _ => None,
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = miette::LabeledSpan> + '_>> {
        match self {
            ChamferError::Facet(inner) => Diagnostic::labels(inner),
            _ => None,
        }
    }

    fn related<'a>(&'a self) -> Option<Box<dyn Iterator<Item = &'a dyn Diagnostic> + 'a>> {
        match self {
            ChamferError::Facet(inner) => Diagnostic::related(inner),
            _ => None,
        }
    }

    fn diagnostic_source(&self) -> Option<&dyn Diagnostic> {
        match self {
            ChamferError::Facet(inner) => Diagnostic::diagnostic_source(inner),
            _ => None,
        }
    }
}

impl ChamferError {
    /// Returns the machine-readable error code.
    pub fn code(&self) -> ChamferErrorCode {
        match self {
            ChamferError::EmptyFaceSet => ChamferErrorCode::EmptyFaceSet,
            ChamferError::InvalidParams { .. } => ChamferErrorCode::InvalidParams,
            ChamferError::TooFewVertices { .. } => ChamferErrorCode::TooFewVertices,
            ChamferError::DegenerateFace { .. } => ChamferErrorCode::DegenerateFace,
            ChamferError::Facet(_) => ChamferErrorCode::Facet,
        }
    }

    /// Returns a recovery suggestion for this error.
    pub fn recovery_suggestion(&self) -> ChamferRecoverySuggestion {
        match self {
            ChamferError::EmptyFaceSet => ChamferRecoverySuggestion::ReconstructFirst,
            ChamferError::InvalidParams { name, .. } => {
                ChamferRecoverySuggestion::AdjustParameter {
                    name,
                    valid_range: "positive, with chamfer_depth < thickness",
                }
            }
            ChamferError::TooFewVertices { .. } => ChamferRecoverySuggestion::ReconstructFirst,
            ChamferError::DegenerateFace { .. } => ChamferRecoverySuggestion::ReconstructFirst,
            ChamferError::Facet(_) => ChamferRecoverySuggestion::None,
        }
    }

    // Constructor helpers

    /// Create an invalid parameter error.
    pub fn invalid_params(name: &'static str, value: f64, details: impl Into<String>) -> Self {
        ChamferError::InvalidParams {
            name,
            value,
            details: details.into(),
        }
    }

    /// Create a too-few-vertices error.
    pub fn too_few_vertices(face_index: usize, count: usize) -> Self {
        ChamferError::TooFewVertices { face_index, count }
    }

    /// Create a degenerate face error.
    pub fn degenerate_face(face_index: usize, details: impl Into<String>) -> Self {
        ChamferError::DegenerateFace {
            face_index,
            details: details.into(),
        }
    }
}
