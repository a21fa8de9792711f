//! Error types for facet operations with rich diagnostics.
//!
//! This module provides:
//! - Machine-readable error codes for programmatic handling
//! - Rich context (which face, which index, what went wrong)
//! - Recovery suggestions for common issues
//! - Terminal display via miette
//!
//! Errors are intentionally rare: per the engine's degrade-gracefully
//! policy, only truly unusable input (empty or dimensionless meshes,
//! out-of-range parameters) is rejected. Geometric degeneracy and stalled
//! progress are handled by fallbacks and warnings inside each operation,
//! not by errors.
//!
//! # Error Codes
//!
//! Each error has a unique code in the format `FACET-XXXX`; the `1xxx`
//! block covers input validation, rejected before any mutation.

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias for facet operations.
pub type FacetResult<T> = Result<T, FacetError>;

/// Machine-readable error codes for facet operations.
///
/// Codes follow the pattern `FACET-1XXX`; all current errors are input
/// validation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FacetErrorCode {
    /// FACET-1001: Mesh has no vertices or faces
    EmptyMesh = 1001,
    /// FACET-1002: Mesh bounding box has no measurable extent
    DimensionlessMesh = 1002,
    /// FACET-1003: Face references invalid vertex index
    InvalidVertexIndex = 1003,
    /// FACET-1004: Vertex has NaN or Infinity coordinate
    InvalidCoordinate = 1004,
    /// FACET-1005: Decimation target outside (0, 1)
    InvalidDecimationTarget = 1005,
}

impl FacetErrorCode {
    /// Returns the error code as a string in the format `FACET-XXXX`.
    pub fn as_str(&self) -> &'static str {
        match self {
            FacetErrorCode::EmptyMesh => "FACET-1001",
            FacetErrorCode::DimensionlessMesh => "FACET-1002",
            FacetErrorCode::InvalidVertexIndex => "FACET-1003",
            FacetErrorCode::InvalidCoordinate => "FACET-1004",
            FacetErrorCode::InvalidDecimationTarget => "FACET-1005",
        }
    }
}

impl std::fmt::Display for FacetErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Recovery suggestions for facet errors.
#[derive(Debug, Clone, PartialEq)]
pub enum RecoverySuggestion {
    /// Run cleanup before retrying the operation.
    CleanupFirst,
    /// Adjust a parameter into its valid range.
    AdjustParameter {
        name: &'static str,
        valid_range: &'static str,
    },
    /// Re-export or re-index the source mesh.
    CheckSourceMesh,
}

impl std::fmt::Display for RecoverySuggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecoverySuggestion::CleanupFirst => {
                write!(f, "Run clean_mesh on the input before this operation")
            }
            RecoverySuggestion::AdjustParameter { name, valid_range } => {
                write!(f, "Adjust `{}` into the range {}", name, valid_range)
            }
            RecoverySuggestion::CheckSourceMesh => {
                write!(
                    f,
                    "Check how the mesh was built; indices and coordinates must be finite and in range"
                )
            }
        }
    }
}

/// Errors that can occur during facet operations.
#[derive(Debug, Error, Diagnostic)]
pub enum FacetError {
    /// Mesh has no vertices or faces.
    #[error("mesh is empty: {details}")]
    #[diagnostic(
        code(facet::validation::empty),
        help(
            "The mesh must have at least one vertex and one face. A mesh that loses all triangles during cleanup is reported here by the caller, not by cleanup itself."
        )
    )]
    EmptyMesh { details: String },

    /// Mesh bounding box has no measurable extent.
    #[error("mesh is dimensionless: bounding-box diagonal {diagonal:.3e} is below tolerance")]
    #[diagnostic(
        code(facet::validation::dimensionless),
        help(
            "All vertices collapse to a single point within tolerance. Check units and the source export."
        )
    )]
    DimensionlessMesh { diagonal: f64 },

    /// Face references a vertex index outside the vertex buffer.
    #[error(
        "invalid vertex index: face {face_index} references vertex {vertex_index}, but mesh only has {vertex_count} vertices"
    )]
    #[diagnostic(
        code(facet::validation::vertex_index),
        help("Rebuild the index buffer or drop the offending faces before processing.")
    )]
    InvalidVertexIndex {
        face_index: usize,
        vertex_index: u32,
        vertex_count: usize,
    },

    /// Vertex coordinate is NaN or Infinity.
    #[error("invalid coordinate at vertex {vertex_index}: {coordinate} is {value}")]
    #[diagnostic(
        code(facet::validation::coordinate),
        help("Check for numerical issues in the source data.")
    )]
    InvalidCoordinate {
        vertex_index: usize,
        coordinate: &'static str,
        value: f64,
    },

    /// Decimation target outside the open interval (0, 1).
    #[error("invalid decimation target {value}: must satisfy 0 < target_reduction < 1")]
    #[diagnostic(
        code(facet::decimate::target),
        help(
            "target_reduction is the fraction of vertices to remove; 0.5 halves the vertex count."
        )
    )]
    InvalidDecimationTarget { value: f64 },
}

impl FacetError {
    /// Returns the machine-readable error code.
    pub fn code(&self) -> FacetErrorCode {
        match self {
            FacetError::EmptyMesh { .. } => FacetErrorCode::EmptyMesh,
            FacetError::DimensionlessMesh { .. } => FacetErrorCode::DimensionlessMesh,
            FacetError::InvalidVertexIndex { .. } => FacetErrorCode::InvalidVertexIndex,
            FacetError::InvalidCoordinate { .. } => FacetErrorCode::InvalidCoordinate,
            FacetError::InvalidDecimationTarget { .. } => FacetErrorCode::InvalidDecimationTarget,
        }
    }

    /// Returns a recovery suggestion for this error.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self {
            FacetError::EmptyMesh { .. } => RecoverySuggestion::CheckSourceMesh,
            FacetError::DimensionlessMesh { .. } => RecoverySuggestion::CheckSourceMesh,
            FacetError::InvalidVertexIndex { .. } => RecoverySuggestion::CleanupFirst,
            FacetError::InvalidCoordinate { .. } => RecoverySuggestion::CheckSourceMesh,
            FacetError::InvalidDecimationTarget { .. } => RecoverySuggestion::AdjustParameter {
                name: "target_reduction",
                valid_range: "(0, 1)",
            },
        }
    }

    // Constructor helpers

    /// Create an empty mesh error.
    pub fn empty_mesh(details: impl Into<String>) -> Self {
        FacetError::EmptyMesh {
            details: details.into(),
        }
    }

    /// Create a dimensionless mesh error.
    pub fn dimensionless_mesh(diagonal: f64) -> Self {
        FacetError::DimensionlessMesh { diagonal }
    }

    /// Create an invalid vertex index error.
    pub fn invalid_vertex_index(face_index: usize, vertex_index: u32, vertex_count: usize) -> Self {
        FacetError::InvalidVertexIndex {
            face_index,
            vertex_index,
            vertex_count,
        }
    }

    /// Create an invalid coordinate error.
    pub fn invalid_coordinate(vertex_index: usize, coordinate: &'static str, value: f64) -> Self {
        FacetError::InvalidCoordinate {
            vertex_index,
            coordinate,
            value,
        }
    }

    /// Create an invalid decimation target error.
    pub fn invalid_decimation_target(value: f64) -> Self {
        FacetError::InvalidDecimationTarget { value }
    }
}
