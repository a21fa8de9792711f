//! Polygon-face reconstruction and decimation for triangle meshes.
//!
//! Triangulated exports lose the flat regions a designer actually drew: a
//! cube arrives as 12 triangles, a gear face as hundreds. This crate
//! recovers those regions as clean polygon faces, and offers supporting
//! operations for the rest of a part-preparation pipeline.
//!
//! # Features
//!
//! - **Cleanup**: weld vertices, drop degenerates and duplicates, fix winding
//! - **Reconstruction**: merge coplanar triangles into polygon faces under
//!   a selectable [`MergePolicy`]
//! - **Decimation**: shortest-edge midpoint collapse toward a target ratio
//! - **Validation**: reject empty, non-finite, or dimensionless input early
//!
//! # Units and Coordinates
//!
//! Coordinates are dimensionless `f64` triples; tolerances assume
//! millimeter-scale geometry (vertex weld at `1e-6`, edge matching at
//! `1e-3`). Right-handed coordinate system; face winding is
//! counter-clockwise viewed from outside, so normals point outward.
//!
//! # Quick Start
//!
//! ```
//! use mesh_facet::{CleanupParams, Mesh, MergePolicy, reconstruct_polygons};
//!
//! let mut mesh = Mesh::new();
//! // ... populate mesh ...
//! mesh.clean(&CleanupParams::default());
//! let (polygons, report) = reconstruct_polygons(&mesh, &MergePolicy::strict());
//! println!("{report}");
//! ```
//!
//! # Degrade-Gracefully Policy
//!
//! Operations prefer partial results over failure: a face group that
//! cannot merge stays unmerged, a stalled decimation leaves a valid
//! partially reduced mesh. Errors ([`FacetError`]) are reserved for input
//! that is unusable outright, and carry machine-readable `FACET-XXXX`
//! codes plus recovery suggestions.

mod error;
mod types;

pub mod adjacency;
pub mod cleanup;
pub mod decimate;
pub mod merge;
pub mod order;
pub mod tracing_ext;
pub mod validate;

// Re-export core types at crate root
pub use error::{FacetError, FacetErrorCode, FacetResult, RecoverySuggestion};
pub use types::{
    DISTANCE_TOLERANCE, EDGE_TOLERANCE, FaceKind, MIN_TRIANGLE_AREA, Mesh, PolygonFace, Triangle,
    Vertex,
};

// Re-export commonly used operations
pub use adjacency::{EdgeKey, FaceAdjacency};
pub use cleanup::{
    CleanupParams, CleanupReport, clean_mesh, fix_winding, remove_degenerate_triangles,
    remove_duplicate_faces, remove_unreferenced_vertices, weld_vertices,
};
pub use decimate::{DecimateStats, decimate_mesh};
pub use merge::{
    GroupingStrategy, MergePolicy, MergeReport, faces_from_triangles, merge_coplanar_faces,
    reconstruct_polygons,
};
pub use order::{order_perimeter, orient_ccw, plane_basis, signed_area, walk_boundary};
pub use validate::validate_mesh_data;
