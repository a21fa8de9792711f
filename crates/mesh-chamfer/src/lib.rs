//! Dihedral-angle driven chamfering and part extrusion for polygon faces.
//!
//! Built on [`mesh_facet`]: takes the polygon faces that reconstruction
//! produces and turns each one into a closed, 3D-printable solid with
//! chamfered front edges, so printed parts seat against each other without
//! post-processing.
//!
//! # Pipeline Position
//!
//! ```text
//! mesh_facet::reconstruct_polygons
//!        │  Vec<PolygonFace>
//!        ▼
//! mesh_chamfer::angles::compute_edge_angles   (per-edge dihedral/chamfer)
//!        │  Vec<Vec<EdgeInfo>>
//!        ▼
//! mesh_chamfer::extrude::extrude_all          (one closed solid per face)
//! ```
//!
//! # Quick Start
//!
//! ```
//! use mesh_chamfer::PartBuilder;
//! use mesh_facet::PolygonFace;
//!
//! let faces: Vec<PolygonFace> = vec![/* from reconstruction */];
//! match PartBuilder::new(&faces).thickness(3.0).chamfer_depth(0.5).build() {
//!     Ok(parts) => println!("built {} parts", parts.len()),
//!     Err(err) => eprintln!("{err}"),
//! }
//! ```

pub mod angles;
pub mod builder;
mod error;
pub mod extrude;

// Re-export core types at crate root
pub use angles::{
    ChamferParams, EdgeInfo, compute_edge_angles, BOUNDARY_DIHEDRAL_DEG, MAX_CHAMFER_DEG,
    MIN_CHAMFER_DEG,
};
pub use builder::PartBuilder;
pub use error::{ChamferError, ChamferErrorCode, ChamferRecoverySuggestion, ChamferResult};
pub use extrude::{ChamferedPart, ExtrudeParams, ExtrudeStats, extrude_all, extrude_chamfered};
