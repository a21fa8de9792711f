//! Fluent builder for turning polygon faces into chamfered parts.
//!
//! Wraps angle calculation and batch extrusion behind a chainable API:
//!
//! ```
//! use mesh_chamfer::PartBuilder;
//! use mesh_facet::PolygonFace;
//!
//! let faces: Vec<PolygonFace> = vec![/* ... */];
//! let parts = PartBuilder::new(&faces)
//!     .thickness(3.0)
//!     .chamfer_depth(0.5)
//!     .build();
//! ```

use tracing::info;

use mesh_facet::PolygonFace;

use crate::angles::{compute_edge_angles, ChamferParams};
use crate::error::{ChamferError, ChamferResult};
use crate::extrude::{extrude_all, ChamferedPart, ExtrudeParams};

/// Builder over a borrowed face slice; configuration is by value, the
/// faces are never copied.
pub struct PartBuilder<'a> {
    faces: &'a [PolygonFace],
    thickness: f64,
    chamfer_depth: f64,
    default_chamfer_angle_deg: f64,
}

impl<'a> PartBuilder<'a> {
    /// Start building parts from the given faces with default parameters
    /// (3.0 thick, 0.5 chamfer, 45° boundary chamfer).
    pub fn new(faces: &'a [PolygonFace]) -> Self {
        let defaults = ExtrudeParams::default();
        Self {
            faces,
            thickness: defaults.thickness,
            chamfer_depth: defaults.chamfer_depth,
            default_chamfer_angle_deg: defaults.default_chamfer_angle_deg,
        }
    }

    // ------------------------------------------------------------
    // Presets
    // ------------------------------------------------------------

    /// Standard structural part: the defaults, spelled out.
    pub fn standard(mut self) -> Self {
        self.thickness = 3.0;
        self.chamfer_depth = 0.5;
        self
    }

    /// Thin decorative panel: shallow extrusion, light chamfer.
    pub fn thin_panel(mut self) -> Self {
        self.thickness = 1.2;
        self.chamfer_depth = 0.2;
        self
    }

    // ------------------------------------------------------------
    // Per-step configuration
    // ------------------------------------------------------------

    /// Total extrusion depth.
    pub fn thickness(mut self, thickness: f64) -> Self {
        self.thickness = thickness;
        self
    }

    /// Depth of the chamfer band.
    pub fn chamfer_depth(mut self, depth: f64) -> Self {
        self.chamfer_depth = depth;
        self
    }

    /// Chamfer angle for boundary edges, in degrees.
    pub fn default_chamfer_angle(mut self, degrees: f64) -> Self {
        self.default_chamfer_angle_deg = degrees;
        self
    }

    // ------------------------------------------------------------
    // Execution
    // ------------------------------------------------------------

    /// Compute edge angles and extrude every face into its own part.
    pub fn build(self) -> ChamferResult<Vec<ChamferedPart>> {
        if self.faces.is_empty() {
            return Err(ChamferError::EmptyFaceSet);
        }

        let angle_params = ChamferParams {
            default_chamfer_angle_deg: self.default_chamfer_angle_deg,
        };
        let extrude_params = ExtrudeParams {
            thickness: self.thickness,
            chamfer_depth: self.chamfer_depth,
            default_chamfer_angle_deg: self.default_chamfer_angle_deg,
        };
        extrude_params.validate()?;

        info!(
            "Building {} part(s): thickness {}, chamfer depth {}",
            self.faces.len(),
            self.thickness,
            self.chamfer_depth
        );

        let edges = compute_edge_angles(self.faces, &angle_params);
        extrude_all(self.faces, &edges, &extrude_params)
    }
}
