//! Chamfered polygon extrusion.
//!
//! Turns a flat polygon face into a closed printable solid: a front cap on
//! the inset perimeter, a chamfer band sloping back out to the full
//! footprint, straight walls down to the back plane, and a reversed back
//! cap. All winding is outward.

mod inset;
mod triangulate;
mod walls;

use nalgebra::Point3;
use rayon::prelude::*;
use tracing::{debug, info};

use mesh_facet::{Mesh, PolygonFace, Vertex};

use crate::angles::EdgeInfo;
use crate::error::{ChamferError, ChamferResult};
use inset::{corner_frames, inset_perimeter};
use triangulate::ear_clip;
use walls::band_faces;

/// Parameters for chamfered extrusion, in the same length unit as the
/// input geometry.
#[derive(Debug, Clone)]
#[cfg_attr(
    feature = "pipeline-config",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct ExtrudeParams {
    /// Total extrusion depth along the negative face normal.
    pub thickness: f64,
    /// Depth of the chamfer band below the front face.
    pub chamfer_depth: f64,
    /// Chamfer angle for boundary edges, in degrees.
    pub default_chamfer_angle_deg: f64,
}

impl Default for ExtrudeParams {
    fn default() -> Self {
        Self {
            thickness: 3.0,
            chamfer_depth: 0.5,
            default_chamfer_angle_deg: 45.0,
        }
    }
}

impl ExtrudeParams {
    /// Reject out-of-range parameters before any geometry is produced.
    pub fn validate(&self) -> ChamferResult<()> {
        if !self.thickness.is_finite() || self.thickness <= 0.0 {
            return Err(ChamferError::invalid_params(
                "thickness",
                self.thickness,
                "must be a positive finite length",
            ));
        }
        if !self.chamfer_depth.is_finite() || self.chamfer_depth <= 0.0 {
            return Err(ChamferError::invalid_params(
                "chamfer_depth",
                self.chamfer_depth,
                "must be a positive finite length",
            ));
        }
        if self.chamfer_depth >= self.thickness {
            return Err(ChamferError::invalid_params(
                "chamfer_depth",
                self.chamfer_depth,
                format!("must be smaller than thickness {}", self.thickness),
            ));
        }
        if !self.default_chamfer_angle_deg.is_finite()
            || self.default_chamfer_angle_deg <= 0.0
            || self.default_chamfer_angle_deg >= 90.0
        {
            return Err(ChamferError::invalid_params(
                "default_chamfer_angle_deg",
                self.default_chamfer_angle_deg,
                "must lie strictly between 0 and 90 degrees",
            ));
        }
        Ok(())
    }
}

/// Statistics from extruding one part.
#[derive(Debug, Clone, Default)]
pub struct ExtrudeStats {
    /// Triangles in the front and back caps combined.
    pub cap_triangles: usize,
    /// Wall quads emitted (chamfer band plus straight walls).
    pub wall_quads: usize,
    /// Whether cap triangulation fell back to a fan.
    pub used_fan_fallback: bool,
}

impl std::fmt::Display for ExtrudeStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Extrusion: {} cap triangles, {} wall quads{}",
            self.cap_triangles,
            self.wall_quads,
            if self.used_fan_fallback {
                " (fan fallback)"
            } else {
                ""
            }
        )
    }
}

/// One extruded part: a closed triangle mesh and its build statistics.
#[derive(Debug, Clone)]
pub struct ChamferedPart {
    pub mesh: Mesh,
    pub stats: ExtrudeStats,
}

/// Extrude a single polygon face into a chamfered solid.
///
/// `edges` must be the face's entry from
/// [`crate::angles::compute_edge_angles`]: one [`EdgeInfo`] per perimeter
/// edge in order. For a convex perimeter with chamfer angles inside the
/// clamp bounds, the output is a closed solid with consistent outward
/// winding.
pub fn extrude_chamfered(
    face: &PolygonFace,
    edges: &[EdgeInfo],
    params: &ExtrudeParams,
) -> ChamferResult<ChamferedPart> {
    params.validate()?;
    extrude_indexed(face, edges, params, 0)
}

/// Extrude every face into its own independent part, in parallel.
///
/// `all_edges` is the full output of
/// [`crate::angles::compute_edge_angles`] over the same face slice.
pub fn extrude_all(
    faces: &[PolygonFace],
    all_edges: &[Vec<EdgeInfo>],
    params: &ExtrudeParams,
) -> ChamferResult<Vec<ChamferedPart>> {
    params.validate()?;
    if faces.is_empty() {
        return Err(ChamferError::EmptyFaceSet);
    }
    if all_edges.len() != faces.len() {
        return Err(ChamferError::invalid_params(
            "all_edges",
            all_edges.len() as f64,
            format!("need one edge list per face, have {} faces", faces.len()),
        ));
    }

    let parts: ChamferResult<Vec<ChamferedPart>> = (0..faces.len())
        .into_par_iter()
        .map(|i| extrude_indexed(&faces[i], &all_edges[i], params, i))
        .collect();
    let parts = parts?;

    info!(
        "Extruded {} part(s), {} triangles total",
        parts.len(),
        parts.iter().map(|p| p.mesh.face_count()).sum::<usize>()
    );
    Ok(parts)
}

/// Extrusion core; `face_index` only feeds error context.
fn extrude_indexed(
    face: &PolygonFace,
    edges: &[EdgeInfo],
    params: &ExtrudeParams,
    face_index: usize,
) -> ChamferResult<ChamferedPart> {
    let n = face.vertex_count();
    if n < 3 {
        return Err(ChamferError::too_few_vertices(face_index, n));
    }
    if edges.len() != n {
        return Err(ChamferError::degenerate_face(
            face_index,
            format!("{} edge entries for {} perimeter vertices", edges.len(), n),
        ));
    }
    let normal = face.normal;
    if normal.norm() < 1e-9 {
        return Err(ChamferError::degenerate_face(
            face_index,
            "face normal is near zero",
        ));
    }

    let frames = corner_frames(face, edges, face_index)?;

    // Three stacked rings: inset front perimeter, bottom of the chamfer
    // band at full footprint, and the back perimeter directly below it.
    let front: Vec<Point3<f64>> = inset_perimeter(face, &frames, params.chamfer_depth);
    let band: Vec<Point3<f64>> = front
        .iter()
        .zip(&frames)
        .map(|(p, frame)| {
            let outward = params.chamfer_depth * frame.chamfer_rad.tan();
            p - frame.inward * outward - normal * params.chamfer_depth
        })
        .collect();
    let back: Vec<Point3<f64>> = band
        .iter()
        .map(|p| p - normal * (params.thickness - params.chamfer_depth))
        .collect();

    let (cap, used_fan_fallback) = ear_clip(&front, &normal);

    let ring = n as u32;
    let mut mesh = Mesh::with_capacity(3 * n, 2 * cap.len() + 4 * n);
    for p in front.iter().chain(&band).chain(&back) {
        mesh.vertices.push(Vertex::new(*p));
    }

    // Front cap on the inset ring, winding with the perimeter.
    mesh.faces.extend(cap.iter().copied());
    // Chamfer band, then straight walls.
    mesh.faces.extend(band_faces(0, ring, ring));
    mesh.faces.extend(band_faces(ring, 2 * ring, ring));
    // Back cap, reversed to face away from the part.
    mesh.faces.extend(
        cap.iter()
            .map(|&[a, b, c]| [2 * ring + a, 2 * ring + c, 2 * ring + b]),
    );

    let stats = ExtrudeStats {
        cap_triangles: 2 * cap.len(),
        wall_quads: 2 * n,
        used_fan_fallback,
    };
    debug!("Extruded face {}: {}", face_index, stats);

    Ok(ChamferedPart { mesh, stats })
}
