//! Corner frames and perimeter insetting.
//!
//! Each perimeter vertex gets a frame: the in-plane inward bisector of its
//! two incident edges and the average chamfer angle of those edges. The
//! front face is inset along the bisectors so the chamfer band has room to
//! slope back out to the part's full footprint.

use nalgebra::{Point3, Vector3};

use mesh_facet::PolygonFace;

use crate::angles::EdgeInfo;
use crate::error::{ChamferError, ChamferResult};

/// Per-vertex geometry derived from the incident edges.
#[derive(Debug)]
pub(crate) struct CornerFrame {
    /// Unit in-plane bisector pointing into the polygon.
    pub inward: Vector3<f64>,
    /// Average chamfer angle of the two incident edges, in radians.
    pub chamfer_rad: f64,
}

/// Build a corner frame for every perimeter vertex.
///
/// Vertex `i` is shared by edge `i-1` (incoming) and edge `i` (outgoing).
/// For a collinear corner the bisector degenerates to the shared inward
/// perpendicular; a corner whose edges fold back on themselves keeps the
/// outgoing edge's perpendicular.
pub(crate) fn corner_frames(
    face: &PolygonFace,
    edges: &[EdgeInfo],
    face_index: usize,
) -> ChamferResult<Vec<CornerFrame>> {
    let n = face.vertex_count();
    let normal = face.normal;

    let mut inward_normals = Vec::with_capacity(n);
    for i in 0..n {
        let direction = face.vertices[(i + 1) % n] - face.vertices[i];
        let length = direction.norm();
        if length < 1e-12 {
            return Err(ChamferError::degenerate_face(
                face_index,
                format!("perimeter edge {} has zero length", i),
            ));
        }
        // For counter-clockwise winding, normal × edge points inside.
        inward_normals.push(normal.cross(&(direction / length)));
    }

    let mut frames = Vec::with_capacity(n);
    for i in 0..n {
        let incoming = (i + n - 1) % n;
        let bisector = inward_normals[incoming] + inward_normals[i];
        let inward = if bisector.norm() < 1e-9 {
            inward_normals[i]
        } else {
            bisector.normalize()
        };

        let chamfer_deg = (edges[incoming].chamfer_deg + edges[i].chamfer_deg) / 2.0;
        frames.push(CornerFrame {
            inward,
            chamfer_rad: chamfer_deg.to_radians(),
        });
    }

    Ok(frames)
}

/// Inset the perimeter along the corner bisectors.
///
/// The inset distance is `chamfer_depth / sin(chamfer_angle)`, capped at
/// `2 × chamfer_depth` so acute corners cannot run away.
pub(crate) fn inset_perimeter(
    face: &PolygonFace,
    frames: &[CornerFrame],
    chamfer_depth: f64,
) -> Vec<Point3<f64>> {
    face.vertices
        .iter()
        .zip(frames)
        .map(|(vertex, frame)| {
            let distance =
                (chamfer_depth / frame.chamfer_rad.sin()).min(2.0 * chamfer_depth);
            vertex + frame.inward * distance
        })
        .collect()
}
