//! Per-edge dihedral and chamfer angle calculation.
//!
//! A pure function of topology and normals: nothing here mutates faces,
//! and results must be recomputed whenever adjacency changes (after
//! merging or decimation).

use nalgebra::Point3;
use tracing::debug;

use mesh_facet::{EdgeKey, FaceAdjacency, PolygonFace};

/// Lower clamp bound for computed chamfer angles, in degrees.
pub const MIN_CHAMFER_DEG: f64 = 15.0;

/// Upper clamp bound for computed chamfer angles, in degrees.
pub const MAX_CHAMFER_DEG: f64 = 75.0;

/// Dihedral angle assigned to boundary edges, in degrees.
pub const BOUNDARY_DIHEDRAL_DEG: f64 = 180.0;

/// Parameters for chamfer angle calculation.
#[derive(Debug, Clone)]
#[cfg_attr(
    feature = "pipeline-config",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct ChamferParams {
    /// Chamfer angle assigned to boundary edges, in degrees.
    pub default_chamfer_angle_deg: f64,
}

impl Default for ChamferParams {
    fn default() -> Self {
        Self {
            default_chamfer_angle_deg: 45.0,
        }
    }
}

/// Angles and adjacency for one perimeter edge of a face.
#[derive(Debug, Clone)]
pub struct EdgeInfo {
    /// Edge start position, in perimeter order.
    pub start: Point3<f64>,
    /// Edge end position, in perimeter order.
    pub end: Point3<f64>,
    /// Index of the face this edge belongs to.
    pub face: u32,
    /// Index of the face across the edge, when exactly one exists.
    pub neighbor: Option<u32>,
    /// Measured dihedral angle in degrees; boundary edges get 180.
    pub dihedral_deg: f64,
    /// Derived chamfer angle in degrees, clamped to
    /// [[`MIN_CHAMFER_DEG`], [`MAX_CHAMFER_DEG`]] for interior edges.
    pub chamfer_deg: f64,
}

impl EdgeInfo {
    /// Whether the edge has no single neighboring face.
    pub fn is_boundary(&self) -> bool {
        self.neighbor.is_none()
    }
}

/// Compute dihedral and chamfer angles for every perimeter edge of every
/// face.
///
/// Returns one `Vec<EdgeInfo>` per input face, one entry per perimeter
/// edge in order. For an edge shared by exactly two faces the dihedral is
/// `acos(|n1 · n2|)` in degrees; the absolute value makes the measure
/// orientation-agnostic. The chamfer angle is
/// `clamp(90 − dihedral/2, 15, 75)`.
///
/// Edges with one or more than two adjacent faces are boundaries: they
/// get a 180° dihedral and `params.default_chamfer_angle_deg`.
pub fn compute_edge_angles(faces: &[PolygonFace], params: &ChamferParams) -> Vec<Vec<EdgeInfo>> {
    let adjacency = FaceAdjacency::build_default(faces);

    let per_face: Vec<Vec<EdgeInfo>> = faces
        .iter()
        .enumerate()
        .map(|(face_idx, face)| {
            face.edges()
                .map(|(start, end)| {
                    let key = EdgeKey::new(&start, &end, mesh_facet::EDGE_TOLERANCE);
                    let neighbor = adjacency
                        .edge_to_faces
                        .get(&key)
                        .filter(|users| users.len() == 2)
                        .and_then(|users| {
                            users.iter().copied().find(|&f| f != face_idx as u32)
                        });

                    let (dihedral_deg, chamfer_deg) = match neighbor {
                        Some(other) => {
                            let dot = face
                                .normal
                                .dot(&faces[other as usize].normal)
                                .abs()
                                .clamp(0.0, 1.0);
                            let dihedral = dot.acos().to_degrees();
                            let chamfer = (90.0 - dihedral / 2.0)
                                .clamp(MIN_CHAMFER_DEG, MAX_CHAMFER_DEG);
                            (dihedral, chamfer)
                        }
                        None => (BOUNDARY_DIHEDRAL_DEG, params.default_chamfer_angle_deg),
                    };

                    EdgeInfo {
                        start,
                        end,
                        face: face_idx as u32,
                        neighbor,
                        dihedral_deg,
                        chamfer_deg,
                    }
                })
                .collect()
        })
        .collect();

    debug!(
        "Computed edge angles for {} faces ({} edges total)",
        faces.len(),
        per_face.iter().map(Vec::len).sum::<usize>()
    );

    per_face
}
