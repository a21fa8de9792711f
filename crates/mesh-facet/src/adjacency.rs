//! Edge-adjacency graph over polygon faces.
//!
//! Two faces are adjacent when they share a complete edge: both endpoints
//! land in the same quantized cell at the edge tolerance, in either
//! direction. Partial overlaps and T-junctions do not count.

use hashbrown::HashMap;
use nalgebra::Point3;
use tracing::debug;

use crate::types::EDGE_TOLERANCE;
use crate::PolygonFace;

/// Quantize a position into integer steps of `tolerance`.
///
/// Positions in the same cell are treated as coincident. Used for vertex
/// welding, edge keys, and perimeter dedup so all three agree on what
/// "the same point" means.
pub(crate) fn quantize_position(pos: &Point3<f64>, tolerance: f64) -> (i64, i64, i64) {
    (
        (pos.x / tolerance).round() as i64,
        (pos.y / tolerance).round() as i64,
        (pos.z / tolerance).round() as i64,
    )
}

/// Direction-independent key for a face edge.
///
/// Endpoints are quantized and stored low-first, so `(a, b)` and `(b, a)`
/// produce the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeKey {
    a: (i64, i64, i64),
    b: (i64, i64, i64),
}

impl EdgeKey {
    /// Build a key from two endpoint positions.
    pub fn new(p0: &Point3<f64>, p1: &Point3<f64>, tolerance: f64) -> Self {
        let ka = quantize_position(p0, tolerance);
        let kb = quantize_position(p1, tolerance);
        if ka <= kb {
            Self { a: ka, b: kb }
        } else {
            Self { a: kb, b: ka }
        }
    }

    /// Whether both endpoints quantize to the same cell (zero-length edge).
    pub fn is_degenerate(&self) -> bool {
        self.a == self.b
    }
}

/// Adjacency structure mapping shared edges to the faces that use them.
///
/// # Example
///
/// ```
/// use mesh_facet::adjacency::FaceAdjacency;
/// use mesh_facet::PolygonFace;
///
/// let faces: Vec<PolygonFace> = vec![/* ... */];
/// let adjacency = FaceAdjacency::build_default(&faces);
/// for edge in adjacency.boundary_edges() {
///     // edges used by exactly one face
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FaceAdjacency {
    /// Map from quantized edge to the indices of faces using that edge.
    pub edge_to_faces: HashMap<EdgeKey, Vec<u32>>,
    /// Per-face neighbor lists, sorted and deduplicated.
    neighbors: Vec<Vec<u32>>,
}

impl FaceAdjacency {
    /// Build the adjacency graph at the given edge tolerance.
    pub fn build(faces: &[PolygonFace], tolerance: f64) -> Self {
        let mut edge_to_faces: HashMap<EdgeKey, Vec<u32>> = HashMap::new();

        for (face_idx, face) in faces.iter().enumerate() {
            for (p0, p1) in face.edges() {
                let key = EdgeKey::new(&p0, &p1, tolerance);
                if key.is_degenerate() {
                    continue;
                }
                let entry = edge_to_faces.entry(key).or_default();
                // A face can touch the same cell pair twice only when it is
                // degenerate at this tolerance; record it once.
                if entry.last() != Some(&(face_idx as u32)) {
                    entry.push(face_idx as u32);
                }
            }
        }

        let mut neighbors: Vec<Vec<u32>> = vec![Vec::new(); faces.len()];
        for face_list in edge_to_faces.values() {
            if face_list.len() < 2 {
                continue;
            }
            // Every pair sharing this edge is mutually adjacent, including
            // non-manifold fans of three or more.
            for (i, &fa) in face_list.iter().enumerate() {
                for &fb in &face_list[i + 1..] {
                    neighbors[fa as usize].push(fb);
                    neighbors[fb as usize].push(fa);
                }
            }
        }

        for list in &mut neighbors {
            list.sort_unstable();
            list.dedup();
        }

        debug!(
            "Built face adjacency: {} faces, {} distinct edges",
            faces.len(),
            edge_to_faces.len()
        );

        Self {
            edge_to_faces,
            neighbors,
        }
    }

    /// Build with the standard edge tolerance of `1e-3`.
    pub fn build_default(faces: &[PolygonFace]) -> Self {
        Self::build(faces, EDGE_TOLERANCE)
    }

    /// Number of faces the graph was built over.
    pub fn face_count(&self) -> usize {
        self.neighbors.len()
    }

    /// Indices of faces sharing at least one complete edge with `face`.
    pub fn neighbors_of(&self, face: u32) -> &[u32] {
        &self.neighbors[face as usize]
    }

    /// Edges used by exactly one face.
    pub fn boundary_edges(&self) -> Vec<EdgeKey> {
        self.edge_to_faces
            .iter()
            .filter(|(_, faces)| faces.len() == 1)
            .map(|(edge, _)| *edge)
            .collect()
    }

    /// Edges shared by more than two faces.
    pub fn non_manifold_edges(&self) -> Vec<EdgeKey> {
        self.edge_to_faces
            .iter()
            .filter(|(_, faces)| faces.len() > 2)
            .map(|(edge, _)| *edge)
            .collect()
    }

    /// Number of edges shared by two or more faces.
    pub fn shared_edge_count(&self) -> usize {
        self.edge_to_faces
            .values()
            .filter(|faces| faces.len() >= 2)
            .count()
    }
}
