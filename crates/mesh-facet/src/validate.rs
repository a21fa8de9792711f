//! Input validation for raw mesh data.
//!
//! Runs before any processing and rejects only truly unusable input:
//! empty meshes, non-finite coordinates, out-of-range indices, and meshes
//! with no measurable extent. Everything else (degenerate triangles,
//! duplicate faces, bad winding) is repairable and left to cleanup.

use tracing::debug;

use crate::error::{FacetError, FacetResult};
use crate::types::DISTANCE_TOLERANCE;
use crate::Mesh;

/// Validate that a mesh is structurally usable.
///
/// Checks, in order:
/// 1. the mesh has at least one vertex and one face,
/// 2. every coordinate is finite,
/// 3. every face index is inside the vertex buffer,
/// 4. the bounding-box diagonal is above [`DISTANCE_TOLERANCE`].
///
/// Returns the first failure found; a mesh that passes can be fed to any
/// operation in this crate without panicking.
pub fn validate_mesh_data(mesh: &Mesh) -> FacetResult<()> {
    if mesh.vertices.is_empty() {
        return Err(FacetError::empty_mesh("mesh has no vertices"));
    }
    if mesh.faces.is_empty() {
        return Err(FacetError::empty_mesh("mesh has no faces"));
    }

    for (vertex_index, vertex) in mesh.vertices.iter().enumerate() {
        let p = &vertex.position;
        for (coordinate, value) in [("x", p.x), ("y", p.y), ("z", p.z)] {
            if !value.is_finite() {
                return Err(FacetError::invalid_coordinate(vertex_index, coordinate, value));
            }
        }
    }

    let vertex_count = mesh.vertex_count();
    for (face_index, face) in mesh.faces.iter().enumerate() {
        for &vertex_index in face {
            if vertex_index as usize >= vertex_count {
                return Err(FacetError::invalid_vertex_index(
                    face_index,
                    vertex_index,
                    vertex_count,
                ));
            }
        }
    }

    // bounds() is Some here: the vertex buffer is non-empty and finite.
    if let Some((min, max)) = mesh.bounds() {
        let diagonal = (max - min).norm();
        if diagonal < DISTANCE_TOLERANCE {
            return Err(FacetError::dimensionless_mesh(diagonal));
        }
    }

    debug!(
        "Validated mesh: {} vertices, {} faces",
        mesh.vertex_count(),
        mesh.face_count()
    );
    Ok(())
}
