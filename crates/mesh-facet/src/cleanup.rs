//! Geometry cleanup: vertex welding, degenerate removal, winding repair.
//!
//! Cleanup feeds every downstream stage and never fails: a mesh that loses
//! all of its triangles here is a valid empty result, rejected later by
//! [`crate::validate::validate_mesh_data`] at the pipeline boundary.

use hashbrown::{HashMap, HashSet};
use nalgebra::Vector3;
use tracing::{debug, info};

use crate::adjacency::quantize_position;
use crate::types::{DISTANCE_TOLERANCE, MIN_TRIANGLE_AREA};
use crate::{Mesh, Triangle};

/// Configuration parameters for geometry cleanup.
///
/// All thresholds are in the same units as the mesh coordinates (typically
/// millimeters).
///
/// # Example
///
/// ```
/// use mesh_facet::CleanupParams;
///
/// // Use defaults (good for mm-scale meshes)
/// let params = CleanupParams::default();
///
/// // Or customize for your use case
/// let params = CleanupParams {
///     weld_epsilon: 1e-4,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(
    feature = "pipeline-config",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct CleanupParams {
    /// Distance quantum for vertex welding.
    ///
    /// Each coordinate is quantized by this tolerance into a hash key and
    /// the first vertex in each cell wins. Larger values merge more
    /// aggressively and may destroy intentional detail.
    ///
    /// Default: `1e-6`
    pub weld_epsilon: f64,

    /// Minimum triangle area threshold.
    ///
    /// Triangles with two identical (post-weld) indices, or with
    /// cross-product-derived area below this threshold, are degenerate and
    /// removed.
    ///
    /// Default: `1e-9`
    pub min_triangle_area: f64,

    /// Whether to remove exact duplicate faces (same vertex set, either
    /// winding). Welding can create duplicates from near-coincident input.
    ///
    /// Default: `true`
    pub remove_duplicate_faces: bool,

    /// Whether to run the winding-correction heuristic.
    ///
    /// Triangles whose normal opposes the mesh-wide average normal get two
    /// indices swapped. This is a best-effort pass, not a formal manifold
    /// repair.
    ///
    /// Default: `true`
    pub fix_winding: bool,
}

impl Default for CleanupParams {
    fn default() -> Self {
        Self {
            weld_epsilon: DISTANCE_TOLERANCE,
            min_triangle_area: MIN_TRIANGLE_AREA,
            remove_duplicate_faces: true,
            fix_winding: true,
        }
    }
}

impl CleanupParams {
    /// Params for noisy, externally produced meshes (loose uploads).
    ///
    /// Welds more aggressively so that nearly-touching triangles share
    /// vertices and edge adjacency can see them.
    pub fn aggressive() -> Self {
        Self {
            weld_epsilon: 1e-4,
            min_triangle_area: 1e-8,
            ..Default::default()
        }
    }
}

/// Summary of a cleanup run, for audit and logging.
#[derive(Debug, Clone, Default)]
pub struct CleanupReport {
    /// Vertices merged into an earlier coincident vertex.
    pub vertices_welded: usize,
    /// Triangles dropped for repeated indices or near-zero area.
    pub degenerate_triangles_removed: usize,
    /// Exact duplicate faces dropped.
    pub duplicate_faces_removed: usize,
    /// Vertices dropped during compaction because no face references them.
    pub unreferenced_vertices_removed: usize,
    /// Triangles whose winding was flipped against the average normal.
    pub triangles_flipped: usize,
}

impl CleanupReport {
    /// Whether the winding pass changed anything.
    pub fn winding_corrected(&self) -> bool {
        self.triangles_flipped > 0
    }

    /// Whether cleanup changed the mesh at all.
    pub fn is_noop(&self) -> bool {
        self.vertices_welded == 0
            && self.degenerate_triangles_removed == 0
            && self.duplicate_faces_removed == 0
            && self.unreferenced_vertices_removed == 0
            && self.triangles_flipped == 0
    }
}

impl std::fmt::Display for CleanupReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cleanup: {} welded, {} degenerate removed, {} duplicates removed, {} unreferenced removed, {} flipped",
            self.vertices_welded,
            self.degenerate_triangles_removed,
            self.duplicate_faces_removed,
            self.unreferenced_vertices_removed,
            self.triangles_flipped
        )
    }
}

/// Weld vertices that quantize to the same cell at the given tolerance.
///
/// Each coordinate is rounded into integer steps of `epsilon`; the first
/// vertex seen in a cell becomes canonical and all face indices are
/// remapped to it. Faces that collapse to repeated indices are dropped.
///
/// Returns the number of vertices merged away.
pub fn weld_vertices(mesh: &mut Mesh, epsilon: f64) -> usize {
    let original_count = mesh.vertices.len();
    if original_count == 0 {
        return 0;
    }

    // First occurrence per quantized cell wins.
    let mut canonical: HashMap<(i64, i64, i64), u32> = HashMap::new();
    let mut vertex_remap: Vec<u32> = Vec::with_capacity(original_count);
    let mut merged_count = 0;

    for (idx, vertex) in mesh.vertices.iter().enumerate() {
        let key = quantize_position(&vertex.position, epsilon);
        let canon = *canonical.entry(key).or_insert(idx as u32);
        if canon != idx as u32 {
            merged_count += 1;
        }
        vertex_remap.push(canon);
    }

    if merged_count == 0 {
        return 0;
    }

    for face in &mut mesh.faces {
        face[0] = vertex_remap[face[0] as usize];
        face[1] = vertex_remap[face[1] as usize];
        face[2] = vertex_remap[face[2] as usize];
    }

    // Drop faces that became degenerate after welding
    mesh.faces
        .retain(|&[i0, i1, i2]| i0 != i1 && i1 != i2 && i0 != i2);

    info!(
        "Welded {} vertices (epsilon = {:.1e}): {} → {}",
        merged_count,
        epsilon,
        original_count,
        original_count - merged_count
    );

    merged_count
}

/// Remove triangles with repeated indices or area below threshold.
///
/// Returns the number of triangles removed.
pub fn remove_degenerate_triangles(mesh: &mut Mesh, area_threshold: f64) -> usize {
    let original_count = mesh.faces.len();

    mesh.faces.retain(|&[i0, i1, i2]| {
        if i0 == i1 || i1 == i2 || i0 == i2 {
            return false;
        }
        let tri = Triangle::new(
            mesh.vertices[i0 as usize].position,
            mesh.vertices[i1 as usize].position,
            mesh.vertices[i2 as usize].position,
        );
        tri.area() >= area_threshold
    });

    let removed = original_count - mesh.faces.len();
    if removed > 0 {
        info!(
            "Removed {} degenerate triangles (area < {:.1e})",
            removed, area_threshold
        );
    }
    removed
}

/// Remove duplicate faces from the mesh.
///
/// Faces are duplicates if they have the same vertex set regardless of
/// winding or starting vertex. The first occurrence survives.
///
/// Returns the number of duplicate faces removed.
pub fn remove_duplicate_faces(mesh: &mut Mesh) -> usize {
    // Rotate the smallest index to the front, keeping cyclic order.
    fn normalize_face(face: [u32; 3]) -> [u32; 3] {
        let mut min_idx = 0;
        for i in 1..3 {
            if face[i] < face[min_idx] {
                min_idx = i;
            }
        }
        [
            face[min_idx],
            face[(min_idx + 1) % 3],
            face[(min_idx + 2) % 3],
        ]
    }

    let original_count = mesh.faces.len();
    let mut seen: HashSet<[u32; 3]> = HashSet::new();

    mesh.faces.retain(|face| {
        let fwd = normalize_face(*face);
        let rev = normalize_face([face[0], face[2], face[1]]);
        if seen.contains(&fwd) || seen.contains(&rev) {
            false
        } else {
            seen.insert(fwd);
            true
        }
    });

    let removed = original_count - mesh.faces.len();
    if removed > 0 {
        info!("Removed {} duplicate faces", removed);
    }
    removed
}

/// Remove unreferenced vertices and compact the vertex array.
///
/// Surviving indices are remapped to a dense 0-based range.
///
/// Returns the number of vertices removed.
pub fn remove_unreferenced_vertices(mesh: &mut Mesh) -> usize {
    let original_count = mesh.vertices.len();

    let mut referenced = vec![false; original_count];
    for face in &mesh.faces {
        for &idx in face {
            referenced[idx as usize] = true;
        }
    }

    let referenced_count = referenced.iter().filter(|&&r| r).count();
    if referenced_count == original_count {
        return 0;
    }

    let mut remap: Vec<u32> = vec![u32::MAX; original_count];
    let mut new_vertices = Vec::with_capacity(referenced_count);

    for (old_idx, vertex) in mesh.vertices.iter().enumerate() {
        if referenced[old_idx] {
            remap[old_idx] = new_vertices.len() as u32;
            new_vertices.push(*vertex);
        }
    }

    for face in &mut mesh.faces {
        face[0] = remap[face[0] as usize];
        face[1] = remap[face[1] as usize];
        face[2] = remap[face[2] as usize];
    }

    let removed = original_count - new_vertices.len();
    mesh.vertices = new_vertices;

    if removed > 0 {
        info!("Removed {} unreferenced vertices", removed);
    }
    removed
}

/// Flip triangles whose normal opposes the mesh-wide average normal.
///
/// Best-effort heuristic for meshes where most faces already agree on an
/// orientation (a flat plate with a few inverted triangles). It is not a
/// manifold repair: a closed solid has no single dominant direction and may
/// come through unchanged.
///
/// Returns the number of triangles flipped.
pub fn fix_winding(mesh: &mut Mesh) -> usize {
    let mut average = Vector3::zeros();
    for tri in mesh.triangles() {
        // Unnormalized normals weight the average by triangle area.
        average += tri.normal_unnormalized();
    }

    if average.norm_squared() <= f64::EPSILON {
        debug!("Average face normal is degenerate, skipping winding correction");
        return 0;
    }

    let vertices = &mesh.vertices;
    let mut flipped = 0;

    for face in &mut mesh.faces {
        let tri = Triangle::new(
            vertices[face[0] as usize].position,
            vertices[face[1] as usize].position,
            vertices[face[2] as usize].position,
        );
        let normal = tri.normal_unnormalized();
        if normal.norm_squared() <= f64::EPSILON {
            continue;
        }
        if normal.dot(&average) < 0.0 {
            face.swap(1, 2);
            flipped += 1;
        }
    }

    if flipped > 0 {
        info!("Flipped {} triangles against the average normal", flipped);
    }
    flipped
}

/// Run the full cleanup pipeline on a mesh.
///
/// # Cleanup Steps
///
/// 1. Weld coincident vertices (quantized, first occurrence wins)
/// 2. Drop degenerate triangles (repeated indices or near-zero area)
/// 3. Drop exact duplicate faces (optional)
/// 4. Compact unreferenced vertices
/// 5. Correct winding against the average normal (optional)
///
/// Never fails; an empty mesh comes back empty with a zeroed report.
///
/// # Example
///
/// ```
/// use mesh_facet::{CleanupParams, Mesh, clean_mesh};
///
/// let mut mesh = Mesh::new();
/// // ... populate mesh ...
/// let report = clean_mesh(&mut mesh, &CleanupParams::default());
/// println!("{report}");
/// ```
pub fn clean_mesh(mesh: &mut Mesh, params: &CleanupParams) -> CleanupReport {
    let mut report = CleanupReport::default();

    if mesh.faces.is_empty() {
        debug!("Mesh has no faces, nothing to clean");
        return report;
    }

    info!(
        "Starting geometry cleanup (weld = {:.1e}, min_area = {:.1e})",
        params.weld_epsilon, params.min_triangle_area
    );
    let initial_vertices = mesh.vertex_count();
    let initial_faces = mesh.face_count();

    // 1. Weld coincident vertices
    report.vertices_welded = weld_vertices(mesh, params.weld_epsilon);

    // 2. Drop degenerate triangles
    report.degenerate_triangles_removed =
        remove_degenerate_triangles(mesh, params.min_triangle_area);

    // 3. Drop duplicate faces (welding can create them)
    if params.remove_duplicate_faces {
        report.duplicate_faces_removed = remove_duplicate_faces(mesh);
    }

    // 4. Compact unreferenced vertices
    report.unreferenced_vertices_removed = remove_unreferenced_vertices(mesh);

    // 5. Winding correction
    if params.fix_winding {
        report.triangles_flipped = fix_winding(mesh);
    }

    info!(
        "Cleanup finished: {} → {} vertices, {} → {} triangles",
        initial_vertices,
        mesh.vertex_count(),
        initial_faces,
        mesh.face_count()
    );

    report
}

impl Mesh {
    /// Clean this mesh in place. See [`clean_mesh`].
    pub fn clean(&mut self, params: &CleanupParams) -> CleanupReport {
        clean_mesh(self, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vertex;

    /// Two triangles sharing an edge, but built with duplicated corner
    /// vertices so nothing is shared at the index level.
    fn unwelded_quad() -> Mesh {
        let mut mesh = Mesh::new();

        mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0)); // 0
        mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0)); // 1
        mesh.vertices.push(Vertex::from_coords(1.0, 1.0, 0.0)); // 2
        mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0)); // 3 (dup of 0)
        mesh.vertices.push(Vertex::from_coords(1.0, 1.0, 0.0)); // 4 (dup of 2)
        mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0)); // 5

        mesh.faces.push([0, 1, 2]);
        mesh.faces.push([3, 4, 5]);

        mesh
    }

    #[test]
    fn test_weld_merges_coincident_vertices() {
        let mut mesh = unwelded_quad();
        let merged = weld_vertices(&mut mesh, 1e-6);

        assert_eq!(merged, 2);
        // Second face now references the canonical indices 0 and 2.
        assert_eq!(mesh.faces[1], [0, 2, 5]);
    }

    #[test]
    fn test_weld_within_tolerance() {
        let mut mesh = Mesh::new();
        mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
        // Within a quarter of the weld quantum of vertex 0.
        mesh.vertices
            .push(Vertex::from_coords(1e-7, 0.0, 0.0));
        mesh.faces.push([0, 1, 2]);
        mesh.faces.push([3, 1, 2]);

        let merged = weld_vertices(&mut mesh, 1e-6);
        assert_eq!(merged, 1);
        // Both faces collapse onto the same indices; one is now a duplicate.
        assert_eq!(mesh.faces[0], mesh.faces[1]);
    }

    #[test]
    fn test_remove_degenerate_collinear() {
        let mut mesh = Mesh::new();
        mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(2.0, 0.0, 0.0)); // collinear
        mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
        mesh.faces.push([0, 1, 2]);
        mesh.faces.push([0, 1, 3]);

        let removed = remove_degenerate_triangles(&mut mesh, 1e-9);
        assert_eq!(removed, 1);
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.faces[0], [0, 1, 3]);
    }

    #[test]
    fn test_remove_degenerate_repeated_index() {
        let mut mesh = Mesh::new();
        mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
        mesh.faces.push([0, 1, 1]);

        let removed = remove_degenerate_triangles(&mut mesh, 1e-9);
        assert_eq!(removed, 1);
        assert_eq!(mesh.face_count(), 0);
    }

    #[test]
    fn test_remove_duplicate_faces_either_winding() {
        let mut mesh = Mesh::new();
        mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
        mesh.faces.push([0, 1, 2]);
        mesh.faces.push([1, 2, 0]); // same cycle
        mesh.faces.push([0, 2, 1]); // reversed winding

        let removed = remove_duplicate_faces(&mut mesh);
        assert_eq!(removed, 2);
        assert_eq!(mesh.face_count(), 1);
    }

    #[test]
    fn test_remove_unreferenced_compacts() {
        let mut mesh = Mesh::new();
        mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0)); // unreferenced
        mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(2.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(1.0, 1.0, 0.0));
        mesh.faces.push([1, 2, 3]);

        let removed = remove_unreferenced_vertices(&mut mesh);
        assert_eq!(removed, 1);
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.faces[0], [0, 1, 2]);
    }

    #[test]
    fn test_fix_winding_flips_minority() {
        let mut mesh = Mesh::new();
        mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(1.0, 1.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
        mesh.faces.push([0, 1, 2]); // +z
        mesh.faces.push([0, 3, 2]); // -z, inverted

        let flipped = fix_winding(&mut mesh);
        assert_eq!(flipped, 1);
        assert_eq!(mesh.faces[1], [0, 2, 3]);

        // All normals now agree.
        for tri in mesh.triangles() {
            assert!(tri.normal().expect("valid triangle").z > 0.0);
        }
    }

    #[test]
    fn test_clean_mesh_pipeline() {
        let mut mesh = unwelded_quad();
        // Add a degenerate sliver referencing a dangling vertex.
        mesh.vertices.push(Vertex::from_coords(5.0, 5.0, 0.0));
        mesh.faces.push([0, 1, 1]);

        let report = clean_mesh(&mut mesh, &CleanupParams::default());

        assert_eq!(report.vertices_welded, 2);
        assert_eq!(report.degenerate_triangles_removed, 1);
        assert!(report.unreferenced_vertices_removed >= 3);
        assert_eq!(mesh.face_count(), 2);
        assert_eq!(mesh.vertex_count(), 4);
        assert!(!report.is_noop());
    }

    #[test]
    fn test_clean_empty_mesh_is_noop() {
        let mut mesh = Mesh::new();
        let report = clean_mesh(&mut mesh, &CleanupParams::default());
        assert!(report.is_noop());
        assert!(mesh.is_empty());
    }

    #[test]
    fn test_report_display() {
        let report = CleanupReport {
            vertices_welded: 4,
            degenerate_triangles_removed: 2,
            duplicate_faces_removed: 1,
            unreferenced_vertices_removed: 3,
            triangles_flipped: 0,
        };
        let text = format!("{}", report);
        assert!(text.contains("4 welded"));
        assert!(text.contains("2 degenerate"));
        assert!(!report.winding_corrected());
    }
}
