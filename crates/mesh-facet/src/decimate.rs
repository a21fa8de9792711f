//! Mesh decimation by shortest-edge midpoint collapse.
//!
//! Runs in bounded passes. Each pass sorts the live edges by length and
//! collapses the shortest first, moving the surviving endpoint to the edge
//! midpoint. A vertex touched by a collapse sits out the rest of the pass,
//! so collapses never cascade within one pass and the result is stable.
//!
//! Decimation is deterministic: edges are discovered in face order and the
//! length sort is stable, so equal-length ties resolve the same way on
//! every run.

use hashbrown::HashSet;
use nalgebra::Point3;
use tracing::{debug, info, warn};

use crate::cleanup::{remove_unreferenced_vertices, weld_vertices};
use crate::error::{FacetError, FacetResult};
use crate::tracing_ext::OperationTimer;
use crate::types::DISTANCE_TOLERANCE;
use crate::{Mesh, Vertex};

/// Decimation never goes below this many vertices.
const MIN_VERTEX_FLOOR: usize = 4;

/// Pass limit for moderate targets.
const BASE_MAX_PASSES: usize = 5;

/// Pass limit when more than half the vertices must go.
const DEEP_MAX_PASSES: usize = 12;

/// Statistics from a decimation run.
#[derive(Debug, Clone, Default)]
pub struct DecimateStats {
    /// Vertices before decimation (after welding).
    pub original_vertices: usize,
    /// Vertices after decimation.
    pub final_vertices: usize,
    /// Triangles before decimation.
    pub original_triangles: usize,
    /// Triangles after decimation.
    pub final_triangles: usize,
    /// Collapse passes executed.
    pub passes: usize,
}

impl DecimateStats {
    /// Fraction of vertices actually removed.
    pub fn reduction_achieved(&self) -> f64 {
        if self.original_vertices == 0 {
            return 0.0;
        }
        1.0 - self.final_vertices as f64 / self.original_vertices as f64
    }
}

impl std::fmt::Display for DecimateStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Decimation: {} → {} vertices ({:.1}% removed), {} → {} triangles, {} pass(es)",
            self.original_vertices,
            self.final_vertices,
            self.reduction_achieved() * 100.0,
            self.original_triangles,
            self.final_triangles,
            self.passes
        )
    }
}

/// Reduce the vertex count of `mesh` by roughly `target_reduction`.
///
/// `target_reduction` is the fraction of vertices to remove and must lie in
/// the open interval (0, 1); anything else is rejected before the mesh is
/// touched. The run stops once `max(4, floor(n × (1 − target_reduction)))`
/// vertices remain.
///
/// Coincident vertices are welded first so edge identity is positional.
/// Triangles that collapse to fewer than three distinct vertices are
/// dropped and the vertex buffer is compacted afterwards, so the output
/// mesh is always index-valid.
///
/// The target is best-effort: when no collapsible edge remains before it
/// is reached, the run stops with a warning and returns the stats for the
/// partially decimated, still valid mesh.
pub fn decimate_mesh(mesh: &mut Mesh, target_reduction: f64) -> FacetResult<DecimateStats> {
    if !target_reduction.is_finite() || target_reduction <= 0.0 || target_reduction >= 1.0 {
        return Err(FacetError::invalid_decimation_target(target_reduction));
    }

    let _timer = OperationTimer::with_context("decimate_mesh", mesh.face_count(), mesh.vertex_count());

    weld_vertices(mesh, DISTANCE_TOLERANCE);
    remove_unreferenced_vertices(mesh);

    let original_vertices = mesh.vertex_count();
    let original_triangles = mesh.face_count();

    let target_remaining = ((original_vertices as f64) * (1.0 - target_reduction)).floor()
        as usize;
    let target_remaining = target_remaining.max(MIN_VERTEX_FLOOR);

    let mut stats = DecimateStats {
        original_vertices,
        final_vertices: original_vertices,
        original_triangles,
        final_triangles: original_triangles,
        passes: 0,
    };

    if original_vertices <= target_remaining {
        debug!(
            "Skipping decimation: {} vertices already at or below target {}",
            original_vertices, target_remaining
        );
        return Ok(stats);
    }

    // Unique edges in face-discovery order; the stable sort below keeps
    // this order for equal lengths.
    let mut seen: HashSet<(u32, u32)> = HashSet::new();
    let mut edges: Vec<(u32, u32)> = Vec::new();
    for face in &mesh.faces {
        for &(a, b) in &[(face[0], face[1]), (face[1], face[2]), (face[2], face[0])] {
            let edge = normalize_edge(a, b);
            if edge.0 != edge.1 && seen.insert(edge) {
                edges.push(edge);
            }
        }
    }

    let vertex_count = original_vertices;
    let mut positions: Vec<Point3<f64>> =
        mesh.vertices.iter().map(|v| v.position).collect();
    // merge_target[v] == v while v is alive; collapsed vertices point at
    // their survivor, forming chains resolved by `resolve`.
    let mut merge_target: Vec<u32> = (0..vertex_count as u32).collect();
    let mut remaining = original_vertices;

    let max_passes = if target_reduction > 0.5 {
        DEEP_MAX_PASSES
    } else {
        BASE_MAX_PASSES
    };

    let mut stalled = false;
    'passes: for _ in 0..max_passes {
        let mut live: Vec<(f64, u32, u32)> = Vec::with_capacity(edges.len());
        for &(a, b) in &edges {
            let ra = resolve(a, &merge_target);
            let rb = resolve(b, &merge_target);
            if ra == rb {
                continue;
            }
            let length = (positions[ra as usize] - positions[rb as usize]).norm();
            live.push((length, ra, rb));
        }

        if live.is_empty() {
            stalled = true;
            break;
        }

        live.sort_by(|x, y| x.0.partial_cmp(&y.0).unwrap_or(std::cmp::Ordering::Equal));

        let mut touched = vec![false; vertex_count];
        let mut collapsed_this_pass = 0usize;

        stats.passes += 1;
        for (_, a, b) in live {
            if touched[a as usize] || touched[b as usize] {
                continue;
            }
            // Keep the lower index so merge chains always point downward
            // and terminate.
            let (keep, drop) = if a < b { (a, b) } else { (b, a) };
            let midpoint = Point3::from(
                (positions[keep as usize].coords + positions[drop as usize].coords) * 0.5,
            );
            positions[keep as usize] = midpoint;
            merge_target[drop as usize] = keep;
            touched[keep as usize] = true;
            touched[drop as usize] = true;
            collapsed_this_pass += 1;
            remaining -= 1;

            if remaining <= target_remaining {
                break 'passes;
            }
        }

        if collapsed_this_pass == 0 {
            stalled = true;
            break;
        }
    }

    rebuild_mesh(mesh, &positions, &merge_target);
    stats.final_vertices = mesh.vertex_count();
    stats.final_triangles = mesh.face_count();
    info!("{}", stats);

    // The target is best-effort: a stall is reported, not raised.
    if stalled && remaining > target_remaining {
        warn!(
            "Decimation stalled at {} vertices (target {}): no collapsible edges remain",
            remaining, target_remaining
        );
    }

    Ok(stats)
}

impl Mesh {
    /// Decimate this mesh in place. See [`decimate_mesh`].
    pub fn decimate(&mut self, target_reduction: f64) -> FacetResult<DecimateStats> {
        decimate_mesh(self, target_reduction)
    }
}

/// Canonical low-first form of an undirected edge.
fn normalize_edge(a: u32, b: u32) -> (u32, u32) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Follow a merge chain to its surviving vertex.
fn resolve(mut v: u32, merge_target: &[u32]) -> u32 {
    while merge_target[v as usize] != v {
        v = merge_target[v as usize];
    }
    v
}

/// Remap faces through the merge chains, drop collapsed triangles, and
/// compact the vertex buffer.
fn rebuild_mesh(mesh: &mut Mesh, positions: &[Point3<f64>], merge_target: &[u32]) {
    let mut vertex_map: Vec<Option<u32>> = vec![None; positions.len()];
    let mut vertices: Vec<Vertex> = Vec::new();

    for (v, &target) in merge_target.iter().enumerate() {
        if v as u32 != target {
            continue;
        }
        vertex_map[v] = Some(vertices.len() as u32);
        vertices.push(Vertex::new(positions[v]));
    }

    let mut faces: Vec<[u32; 3]> = Vec::with_capacity(mesh.faces.len());
    for face in &mesh.faces {
        let a = resolve(face[0], merge_target);
        let b = resolve(face[1], merge_target);
        let c = resolve(face[2], merge_target);
        if a == b || b == c || a == c {
            continue;
        }
        // Survivors always have a slot in the compacted buffer.
        if let (Some(na), Some(nb), Some(nc)) = (
            vertex_map[a as usize],
            vertex_map[b as usize],
            vertex_map[c as usize],
        ) {
            faces.push([na, nb, nc]);
        }
    }

    mesh.vertices = vertices;
    mesh.faces = faces;
}
