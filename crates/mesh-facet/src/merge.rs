//! Coplanar face merging: one algorithm, policy-selected grouping.
//!
//! The merger collapses groups of coplanar faces into single polygon faces.
//! What varies between use cases is only how candidate groups are formed and
//! how forgiving the tolerances are, so the whole family is expressed as one
//! skeleton parameterized by a [`MergePolicy`] rather than separate engines.
//!
//! Merging is an optimization, never a correctness requirement: any group
//! that cannot produce a valid perimeter falls back to its original faces.

use hashbrown::{HashMap, HashSet};
use nalgebra::Point3;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::adjacency::{quantize_position, EdgeKey, FaceAdjacency};
use crate::order::{order_perimeter, orient_ccw, walk_boundary};
use crate::tracing_ext::OperationTimer;
use crate::types::{DISTANCE_TOLERANCE, EDGE_TOLERANCE};
use crate::{Mesh, PolygonFace};

/// How faces are grouped into merge candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "pipeline-config",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum GroupingStrategy {
    /// Only faces connected through complete shared edges merge. Preserves
    /// voids and holes because a ring's inner and outer rims are never
    /// edge-connected across the gap.
    EdgeAdjacency,

    /// Every face on the same plane merges, adjacent or not. Use for large
    /// flat regions where triangulation cracks leave edge adjacency
    /// under-merged.
    PlaneBucket,

    /// Same plane, but faces must also be physically close: plane groups are
    /// split wherever the bounding-box gap exceeds
    /// [`MergePolicy::max_cluster_gap`].
    SpatialClusters,

    /// Fan-triangulated caps sharing one high-frequency hub vertex. The hub
    /// is excluded from the merged perimeter. Falls back to
    /// [`GroupingStrategy::EdgeAdjacency`] when no hub is found.
    CenterFan,
}

/// Tolerances and grouping strategy for one merge pass.
///
/// Presets cover the known shape provenances; [`MergePolicy::strict`] is the
/// default and the right choice for arbitrary uploaded meshes.
#[derive(Debug, Clone)]
#[cfg_attr(
    feature = "pipeline-config",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct MergePolicy {
    /// Grouping strategy.
    pub strategy: GroupingStrategy,

    /// Minimum dot product of unit normals for two faces to count as
    /// parallel.
    pub normal_tolerance: f64,

    /// Maximum distance from a candidate face's centroid to the seed face's
    /// plane.
    pub distance_tolerance: f64,

    /// Faces with area below this stay unmerged. `0.0` disables the gate;
    /// only the flat-surface preset enables it, to keep slivers from gluing
    /// unrelated regions together.
    pub min_face_area: f64,

    /// Maximum bounding-box gap for [`GroupingStrategy::SpatialClusters`].
    pub max_cluster_gap: f64,
}

impl Default for MergePolicy {
    fn default() -> Self {
        Self::strict()
    }
}

impl MergePolicy {
    /// Strict edge-respecting merge (the default).
    ///
    /// Preserves voids and holes in rings, crosses, and brackets.
    pub fn strict() -> Self {
        Self {
            strategy: GroupingStrategy::EdgeAdjacency,
            normal_tolerance: 0.999,
            distance_tolerance: 0.001,
            min_face_area: 0.0,
            max_cluster_gap: 0.0,
        }
    }

    /// Permissive flat-surface merge for large planar regions (gear faces)
    /// where edge adjacency under-merges.
    pub fn flat_surface() -> Self {
        Self {
            strategy: GroupingStrategy::PlaneBucket,
            normal_tolerance: 0.95,
            distance_tolerance: 0.01,
            min_face_area: 1e-6,
            max_cluster_gap: 0.0,
        }
    }

    /// Plane grouping with a physical-contiguity requirement: coplanar but
    /// distant patches stay separate.
    pub fn spatial_clusters() -> Self {
        Self {
            strategy: GroupingStrategy::SpatialClusters,
            normal_tolerance: 0.999,
            distance_tolerance: 0.001,
            min_face_area: 0.0,
            max_cluster_gap: 0.5,
        }
    }

    /// Aggressive plane bucketing for procedural primitives where maximal
    /// merging is desired and voids are not a concern.
    pub fn plane_bucketed() -> Self {
        Self {
            strategy: GroupingStrategy::PlaneBucket,
            normal_tolerance: 0.95,
            distance_tolerance: 0.1,
            min_face_area: 0.0,
            max_cluster_gap: 0.0,
        }
    }

    /// Fan-triangulated cap merge (gear/star/cross centers). The shared
    /// apex is excluded from the merged perimeter.
    pub fn center_fan() -> Self {
        Self {
            strategy: GroupingStrategy::CenterFan,
            normal_tolerance: 0.999,
            distance_tolerance: 0.001,
            min_face_area: 0.0,
            max_cluster_gap: 0.0,
        }
    }

    /// Whether `candidate` lies on `seed`'s plane within this policy's
    /// tolerances.
    fn coplanar(&self, seed: &PolygonFace, candidate: &PolygonFace) -> bool {
        seed.normal.dot(&candidate.normal) >= self.normal_tolerance
            && seed.plane_distance(&candidate.centroid()) <= self.distance_tolerance
    }
}

/// Summary of a merge pass, for audit and logging.
#[derive(Debug, Clone, Default)]
pub struct MergeReport {
    /// Faces fed into the merger.
    pub input_faces: usize,
    /// Faces in the merged output.
    pub output_faces: usize,
    /// Multi-face components successfully collapsed into one polygon.
    pub components_merged: usize,
    /// Components returned unmerged because no valid perimeter emerged.
    pub fallbacks: usize,
}

impl MergeReport {
    /// Whether the pass reduced the face count at all.
    pub fn reduced(&self) -> bool {
        self.output_faces < self.input_faces
    }
}

impl std::fmt::Display for MergeReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Merge: {} → {} faces, {} components merged, {} fallbacks",
            self.input_faces, self.output_faces, self.components_merged, self.fallbacks
        )
    }
}

/// Outcome of collapsing one component.
struct Collapsed {
    faces: Vec<PolygonFace>,
    merged: bool,
    fallback: bool,
}

/// Merge connected groups of coplanar faces into single polygon faces.
///
/// Each group collapses to one [`PolygonFace`] whose perimeter comes from
/// walking the group's boundary edges (with the angular sort of
/// [`order_perimeter`] as the fallback), whose normal is the seed face's
/// normal, and whose `source_triangles` is the union of the members'.
///
/// Components of size 1 pass through unchanged. A component that cannot
/// produce a valid perimeter (fewer than 3 unique vertices, or a boundary
/// that is not a single loop and defeats the angular sort too) returns its
/// original faces instead, counted in [`MergeReport::fallbacks`].
pub fn merge_coplanar_faces(
    faces: &[PolygonFace],
    policy: &MergePolicy,
) -> (Vec<PolygonFace>, MergeReport) {
    let mut report = MergeReport {
        input_faces: faces.len(),
        ..Default::default()
    };

    if faces.is_empty() {
        return (Vec::new(), report);
    }

    let _timer = OperationTimer::new("merge_coplanar_faces");

    let components = match policy.strategy {
        GroupingStrategy::EdgeAdjacency => group_edge_adjacent(faces, policy),
        GroupingStrategy::PlaneBucket => group_plane_bucket(faces, policy),
        GroupingStrategy::SpatialClusters => group_spatial_clusters(faces, policy),
        GroupingStrategy::CenterFan => group_center_fan(faces, policy),
    };

    debug!(
        "Merging {} faces in {} component(s) with {:?} grouping",
        faces.len(),
        components.len(),
        policy.strategy
    );

    // Components are disjoint, so each can collapse independently; the
    // ordered collect keeps output deterministic.
    let collapsed: Vec<Collapsed> = components
        .par_iter()
        .map(|component| collapse_component(faces, component))
        .collect();

    let mut output = Vec::with_capacity(collapsed.len());
    for outcome in collapsed {
        if outcome.merged {
            report.components_merged += 1;
        }
        if outcome.fallback {
            report.fallbacks += 1;
        }
        output.extend(outcome.faces);
    }

    report.output_faces = output.len();
    info!("{}", report);

    (output, report)
}

/// Wrap each non-degenerate triangle of a mesh as a single-triangle face.
pub fn faces_from_triangles(mesh: &Mesh) -> Vec<PolygonFace> {
    mesh.triangles()
        .enumerate()
        .filter_map(|(idx, tri)| PolygonFace::from_triangle(&tri, idx as u32))
        .collect()
}

/// Reconstruct polygon faces directly from a triangle mesh.
///
/// Convenience entry point chaining [`faces_from_triangles`] and
/// [`merge_coplanar_faces`]. The mesh should be cleaned first
/// ([`crate::cleanup::clean_mesh`]) so winding and vertex identity are
/// consistent.
pub fn reconstruct_polygons(
    mesh: &Mesh,
    policy: &MergePolicy,
) -> (Vec<PolygonFace>, MergeReport) {
    let faces = faces_from_triangles(mesh);
    merge_coplanar_faces(&faces, policy)
}

/// BFS over edge-adjacent faces coplanar with each component's seed.
fn group_edge_adjacent(faces: &[PolygonFace], policy: &MergePolicy) -> Vec<Vec<u32>> {
    let adjacency = FaceAdjacency::build_default(faces);
    let mut visited = vec![false; faces.len()];
    let mut components = Vec::new();

    for seed in 0..faces.len() {
        if visited[seed] {
            continue;
        }
        visited[seed] = true;

        let mut component = vec![seed as u32];
        let mut stack = vec![seed as u32];
        while let Some(face_idx) = stack.pop() {
            for &neighbor in adjacency.neighbors_of(face_idx) {
                if !visited[neighbor as usize]
                    && policy.coplanar(&faces[seed], &faces[neighbor as usize])
                {
                    visited[neighbor as usize] = true;
                    component.push(neighbor);
                    stack.push(neighbor);
                }
            }
        }

        component.sort_unstable();
        components.push(component);
    }

    components
}

/// Greedy plane bucketing: every unassigned face coplanar with the seed
/// joins its group, adjacency not required.
fn group_plane_bucket(faces: &[PolygonFace], policy: &MergePolicy) -> Vec<Vec<u32>> {
    let gated = |face: &PolygonFace| {
        policy.min_face_area > 0.0 && face.area() < policy.min_face_area
    };

    let mut assigned = vec![false; faces.len()];
    let mut components = Vec::new();

    for seed in 0..faces.len() {
        if assigned[seed] {
            continue;
        }
        assigned[seed] = true;

        let mut component = vec![seed as u32];
        if !gated(&faces[seed]) {
            for other in (seed + 1)..faces.len() {
                if assigned[other] || gated(&faces[other]) {
                    continue;
                }
                if policy.coplanar(&faces[seed], &faces[other]) {
                    assigned[other] = true;
                    component.push(other as u32);
                }
            }
        }
        components.push(component);
    }

    components
}

/// Plane bucketing followed by single-link clustering on bounding-box gaps,
/// so coplanar-but-distant patches stay separate.
fn group_spatial_clusters(faces: &[PolygonFace], policy: &MergePolicy) -> Vec<Vec<u32>> {
    let bounds: Vec<(Point3<f64>, Point3<f64>)> = faces.iter().map(face_bounds).collect();

    let mut components = Vec::new();
    for bucket in group_plane_bucket(faces, policy) {
        if bucket.len() <= 1 {
            components.push(bucket);
            continue;
        }

        let mut visited = vec![false; bucket.len()];
        for start in 0..bucket.len() {
            if visited[start] {
                continue;
            }
            visited[start] = true;

            let mut cluster = vec![bucket[start]];
            let mut stack = vec![start];
            while let Some(i) = stack.pop() {
                for (j, seen) in visited.iter_mut().enumerate() {
                    if *seen {
                        continue;
                    }
                    let gap = bounds_gap(
                        &bounds[bucket[i] as usize],
                        &bounds[bucket[j] as usize],
                    );
                    if gap <= policy.max_cluster_gap {
                        *seen = true;
                        cluster.push(bucket[j]);
                        stack.push(j);
                    }
                }
            }

            cluster.sort_unstable();
            components.push(cluster);
        }
    }

    components
}

/// Group all triangles sharing the most-referenced "hub" vertex into one
/// fan component; everything else stays singleton.
///
/// The fan's interior edges (hub to rim) are each used by two triangles, so
/// the generic boundary walk in [`collapse_component`] drops the hub from
/// the merged perimeter automatically.
fn group_center_fan(faces: &[PolygonFace], policy: &MergePolicy) -> Vec<Vec<u32>> {
    let mut incidence: HashMap<(i64, i64, i64), Vec<u32>> = HashMap::new();
    let mut all_triangles = true;

    for (face_idx, face) in faces.iter().enumerate() {
        if face.vertex_count() != 3 {
            all_triangles = false;
            break;
        }
        for vertex in &face.vertices {
            incidence
                .entry(quantize_position(vertex, DISTANCE_TOLERANCE))
                .or_default()
                .push(face_idx as u32);
        }
    }

    // Pick the most-used vertex; ties break toward the lowest face set so
    // the grouping stays deterministic across hash orderings.
    let mut hub: Option<Vec<u32>> = None;
    if all_triangles {
        for mut members in incidence.into_values() {
            members.sort_unstable();
            members.dedup();
            if members.len() < 3 {
                continue;
            }
            let better = match &hub {
                None => true,
                Some(best) => {
                    members.len() > best.len() || (members.len() == best.len() && members < *best)
                }
            };
            if better {
                hub = Some(members);
            }
        }
    }

    let Some(fan_members) = hub else {
        warn!("No fan hub vertex found, falling back to edge-adjacent grouping");
        return group_edge_adjacent(faces, policy);
    };

    // Keep only members coplanar with the fan's seed; a hub shared between
    // a front and back cap must not fuse the two planes.
    let seed = fan_members[0] as usize;
    let fan: Vec<u32> = fan_members
        .into_iter()
        .filter(|&idx| policy.coplanar(&faces[seed], &faces[idx as usize]))
        .collect();

    let in_fan: HashSet<u32> = fan.iter().copied().collect();
    let mut components = vec![fan];
    for face_idx in 0..faces.len() as u32 {
        if !in_fan.contains(&face_idx) {
            components.push(vec![face_idx]);
        }
    }

    components
}

/// Collapse one component into a single polygon face, or fall back to the
/// original member faces when no valid perimeter can be built.
fn collapse_component(faces: &[PolygonFace], component: &[u32]) -> Collapsed {
    if component.len() == 1 {
        return Collapsed {
            faces: vec![faces[component[0] as usize].clone()],
            merged: false,
            fallback: false,
        };
    }

    let seed = &faces[component[0] as usize];
    let normal = seed.normal;

    let perimeter = boundary_loop(faces, component, &normal)
        .or_else(|| angular_perimeter(faces, component, seed));

    match perimeter {
        Some(vertices) if vertices.len() >= 3 => {
            let mut source_triangles: Vec<u32> = component
                .iter()
                .flat_map(|&idx| faces[idx as usize].source_triangles.iter().copied())
                .collect();
            source_triangles.sort_unstable();
            source_triangles.dedup();

            Collapsed {
                faces: vec![PolygonFace::new(vertices, normal, source_triangles)],
                merged: true,
                fallback: false,
            }
        }
        _ => {
            warn!(
                "Component of {} faces produced no valid perimeter, keeping faces unmerged",
                component.len()
            );
            Collapsed {
                faces: component
                    .iter()
                    .map(|&idx| faces[idx as usize].clone())
                    .collect(),
                merged: false,
                fallback: true,
            }
        }
    }
}

/// Walk the component's once-used edges into an oriented perimeter loop.
///
/// Concavity-safe: the loop follows actual boundary edges, so an L-shaped
/// component comes out in walk order, and interior vertices (fan hubs)
/// never appear. Returns `None` when the boundary is not a single loop.
fn boundary_loop(
    faces: &[PolygonFace],
    component: &[u32],
    normal: &nalgebra::Vector3<f64>,
) -> Option<Vec<Point3<f64>>> {
    let mut edge_use: HashMap<EdgeKey, usize> = HashMap::new();
    for &face_idx in component {
        for (start, end) in faces[face_idx as usize].edges() {
            let key = EdgeKey::new(&start, &end, EDGE_TOLERANCE);
            *edge_use.entry(key).or_insert(0) += 1;
        }
    }

    let mut boundary: Vec<(Point3<f64>, Point3<f64>)> = Vec::new();
    for &face_idx in component {
        for (start, end) in faces[face_idx as usize].edges() {
            let key = EdgeKey::new(&start, &end, EDGE_TOLERANCE);
            if edge_use.get(&key) == Some(&1) {
                boundary.push((start, end));
            }
        }
    }

    let mut loop_points = walk_boundary(&boundary, EDGE_TOLERANCE)?;
    orient_ccw(&mut loop_points, normal);
    Some(loop_points)
}

/// Fallback perimeter: union of member vertices, deduplicated positionally
/// and ordered by angle around the centroid.
fn angular_perimeter(
    faces: &[PolygonFace],
    component: &[u32],
    seed: &PolygonFace,
) -> Option<Vec<Point3<f64>>> {
    let mut seen: HashSet<(i64, i64, i64)> = HashSet::new();
    let mut unique: Vec<Point3<f64>> = Vec::new();

    for &face_idx in component {
        for vertex in &faces[face_idx as usize].vertices {
            if seen.insert(quantize_position(vertex, DISTANCE_TOLERANCE)) {
                unique.push(*vertex);
            }
        }
    }

    if unique.len() < 3 {
        return None;
    }

    let mut ordered = order_perimeter(&unique, &seed.normal);
    orient_ccw(&mut ordered, &seed.normal);
    Some(ordered)
}

fn face_bounds(face: &PolygonFace) -> (Point3<f64>, Point3<f64>) {
    let mut min = face.vertices[0];
    let mut max = face.vertices[0];
    for p in &face.vertices[1..] {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        min.z = min.z.min(p.z);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
        max.z = max.z.max(p.z);
    }
    (min, max)
}

/// Euclidean gap between two axis-aligned boxes (0 when they touch).
fn bounds_gap(a: &(Point3<f64>, Point3<f64>), b: &(Point3<f64>, Point3<f64>)) -> f64 {
    let sep = |min_a: f64, max_a: f64, min_b: f64, max_b: f64| {
        (min_a - max_b).max(min_b - max_a).max(0.0)
    };
    let dx = sep(a.0.x, a.1.x, b.0.x, b.1.x);
    let dy = sep(a.0.y, a.1.y, b.0.y, b.1.y);
    let dz = sep(a.0.z, a.1.z, b.0.z, b.1.z);
    (dx * dx + dy * dy + dz * dz).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FaceKind;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn tri(p0: [f64; 3], p1: [f64; 3], p2: [f64; 3], source: u32) -> PolygonFace {
        let t = crate::Triangle::new(
            Point3::new(p0[0], p0[1], p0[2]),
            Point3::new(p1[0], p1[1], p1[2]),
            Point3::new(p2[0], p2[1], p2[2]),
        );
        PolygonFace::from_triangle(&t, source).expect("non-degenerate fixture")
    }

    /// Two triangles forming the unit square on z = 0.
    fn square_pair() -> Vec<PolygonFace> {
        vec![
            tri([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], 0),
            tri([0.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0], 1),
        ]
    }

    fn total_area(faces: &[PolygonFace]) -> f64 {
        faces.iter().map(|f| f.area()).sum()
    }

    #[test]
    fn test_square_pair_merges_to_quad() {
        let faces = square_pair();
        let (merged, report) = merge_coplanar_faces(&faces, &MergePolicy::strict());

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].kind, FaceKind::Quad);
        assert_eq!(merged[0].source_triangles, vec![0, 1]);
        assert_eq!(report.components_merged, 1);
        assert_eq!(report.fallbacks, 0);
        assert_relative_eq!(merged[0].area(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_non_coplanar_neighbors_stay_separate() {
        // Two triangles sharing an edge but folded 90 degrees.
        let faces = vec![
            tri([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], 0),
            tri([1.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 1.0], 1),
        ];
        let (merged, report) = merge_coplanar_faces(&faces, &MergePolicy::strict());

        assert_eq!(merged.len(), 2);
        assert_eq!(report.components_merged, 0);
    }

    #[test]
    fn test_strict_does_not_bridge_disconnected_patches() {
        // Coplanar squares separated by a gap: a void the strict policy
        // must preserve.
        let mut faces = square_pair();
        faces.push(tri([3.0, 0.0, 0.0], [4.0, 0.0, 0.0], [4.0, 1.0, 0.0], 2));
        faces.push(tri([3.0, 0.0, 0.0], [4.0, 1.0, 0.0], [3.0, 1.0, 0.0], 3));

        let (merged, _) = merge_coplanar_faces(&faces, &MergePolicy::strict());
        assert_eq!(merged.len(), 2);
        assert!(merged.iter().all(|f| f.kind == FaceKind::Quad));
    }

    #[test]
    fn test_flat_surface_bridges_disconnected_patches() {
        let mut faces = square_pair();
        faces.push(tri([3.0, 0.0, 0.0], [4.0, 0.0, 0.0], [4.0, 1.0, 0.0], 2));
        faces.push(tri([3.0, 0.0, 0.0], [4.0, 1.0, 0.0], [3.0, 1.0, 0.0], 3));

        let (merged, report) = merge_coplanar_faces(&faces, &MergePolicy::flat_surface());
        assert_eq!(merged.len(), 1);
        assert_eq!(report.components_merged, 1);
        assert_eq!(merged[0].source_triangles, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_spatial_clusters_split_distant_patches() {
        let mut faces = square_pair();
        faces.push(tri([10.0, 0.0, 0.0], [11.0, 0.0, 0.0], [11.0, 1.0, 0.0], 2));
        faces.push(tri([10.0, 0.0, 0.0], [11.0, 1.0, 0.0], [10.0, 1.0, 0.0], 3));

        let (merged, report) = merge_coplanar_faces(&faces, &MergePolicy::spatial_clusters());
        assert_eq!(merged.len(), 2);
        assert_eq!(report.components_merged, 2);
    }

    #[test]
    fn test_plane_bucketed_tolerates_loose_planes() {
        // Second pair sits 0.05 above the first: inside the aggressive
        // distance tolerance, outside the strict one.
        let mut faces = square_pair();
        faces.push(tri([1.0, 0.0, 0.05], [2.0, 0.0, 0.05], [2.0, 1.0, 0.05], 2));
        faces.push(tri([1.0, 0.0, 0.05], [2.0, 1.0, 0.05], [1.0, 1.0, 0.05], 3));

        let (strict, _) = merge_coplanar_faces(&faces, &MergePolicy::strict());
        assert_eq!(strict.len(), 2);

        let (aggressive, _) = merge_coplanar_faces(&faces, &MergePolicy::plane_bucketed());
        assert_eq!(aggressive.len(), 1);
    }

    #[test]
    fn test_min_area_gate_keeps_slivers_unmerged() {
        let mut faces = square_pair();
        // A sliver far below the flat-surface area gate.
        faces.push(tri(
            [5.0, 0.0, 0.0],
            [5.0 + 1e-4, 0.0, 0.0],
            [5.0, 1e-4, 0.0],
            2,
        ));

        let (merged, _) = merge_coplanar_faces(&faces, &MergePolicy::flat_surface());
        assert_eq!(merged.len(), 2);
        assert!(merged.iter().any(|f| f.kind == FaceKind::Triangle));
    }

    #[test]
    fn test_singleton_component_passes_through() {
        let faces = vec![tri([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], 7)];
        let (merged, report) = merge_coplanar_faces(&faces, &MergePolicy::strict());

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].source_triangles, vec![7]);
        assert_eq!(report.components_merged, 0);
        assert_eq!(report.fallbacks, 0);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let faces = square_pair();
        let policy = MergePolicy::strict();
        let (once, _) = merge_coplanar_faces(&faces, &policy);
        let (twice, report) = merge_coplanar_faces(&once, &policy);

        assert_eq!(twice.len(), once.len());
        assert_eq!(report.components_merged, 0);
        assert_eq!(twice[0].vertices, once[0].vertices);
    }

    #[test]
    fn test_area_is_conserved() {
        // An L-shaped region of four triangles.
        let faces = vec![
            tri([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], 0),
            tri([0.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0], 1),
            tri([1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [2.0, 1.0, 0.0], 2),
            tri([1.0, 0.0, 0.0], [2.0, 1.0, 0.0], [1.0, 1.0, 0.0], 3),
        ];
        let before = total_area(&faces);

        let (merged, _) = merge_coplanar_faces(&faces, &MergePolicy::strict());
        assert_eq!(merged.len(), 1);
        assert_relative_eq!(total_area(&merged), before, epsilon = 1e-9);
    }

    #[test]
    fn test_merged_perimeter_is_ccw() {
        let (merged, _) = merge_coplanar_faces(&square_pair(), &MergePolicy::strict());
        let area = crate::order::signed_area(&merged[0].vertices, &Vector3::z());
        assert!(area > 0.0, "perimeter should be counterclockwise");
    }

    #[test]
    fn test_center_fan_without_hub_degrades_to_edge_adjacency() {
        // A quad face defeats the all-triangle precondition.
        let faces = vec![PolygonFace::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            Vector3::z(),
            vec![0],
        )];
        let (merged, _) = merge_coplanar_faces(&faces, &MergePolicy::center_fan());
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].kind, FaceKind::Quad);
    }

    #[test]
    fn test_center_fan_merges_fan_cap() {
        // Hexagon fanned around the origin: 6 triangles, hub used 6 times.
        let rim: Vec<Point3<f64>> = (0..6)
            .map(|i| {
                let a = std::f64::consts::TAU * i as f64 / 6.0;
                Point3::new(a.cos(), a.sin(), 0.0)
            })
            .collect();
        let faces: Vec<PolygonFace> = (0..6)
            .map(|i| {
                tri(
                    [0.0, 0.0, 0.0],
                    [rim[i].x, rim[i].y, 0.0],
                    [rim[(i + 1) % 6].x, rim[(i + 1) % 6].y, 0.0],
                    i as u32,
                )
            })
            .collect();

        let (merged, report) = merge_coplanar_faces(&faces, &MergePolicy::center_fan());
        assert_eq!(merged.len(), 1);
        assert_eq!(report.components_merged, 1);
        // Hub excluded from the perimeter.
        assert_eq!(merged[0].vertex_count(), 6);
        assert!(merged[0]
            .vertices
            .iter()
            .all(|v| v.coords.norm() > 0.5));
    }

    #[test]
    fn test_reconstruct_polygons_from_mesh() {
        let mut mesh = Mesh::new();
        mesh.vertices.push(crate::Vertex::from_coords(0.0, 0.0, 0.0));
        mesh.vertices.push(crate::Vertex::from_coords(1.0, 0.0, 0.0));
        mesh.vertices.push(crate::Vertex::from_coords(1.0, 1.0, 0.0));
        mesh.vertices.push(crate::Vertex::from_coords(0.0, 1.0, 0.0));
        mesh.faces.push([0, 1, 2]);
        mesh.faces.push([0, 2, 3]);

        let (polygons, report) = reconstruct_polygons(&mesh, &MergePolicy::strict());
        assert_eq!(report.input_faces, 2);
        assert_eq!(polygons.len(), 1);
        assert_eq!(polygons[0].kind, FaceKind::Quad);
    }

    #[test]
    fn test_bounds_gap() {
        let a = (Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 0.0));
        let b = (Point3::new(3.0, 0.0, 0.0), Point3::new(4.0, 1.0, 0.0));
        assert_relative_eq!(bounds_gap(&a, &b), 2.0, epsilon = 1e-12);

        let touching = (Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 1.0, 0.0));
        assert_relative_eq!(bounds_gap(&a, &touching), 0.0, epsilon = 1e-12);
    }
}
