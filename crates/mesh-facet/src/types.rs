//! Core mesh and polygon data types.

use nalgebra::{Point3, Vector3};

/// Vertices closer than this are considered the same point.
///
/// Positional identity is the only vertex identity in this crate: two
/// vertices are "the same" iff every coordinate matches within this
/// tolerance.
pub const DISTANCE_TOLERANCE: f64 = 1e-6;

/// Default tolerance for edge-endpoint matching when building adjacency.
pub const EDGE_TOLERANCE: f64 = 1e-3;

/// Triangles with area below this are degenerate and dropped by cleanup.
pub const MIN_TRIANGLE_AREA: f64 = 1e-9;

/// A vertex in the mesh.
///
/// Coordinates are typically in millimeters but the library is unit-agnostic.
/// There are deliberately no per-vertex normals: this engine preserves
/// faceted shading, so normals live on faces ([`PolygonFace::normal`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// 3D position.
    pub position: Point3<f64>,
}

impl Vertex {
    /// Create a new vertex at the given position.
    #[inline]
    pub fn new(position: Point3<f64>) -> Self {
        Self { position }
    }

    /// Create a vertex from raw coordinates.
    #[inline]
    pub fn from_coords(x: f64, y: f64, z: f64) -> Self {
        Self::new(Point3::new(x, y, z))
    }
}

/// A triangle mesh with indexed vertices and faces.
#[derive(Debug, Clone)]
pub struct Mesh {
    /// Vertex data.
    pub vertices: Vec<Vertex>,

    /// Triangle faces as indices into the vertex array.
    /// Each face is [v0, v1, v2] with counter-clockwise winding.
    pub faces: Vec<[u32; 3]>,

    /// Optional polygon metadata produced by the coplanar merger.
    ///
    /// Polygon faces store positions rather than vertex indices, so index
    /// remapping (welding, decimation) leaves them structurally valid;
    /// callers must still re-derive them when the underlying geometry has
    /// changed enough to matter (see [`crate::decimate`]).
    pub polygons: Option<Vec<PolygonFace>>,
}

impl Mesh {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
            polygons: None,
        }
    }

    /// Create a mesh with pre-allocated capacity.
    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
            polygons: None,
        }
    }

    /// Number of vertices in the mesh.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of faces (triangles) in the mesh.
    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if mesh is empty (no vertices or faces).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Compute the axis-aligned bounding box.
    /// Returns (min_corner, max_corner) or None if mesh has no vertices.
    pub fn bounds(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        if self.vertices.is_empty() {
            return None;
        }

        let mut min = self.vertices[0].position;
        let mut max = self.vertices[0].position;

        for vertex in &self.vertices[1..] {
            let p = &vertex.position;
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }

        Some((min, max))
    }

    /// Iterate over triangles, yielding Triangle structs with actual vertex data.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.faces.iter().map(|&[i0, i1, i2]| Triangle {
            v0: self.vertices[i0 as usize].position,
            v1: self.vertices[i1 as usize].position,
            v2: self.vertices[i2 as usize].position,
        })
    }

    /// Get a specific triangle by face index.
    pub fn triangle(&self, face_idx: usize) -> Option<Triangle> {
        self.faces.get(face_idx).map(|&[i0, i1, i2]| Triangle {
            v0: self.vertices[i0 as usize].position,
            v1: self.vertices[i1 as usize].position,
            v2: self.vertices[i2 as usize].position,
        })
    }

    /// Translate mesh by the given vector.
    pub fn translate(&mut self, offset: Vector3<f64>) {
        for vertex in &mut self.vertices {
            vertex.position += offset;
        }
        if let Some(polygons) = self.polygons.take() {
            self.polygons = Some(polygons.iter().map(|p| p.translated(offset)).collect());
        }
    }

    /// Scale mesh uniformly around the origin.
    pub fn scale(&mut self, factor: f64) {
        for vertex in &mut self.vertices {
            vertex.position.coords *= factor;
        }
        if let Some(polygons) = self.polygons.take() {
            self.polygons = Some(polygons.iter().map(|p| p.scaled(factor)).collect());
        }
    }

    /// Compute the total surface area of the mesh.
    ///
    /// Sums the area of all triangles in the mesh.
    pub fn surface_area(&self) -> f64 {
        self.triangles().map(|tri| tri.area()).sum()
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

/// A triangle with concrete vertex positions.
///
/// Utility type for geometric calculations. Winding is counter-clockwise
/// when viewed from the front (normal points toward viewer).
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    pub v0: Point3<f64>,
    pub v1: Point3<f64>,
    pub v2: Point3<f64>,
}

impl Triangle {
    /// Create a new triangle from three points.
    #[inline]
    pub fn new(v0: Point3<f64>, v1: Point3<f64>, v2: Point3<f64>) -> Self {
        Self { v0, v1, v2 }
    }

    /// Compute the (unnormalized) face normal via cross product.
    /// The direction follows the right-hand rule with CCW winding.
    #[inline]
    pub fn normal_unnormalized(&self) -> Vector3<f64> {
        let e1 = self.v1 - self.v0;
        let e2 = self.v2 - self.v0;
        e1.cross(&e2)
    }

    /// Compute the unit face normal.
    /// Returns None for degenerate triangles (zero area).
    pub fn normal(&self) -> Option<Vector3<f64>> {
        let n = self.normal_unnormalized();
        let len_sq = n.norm_squared();
        if len_sq > f64::EPSILON {
            Some(n / len_sq.sqrt())
        } else {
            None
        }
    }

    /// Compute the area of the triangle.
    #[inline]
    pub fn area(&self) -> f64 {
        self.normal_unnormalized().norm() * 0.5
    }

    /// Compute the centroid (center of mass).
    #[inline]
    pub fn centroid(&self) -> Point3<f64> {
        Point3::new(
            (self.v0.x + self.v1.x + self.v2.x) / 3.0,
            (self.v0.y + self.v1.y + self.v2.y) / 3.0,
            (self.v0.z + self.v1.z + self.v2.z) / 3.0,
        )
    }

    /// Get the three edges as (start, end) pairs.
    pub fn edges(&self) -> [(Point3<f64>, Point3<f64>); 3] {
        [(self.v0, self.v1), (self.v1, self.v2), (self.v2, self.v0)]
    }

    /// Check if the triangle is degenerate (zero or near-zero area).
    pub fn is_degenerate(&self, epsilon: f64) -> bool {
        self.area() < epsilon
    }
}

/// Classification of a polygon face by perimeter vertex count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "pipeline-config", derive(serde::Serialize, serde::Deserialize))]
pub enum FaceKind {
    /// Exactly 3 perimeter vertices.
    Triangle,
    /// Exactly 4 perimeter vertices.
    Quad,
    /// 5 or more perimeter vertices.
    Polygon,
}

impl FaceKind {
    /// Classify a perimeter by vertex count.
    pub fn from_vertex_count(count: usize) -> Self {
        match count {
            3 => FaceKind::Triangle,
            4 => FaceKind::Quad,
            _ => FaceKind::Polygon,
        }
    }
}

/// A planar polygon face reconstructed from one or more source triangles.
///
/// Perimeter vertices are coplanar within the merge tolerances and ordered
/// counter-clockwise when viewed along the outward `normal`. Faces are never
/// mutated in place: transformations return new values.
#[derive(Debug, Clone)]
pub struct PolygonFace {
    /// Ordered perimeter vertices (3+).
    pub vertices: Vec<Point3<f64>>,

    /// Unit outward normal.
    pub normal: Vector3<f64>,

    /// Classification derived from the perimeter vertex count.
    pub kind: FaceKind,

    /// Indices of the triangles this face was merged from, in the face
    /// buffer the merger was fed. A face built directly from one triangle
    /// carries that single index.
    pub source_triangles: Vec<u32>,
}

impl PolygonFace {
    /// Create a polygon face from an ordered perimeter.
    ///
    /// The caller guarantees ordering and coplanarity; `kind` is derived
    /// from the vertex count.
    pub fn new(
        vertices: Vec<Point3<f64>>,
        normal: Vector3<f64>,
        source_triangles: Vec<u32>,
    ) -> Self {
        let kind = FaceKind::from_vertex_count(vertices.len());
        Self {
            vertices,
            normal,
            kind,
            source_triangles,
        }
    }

    /// Create a triangular face from a positional triangle.
    ///
    /// Returns None when the triangle is degenerate (no unit normal).
    pub fn from_triangle(tri: &Triangle, source_index: u32) -> Option<Self> {
        let normal = tri.normal()?;
        Some(Self {
            vertices: vec![tri.v0, tri.v1, tri.v2],
            normal,
            kind: FaceKind::Triangle,
            source_triangles: vec![source_index],
        })
    }

    /// Number of perimeter vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Perimeter edges as (start, end) pairs, wrapping around to the start.
    pub fn edges(&self) -> impl Iterator<Item = (Point3<f64>, Point3<f64>)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// Compute the perimeter centroid.
    pub fn centroid(&self) -> Point3<f64> {
        let n = self.vertices.len().max(1) as f64;
        let sum = self
            .vertices
            .iter()
            .fold(Vector3::zeros(), |acc, p| acc + p.coords);
        Point3::from(sum / n)
    }

    /// Compute the polygon area by fan decomposition about the centroid.
    ///
    /// Exact for simple polygons with a correct perimeter ordering.
    pub fn area(&self) -> f64 {
        if self.vertices.len() < 3 {
            return 0.0;
        }
        let c = self.centroid();
        let n = self.vertices.len();
        let mut doubled = Vector3::zeros();
        for i in 0..n {
            let a = self.vertices[i] - c;
            let b = self.vertices[(i + 1) % n] - c;
            doubled += a.cross(&b);
        }
        doubled.dot(&self.normal).abs() * 0.5
    }

    /// Perpendicular distance from a point to this face's plane.
    pub fn plane_distance(&self, point: &Point3<f64>) -> f64 {
        match self.vertices.first() {
            Some(origin) => (point - origin).dot(&self.normal).abs(),
            None => 0.0,
        }
    }

    /// Return a translated copy of this face.
    pub fn translated(&self, offset: Vector3<f64>) -> Self {
        Self {
            vertices: self.vertices.iter().map(|p| p + offset).collect(),
            normal: self.normal,
            kind: self.kind,
            source_triangles: self.source_triangles.clone(),
        }
    }

    /// Return a copy of this face scaled uniformly around the origin.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            vertices: self
                .vertices
                .iter()
                .map(|p| Point3::from(p.coords * factor))
                .collect(),
            normal: self.normal,
            kind: self.kind,
            source_triangles: self.source_triangles.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-10
    }

    #[test]
    fn test_vertex_creation() {
        let v = Vertex::from_coords(1.0, 2.0, 3.0);
        assert!(approx_eq(v.position.x, 1.0));
        assert!(approx_eq(v.position.y, 2.0));
        assert!(approx_eq(v.position.z, 3.0));
    }

    #[test]
    fn test_triangle_normal() {
        let tri = Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        );

        let normal = tri.normal().expect("non-degenerate triangle");
        assert!(approx_eq(normal.x, 0.0));
        assert!(approx_eq(normal.y, 0.0));
        assert!(approx_eq(normal.z, 1.0));
    }

    #[test]
    fn test_triangle_area() {
        let tri = Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
        );
        assert!(approx_eq(tri.area(), 2.0));
    }

    #[test]
    fn test_degenerate_triangle_has_no_normal() {
        let tri = Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        );
        assert!(tri.normal().is_none());
        assert!(tri.is_degenerate(1e-9));
    }

    #[test]
    fn test_mesh_bounds() {
        let mut mesh = Mesh::new();
        mesh.vertices.push(Vertex::from_coords(-1.0, 0.0, 2.0));
        mesh.vertices.push(Vertex::from_coords(3.0, -4.0, 1.0));

        let (min, max) = mesh.bounds().expect("non-empty mesh");
        assert!(approx_eq(min.x, -1.0));
        assert!(approx_eq(min.y, -4.0));
        assert!(approx_eq(max.x, 3.0));
        assert!(approx_eq(max.z, 2.0));
    }

    #[test]
    fn test_face_kind_classification() {
        assert_eq!(FaceKind::from_vertex_count(3), FaceKind::Triangle);
        assert_eq!(FaceKind::from_vertex_count(4), FaceKind::Quad);
        assert_eq!(FaceKind::from_vertex_count(7), FaceKind::Polygon);
    }

    #[test]
    fn test_polygon_face_area_unit_square() {
        let face = PolygonFace::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            Vector3::new(0.0, 0.0, 1.0),
            vec![0, 1],
        );

        assert_eq!(face.kind, FaceKind::Quad);
        assert!(approx_eq(face.area(), 1.0));
        let c = face.centroid();
        assert!(approx_eq(c.x, 0.5));
        assert!(approx_eq(c.y, 0.5));
    }

    #[test]
    fn test_polygon_face_edges_wrap() {
        let face = PolygonFace::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            Vector3::new(0.0, 0.0, 1.0),
            vec![0],
        );

        let edges: Vec<_> = face.edges().collect();
        assert_eq!(edges.len(), 3);
        // Last edge closes the loop back to the first vertex.
        assert!(approx_eq(edges[2].1.x, 0.0));
        assert!(approx_eq(edges[2].1.y, 0.0));
    }

    #[test]
    fn test_translated_leaves_original_untouched() {
        let face = PolygonFace::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            Vector3::new(0.0, 0.0, 1.0),
            vec![0],
        );

        let moved = face.translated(Vector3::new(0.0, 0.0, 5.0));
        assert!(approx_eq(face.vertices[0].z, 0.0));
        assert!(approx_eq(moved.vertices[0].z, 5.0));
        assert_eq!(moved.source_triangles, face.source_triangles);
    }

    #[test]
    fn test_plane_distance() {
        let face = PolygonFace::new(
            vec![
                Point3::new(0.0, 0.0, 1.0),
                Point3::new(1.0, 0.0, 1.0),
                Point3::new(0.0, 1.0, 1.0),
            ],
            Vector3::new(0.0, 0.0, 1.0),
            vec![0],
        );

        assert!(approx_eq(face.plane_distance(&Point3::new(5.0, 5.0, 1.0)), 0.0));
        assert!(approx_eq(face.plane_distance(&Point3::new(0.0, 0.0, 3.0)), 2.0));
    }
}
