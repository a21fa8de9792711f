//! Perimeter vertex ordering for reconstructed polygon faces.
//!
//! The merger produces an unordered bag of perimeter vertices; rendering
//! and extrusion need them as a clean counterclockwise loop around the
//! face normal. The primary path walks once-used boundary edges into a
//! loop; [`order_perimeter`] is the angular fallback.

use hashbrown::HashMap;
use nalgebra::{Point3, Vector3};
use tracing::trace;

use crate::adjacency::quantize_position;

/// Build an orthonormal in-plane basis `(u, v)` for a plane normal.
///
/// The basis is right-handed with the normal (`u × v = n`), so angles
/// measured as `atan2(d·v, d·u)` increase counterclockwise when viewed
/// from the normal side.
///
/// Returns `None` when the normal is too short to define a plane.
pub fn plane_basis(normal: &Vector3<f64>) -> Option<(Vector3<f64>, Vector3<f64>)> {
    let n = normal.try_normalize(f64::EPSILON)?;

    // Reference axis least aligned with the normal.
    let reference = if n.x.abs() <= n.y.abs() && n.x.abs() <= n.z.abs() {
        Vector3::x()
    } else if n.y.abs() <= n.z.abs() {
        Vector3::y()
    } else {
        Vector3::z()
    };

    let u = n.cross(&reference).try_normalize(f64::EPSILON)?;
    let v = n.cross(&u);
    Some((u, v))
}

/// Order perimeter vertices counterclockwise around the face normal.
///
/// Vertices are projected onto the plane through their centroid and sorted
/// by polar angle. Inputs with four or fewer vertices are returned
/// unchanged: triangles and quads arrive already ordered from the merger
/// and re-sorting them could only disturb a correct winding.
///
/// Angular sorting assumes the outline is star-shaped about its centroid.
/// A strongly concave perimeter whose centroid sees vertices out of walk
/// order will interleave; callers that can walk boundary edges should
/// prefer [`walk_boundary`] and use this as the fallback.
pub fn order_perimeter(vertices: &[Point3<f64>], normal: &Vector3<f64>) -> Vec<Point3<f64>> {
    if vertices.len() <= 4 {
        return vertices.to_vec();
    }

    let (u, v) = match plane_basis(normal) {
        Some(basis) => basis,
        None => {
            trace!("Degenerate normal, leaving perimeter order untouched");
            return vertices.to_vec();
        }
    };

    let n = vertices.len() as f64;
    let sum = vertices
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    let centroid = Point3::from(sum / n);

    let mut keyed: Vec<(f64, Point3<f64>)> = vertices
        .iter()
        .map(|p| {
            let d = p - centroid;
            (d.dot(&v).atan2(d.dot(&u)), *p)
        })
        .collect();

    keyed.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
    keyed.into_iter().map(|(_, p)| p).collect()
}

/// Signed area of a closed loop, positive when wound counterclockwise
/// around `normal`.
pub fn signed_area(points: &[Point3<f64>], normal: &Vector3<f64>) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let n = points.len() as f64;
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    let centroid = Point3::from(sum / n);

    let mut doubled = Vector3::zeros();
    for i in 0..points.len() {
        let a = points[i] - centroid;
        let b = points[(i + 1) % points.len()] - centroid;
        doubled += a.cross(&b);
    }
    doubled.dot(normal) * 0.5
}

/// Reverse a loop in place if it is wound clockwise around `normal`.
///
/// Returns `true` if the loop was reversed.
pub fn orient_ccw(points: &mut [Point3<f64>], normal: &Vector3<f64>) -> bool {
    if signed_area(points, normal) < 0.0 {
        points.reverse();
        return true;
    }
    false
}

/// Walk directed boundary edges into a single closed loop.
///
/// `edges` are the once-used edges of a face component, in face winding
/// direction. The walk chains them start-to-end at the given tolerance.
/// Returns `None` when the edges do not form exactly one closed loop of
/// three or more vertices (holes, dangling edges, or split outlines), in
/// which case the caller should fall back to [`order_perimeter`].
pub fn walk_boundary(
    edges: &[(Point3<f64>, Point3<f64>)],
    tolerance: f64,
) -> Option<Vec<Point3<f64>>> {
    if edges.len() < 3 {
        return None;
    }

    // start cell -> (end cell, start position)
    let mut next: HashMap<(i64, i64, i64), ((i64, i64, i64), Point3<f64>)> =
        HashMap::with_capacity(edges.len());
    for (start, end) in edges {
        let start_key = quantize_position(start, tolerance);
        let end_key = quantize_position(end, tolerance);
        if start_key == end_key {
            return None;
        }
        // Two boundary edges leaving the same vertex means the outline
        // pinches or splits; the walk cannot pick a side.
        if next.insert(start_key, (end_key, *start)).is_some() {
            return None;
        }
    }

    let first_key = quantize_position(&edges[0].0, tolerance);
    let mut loop_points = Vec::with_capacity(edges.len());
    let mut current = first_key;

    loop {
        let (end_key, start_pos) = next.remove(&current)?;
        loop_points.push(start_pos);
        current = end_key;
        if current == first_key {
            break;
        }
    }

    // Leftover edges belong to a second loop (an interior hole).
    if !next.is_empty() || loop_points.len() < 3 {
        return None;
    }

    Some(loop_points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64, z: f64) -> Point3<f64> {
        Point3::new(x, y, z)
    }

    /// Positions match cyclically (same loop, any starting vertex).
    fn cyclic_equal(a: &[Point3<f64>], b: &[Point3<f64>]) -> bool {
        if a.len() != b.len() || a.is_empty() {
            return a.len() == b.len();
        }
        let n = a.len();
        (0..n).any(|shift| {
            (0..n).all(|i| {
                let d = a[i] - b[(i + shift) % n];
                d.norm() < 1e-9
            })
        })
    }

    #[test]
    fn test_plane_basis_is_orthonormal() {
        let normal = Vector3::new(0.3, -0.4, 0.866);
        let (u, v) = plane_basis(&normal).expect("valid normal");

        assert_relative_eq!(u.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(v.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(u.dot(&v), 0.0, epsilon = 1e-12);
        // Right-handed with the normal.
        let n = normal.normalize();
        assert_relative_eq!(u.cross(&v).dot(&n), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_plane_basis_rejects_zero_normal() {
        assert!(plane_basis(&Vector3::zeros()).is_none());
    }

    #[test]
    fn test_quad_passes_through_unchanged() {
        // Deliberately scrambled; at four vertices the orderer must not touch it.
        let scrambled = vec![
            p(0.0, 0.0, 0.0),
            p(1.0, 1.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(0.0, 1.0, 0.0),
        ];
        let ordered = order_perimeter(&scrambled, &Vector3::z());
        assert_eq!(ordered, scrambled);
    }

    #[test]
    fn test_hexagon_ordering() {
        let hexagon: Vec<Point3<f64>> = (0..6)
            .map(|i| {
                let a = std::f64::consts::TAU * i as f64 / 6.0;
                p(a.cos(), a.sin(), 2.0)
            })
            .collect();

        let shuffled = vec![
            hexagon[3], hexagon[0], hexagon[5], hexagon[1], hexagon[4], hexagon[2],
        ];
        let ordered = order_perimeter(&shuffled, &Vector3::z());

        assert!(cyclic_equal(&ordered, &hexagon));
        assert!(signed_area(&ordered, &Vector3::z()) > 0.0);
    }

    #[test]
    fn test_ordering_on_tilted_plane() {
        let normal = Vector3::new(1.0, 1.0, 1.0).normalize();
        let (u, v) = plane_basis(&normal).expect("valid normal");

        let pentagon: Vec<Point3<f64>> = (0..5)
            .map(|i| {
                let a = std::f64::consts::TAU * i as f64 / 5.0;
                Point3::from((u * a.cos() + v * a.sin()).scale(2.0))
            })
            .collect();
        let shuffled = vec![pentagon[2], pentagon[4], pentagon[1], pentagon[3], pentagon[0]];

        let ordered = order_perimeter(&shuffled, &normal);
        assert!(cyclic_equal(&ordered, &pentagon));
    }

    #[test]
    fn test_centroid_coincident_vertex() {
        // One vertex sits exactly on the centroid; atan2(0, 0) is defined
        // and the sort must not panic.
        let mut points: Vec<Point3<f64>> = (0..5)
            .map(|i| {
                let a = std::f64::consts::TAU * i as f64 / 5.0;
                p(a.cos(), a.sin(), 0.0)
            })
            .collect();
        let centroid_sum: Vector3<f64> = points.iter().map(|q| q.coords).sum();
        points.push(Point3::from(centroid_sum / 5.0));

        let ordered = order_perimeter(&points, &Vector3::z());
        assert_eq!(ordered.len(), 6);
    }

    #[test]
    fn test_signed_area_square() {
        let ccw = vec![
            p(0.0, 0.0, 0.0),
            p(2.0, 0.0, 0.0),
            p(2.0, 2.0, 0.0),
            p(0.0, 2.0, 0.0),
        ];
        assert_relative_eq!(signed_area(&ccw, &Vector3::z()), 4.0, epsilon = 1e-12);

        let cw: Vec<_> = ccw.iter().rev().copied().collect();
        assert_relative_eq!(signed_area(&cw, &Vector3::z()), -4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_orient_ccw_reverses_clockwise_loop() {
        let mut cw = vec![
            p(0.0, 0.0, 0.0),
            p(0.0, 1.0, 0.0),
            p(1.0, 1.0, 0.0),
            p(1.0, 0.0, 0.0),
        ];
        assert!(orient_ccw(&mut cw, &Vector3::z()));
        assert!(signed_area(&cw, &Vector3::z()) > 0.0);
        assert!(!orient_ccw(&mut cw, &Vector3::z()));
    }

    #[test]
    fn test_walk_boundary_square() {
        let corners = [
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(1.0, 1.0, 0.0),
            p(0.0, 1.0, 0.0),
        ];
        // Edges given out of order; walk must still chain them.
        let edges = vec![
            (corners[2], corners[3]),
            (corners[0], corners[1]),
            (corners[3], corners[0]),
            (corners[1], corners[2]),
        ];

        let loop_points = walk_boundary(&edges, 1e-6).expect("single closed loop");
        assert_eq!(loop_points.len(), 4);
        assert!(cyclic_equal(&loop_points, &corners));
    }

    #[test]
    fn test_walk_boundary_rejects_open_chain() {
        let edges = vec![
            (p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0)),
            (p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0)),
            (p(1.0, 1.0, 0.0), p(0.0, 1.0, 0.0)),
        ];
        assert!(walk_boundary(&edges, 1e-6).is_none());
    }

    #[test]
    fn test_walk_boundary_rejects_two_loops() {
        // Outer square plus a detached triangle: a hole-bearing outline.
        let mut edges = vec![
            (p(0.0, 0.0, 0.0), p(4.0, 0.0, 0.0)),
            (p(4.0, 0.0, 0.0), p(4.0, 4.0, 0.0)),
            (p(4.0, 4.0, 0.0), p(0.0, 4.0, 0.0)),
            (p(0.0, 4.0, 0.0), p(0.0, 0.0, 0.0)),
        ];
        edges.push((p(1.0, 1.0, 0.0), p(2.0, 1.0, 0.0)));
        edges.push((p(2.0, 1.0, 0.0), p(1.5, 2.0, 0.0)));
        edges.push((p(1.5, 2.0, 0.0), p(1.0, 1.0, 0.0)));

        assert!(walk_boundary(&edges, 1e-6).is_none());
    }
}
