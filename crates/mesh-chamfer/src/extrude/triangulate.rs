//! Cap triangulation by ear clipping.
//!
//! Handles simple, possibly non-convex perimeters. When no valid ear can
//! be found the input is degenerate or self-intersecting; a fan about the
//! first vertex is emitted instead so the extrusion still closes.

use nalgebra::{Point3, Vector3};
use tracing::warn;

/// Triangulate a closed perimeter.
///
/// Returns local indices into `points` plus a flag marking whether the fan
/// fallback was used. Triangles wind the same way as the perimeter.
pub(crate) fn ear_clip(points: &[Point3<f64>], normal: &Vector3<f64>) -> (Vec<[u32; 3]>, bool) {
    let n = points.len();
    let mut triangles = Vec::with_capacity(n.saturating_sub(2));
    if n < 3 {
        return (triangles, false);
    }

    let mut remaining: Vec<u32> = (0..n as u32).collect();
    let mut fallback = false;

    while remaining.len() > 3 {
        let ear = (0..remaining.len()).find(|&i| is_ear(points, &remaining, i, normal));
        match ear {
            Some(i) => {
                let len = remaining.len();
                let prev = remaining[(i + len - 1) % len];
                let curr = remaining[i];
                let next = remaining[(i + 1) % len];
                triangles.push([prev, curr, next]);
                remaining.remove(i);
            }
            None => {
                warn!(
                    "Ear clipping found no valid ear with {} vertices left, using fan triangulation",
                    remaining.len()
                );
                fallback = true;
                break;
            }
        }
    }

    if fallback {
        triangles.clear();
        for i in 1..n - 1 {
            triangles.push([0, i as u32, (i + 1) as u32]);
        }
    } else {
        triangles.push([remaining[0], remaining[1], remaining[2]]);
    }

    (triangles, fallback)
}

/// Whether `remaining[i]` forms a clippable ear: a convex corner whose
/// triangle contains no other remaining vertex.
fn is_ear(points: &[Point3<f64>], remaining: &[u32], i: usize, normal: &Vector3<f64>) -> bool {
    let len = remaining.len();
    let prev = points[remaining[(i + len - 1) % len] as usize];
    let curr = points[remaining[i] as usize];
    let next = points[remaining[(i + 1) % len] as usize];

    let cross = (curr - prev).cross(&(next - curr));
    if cross.dot(normal) <= 1e-12 {
        return false;
    }

    for (j, &idx) in remaining.iter().enumerate() {
        let offset = (i + len - 1) % len;
        if j == i || j == offset || j == (i + 1) % len {
            continue;
        }
        if point_in_triangle(&points[idx as usize], &prev, &curr, &next, normal) {
            return false;
        }
    }

    true
}

/// 2D point-in-triangle test after projecting out the dominant normal axis.
fn point_in_triangle(
    p: &Point3<f64>,
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
    normal: &Vector3<f64>,
) -> bool {
    let (nx, ny, nz) = (normal.x.abs(), normal.y.abs(), normal.z.abs());
    let project = |pt: &Point3<f64>| -> (f64, f64) {
        if nz >= nx && nz >= ny {
            (pt.x, pt.y)
        } else if ny >= nx {
            (pt.x, pt.z)
        } else {
            (pt.y, pt.z)
        }
    };

    let (px, py) = project(p);
    let (ax, ay) = project(a);
    let (bx, by) = project(b);
    let (cx, cy) = project(c);

    let sign = |x0: f64, y0: f64, x1: f64, y1: f64| (px - x1) * (y0 - y1) - (x0 - x1) * (py - y1);
    let d0 = sign(ax, ay, bx, by);
    let d1 = sign(bx, by, cx, cy);
    let d2 = sign(cx, cy, ax, ay);

    let has_neg = d0 < 0.0 || d1 < 0.0 || d2 < 0.0;
    let has_pos = d0 > 0.0 || d1 > 0.0 || d2 > 0.0;
    !(has_neg && has_pos)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn test_square_clips_to_two_triangles() {
        let (tris, fallback) = ear_clip(&square(), &Vector3::z());
        assert_eq!(tris.len(), 2);
        assert!(!fallback);
    }

    #[test]
    fn test_triangle_passes_through() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let (tris, fallback) = ear_clip(&points, &Vector3::z());
        assert_eq!(tris, vec![[0, 1, 2]]);
        assert!(!fallback);
    }

    #[test]
    fn test_concave_polygon_clips_fully() {
        // L-shape: six vertices, one reflex corner.
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(1.0, 2.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
        ];
        let (tris, fallback) = ear_clip(&points, &Vector3::z());
        assert_eq!(tris.len(), 4);
        assert!(!fallback);

        // Triangulated area equals the L-shape's area of 3.
        let area: f64 = tris
            .iter()
            .map(|&[a, b, c]| {
                let (pa, pb, pc) = (
                    points[a as usize],
                    points[b as usize],
                    points[c as usize],
                );
                (pb - pa).cross(&(pc - pa)).norm() / 2.0
            })
            .sum();
        assert!((area - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_collinear_input_falls_back() {
        // All points collinear: no convex corner exists.
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(3.0, 0.0, 0.0),
        ];
        let (tris, fallback) = ear_clip(&points, &Vector3::z());
        assert!(fallback);
        assert_eq!(tris.len(), 2);
    }

    #[test]
    fn test_triangles_wind_with_perimeter() {
        let (tris, _) = ear_clip(&square(), &Vector3::z());
        let points = square();
        for &[a, b, c] in &tris {
            let cross = (points[b as usize] - points[a as usize])
                .cross(&(points[c as usize] - points[a as usize]));
            assert!(cross.z > 0.0);
        }
    }
}
