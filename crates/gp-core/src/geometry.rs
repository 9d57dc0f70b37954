//! Ground-plane polygon geometry
//!
//! All shapes live on the XZ plane with Y pointing up. Functions in this
//! module project points to `(x, z)` for 2D work and lift results back to
//! 3D at the height of the vertex they came from.

use glam::{Vec2, Vec3};

use crate::constants::GEOMETRY_EPSILON;

/// Project a point onto the ground plane as 2D `(x, z)`
pub fn to_ground(p: Vec3) -> Vec2 {
    Vec2::new(p.x, p.z)
}

/// Lift a ground-plane point back to 3D at the given height
pub fn from_ground(p: Vec2, y: f32) -> Vec3 {
    Vec3::new(p.x, y, p.y)
}

/// Arithmetic mean of the points, or the origin for an empty slice
pub fn centroid(points: &[Vec3]) -> Vec3 {
    if points.is_empty() {
        return Vec3::ZERO;
    }
    points.iter().copied().sum::<Vec3>() / points.len() as f32
}

/// Signed shoelace area on the ground plane
///
/// The sign depends on the winding order of the input. Use
/// [`polygon_area`] when only the magnitude matters.
pub fn signed_area(points: &[Vec3]) -> f32 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for (i, a) in points.iter().enumerate() {
        let b = points[(i + 1) % points.len()];
        sum += a.x * b.z - b.x * a.z;
    }
    sum / 2.0
}

/// Enclosed area of a polygon, independent of winding direction
pub fn polygon_area(points: &[Vec3]) -> f32 {
    signed_area(points).abs()
}

/// Midpoint of a segment
pub fn segment_midpoint(a: Vec3, b: Vec3) -> Vec3 {
    (a + b) * 0.5
}

/// Unit vector on the ground plane pointing to `angle` radians from +Z
pub fn north_vector(angle: f32) -> Vec3 {
    Vec3::new(angle.sin(), 0.0, angle.cos())
}

/// Unsigned angle between two directions, in degrees
///
/// Returns 0 if either direction is degenerate.
pub fn angle_between(a: Vec3, b: Vec3) -> f32 {
    if a.length_squared() < GEOMETRY_EPSILON || b.length_squared() < GEOMETRY_EPSILON {
        return 0.0;
    }
    a.angle_between(b).to_degrees()
}

/// Grow or shrink a closed polygon outline by `distance`
///
/// A positive distance always grows the enclosed area and a negative one
/// always shrinks it, whatever the winding of `points`. Convex corners on
/// the growing side are rounded with `arc_segments` segments (at least one,
/// which bevels the corner). Degenerate input (fewer than three distinct
/// points) is returned unchanged.
pub fn offset_polygon(points: &[Vec3], distance: f32, arc_segments: u32) -> Vec<Vec3> {
    let ring = distinct_ring(points);
    if ring.len() < 3 || distance == 0.0 {
        return points.to_vec();
    }

    let original = polygon_area(&ring);
    let offset = offset_ring(&ring, distance, arc_segments);
    let area = polygon_area(&offset);

    // The left-normal offset only grows counter-clockwise input
    let wrong_way = (distance > 0.0 && area < original) || (distance < 0.0 && area > original);
    if wrong_way {
        tracing::trace!("offset_polygon: flipping offset sign for winding");
        offset_ring(&ring, -distance, arc_segments)
    } else {
        offset
    }
}

/// Drop consecutive duplicates, including a closing copy of the first point
fn distinct_ring(points: &[Vec3]) -> Vec<Vec3> {
    let mut ring: Vec<Vec3> = Vec::with_capacity(points.len());
    for &p in points {
        if ring
            .last()
            .is_none_or(|last| to_ground(*last).distance(to_ground(p)) > GEOMETRY_EPSILON)
        {
            ring.push(p);
        }
    }
    while ring.len() > 1
        && to_ground(ring[0]).distance(to_ground(ring[ring.len() - 1])) <= GEOMETRY_EPSILON
    {
        ring.pop();
    }
    ring
}

fn cross(a: Vec2, b: Vec2) -> f32 {
    a.x * b.y - a.y * b.x
}

fn left_normal(v: Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}

/// Offset every edge along its left normal and join the corners
fn offset_ring(ring: &[Vec3], distance: f32, arc_segments: u32) -> Vec<Vec3> {
    let n = ring.len();
    let segments = arc_segments.max(1);
    let mut out = Vec::with_capacity(n * (segments as usize + 1));

    for i in 0..n {
        let prev = to_ground(ring[(i + n - 1) % n]);
        let curr = to_ground(ring[i]);
        let next = to_ground(ring[(i + 1) % n]);
        let y = ring[i].y;

        let d1 = (curr - prev).normalize_or_zero();
        let d2 = (next - curr).normalize_or_zero();
        let a = curr + left_normal(d1) * distance;
        let b = curr + left_normal(d2) * distance;
        let turn = cross(d1, d2);

        if turn.abs() < GEOMETRY_EPSILON {
            out.push(from_ground(a, y));
            if d1.dot(d2) < 0.0 {
                // Edge folds back on itself
                out.push(from_ground(b, y));
            }
        } else if turn * distance < 0.0 {
            // Offset edges separate at this corner: round it around `curr`
            let start = (a - curr).to_angle();
            let mut sweep = (b - curr).to_angle() - start;
            while sweep > std::f32::consts::PI {
                sweep -= std::f32::consts::TAU;
            }
            while sweep < -std::f32::consts::PI {
                sweep += std::f32::consts::TAU;
            }
            let radius = distance.abs();
            for k in 0..=segments {
                let angle = start + sweep * k as f32 / segments as f32;
                out.push(from_ground(curr + Vec2::from_angle(angle) * radius, y));
            }
        } else {
            // Offset edges overlap: join them at their intersection
            let t = cross(b - a, d2) / turn;
            out.push(from_ground(a + d1 * t, y));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square_ccw() -> Vec<Vec3> {
        vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(0.0, 0.0, 1.0),
        ]
    }

    #[test]
    fn test_centroid_mean() {
        let c = centroid(&square_ccw());
        assert_relative_eq!(c.x, 0.5);
        assert_relative_eq!(c.y, 0.0);
        assert_relative_eq!(c.z, 0.5);
        assert_eq!(centroid(&[]), Vec3::ZERO);
    }

    #[test]
    fn test_unit_square_area_either_winding() {
        let square = square_ccw();
        let mut reversed = square.clone();
        reversed.reverse();

        assert_relative_eq!(polygon_area(&square), 1.0);
        assert_relative_eq!(polygon_area(&reversed), 1.0);
        assert_relative_eq!(signed_area(&square), -signed_area(&reversed));
    }

    #[test]
    fn test_area_of_degenerate_input() {
        assert_eq!(polygon_area(&[]), 0.0);
        assert_eq!(polygon_area(&[Vec3::ZERO, Vec3::X]), 0.0);
    }

    #[test]
    fn test_offset_grows_both_windings() {
        let square = square_ccw();
        let mut reversed = square.clone();
        reversed.reverse();

        for points in [&square, &reversed] {
            let border = offset_polygon(points, 0.1, 1);
            assert!(
                polygon_area(&border) > polygon_area(points),
                "positive offset should grow the polygon, got {}",
                polygon_area(&border)
            );
        }

        // Beveled corners: (1 + 2d)^2 minus four corner triangles of d^2 / 2
        let border = offset_polygon(&reversed, 0.1, 1);
        assert_relative_eq!(polygon_area(&border), 1.42, epsilon = 1e-4);
    }

    #[test]
    fn test_offset_shrinks_both_windings() {
        let square = square_ccw();
        let mut reversed = square.clone();
        reversed.reverse();

        for points in [&square, &reversed] {
            let inner = offset_polygon(points, -0.1, 1);
            assert_relative_eq!(polygon_area(&inner), 0.64, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_offset_arc_segments_round_corners() {
        let square = square_ccw();
        let beveled = offset_polygon(&square, 0.1, 1);
        let rounded = offset_polygon(&square, 0.1, 8);

        assert_eq!(beveled.len(), 8);
        assert_eq!(rounded.len(), 4 * 9);
        // More segments approach the exact rounded area 1 + 4d + pi d^2
        let exact = 1.0 + 0.4 + std::f32::consts::PI * 0.01;
        assert!(polygon_area(&rounded) > polygon_area(&beveled));
        assert!(polygon_area(&rounded) < exact);
    }

    #[test]
    fn test_offset_keeps_vertex_height() {
        let raised: Vec<Vec3> = square_ccw()
            .into_iter()
            .map(|p| p + Vec3::Y * 0.5)
            .collect();
        let border = offset_polygon(&raised, 0.2, 2);
        assert!(border.iter().all(|p| (p.y - 0.5).abs() < 1e-6));
    }

    #[test]
    fn test_offset_ignores_closing_duplicate() {
        let mut closed = square_ccw();
        closed.push(closed[0]);
        let a = offset_polygon(&closed, 0.1, 1);
        let b = offset_polygon(&square_ccw(), 0.1, 1);
        assert_eq!(a.len(), b.len());
        assert_relative_eq!(polygon_area(&a), polygon_area(&b), epsilon = 1e-5);
    }

    #[test]
    fn test_offset_degenerate_passthrough() {
        let line = vec![Vec3::ZERO, Vec3::X];
        assert_eq!(offset_polygon(&line, 0.1, 1), line);
    }

    #[test]
    fn test_angle_helpers() {
        assert_relative_eq!(angle_between(Vec3::X, Vec3::Z), 90.0, epsilon = 1e-4);
        assert_relative_eq!(angle_between(Vec3::X, Vec3::ZERO), 0.0);

        let north = north_vector(0.0);
        assert_relative_eq!(north.z, 1.0);
        let east = north_vector(std::f32::consts::FRAC_PI_2);
        assert_relative_eq!(east.x, 1.0, epsilon = 1e-6);
    }
}
