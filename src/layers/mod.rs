//! Layers for the map view that can handle input, and draw on top of the map view different kinds of data.
//!
use egui::{Painter, Pos2, Response};
use std::any::Any;

use crate::projection::MapProjection;

/// Conversion of GeoJSON geometries into drawable shapes.
pub mod geojson;

/// Zoning layer
pub mod zoning;

/// A trait for map layers.
pub trait Layer: Any {
    /// Handles user input for the layer. Returns `true` if the input was handled and should not be
    /// processed further by the map.
    fn handle_input(&mut self, response: &Response, projection: &MapProjection) -> bool;

    /// Draws the layer.
    fn draw(&self, painter: &Painter, projection: &MapProjection);

    /// Gets the layer as a `dyn Any`.
    fn as_any(&self) -> &dyn Any;

    /// Gets the layer as a mutable `dyn Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Calculates the squared distance from a point to a line segment.
pub(crate) fn dist_sq_to_segment(p: Pos2, a: Pos2, b: Pos2) -> f32 {
    let ab = b - a;
    let ap = p - a;
    let l2 = ab.length_sq();

    if l2 == 0.0 {
        // The segment is a point.
        return ap.length_sq();
    }

    // Project point p onto the line defined by a and b.
    // `t` is the normalized distance from a to the projection.
    let t = (ap.dot(ab) / l2).clamp(0.0, 1.0);

    // The closest point on the line segment.
    let closest_point = a + t * ab;

    p.distance_sq(closest_point)
}

/// Checks whether `p` is inside a polygon made of `rings`, using the even-odd rule.
///
/// Rings are implicitly closed. Holes are simply further rings, so a point inside a hole is
/// outside the polygon.
pub(crate) fn point_in_rings(p: Pos2, rings: &[Vec<Pos2>]) -> bool {
    let mut inside = false;
    for ring in rings {
        let n = ring.len();
        if n < 3 {
            continue;
        }
        let mut j = n - 1;
        for i in 0..n {
            let (a, b) = (ring[i], ring[j]);
            if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x
            {
                inside = !inside;
            }
            j = i;
        }
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    const EPSILON: f32 = 1e-6;

    #[test]
    fn test_dist_sq_to_segment() {
        let a = pos2(0.0, 0.0);
        let b = pos2(10.0, 0.0);

        // Point on the segment
        let p1 = pos2(5.0, 0.0);
        assert!((dist_sq_to_segment(p1, a, b) - 0.0).abs() < EPSILON);

        // Point off the segment, projection is on the segment
        let p2 = pos2(5.0, 5.0);
        assert!((dist_sq_to_segment(p2, a, b) - 25.0).abs() < EPSILON);

        // Point off the segment, projection is before 'a'
        let p3 = pos2(-5.0, 5.0);
        assert!((dist_sq_to_segment(p3, a, b) - 50.0).abs() < EPSILON);

        // Point off the segment, projection is after 'b'
        let p4 = pos2(15.0, 5.0);
        assert!((dist_sq_to_segment(p4, a, b) - 50.0).abs() < EPSILON);

        // Zero-length segment
        let c = pos2(5.0, 5.0);
        let p5 = pos2(10.0, 10.0);
        assert!((dist_sq_to_segment(p5, c, c) - 50.0).abs() < EPSILON);
    }

    #[test]
    fn test_point_in_rings() {
        let outer = vec![
            pos2(0.0, 0.0),
            pos2(10.0, 0.0),
            pos2(10.0, 10.0),
            pos2(0.0, 10.0),
        ];
        let hole = vec![
            pos2(4.0, 4.0),
            pos2(6.0, 4.0),
            pos2(6.0, 6.0),
            pos2(4.0, 6.0),
        ];

        assert!(point_in_rings(pos2(2.0, 2.0), &[outer.clone()]));
        assert!(!point_in_rings(pos2(12.0, 2.0), &[outer.clone()]));
        assert!(!point_in_rings(pos2(-1.0, 5.0), &[outer.clone()]));

        let with_hole = [outer, hole];
        assert!(point_in_rings(pos2(2.0, 2.0), &with_hole));
        assert!(!point_in_rings(pos2(5.0, 5.0), &with_hole), "Inside the hole");
    }

    #[test]
    fn test_point_in_degenerate_ring() {
        let line = vec![pos2(0.0, 0.0), pos2(10.0, 10.0)];
        assert!(!point_in_rings(pos2(5.0, 5.0), &[line]));
        assert!(!point_in_rings(pos2(5.0, 5.0), &[]));
    }
}
