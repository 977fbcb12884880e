//! Oriented rectangle geometry on the x/z placement plane.
//!
//! Overlap uses the Separating Axis Theorem. Rectangles that only share an
//! edge or a corner do not overlap.

use glam::Vec2;
use placement_sandbox_core::{Footprint, Transform2D};

/// Rectangle on the x/z plane rotated by a yaw angle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrientedRect {
    center: Vec2,
    half_extents: Vec2,
    axis_x: Vec2,
    axis_z: Vec2,
}

const CORNER_SIGNS: [(f32, f32); 4] = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];

impl OrientedRect {
    /// Creates a rectangle from its centre, half extents and yaw in degrees.
    #[must_use]
    pub fn new(center: Vec2, half_extents: Vec2, yaw_degrees: f32) -> Self {
        let (sin, cos) = yaw_degrees.to_radians().sin_cos();
        Self {
            center,
            half_extents,
            axis_x: Vec2::new(cos, sin),
            axis_z: Vec2::new(-sin, cos),
        }
    }

    /// World-space envelope of a footprint placed at `transform`.
    ///
    /// The footprint's local offset rotates together with the object.
    #[must_use]
    pub fn from_placement(transform: &Transform2D, footprint: &Footprint) -> Self {
        let origin = Vec2::new(transform.position.x, transform.position.z);
        let mut rect = Self::new(
            origin,
            Vec2::new(footprint.half_x, footprint.half_z),
            transform.yaw_degrees,
        );
        rect.center += rect.axis_x * footprint.offset_x + rect.axis_z * footprint.offset_z;
        rect
    }

    /// Centre of the rectangle.
    #[must_use]
    pub const fn center(&self) -> Vec2 {
        self.center
    }

    /// Corner points in winding order.
    #[must_use]
    pub fn corners(&self) -> [Vec2; 4] {
        CORNER_SIGNS.map(|(sx, sz)| {
            self.center
                + self.axis_x * (sx * self.half_extents.x)
                + self.axis_z * (sz * self.half_extents.y)
        })
    }

    /// True if the interiors of the two rectangles intersect.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        let own = self.corners();
        let theirs = other.corners();
        // Opposite edges are parallel, so two axes per rectangle suffice.
        for axis in [self.axis_x, self.axis_z, other.axis_x, other.axis_z] {
            let (min_a, max_a) = project(&own, axis);
            let (min_b, max_b) = project(&theirs, axis);
            if max_a <= min_b || max_b <= min_a {
                return false;
            }
        }
        true
    }

    /// True if the point lies inside or on the edge of the rectangle.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        let offset = point - self.center;
        offset.dot(self.axis_x).abs() <= self.half_extents.x
            && offset.dot(self.axis_z).abs() <= self.half_extents.y
    }
}

fn project(corners: &[Vec2; 4], axis: Vec2) -> (f32, f32) {
    corners
        .iter()
        .map(|corner| corner.dot(axis))
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), dot| {
            (lo.min(dot), hi.max(dot))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x: f32, z: f32, yaw: f32) -> OrientedRect {
        OrientedRect::new(Vec2::new(x, z), Vec2::new(2.5, 1.25), yaw)
    }

    #[test]
    fn separated_no_overlap() {
        assert!(!rect(0.0, 0.0, 0.0).overlaps(&rect(10.0, 0.0, 0.0)));
    }

    #[test]
    fn overlapping() {
        assert!(rect(0.0, 0.0, 0.0).overlaps(&rect(3.0, 0.0, 0.0)));
    }

    #[test]
    fn touching_edge_no_overlap() {
        assert!(!rect(0.0, 0.0, 0.0).overlaps(&rect(5.0, 0.0, 0.0)));
    }

    #[test]
    fn touching_corner_no_overlap() {
        assert!(!rect(0.0, 0.0, 0.0).overlaps(&rect(5.0, 2.5, 0.0)));
    }

    #[test]
    fn rotated_same_center_overlap() {
        assert!(rect(0.0, 0.0, 0.0).overlaps(&rect(0.0, 0.0, 45.0)));
    }

    #[test]
    fn rotation_closes_gap_that_axis_aligned_boxes_leave() {
        // Plank centred at x = 1: unrotated it reaches x = 3.5, rotated 90
        // degrees only x = 2.25, short of the neighbour starting at x = 3.
        let neighbour = OrientedRect::new(Vec2::new(5.0, 0.0), Vec2::new(2.0, 2.0), 0.0);
        assert!(!rect(0.0, 0.0, 0.0).overlaps(&neighbour));
        let moved = rect(1.0, 0.0, 0.0);
        assert!(moved.overlaps(&neighbour));
        assert!(!rect(1.0, 0.0, 90.0).overlaps(&neighbour));
    }

    #[test]
    fn diamond_corner_gap_is_not_overlap() {
        // A 45 degree square whose bounding box overlaps but whose diamond does not.
        let square = OrientedRect::new(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0), 0.0);
        let diamond = OrientedRect::new(Vec2::new(2.3, 2.3), Vec2::new(1.0, 1.0), 45.0);
        assert!(!square.overlaps(&diamond));
    }

    #[test]
    fn offset_rotates_with_yaw() {
        let footprint = Footprint::new(0.5, 0.5).with_offset(2.0, 0.0);
        let rect = OrientedRect::from_placement(&Transform2D::new(1.0, 0.0, 1.0, 90.0), &footprint);
        assert!((rect.center().x - 1.0).abs() < 1e-5);
        assert!((rect.center().y - 3.0).abs() < 1e-5);
    }

    #[test]
    fn contains_includes_edges() {
        let rect = rect(0.0, 0.0, 0.0);
        assert!(rect.contains(Vec2::new(2.5, 0.0)));
        assert!(rect.contains(Vec2::new(-1.0, 1.0)));
        assert!(!rect.contains(Vec2::new(0.0, 1.5)));
    }
}
