#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure spatial validation of candidate placements.
//!
//! A candidate is checked against the strict placement bounds and against
//! every obstacle's rotated footprint. Nothing here holds state; the same
//! inputs always produce the same [`Validity`].

mod geometry;

pub use geometry::OrientedRect;

use glam::Vec2;
use placement_sandbox_core::{
    BoundaryMode, Bounds, Footprint, InvalidReason, InvalidReasons, ObjectId, Obstacle,
    ObstacleSet, Transform2D, Validity,
};

/// Validates candidate placements against fixed bounds and a boundary rule.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpatialValidator {
    bounds: Bounds,
    boundary: BoundaryMode,
}

impl SpatialValidator {
    /// Creates a validator for the provided placement bounds.
    #[must_use]
    pub const fn new(bounds: Bounds, boundary: BoundaryMode) -> Self {
        Self { bounds, boundary }
    }

    /// Strict placement bounds used by the validator.
    #[must_use]
    pub const fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Rule applied to positions lying on a bounds edge.
    #[must_use]
    pub const fn boundary(&self) -> BoundaryMode {
        self.boundary
    }

    /// Validates a candidate against the bounds and every obstacle.
    #[must_use]
    pub fn validate(
        &self,
        candidate: &Transform2D,
        footprint: &Footprint,
        obstacles: &ObstacleSet,
    ) -> Validity {
        self.validate_excluding(candidate, footprint, obstacles, None)
    }

    /// Validates a placed object's candidate transform, never testing it against itself.
    #[must_use]
    pub fn validate_excluding(
        &self,
        candidate: &Transform2D,
        footprint: &Footprint,
        obstacles: &ObstacleSet,
        excluding: Option<ObjectId>,
    ) -> Validity {
        let mut reasons = InvalidReasons::none();
        if is_out_of_bounds(candidate, &self.bounds, self.boundary) {
            reasons.insert(InvalidReason::OutOfBounds);
        }
        if first_overlap(candidate, footprint, obstacles, excluding).is_some() {
            reasons.insert(InvalidReason::Overlapping);
        }
        Validity::from_reasons(reasons)
    }
}

/// Validates with inclusive edges.
#[must_use]
pub fn validate(
    candidate: &Transform2D,
    footprint: &Footprint,
    bounds: &Bounds,
    obstacles: &ObstacleSet,
) -> Validity {
    SpatialValidator::new(*bounds, BoundaryMode::Inclusive)
        .validate(candidate, footprint, obstacles)
}

/// Reports whether the candidate position falls outside the bounds.
#[must_use]
pub fn is_out_of_bounds(candidate: &Transform2D, bounds: &Bounds, boundary: BoundaryMode) -> bool {
    let x = candidate.position.x;
    let z = candidate.position.z;
    match boundary {
        BoundaryMode::Inclusive => {
            x < bounds.min_x || x > bounds.max_x || z < bounds.min_z || z > bounds.max_z
        }
        BoundaryMode::Exclusive => {
            x <= bounds.min_x || x >= bounds.max_x || z <= bounds.min_z || z >= bounds.max_z
        }
    }
}

/// First obstacle, in set order, whose footprint intersects the candidate's.
#[must_use]
pub fn first_overlap(
    candidate: &Transform2D,
    footprint: &Footprint,
    obstacles: &ObstacleSet,
    excluding: Option<ObjectId>,
) -> Option<ObjectId> {
    let envelope = OrientedRect::from_placement(candidate, footprint);
    obstacles
        .iter()
        .filter(|obstacle| Some(obstacle.id) != excluding)
        .find(|obstacle| envelope.overlaps(&obstacle_rect(obstacle)))
        .map(|obstacle| obstacle.id)
}

/// Reports whether two placed footprints intersect. Symmetric in its arguments.
#[must_use]
pub fn footprints_overlap(
    a: &Transform2D,
    a_footprint: &Footprint,
    b: &Transform2D,
    b_footprint: &Footprint,
) -> bool {
    OrientedRect::from_placement(a, a_footprint)
        .overlaps(&OrientedRect::from_placement(b, b_footprint))
}

/// Reports whether a ground point lies within a placed footprint.
#[must_use]
pub fn footprint_contains(transform: &Transform2D, footprint: &Footprint, x: f32, z: f32) -> bool {
    OrientedRect::from_placement(transform, footprint).contains(Vec2::new(x, z))
}

fn obstacle_rect(obstacle: &Obstacle) -> OrientedRect {
    OrientedRect::from_placement(&obstacle.transform, &obstacle.footprint)
}

/// Bounds with a secondary, wider limit used while a viewport is being dragged.
///
/// While dragging, positions may stray `leeway` past the strict bounds; once
/// released they are expected to settle back inside the strict bounds. This
/// is distinct from placement validation, which only uses strict bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LeewayBounds {
    strict: Bounds,
    leeway: f32,
}

impl LeewayBounds {
    /// Creates leeway bounds. Negative leeway is treated as zero.
    #[must_use]
    pub fn new(strict: Bounds, leeway: f32) -> Self {
        Self {
            strict,
            leeway: leeway.max(0.0),
        }
    }

    /// Bounds a resting position must lie in.
    #[must_use]
    pub const fn strict(&self) -> Bounds {
        self.strict
    }

    /// Margin allowed past the strict bounds while dragging.
    #[must_use]
    pub const fn leeway(&self) -> f32 {
        self.leeway
    }

    /// Bounds widened by the leeway margin.
    #[must_use]
    pub fn widened(&self) -> Bounds {
        self.strict.widened(self.leeway)
    }

    /// Clamps a dragged position into the widened bounds.
    #[must_use]
    pub fn clamp_dragging(&self, x: f32, z: f32) -> (f32, f32) {
        self.widened().clamp(x, z)
    }

    /// Clamps a resting position into the strict bounds.
    #[must_use]
    pub fn clamp_resting(&self, x: f32, z: f32) -> (f32, f32) {
        self.strict.clamp(x, z)
    }
}
