use placement_sandbox_core::{
    BoundaryMode, Bounds, Footprint, InvalidReason, ObjectId, Obstacle, ObstacleSet, Transform2D,
    Validity,
};
use placement_sandbox_system_validation::{
    first_overlap, footprint_contains, footprints_overlap, validate, LeewayBounds,
    SpatialValidator,
};

fn unit_crate() -> Footprint {
    Footprint::new(0.5, 0.5)
}

fn obstacle(id: u32, x: f32, z: f32, yaw: f32) -> Obstacle {
    Obstacle {
        id: ObjectId::new(id),
        transform: Transform2D::new(x, 0.0, z, yaw),
        footprint: unit_crate(),
    }
}

fn placement_bounds() -> Bounds {
    Bounds::symmetric(13.0)
}

#[test]
fn interior_candidates_without_neighbours_are_valid() {
    let obstacles = ObstacleSet::from_obstacles(vec![obstacle(1, 10.0, 10.0, 0.0)]);
    for (x, z) in [(0.0, 0.0), (-12.9, 12.9), (5.5, -3.25), (12.0, -12.0)] {
        let candidate = Transform2D::on_plane(x, z);
        assert_eq!(
            validate(&candidate, &unit_crate(), &placement_bounds(), &obstacles),
            Validity::Valid,
            "candidate at ({x}, {z}) should be valid",
        );
    }
}

#[test]
fn candidates_outside_bounds_are_flagged() {
    let obstacles = ObstacleSet::default();
    for (x, z) in [(13.01, 0.0), (-14.0, 0.0), (0.0, 20.0), (0.0, -13.5), (30.0, 30.0)] {
        let validity = validate(
            &Transform2D::on_plane(x, z),
            &unit_crate(),
            &placement_bounds(),
            &obstacles,
        );
        assert!(
            validity.has(InvalidReason::OutOfBounds),
            "candidate at ({x}, {z}) should be out of bounds",
        );
        assert!(!validity.has(InvalidReason::Overlapping));
    }
}

#[test]
fn boundary_line_follows_configured_mode() {
    let obstacles = ObstacleSet::default();
    let on_edge = Transform2D::on_plane(13.0, -13.0);

    let inclusive = SpatialValidator::new(placement_bounds(), BoundaryMode::Inclusive);
    assert!(inclusive.validate(&on_edge, &unit_crate(), &obstacles).is_valid());

    let exclusive = SpatialValidator::new(placement_bounds(), BoundaryMode::Exclusive);
    assert!(exclusive
        .validate(&on_edge, &unit_crate(), &obstacles)
        .has(InvalidReason::OutOfBounds));
}

#[test]
fn both_reasons_are_reported_together() {
    let obstacles = ObstacleSet::from_obstacles(vec![obstacle(4, 14.0, 0.0, 0.0)]);
    let validity = validate(
        &Transform2D::on_plane(14.2, 0.0),
        &unit_crate(),
        &placement_bounds(),
        &obstacles,
    );
    assert!(validity.has(InvalidReason::OutOfBounds));
    assert!(validity.has(InvalidReason::Overlapping));
}

#[test]
fn overlap_is_symmetric_for_rotated_footprints() {
    let plank = Footprint::new(2.0, 0.25);
    let cases = [
        (Transform2D::new(0.0, 0.0, 0.0, 0.0), Transform2D::new(1.5, 0.0, 1.0, 60.0)),
        (Transform2D::new(0.0, 0.0, 0.0, 30.0), Transform2D::new(3.0, 0.0, 0.0, 120.0)),
        (Transform2D::new(-2.0, 0.0, 1.0, 15.0), Transform2D::new(2.0, 0.0, -1.0, 200.0)),
        (Transform2D::new(0.0, 0.0, 0.0, 45.0), Transform2D::new(0.0, 0.0, 0.0, 135.0)),
    ];
    for (a, b) in cases {
        assert_eq!(
            footprints_overlap(&a, &plank, &b, &unit_crate()),
            footprints_overlap(&b, &unit_crate(), &a, &plank),
            "overlap must not depend on argument order for {a:?} / {b:?}",
        );
    }
}

#[test]
fn rotated_footprint_is_not_approximated_by_its_bounding_box() {
    let plank = Footprint::new(3.0, 0.25);
    let neighbour = ObstacleSet::from_obstacles(vec![obstacle(2, 0.0, 2.0, 0.0)]);

    let flat = Transform2D::new(0.0, 0.0, 0.0, 0.0);
    assert!(first_overlap(&flat, &plank, &neighbour, None).is_none());

    let upright = Transform2D::new(0.0, 0.0, 0.0, 90.0);
    assert_eq!(
        first_overlap(&upright, &plank, &neighbour, None),
        Some(ObjectId::new(2))
    );
}

#[test]
fn excluded_object_is_never_its_own_obstacle() {
    let obstacles = ObstacleSet::from_obstacles(vec![obstacle(7, 1.0, 1.0, 0.0)]);
    let validator = SpatialValidator::new(placement_bounds(), BoundaryMode::Inclusive);
    let same_spot = Transform2D::on_plane(1.0, 1.0);

    assert!(!validator
        .validate(&same_spot, &unit_crate(), &obstacles)
        .is_valid());
    assert!(validator
        .validate_excluding(&same_spot, &unit_crate(), &obstacles, Some(ObjectId::new(7)))
        .is_valid());
}

#[test]
fn result_does_not_depend_on_obstacle_order() {
    let forward = vec![
        obstacle(1, 5.0, 5.0, 0.0),
        obstacle(2, 0.6, 0.0, 30.0),
        obstacle(3, -5.0, 0.0, 0.0),
    ];
    let mut reversed = forward.clone();
    reversed.reverse();
    let candidate = Transform2D::on_plane(0.0, 0.0);

    assert_eq!(
        validate(
            &candidate,
            &unit_crate(),
            &placement_bounds(),
            &ObstacleSet::from_obstacles(forward)
        ),
        validate(
            &candidate,
            &unit_crate(),
            &placement_bounds(),
            &ObstacleSet::from_obstacles(reversed)
        ),
    );
}

#[test]
fn footprint_contains_respects_rotation() {
    let plank = Footprint::new(2.0, 0.25);
    let upright = Transform2D::new(0.0, 0.0, 0.0, 90.0);
    assert!(footprint_contains(&upright, &plank, 0.0, 1.8));
    assert!(!footprint_contains(&upright, &plank, 1.8, 0.0));
}

#[test]
fn leeway_bounds_keep_two_distinct_limits() {
    let view = LeewayBounds::new(Bounds::symmetric(7.5), 1.0);
    assert_eq!(view.clamp_dragging(20.0, -20.0), (8.5, -8.5));
    assert_eq!(view.clamp_resting(20.0, -20.0), (7.5, -7.5));
    assert_eq!(view.clamp_dragging(8.0, 0.0), (8.0, 0.0));
}

#[test]
fn negative_leeway_collapses_to_strict_bounds() {
    let view = LeewayBounds::new(Bounds::symmetric(2.0), -3.0);
    assert_eq!(view.leeway(), 0.0);
    assert_eq!(view.widened(), view.strict());
}
