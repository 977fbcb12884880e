use std::time::Duration;

use placement_sandbox_core::{
    Footprint, ObjectFactory, ObjectId, ObjectTransforms, Prototype, PrototypeId, Transform2D,
};
use placement_sandbox_system_animation::{
    AnimationEvent, CycleConfig, CyclePhase, DropConfig, Easing, Scheduler,
};
use placement_sandbox_world::Scene;

fn scene_with_crate() -> (Scene, ObjectId) {
    let mut scene = Scene::new([Prototype::new(
        PrototypeId::new("crate"),
        Footprint::new(0.5, 0.5),
    )]);
    let object = scene
        .instantiate(&PrototypeId::new("crate"), Transform2D::new(1.0, 0.0, 2.0, 90.0))
        .expect("crate placed");
    (scene, object)
}

fn drop_config() -> DropConfig {
    DropConfig {
        height: 2.0,
        duration: Duration::from_millis(400),
        easing: Easing::Linear,
    }
}

fn height(scene: &Scene, object: ObjectId) -> f32 {
    scene.transform(object).expect("object exists").position.y
}

#[test]
fn dropped_object_starts_raised_and_lands_on_its_rest_height() {
    let (mut scene, object) = scene_with_crate();
    let mut scheduler = Scheduler::new();
    let mut events = Vec::new();

    let task = scheduler
        .schedule_drop(object, &drop_config(), &mut scene)
        .expect("drop scheduled");
    assert_eq!(height(&scene, object), 2.0);

    scheduler.advance(Duration::from_millis(200), &mut scene, &mut events);
    assert!((height(&scene, object) - 1.0).abs() < 1e-5);
    assert!(events.is_empty());

    scheduler.advance(Duration::from_millis(300), &mut scene, &mut events);
    assert_eq!(height(&scene, object), 0.0);
    assert_eq!(events, vec![AnimationEvent::DropLanded { object }]);
    assert!(!scheduler.is_scheduled(task));

    let landed = scene.transform(object).expect("object exists");
    assert!(landed.approx_eq(&Transform2D::new(1.0, 0.0, 2.0, 90.0), 1e-6));
}

#[test]
fn drop_never_overwrites_horizontal_position() {
    let (mut scene, object) = scene_with_crate();
    let mut scheduler = Scheduler::new();
    let mut events = Vec::new();

    let _ = scheduler
        .schedule_drop(object, &drop_config(), &mut scene)
        .expect("drop scheduled");
    let mut moved = scene.transform(object).expect("object exists");
    moved.position.x = -4.0;
    moved.yaw_degrees = 15.0;
    assert!(scene.set_transform(object, moved));

    scheduler.advance(Duration::from_secs(1), &mut scene, &mut events);

    let landed = scene.transform(object).expect("object exists");
    assert_eq!(landed.position.x, -4.0);
    assert_eq!(landed.yaw_degrees, 15.0);
    assert_eq!(landed.position.y, 0.0);
}

#[test]
fn removing_the_owner_cancels_its_drop() {
    let (mut scene, object) = scene_with_crate();
    let mut scheduler = Scheduler::new();
    let mut events = Vec::new();

    let task = scheduler
        .schedule_drop(object, &drop_config(), &mut scene)
        .expect("drop scheduled");
    let cycle = scheduler.schedule_cycle(CycleConfig::default());

    assert!(scene.destroy(object));
    assert_eq!(scheduler.cancel_owned_by(object), 1);
    assert!(!scheduler.is_scheduled(task));
    assert!(scheduler.is_scheduled(cycle));

    scheduler.advance(Duration::from_millis(100), &mut scene, &mut events);
    assert!(events.is_empty());
}

#[test]
fn vanished_object_abandons_its_drop() {
    let (mut scene, object) = scene_with_crate();
    let mut scheduler = Scheduler::new();
    let mut events = Vec::new();

    let _ = scheduler
        .schedule_drop(object, &drop_config(), &mut scene)
        .expect("drop scheduled");
    assert!(scene.destroy(object));

    scheduler.advance(Duration::from_millis(100), &mut scene, &mut events);

    assert_eq!(events, vec![AnimationEvent::DropAbandoned { object }]);
    assert!(scheduler.is_empty());
}

#[test]
fn settle_finishes_a_drop_immediately() {
    let (mut scene, object) = scene_with_crate();
    let mut scheduler = Scheduler::new();
    let mut events = Vec::new();

    let _ = scheduler
        .schedule_drop(object, &drop_config(), &mut scene)
        .expect("drop scheduled");
    assert!(scheduler.drop_for(object).is_some());

    assert!(scheduler.settle(object, &mut scene, &mut events));
    assert_eq!(height(&scene, object), 0.0);
    assert_eq!(events, vec![AnimationEvent::DropLanded { object }]);
    assert!(!scheduler.settle(object, &mut scene, &mut events));
}

#[test]
fn missing_object_cannot_be_dropped() {
    let (mut scene, _) = scene_with_crate();
    let mut scheduler = Scheduler::new();
    assert!(scheduler
        .schedule_drop(ObjectId::new(99), &drop_config(), &mut scene)
        .is_none());
    assert!(scheduler.is_empty());
}

#[test]
fn event_cycle_reports_windows_until_cancelled() {
    let (mut scene, _) = scene_with_crate();
    let mut scheduler = Scheduler::new();
    let mut events = Vec::new();
    let task = scheduler.schedule_cycle(CycleConfig {
        cooldown: Duration::from_secs(30),
        active: Duration::from_secs(60),
    });

    scheduler.advance(Duration::from_secs(30), &mut scene, &mut events);
    assert_eq!(events, vec![AnimationEvent::CycleStarted { task }]);
    assert_eq!(scheduler.cycle_phase(task), Some(CyclePhase::Active));

    scheduler.advance(Duration::from_secs(60), &mut scene, &mut events);
    assert_eq!(events.last(), Some(&AnimationEvent::CycleEnded { task }));

    assert!(scheduler.cancel(task));
    events.clear();
    scheduler.advance(Duration::from_secs(600), &mut scene, &mut events);
    assert!(events.is_empty());
    assert_eq!(scheduler.cycle_phase(task), None);
}
