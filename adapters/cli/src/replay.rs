//! Feeds a scripted scenario through the input router.

use std::time::Duration;

use anyhow::{bail, Result};
use placement_sandbox_core::{
    Command, Event, ObjectId, Point2, PointerSample, PrototypeId, ScreenRaycaster, SessionError,
    Transform2D,
};
use placement_sandbox_system_interaction::{InputRouter, Interaction};
use placement_sandbox_world::{self as world, query, Scene};
use tracing::{info, warn};

use crate::{
    config::SandboxConfig,
    feedback::LogFeedback,
    scenario::{Scenario, Step},
};

const TICKS_PER_SECOND: f32 = 60.0;
const TICK: Duration = Duration::from_nanos(16_666_667);

/// Everything observed while replaying a scenario.
#[derive(Debug)]
pub(crate) struct ReplayReport {
    pub(crate) interactions: Vec<Interaction>,
    pub(crate) events: Vec<Event>,
    pub(crate) layout: Vec<query::ObjectSnapshot>,
    pub(crate) rejected_steps: usize,
}

struct Replay {
    scene: Scene,
    router: InputRouter,
    feedback: LogFeedback,
    interactions: Vec<Interaction>,
}

/// Seeds the scene, routes every step and collects what happened.
///
/// Steps the router refuses are logged and skipped; a seed object the world
/// rejects aborts the replay.
pub(crate) fn run(config: &SandboxConfig, scenario: &Scenario) -> Result<ReplayReport> {
    scenario.validate()?;
    let mut scene = Scene::new(config.catalog());
    let mut events = Vec::new();
    for seed in &scenario.objects {
        world::apply(
            &mut scene,
            Command::PlaceObject {
                prototype: PrototypeId::new(seed.prototype.as_str()),
                transform: Transform2D::new(seed.x, 0.0, seed.z, seed.yaw),
            },
            &mut events,
        );
        if let Some(Event::CommandRejected { reason }) = events.last() {
            bail!("seed object `{}` was rejected: {reason:?}", seed.prototype);
        }
    }

    let mut router = InputRouter::new(config.router_config());
    let _ = router.start_event_cycle(config.weather);
    let mut replay = Replay {
        scene,
        router,
        feedback: LogFeedback::default(),
        interactions: Vec::new(),
    };

    let mut rejected_steps = 0;
    for (index, step) in scenario.steps.iter().enumerate() {
        if let Err(error) = replay.route(step) {
            rejected_steps += 1;
            warn!(index, ?step, %error, "step rejected");
        }
    }

    world::drain_events(&mut replay.scene, &mut events);
    info!(
        steps = scenario.steps.len(),
        rejected_steps,
        indicator_updates = replay.feedback.updates(),
        "scenario replayed"
    );
    Ok(ReplayReport {
        interactions: replay.interactions,
        events,
        layout: query::objects(&replay.scene),
        rejected_steps,
    })
}

impl Replay {
    fn route(&mut self, step: &Step) -> Result<(), SessionError> {
        let Self {
            scene,
            router,
            feedback,
            interactions,
        } = self;
        match step {
            Step::Palette { prototype, x, y } => {
                let id = PrototypeId::new(prototype.as_str());
                let prototype = query::prototype(scene, &id)
                    .cloned()
                    .ok_or(SessionError::UnknownPrototype { prototype: id })?;
                let pointer = pointer_at(router, *x, *y, false);
                router.palette_pressed(prototype, scene, feedback, &pointer)
            }
            Step::Down { x, y, over_ui } => {
                let pointer = pointer_at(router, *x, *y, *over_ui);
                router.pointer_down(scene, feedback, &pointer, interactions)
            }
            Step::Drag { x, y } => {
                let pointer = pointer_at(router, *x, *y, false);
                router.pointer_drag(scene, feedback, &pointer)
            }
            Step::Up { x, y } => {
                let pointer = pointer_at(router, *x, *y, false);
                router.pointer_up(scene, feedback, &pointer, interactions)
            }
            Step::Edit => router.enter_editing(scene, feedback).map(|_| ()),
            Step::Rotate { value } => router.set_rotation(*value, scene, feedback).map(|_| ()),
            Step::EndRotate => router.end_rotation(),
            Step::Confirm => router.confirm(feedback, interactions),
            Step::Cancel => router.cancel(scene, feedback, interactions),
            Step::Remove { object } => {
                router.remove_object(ObjectId::new(*object), scene, feedback, interactions)
            }
            Step::Wait { seconds } => {
                let ticks = (seconds * TICKS_PER_SECOND).round() as u32;
                for _ in 0..ticks {
                    router.advance(TICK, scene, interactions);
                }
                Ok(())
            }
        }
    }
}

fn pointer_at(router: &InputRouter, x: f32, y: f32, over_ui: bool) -> PointerSample {
    let position = Point2::new(x, y);
    PointerSample::new(position, router.camera().screen_ray(position), over_ui)
}

#[cfg(test)]
mod tests {
    use super::*;
    use placement_sandbox_system_animation::AnimationEvent;

    fn scenario(text: &str) -> Scenario {
        toml::from_str(text).expect("scenario parses")
    }

    #[test]
    fn drag_to_place_then_rotate_and_confirm() {
        let report = run(
            &SandboxConfig::default(),
            &scenario(
                r#"
                [[steps]]
                action = "palette"
                prototype = "crate"
                x = 640.0
                y = 360.0

                [[steps]]
                action = "drag"
                x = 672.0
                y = 360.0

                [[steps]]
                action = "up"
                x = 672.0
                y = 360.0

                [[steps]]
                action = "wait"
                seconds = 1.0

                [[steps]]
                action = "down"
                x = 672.0
                y = 360.0

                [[steps]]
                action = "edit"

                [[steps]]
                action = "rotate"
                value = 1.0

                [[steps]]
                action = "confirm"
                "#,
            ),
        )
        .expect("replay succeeds");

        assert_eq!(report.rejected_steps, 0);
        let placed = report
            .interactions
            .iter()
            .find_map(|interaction| match interaction {
                Interaction::Placed { object, .. } => Some(*object),
                _ => None,
            })
            .expect("crate placed");
        assert!(report
            .interactions
            .contains(&Interaction::Animation(AnimationEvent::DropLanded { object: placed })));
        assert!(report
            .interactions
            .contains(&Interaction::Selected { object: placed }));
        let commit = report
            .interactions
            .iter()
            .find_map(|interaction| match interaction {
                Interaction::EditCommitted(commit) => Some(*commit),
                _ => None,
            })
            .expect("edit committed");
        assert_eq!(commit.object, placed);
        assert_eq!(commit.to.yaw_degrees, 90.0);

        assert_eq!(report.layout.len(), 1);
        let rest = report.layout[0].transform;
        assert!(rest.approx_eq(&Transform2D::new(1.0, 0.0, 0.0, 90.0), 1e-4));
    }

    #[test]
    fn refused_steps_are_counted_and_skipped() {
        let report = run(
            &SandboxConfig::default(),
            &scenario(
                r#"
                [[objects]]
                prototype = "crate"
                x = 0.0
                z = 0.0

                [[steps]]
                action = "confirm"

                [[steps]]
                action = "palette"
                prototype = "decal"
                x = 640.0
                y = 360.0

                [[steps]]
                action = "remove"
                object = 0
                "#,
            ),
        )
        .expect("replay succeeds");

        assert_eq!(report.rejected_steps, 2);
        assert!(report.layout.is_empty());
        assert!(matches!(
            report.events.as_slice(),
            [Event::ObjectPlaced { .. }, Event::ObjectRemoved { .. }]
        ));
    }

    #[test]
    fn unbounded_wait_aborts_before_any_step() {
        let error = run(
            &SandboxConfig::default(),
            &scenario(
                r#"
                [[steps]]
                action = "palette"
                prototype = "crate"
                x = 640.0
                y = 360.0

                [[steps]]
                action = "wait"
                seconds = 1e30
                "#,
            ),
        )
        .expect_err("wait is too long");
        assert!(error.to_string().contains("step 1"));
    }

    #[test]
    fn rejected_seed_aborts_the_replay() {
        let error = run(
            &SandboxConfig::default(),
            &scenario("[[objects]]\nprototype = \"decal\"\nx = 0.0\nz = 0.0\n"),
        )
        .expect_err("decal has no footprint");
        assert!(error.to_string().contains("decal"));
    }
}
