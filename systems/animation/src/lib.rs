#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Time-driven tasks advanced once per host tick.
//!
//! Nothing here sleeps or spawns threads. The host calls
//! [`Scheduler::advance`] with the elapsed time and receives the resulting
//! [`AnimationEvent`]s. Tasks owned by an object are cancelled when that
//! object goes away so they never write to a destroyed object.

mod cycle;
mod drop_animation;
mod tween;

pub use cycle::{CycleConfig, CyclePhase, CycleTransition, EventCycle};
pub use drop_animation::{DropAnimation, DropConfig};
pub use tween::{Easing, Progress, Tween};

use std::{collections::BTreeMap, time::Duration};

use placement_sandbox_core::{ObjectId, ObjectTransforms};
use tracing::debug;

/// Identifier of a scheduled task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u32);

impl TaskId {
    /// Creates a task identifier from its raw value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Raw value of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Notifications produced while advancing scheduled tasks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationEvent {
    /// A drop animation reached the resting height.
    DropLanded {
        /// Object that landed.
        object: ObjectId,
    },
    /// A drop animation stopped because its object no longer exists.
    DropAbandoned {
        /// Object that disappeared mid-flight.
        object: ObjectId,
    },
    /// A periodic event entered its active window.
    CycleStarted {
        /// Task driving the cycle.
        task: TaskId,
    },
    /// A periodic event returned to its cooldown.
    CycleEnded {
        /// Task driving the cycle.
        task: TaskId,
    },
}

#[derive(Clone, Debug)]
enum Task {
    Drop(DropAnimation),
    Cycle(EventCycle),
}

impl Task {
    fn owner(&self) -> Option<ObjectId> {
        match self {
            Self::Drop(animation) => Some(animation.object()),
            Self::Cycle(_) => None,
        }
    }
}

/// Owner of every delayed and periodic task.
#[derive(Clone, Debug, Default)]
pub struct Scheduler {
    tasks: BTreeMap<TaskId, Task>,
    next_task_id: u32,
}

impl Scheduler {
    /// Creates an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Reports whether no task is scheduled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Reports whether the task is still scheduled.
    #[must_use]
    pub fn is_scheduled(&self, task: TaskId) -> bool {
        self.tasks.contains_key(&task)
    }

    /// Drop animation currently running for `object`.
    #[must_use]
    pub fn drop_for(&self, object: ObjectId) -> Option<&DropAnimation> {
        self.tasks.values().find_map(|task| match task {
            Task::Drop(animation) if animation.object() == object => Some(animation),
            _ => None,
        })
    }

    /// Phase of a scheduled event cycle.
    #[must_use]
    pub fn cycle_phase(&self, task: TaskId) -> Option<CyclePhase> {
        match self.tasks.get(&task) {
            Some(Task::Cycle(cycle)) => Some(cycle.phase()),
            _ => None,
        }
    }

    /// Lifts a freshly placed object and schedules its descent.
    ///
    /// The object is raised immediately so the first frame already shows it
    /// above its resting height. Returns `None` if the object does not exist.
    pub fn schedule_drop<S>(
        &mut self,
        object: ObjectId,
        config: &DropConfig,
        scene: &mut S,
    ) -> Option<TaskId>
    where
        S: ObjectTransforms + ?Sized,
    {
        let rest_height = scene.transform(object)?.position.y;
        let animation = DropAnimation::new(object, rest_height, config);
        animation.apply(scene)?;
        let task = self.insert(Task::Drop(animation));
        debug!(%object, task = task.get(), "drop scheduled");
        Some(task)
    }

    /// Schedules a periodic event cycle.
    pub fn schedule_cycle(&mut self, config: CycleConfig) -> TaskId {
        self.insert(Task::Cycle(EventCycle::new(config)))
    }

    /// Cancels a task, returning whether it was scheduled.
    pub fn cancel(&mut self, task: TaskId) -> bool {
        self.tasks.remove(&task).is_some()
    }

    /// Cancels every task owned by `object`, returning how many were removed.
    ///
    /// Cancelled drops leave the object at whatever height they reached.
    pub fn cancel_owned_by(&mut self, object: ObjectId) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|_, task| task.owner() != Some(object));
        let cancelled = before - self.tasks.len();
        if cancelled > 0 {
            debug!(%object, cancelled, "tasks cancelled with their owner");
        }
        cancelled
    }

    /// Completes the drop animation of `object` at once, returning whether one was running.
    pub fn settle<S>(
        &mut self,
        object: ObjectId,
        scene: &mut S,
        out: &mut Vec<AnimationEvent>,
    ) -> bool
    where
        S: ObjectTransforms + ?Sized,
    {
        let mut settled = false;
        self.tasks.retain(|_, task| match task {
            Task::Drop(animation) if animation.object() == object => {
                animation.finish();
                out.push(land(animation, scene));
                settled = true;
                false
            }
            _ => true,
        });
        settled
    }

    /// Advances every task by `dt` in scheduling order.
    pub fn advance<S>(&mut self, dt: Duration, scene: &mut S, out: &mut Vec<AnimationEvent>)
    where
        S: ObjectTransforms + ?Sized,
    {
        let mut transitions = Vec::new();
        self.tasks.retain(|id, task| match task {
            Task::Drop(animation) => {
                let progress = animation.advance(dt);
                if animation.apply(scene).is_none() {
                    out.push(AnimationEvent::DropAbandoned {
                        object: animation.object(),
                    });
                    return false;
                }
                match progress {
                    Progress::Running => true,
                    Progress::Finished => {
                        out.push(AnimationEvent::DropLanded {
                            object: animation.object(),
                        });
                        false
                    }
                }
            }
            Task::Cycle(cycle) => {
                cycle.advance(dt, &mut transitions);
                out.extend(transitions.drain(..).map(|transition| match transition {
                    CycleTransition::Started => AnimationEvent::CycleStarted { task: *id },
                    CycleTransition::Ended => AnimationEvent::CycleEnded { task: *id },
                }));
                true
            }
        });
    }

    fn insert(&mut self, task: Task) -> TaskId {
        let id = TaskId::new(self.next_task_id);
        self.next_task_id = self.next_task_id.saturating_add(1);
        let _ = self.tasks.insert(id, task);
        id
    }
}

fn land<S>(animation: &DropAnimation, scene: &mut S) -> AnimationEvent
where
    S: ObjectTransforms + ?Sized,
{
    match animation.apply(scene) {
        Some(()) => AnimationEvent::DropLanded {
            object: animation.object(),
        },
        None => AnimationEvent::DropAbandoned {
            object: animation.object(),
        },
    }
}

mod seconds {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(crate) fn serialize<S: Serializer>(
        value: &Duration,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Duration, D::Error> {
        let seconds = f64::deserialize(deserializer)?;
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(serde::de::Error::custom(format!(
                "expected a non-negative number of seconds, got {seconds}"
            )));
        }
        Ok(Duration::from_millis((seconds * 1000.0).round() as u64))
    }
}
