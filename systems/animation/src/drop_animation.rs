use std::time::Duration;

use placement_sandbox_core::{ObjectId, ObjectTransforms};
use serde::{Deserialize, Serialize};

use crate::{seconds, Easing, Progress, Tween};

/// Parameters of the settle-onto-the-ground animation played after a placement.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DropConfig {
    /// Height above the resting position the object starts at.
    pub height: f32,
    /// Time taken to reach the resting position.
    #[serde(with = "seconds")]
    pub duration: Duration,
    /// Curve followed on the way down.
    #[serde(default)]
    pub easing: Easing,
}

impl Default for DropConfig {
    fn default() -> Self {
        Self {
            height: 2.0,
            duration: Duration::from_millis(350),
            easing: Easing::EaseIn,
        }
    }
}

/// Lowers one placed object onto its resting height.
///
/// Only the height is animated; the object's x, z and yaw are read from the
/// scene each tick so an edit in progress is never overwritten.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DropAnimation {
    object: ObjectId,
    tween: Tween,
}

impl DropAnimation {
    pub(crate) fn new(object: ObjectId, rest_height: f32, config: &DropConfig) -> Self {
        Self {
            object,
            tween: Tween::new(
                rest_height + config.height,
                rest_height,
                config.duration,
                config.easing,
            ),
        }
    }

    /// Object being lowered.
    #[must_use]
    pub const fn object(&self) -> ObjectId {
        self.object
    }

    /// Height the animation currently places the object at.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.tween.value()
    }

    /// Writes the current height to the object. `None` when the object is gone.
    pub(crate) fn apply<S>(&self, scene: &mut S) -> Option<()>
    where
        S: ObjectTransforms + ?Sized,
    {
        let mut transform = scene.transform(self.object)?;
        transform.position.y = self.tween.value();
        scene.set_transform(self.object, transform).then_some(())
    }

    pub(crate) fn advance(&mut self, dt: Duration) -> Progress {
        self.tween.advance(dt)
    }

    pub(crate) fn finish(&mut self) {
        self.tween.finish();
    }
}
