use std::time::Duration;

use placement_sandbox_core::{Bounds, Point2, Point3, Ray, ScreenRaycaster};
use placement_sandbox_system_validation::LeewayBounds;
use serde::{Deserialize, Serialize};

const SETTLE_EPSILON: f32 = 1e-4;

/// Pixel dimensions of the host window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Viewport {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Tunables of the top-down camera rig.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CameraConfig {
    /// Region the camera focus rests in.
    pub bounds: Bounds,
    /// Distance the focus may stray past `bounds` while panning.
    pub leeway: f32,
    /// Screen pixels per world unit.
    pub pixels_per_unit: f32,
    /// Window size.
    pub viewport: Viewport,
    /// Share of the remaining distance recovered per second after a pan.
    pub drift_rate: f32,
    /// Height pointer rays are cast from.
    #[serde(default = "default_eye_height")]
    pub eye_height: f32,
}

fn default_eye_height() -> f32 {
    35.0
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            bounds: Bounds::symmetric(7.5),
            leeway: 1.0,
            pixels_per_unit: 32.0,
            viewport: Viewport {
                width: 1280,
                height: 720,
            },
            drift_rate: 10.0,
            eye_height: default_eye_height(),
        }
    }
}

/// Orthographic camera looking straight down at the placement plane.
///
/// Screen `y` grows downwards while world `z` grows upwards. Panning is
/// clamped to the leeway bounds; once released the focus drifts back into
/// the strict bounds a little on every [`TopDownCamera::advance`].
#[derive(Clone, Debug)]
pub struct TopDownCamera {
    limits: LeewayBounds,
    pixels_per_unit: f32,
    viewport: Viewport,
    drift_rate: f32,
    eye_height: f32,
    focus_x: f32,
    focus_z: f32,
    pan_anchor: Option<Point2>,
}

impl TopDownCamera {
    /// Creates a camera focused on the world origin.
    #[must_use]
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            limits: LeewayBounds::new(config.bounds, config.leeway),
            pixels_per_unit: config.pixels_per_unit.max(f32::EPSILON),
            viewport: config.viewport,
            drift_rate: config.drift_rate.max(0.0),
            eye_height: config.eye_height,
            focus_x: 0.0,
            focus_z: 0.0,
            pan_anchor: None,
        }
    }

    /// Ground point at the centre of the screen.
    #[must_use]
    pub const fn focus(&self) -> (f32, f32) {
        (self.focus_x, self.focus_z)
    }

    /// Whether a pan gesture is in progress.
    #[must_use]
    pub const fn is_panning(&self) -> bool {
        self.pan_anchor.is_some()
    }

    /// Ground point under a screen position.
    #[must_use]
    pub fn screen_to_ground(&self, screen: Point2) -> (f32, f32) {
        let half_width = self.viewport.width as f32 * 0.5;
        let half_height = self.viewport.height as f32 * 0.5;
        (
            self.focus_x + (screen.x - half_width) / self.pixels_per_unit,
            self.focus_z + (half_height - screen.y) / self.pixels_per_unit,
        )
    }

    /// Screen position of a ground point.
    #[must_use]
    pub fn ground_to_screen(&self, x: f32, z: f32) -> Point2 {
        Point2::new(
            (x - self.focus_x) * self.pixels_per_unit + self.viewport.width as f32 * 0.5,
            self.viewport.height as f32 * 0.5 - (z - self.focus_z) * self.pixels_per_unit,
        )
    }

    /// Starts a pan gesture anchored at a screen position.
    pub fn begin_pan(&mut self, screen: Point2) {
        self.pan_anchor = Some(screen);
    }

    /// Moves the view so the ground follows the pointer, within the leeway bounds.
    pub fn pan_to(&mut self, screen: Point2) {
        let Some(anchor) = self.pan_anchor else {
            return;
        };
        let x = self.focus_x - (screen.x - anchor.x) / self.pixels_per_unit;
        let z = self.focus_z + (screen.y - anchor.y) / self.pixels_per_unit;
        (self.focus_x, self.focus_z) = self.limits.clamp_dragging(x, z);
        self.pan_anchor = Some(screen);
    }

    /// Ends the pan gesture. The focus drifts back on later ticks.
    pub fn end_pan(&mut self) {
        self.pan_anchor = None;
    }

    /// Eases the focus back inside the strict bounds when not panning.
    pub fn advance(&mut self, dt: Duration) {
        if self.is_panning() {
            return;
        }
        let (target_x, target_z) = self.limits.clamp_resting(self.focus_x, self.focus_z);
        let blend = (dt.as_secs_f32() * self.drift_rate).min(1.0);
        self.focus_x += (target_x - self.focus_x) * blend;
        self.focus_z += (target_z - self.focus_z) * blend;
        if (target_x - self.focus_x).abs() < SETTLE_EPSILON
            && (target_z - self.focus_z).abs() < SETTLE_EPSILON
        {
            self.focus_x = target_x;
            self.focus_z = target_z;
        }
    }
}

impl ScreenRaycaster for TopDownCamera {
    fn screen_ray(&self, screen: Point2) -> Ray {
        let (x, z) = self.screen_to_ground(screen);
        Ray::new(
            Point3::new(x, self.eye_height, z),
            Point3::new(0.0, -1.0, 0.0),
        )
    }
}
