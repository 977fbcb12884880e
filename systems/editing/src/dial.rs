use serde::{Deserialize, Serialize};

/// Maps a normalised slider value onto discrete yaw offsets.
///
/// `0.5` is neutral. The full `[0, 1]` range spans `steps_per_side` steps of
/// `step_degrees` on either side of neutral, rounding to the nearest step.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RotationDial {
    step_degrees: f32,
    steps_per_side: u32,
}

impl RotationDial {
    /// Slider value that produces no rotation.
    pub const NEUTRAL: f32 = 0.5;

    /// Creates a dial with the provided step size and resolution.
    #[must_use]
    pub const fn new(step_degrees: f32, steps_per_side: u32) -> Self {
        Self {
            step_degrees,
            steps_per_side,
        }
    }

    /// Degrees added per step.
    #[must_use]
    pub const fn step_degrees(&self) -> f32 {
        self.step_degrees
    }

    /// Steps available on each side of neutral.
    #[must_use]
    pub const fn steps_per_side(&self) -> u32 {
        self.steps_per_side
    }

    /// Largest offset the dial can produce in either direction.
    #[must_use]
    pub fn range_degrees(&self) -> f32 {
        self.step_degrees * self.steps_per_side as f32
    }

    /// Signed number of steps selected by `value`.
    ///
    /// Values outside `[0, 1]` are clamped; non-finite values read as neutral.
    #[must_use]
    pub fn steps_for(&self, value: f32) -> i32 {
        if !value.is_finite() {
            return 0;
        }
        let delta = value.clamp(0.0, 1.0) - Self::NEUTRAL;
        (delta * 2.0 * self.steps_per_side as f32).round() as i32
    }

    /// Yaw offset in degrees selected by `value`. Positive turns increase yaw.
    #[must_use]
    pub fn offset_for(&self, value: f32) -> f32 {
        self.steps_for(value) as f32 * self.step_degrees
    }

    /// Absolute yaw for `value` relative to `initial_yaw`, normalised to `[0, 360)`.
    #[must_use]
    pub fn yaw_for(&self, initial_yaw: f32, value: f32) -> f32 {
        normalize_degrees(initial_yaw + self.offset_for(value))
    }

    /// Slider value that selects exactly `steps` steps.
    #[must_use]
    pub fn value_for_steps(&self, steps: i32) -> f32 {
        if self.steps_per_side == 0 {
            return Self::NEUTRAL;
        }
        let value = Self::NEUTRAL + steps as f32 / (2.0 * self.steps_per_side as f32);
        value.clamp(0.0, 1.0)
    }
}

impl Default for RotationDial {
    fn default() -> Self {
        Self::new(15.0, 6)
    }
}

fn normalize_degrees(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_value_has_no_offset() {
        let dial = RotationDial::default();
        assert_eq!(dial.steps_for(RotationDial::NEUTRAL), 0);
        assert_eq!(dial.offset_for(RotationDial::NEUTRAL), 0.0);
    }

    #[test]
    fn extremes_reach_the_full_range() {
        let dial = RotationDial::default();
        assert_eq!(dial.offset_for(1.0), 90.0);
        assert_eq!(dial.offset_for(0.0), -90.0);
        assert_eq!(dial.range_degrees(), 90.0);
    }

    #[test]
    fn values_snap_to_the_nearest_step() {
        let dial = RotationDial::new(30.0, 3);
        assert_eq!(dial.steps_for(0.5 + 1.0 / 6.0), 1);
        assert_eq!(dial.steps_for(0.5 + 0.07), 0);
        assert_eq!(dial.steps_for(0.5 + 0.1), 1);
        assert_eq!(dial.steps_for(0.5 - 0.3), -2);
    }

    #[test]
    fn out_of_range_and_nan_inputs_are_tamed() {
        let dial = RotationDial::default();
        assert_eq!(dial.steps_for(7.0), 6);
        assert_eq!(dial.steps_for(-1.0), -6);
        assert_eq!(dial.steps_for(f32::NAN), 0);
    }

    #[test]
    fn yaw_wraps_into_a_single_turn() {
        let dial = RotationDial::default();
        let one_step = dial.value_for_steps(1);
        assert_eq!(dial.yaw_for(350.0, one_step), 5.0);
        assert_eq!(dial.yaw_for(10.0, dial.value_for_steps(-2)), 340.0);
    }

    #[test]
    fn zero_resolution_dial_stays_neutral() {
        let dial = RotationDial::new(15.0, 0);
        assert_eq!(dial.value_for_steps(4), RotationDial::NEUTRAL);
        assert_eq!(dial.offset_for(1.0), 0.0);
    }
}
