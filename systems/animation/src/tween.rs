use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Whether a timed task still has work left.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Progress {
    /// More ticks are needed.
    Running,
    /// The task reached its end.
    Finished,
}

/// Shape of the interpolation curve.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    /// Constant speed.
    Linear,
    /// Starts slow and accelerates.
    #[default]
    EaseIn,
    /// Starts fast and decelerates.
    EaseOut,
}

impl Easing {
    fn apply(self, t: f32) -> f32 {
        match self {
            Self::Linear => t,
            Self::EaseIn => t * t,
            Self::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
        }
    }
}

/// Scalar interpolation advanced by explicit time steps.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tween {
    from: f32,
    to: f32,
    duration: Duration,
    elapsed: Duration,
    easing: Easing,
}

impl Tween {
    /// Creates a tween positioned at its start value.
    #[must_use]
    pub const fn new(from: f32, to: f32, duration: Duration, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration,
            elapsed: Duration::ZERO,
            easing,
        }
    }

    /// Advances the tween by `dt`, saturating at its end.
    pub fn advance(&mut self, dt: Duration) -> Progress {
        self.elapsed = self.elapsed.saturating_add(dt).min(self.duration);
        self.progress()
    }

    /// Jumps straight to the end value.
    pub fn finish(&mut self) {
        self.elapsed = self.duration;
    }

    /// Completed share of the duration in `[0, 1]`.
    #[must_use]
    pub fn fraction(&self) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
    }

    /// Interpolated value at the current time.
    #[must_use]
    pub fn value(&self) -> f32 {
        self.from + (self.to - self.from) * self.easing.apply(self.fraction())
    }

    /// Current state of the tween.
    #[must_use]
    pub fn progress(&self) -> Progress {
        if self.elapsed >= self.duration {
            Progress::Finished
        } else {
            Progress::Running
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tween_starts_at_origin_and_lands_exactly() {
        let mut tween = Tween::new(3.0, 0.0, Duration::from_millis(400), Easing::EaseIn);
        assert_eq!(tween.value(), 3.0);
        assert_eq!(tween.advance(Duration::from_millis(100)), Progress::Running);
        assert!(tween.value() < 3.0 && tween.value() > 0.0);
        assert_eq!(tween.advance(Duration::from_secs(5)), Progress::Finished);
        assert_eq!(tween.value(), 0.0);
    }

    #[test]
    fn easing_curves_share_endpoints() {
        for easing in [Easing::Linear, Easing::EaseIn, Easing::EaseOut] {
            assert_eq!(easing.apply(0.0), 0.0);
            assert_eq!(easing.apply(1.0), 1.0);
        }
        assert!(Easing::EaseIn.apply(0.5) < Easing::Linear.apply(0.5));
        assert!(Easing::EaseOut.apply(0.5) > Easing::Linear.apply(0.5));
    }

    #[test]
    fn zero_duration_tween_is_already_finished() {
        let tween = Tween::new(1.0, 2.0, Duration::ZERO, Easing::Linear);
        assert_eq!(tween.progress(), Progress::Finished);
        assert_eq!(tween.value(), 2.0);
    }
}
