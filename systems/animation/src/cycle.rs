use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::seconds;

/// Timing of a recurring event that alternates between a cooldown and an active window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CycleConfig {
    /// Quiet time before each active window.
    #[serde(with = "seconds")]
    pub cooldown: Duration,
    /// Length of each active window.
    #[serde(with = "seconds")]
    pub active: Duration,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            cooldown: Duration::from_secs(30),
            active: Duration::from_secs(60),
        }
    }
}

/// Phase of an [`EventCycle`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CyclePhase {
    /// Waiting for the next active window.
    Cooldown,
    /// The event is running.
    Active,
}

/// Phase change reported while advancing a cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleTransition {
    /// An active window opened.
    Started,
    /// An active window closed.
    Ended,
}

/// Periodic cooldown, active, cooldown state machine driven by explicit time steps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EventCycle {
    config: CycleConfig,
    phase: CyclePhase,
    elapsed: Duration,
}

impl EventCycle {
    /// Creates a cycle at the start of its first cooldown.
    #[must_use]
    pub const fn new(config: CycleConfig) -> Self {
        Self {
            config,
            phase: CyclePhase::Cooldown,
            elapsed: Duration::ZERO,
        }
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> CyclePhase {
        self.phase
    }

    /// Time left in the current phase.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.phase_length().saturating_sub(self.elapsed)
    }

    /// Advances the cycle, reporting every phase change crossed by `dt` in order.
    pub fn advance(&mut self, dt: Duration, out: &mut Vec<CycleTransition>) {
        if self.config.cooldown.is_zero() && self.config.active.is_zero() {
            return;
        }
        self.elapsed = self.elapsed.saturating_add(dt);
        while self.elapsed >= self.phase_length() {
            self.elapsed -= self.phase_length();
            match self.phase {
                CyclePhase::Cooldown => {
                    self.phase = CyclePhase::Active;
                    out.push(CycleTransition::Started);
                }
                CyclePhase::Active => {
                    self.phase = CyclePhase::Cooldown;
                    out.push(CycleTransition::Ended);
                }
            }
        }
    }

    fn phase_length(&self) -> Duration {
        match self.phase {
            CyclePhase::Cooldown => self.config.cooldown,
            CyclePhase::Active => self.config.active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cycle() -> EventCycle {
        EventCycle::new(CycleConfig {
            cooldown: Duration::from_secs(30),
            active: Duration::from_secs(60),
        })
    }

    #[test]
    fn cooldown_precedes_the_first_window() {
        let mut cycle = cycle();
        let mut transitions = Vec::new();

        cycle.advance(Duration::from_secs(29), &mut transitions);
        assert!(transitions.is_empty());
        assert_eq!(cycle.phase(), CyclePhase::Cooldown);
        assert_eq!(cycle.remaining(), Duration::from_secs(1));

        cycle.advance(Duration::from_secs(1), &mut transitions);
        assert_eq!(transitions, vec![CycleTransition::Started]);
        assert_eq!(cycle.phase(), CyclePhase::Active);
    }

    #[test]
    fn large_steps_report_every_crossed_transition() {
        let mut cycle = cycle();
        let mut transitions = Vec::new();

        cycle.advance(Duration::from_secs(125), &mut transitions);

        assert_eq!(
            transitions,
            vec![
                CycleTransition::Started,
                CycleTransition::Ended,
                CycleTransition::Started,
            ]
        );
        assert_eq!(cycle.phase(), CyclePhase::Active);
        assert_eq!(cycle.remaining(), Duration::from_secs(55));
    }

    #[test]
    fn degenerate_timing_never_spins() {
        let mut cycle = EventCycle::new(CycleConfig {
            cooldown: Duration::ZERO,
            active: Duration::ZERO,
        });
        let mut transitions = Vec::new();
        cycle.advance(Duration::from_secs(10), &mut transitions);
        assert!(transitions.is_empty());
    }
}
