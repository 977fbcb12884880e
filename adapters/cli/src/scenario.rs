//! Scripted input scenarios replayed by the `replay` subcommand.

use std::{fs, path::Path};

use anyhow::{ensure, Context, Result};
use serde::Deserialize;

/// Longest single `wait` step, in seconds.
const MAX_WAIT_SECONDS: f32 = 600.0;

/// Seed layout plus the input steps to feed through the router.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Scenario {
    #[serde(default)]
    pub(crate) objects: Vec<SeedObject>,
    #[serde(default)]
    pub(crate) steps: Vec<Step>,
}

/// Object placed through the world before any input is routed.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct SeedObject {
    pub(crate) prototype: String,
    pub(crate) x: f32,
    pub(crate) z: f32,
    #[serde(default)]
    pub(crate) yaw: f32,
}

/// One input step. Pointer coordinates are screen pixels.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case", deny_unknown_fields)]
pub(crate) enum Step {
    Palette {
        prototype: String,
        x: f32,
        y: f32,
    },
    Down {
        x: f32,
        y: f32,
        #[serde(default)]
        over_ui: bool,
    },
    Drag {
        x: f32,
        y: f32,
    },
    Up {
        x: f32,
        y: f32,
    },
    Edit,
    Rotate {
        value: f32,
    },
    EndRotate,
    Confirm,
    Cancel,
    Remove {
        object: u32,
    },
    Wait {
        seconds: f32,
    },
}

impl Scenario {
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario at {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("failed to parse scenario at {}", path.display()))
    }

    /// Checks step arguments that parse fine but cannot be replayed.
    pub(crate) fn validate(&self) -> Result<()> {
        for (index, step) in self.steps.iter().enumerate() {
            if let Step::Wait { seconds } = step {
                ensure!(
                    seconds.is_finite() && (0.0..=MAX_WAIT_SECONDS).contains(seconds),
                    "step {index} waits {seconds} seconds, expected 0 to {MAX_WAIT_SECONDS}"
                );
            }
        }
        Ok(())
    }
}
