//! Seeded stress run that drops prototypes at random points.

use anyhow::{bail, Result};
use placement_sandbox_core::{Prototype, PrototypeId, Ray, SessionError};
use placement_sandbox_system_placement::{PlacementOutcome, PlacementSession};
use placement_sandbox_world::{query, Scene};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use crate::{config::SandboxConfig, feedback::LogFeedback};

/// Margin outside the placement bounds that random points may land in.
const SCATTER_MARGIN: f32 = 1.0;

/// Tally of a scatter run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct ScatterSummary {
    pub(crate) committed: usize,
    pub(crate) discarded: usize,
    pub(crate) skipped: usize,
}

/// Runs `count` drag-to-place gestures at random points.
///
/// Returns the tally together with the resulting scene.
pub(crate) fn run(
    config: &SandboxConfig,
    prototype: Option<&str>,
    count: usize,
    seed: u64,
) -> Result<(ScatterSummary, Scene)> {
    let mut scene = Scene::new(config.catalog());
    let candidates: Vec<Prototype> = match prototype {
        Some(name) => match query::prototype(&scene, &PrototypeId::new(name)) {
            Some(entry) => vec![entry.clone()],
            None => bail!("prototype `{name}` is not in the catalog"),
        },
        None => query::prototypes(&scene).cloned().collect(),
    };
    if candidates.is_empty() {
        bail!("the prototype catalog is empty");
    }

    let region = config.placement.bounds.widened(SCATTER_MARGIN);
    let validator = config.validator();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut feedback = LogFeedback::default();
    let mut summary = ScatterSummary::default();

    for attempt in 0..count {
        let prototype = candidates[rng.gen_range(0..candidates.len())].clone();
        let x = rng.gen_range(region.min_x..=region.max_x);
        let z = rng.gen_range(region.min_z..=region.max_z);
        let ray = Ray::downward(x, z);

        let mut session = PlacementSession::new(prototype, validator);
        match session.begin(&ray, &scene, &mut feedback) {
            Ok(()) => {}
            Err(error @ SessionError::MissingFootprint { .. }) => {
                summary.skipped += 1;
                debug!(attempt, %error, "scatter attempt skipped");
                continue;
            }
            Err(error) => return Err(error.into()),
        }
        match session.release(&ray, &mut scene, &mut feedback)? {
            PlacementOutcome::Committed { object, .. } => {
                summary.committed += 1;
                debug!(attempt, %object, x, z, "scatter attempt committed");
            }
            PlacementOutcome::Discarded { validity } => {
                summary.discarded += 1;
                debug!(attempt, ?validity, x, z, "scatter attempt discarded");
            }
        }
    }

    if summary.committed == 0 && count > 0 {
        warn!(count, "no scatter attempt produced an object");
    }
    info!(
        seed,
        committed = summary.committed,
        discarded = summary.discarded,
        skipped = summary.skipped,
        "scatter finished"
    );
    Ok((summary, scene))
}
