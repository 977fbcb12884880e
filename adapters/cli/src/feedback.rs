use placement_sandbox_core::{IndicatorTarget, RenderFeedback};
use tracing::debug;

/// Validity display that writes indicator changes to the log.
#[derive(Debug, Default)]
pub(crate) struct LogFeedback {
    updates: usize,
}

impl LogFeedback {
    pub(crate) const fn updates(&self) -> usize {
        self.updates
    }
}

impl RenderFeedback for LogFeedback {
    fn set_validity_indicator(&mut self, target: IndicatorTarget, valid: bool) {
        self.updates += 1;
        debug!(?target, valid, "validity indicator");
    }

    fn clear_indicator(&mut self, target: IndicatorTarget) {
        self.updates += 1;
        debug!(?target, "indicator cleared");
    }
}
