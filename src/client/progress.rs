//! Cosmetic upload progress.
//!
//! The percentages produced here are **not** tied to any byte transfer. They advance by random
//! steps on a fixed tick so the user sees movement; the real upload starts once the indicator
//! reaches 100%, and its outcome is reported separately.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const TICK: Duration = Duration::from_millis(400);
/// Pause after reaching 100% before the caller proceeds.
pub const SETTLE: Duration = Duration::from_millis(500);

const MAX_STEP: f64 = 30.0;

#[derive(Debug, Clone, Default)]
pub struct SimulatedProgress {
    percent: f64,
}

impl SimulatedProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn percent(&self) -> f64 {
        self.percent
    }

    pub fn is_complete(&self) -> bool {
        self.percent >= 100.0
    }

    /// Moves forward by a random step below 30%, capped at 100. Returns `None` once complete.
    pub fn advance<R: Rng>(&mut self, rng: &mut R) -> Option<f64> {
        if self.is_complete() {
            return None;
        }
        self.percent = (self.percent + rng.gen_range(0.0..MAX_STEP)).min(100.0);
        Some(self.percent)
    }
}

/// Drives a [`SimulatedProgress`] to completion, calling `on_update` after every tick,
/// then waits `settle`.
pub async fn run(tick: Duration, settle: Duration, mut on_update: impl FnMut(f64)) {
    let mut rng = StdRng::from_entropy();
    let mut progress = SimulatedProgress::new();

    while let Some(percent) = progress.advance(&mut rng) {
        tokio::time::sleep(tick).await;
        on_update(percent);
    }
    tokio::time::sleep(settle).await;
}
