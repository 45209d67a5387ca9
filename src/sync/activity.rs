// src/sync/activity.rs

//! Turns Syncthing's cumulative transfer counters into an "actively syncing" flag.
//!
//! Connected devices exchange index and status messages all the time, so the
//! byte counters tick even when nothing is being synchronised. A cycle only
//! counts as active when the counters grew by at least `min_delta_bytes`, and a
//! short run of quiet cycles after an active one is tolerated.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What happens once the tolerance countdown reaches zero.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DecayPolicy {
    /// The floored countdown keeps reporting activity.
    #[default]
    Sticky,
    /// Report inactive once `tolerance_cycles` quiet cycles followed the last active one.
    Expire,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActivitySettings {
    pub min_delta_bytes: u64,
    pub initial_delay: Duration,
    pub tolerance_cycles: u32,
    pub decay: DecayPolicy,
}

impl Default for ActivitySettings {
    fn default() -> Self {
        Self {
            min_delta_bytes: 1024,
            initial_delay: Duration::from_secs(1),
            tolerance_cycles: 10,
            decay: DecayPolicy::Sticky,
        }
    }
}

pub struct TransferActivityDetector {
    settings: ActivitySettings,
    last_total: Option<u64>,
    remaining_tolerance: u32,
}

impl TransferActivityDetector {
    pub fn new(settings: ActivitySettings) -> Self {
        Self {
            settings,
            last_total: None,
            remaining_tolerance: 0,
        }
    }

    /// The most recent counter sample, if any.
    pub fn last_total(&self) -> Option<u64> {
        self.last_total
    }

    pub fn remaining_tolerance(&self) -> u32 {
        self.remaining_tolerance
    }

    /// Sample the counters through `read_total` and report whether a transfer is running.
    ///
    /// The very first call has nothing to compare against: it records a
    /// baseline, blocks for `initial_delay`, samples again and evaluates that
    /// second sample. Every later call samples exactly once.
    pub fn update<F>(&mut self, mut read_total: F) -> Result<bool>
    where
        F: FnMut() -> Result<u64>,
    {
        let mut total = read_total()?;

        if self.last_total.is_none() {
            log::debug!(
                "Activity: baseline {} bytes, measuring for {:?}",
                total,
                self.settings.initial_delay
            );
            self.last_total = Some(total);
            self.remaining_tolerance = 0;
            std::thread::sleep(self.settings.initial_delay);
            total = read_total()?;
        }

        Ok(self.record(total))
    }

    /// Evaluate one sample against the previous one.
    pub fn record(&mut self, current_total: u64) -> bool {
        let last = self.last_total.replace(current_total).unwrap_or(current_total);

        // A counter that went backwards means the daemon restarted; that is not activity.
        if current_total >= last.saturating_add(self.settings.min_delta_bytes) {
            self.remaining_tolerance = self.settings.tolerance_cycles;
            return true;
        }

        match self.settings.decay {
            DecayPolicy::Sticky => {
                self.remaining_tolerance = self.remaining_tolerance.saturating_sub(1);
                true
            }
            DecayPolicy::Expire => {
                let tolerated = self.remaining_tolerance > 0;
                self.remaining_tolerance = self.remaining_tolerance.saturating_sub(1);
                tolerated
            }
        }
    }
}
