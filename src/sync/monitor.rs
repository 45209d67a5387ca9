// src/sync/monitor.rs

//! The poll loop: read signals, derive the status, update the LEDs.

use anyhow::{Context, Result};
use std::time::{Duration, Instant};

use super::activity::TransferActivityDetector;
use super::api::DaemonApi;
use super::process::ProcessTable;
use super::signals::SyncSignalSource;
use super::status::{classify, RawSignals, SyncState};
use crate::indicator::{IndicatorControl, IndicatorDriver};

#[derive(Debug, Clone, Default)]
pub struct CycleStats {
    pub cycles: u64,
    pub slowest: Duration,
}

/// Owns every piece of state that survives between cycles.
pub struct Monitor<D, P, C> {
    signals: SyncSignalSource<D, P>,
    detector: TransferActivityDetector,
    driver: IndicatorDriver<C>,
    interval: Duration,
    stats: CycleStats,
}

impl<D, P, C> Monitor<D, P, C>
where
    D: DaemonApi,
    P: ProcessTable,
    C: IndicatorControl,
{
    pub fn new(
        signals: SyncSignalSource<D, P>,
        detector: TransferActivityDetector,
        driver: IndicatorDriver<C>,
        interval: Duration,
    ) -> Self {
        Self {
            signals,
            detector,
            driver,
            interval,
            stats: CycleStats::default(),
        }
    }

    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }

    pub fn driver(&self) -> &IndicatorDriver<C> {
        &self.driver
    }

    /// Poll forever. Only a process table failure ends the loop.
    pub fn run(&mut self) -> Result<()> {
        log::info!("Monitor: polling every {:?}", self.interval);
        loop {
            std::thread::sleep(self.interval);
            self.tick()?;
        }
    }

    /// One full cycle. Returns the state that is now showing.
    pub fn tick(&mut self) -> Result<SyncState> {
        let start = Instant::now();

        let (signals, transfer_active) = self.observe()?;
        let state = classify(&signals, transfer_active);
        self.driver.apply(state);

        let elapsed = start.elapsed();
        self.stats.cycles += 1;
        if elapsed > self.stats.slowest {
            self.stats.slowest = elapsed;
            log::debug!("Monitor: slowest cycle so far took {:?}", elapsed);
        }
        log::trace!("Monitor: {:?} active={} -> {}", signals, transfer_active, state);

        Ok(state)
    }

    fn observe(&mut self) -> Result<(RawSignals, bool)> {
        let (mut signals, transfer_active) = match self.observe_daemon() {
            Ok(observed) => observed,
            Err(e) => {
                log::debug!("Monitor: daemon unreachable: {:#}", e);
                return Ok((RawSignals::unreachable(), false));
            }
        };

        // Errors win over everything else, no need to look for rsync.
        if !signals.errors_since_boot {
            signals.copy_process_running = self.signals.copy_process_running()?;
        }
        Ok((signals, transfer_active))
    }

    /// Every error returned here means the daemon could not be read.
    fn observe_daemon(&mut self) -> Result<(RawSignals, bool)> {
        self.signals.ping().context("Ping failed")?;

        let mut signals = RawSignals {
            daemon_reachable: true,
            ..RawSignals::unreachable()
        };

        if self.signals.errors_since_boot()? {
            signals.errors_since_boot = true;
            return Ok((signals, false));
        }

        signals.completion_percent = self.signals.completion()?;

        // The counters only matter while there is something left to sync.
        let transfer_active = if signals.completion_percent < 100.0 {
            let source = &self.signals;
            self.detector.update(|| source.transfer_totals())?
        } else {
            false
        };
        signals.bytes_transferred = self.detector.last_total().unwrap_or(0);

        Ok((signals, transfer_active))
    }
}
