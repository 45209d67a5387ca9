// src/sync/signals.rs

//! Raw reads against the daemon and the process table.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use super::api::{DaemonApi, DaemonError};
use super::process::ProcessTable;

/// Name of the external copy process whose presence means "syncing".
pub const COPY_PROCESS_NAME: &str = "rsync";

pub struct SyncSignalSource<D, P> {
    api: D,
    processes: P,
    boot_time: DateTime<Utc>,
}

impl<D: DaemonApi, P: ProcessTable> SyncSignalSource<D, P> {
    /// Captures the boot time once; it does not change while we run.
    pub fn new(api: D, processes: P) -> Result<Self> {
        let boot_time = processes.boot_time().context("Failed to read boot time")?;
        log::debug!("Signals: system booted at {}", boot_time);
        Ok(Self {
            api,
            processes,
            boot_time,
        })
    }

    pub fn boot_time(&self) -> DateTime<Utc> {
        self.boot_time
    }

    pub fn ping(&self) -> Result<()> {
        self.api.ping()
    }

    pub fn completion(&self) -> Result<f64> {
        self.api.completion()
    }

    pub fn errors_since_boot(&self) -> Result<bool> {
        match self.api.errors()? {
            Some(errors) => any_error_after(&errors, self.boot_time),
            None => Ok(false),
        }
    }

    pub fn transfer_totals(&self) -> Result<u64> {
        Ok(self.api.connection_totals()?.sum())
    }

    pub fn copy_process_running(&mut self) -> Result<bool> {
        self.processes.is_running(COPY_PROCESS_NAME)
    }
}

fn any_error_after(errors: &[DaemonError], boot_time: DateTime<Utc>) -> Result<bool> {
    for error in errors {
        let when = DateTime::parse_from_rfc3339(&error.when)
            .with_context(|| format!("Invalid error timestamp: {}", error.when))?;
        if when.with_timezone(&Utc) > boot_time {
            log::debug!("Signals: error since boot at {}: {}", error.when, error.message);
            return Ok(true);
        }
    }
    Ok(false)
}
