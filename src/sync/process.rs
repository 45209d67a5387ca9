// src/sync/process.rs

//! Access to the OS process table.

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use sysinfo::{ProcessRefreshKind, System};

pub trait ProcessTable {
    /// Whether a process with exactly this name (case-sensitive) exists right now.
    fn is_running(&mut self, name: &str) -> Result<bool>;
    /// When the machine booted.
    fn boot_time(&self) -> Result<DateTime<Utc>>;
}

pub struct SystemProcessTable {
    system: System,
}

impl SystemProcessTable {
    pub fn new() -> Result<Self> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            bail!("Process listing is not supported on this platform");
        }
        Ok(Self { system: System::new() })
    }
}

impl ProcessTable for SystemProcessTable {
    fn is_running(&mut self, name: &str) -> Result<bool> {
        // Names are all we look at.
        self.system.refresh_processes_specifics(ProcessRefreshKind::new());
        let found = self.system.processes_by_exact_name(name).next().is_some();
        Ok(found)
    }

    fn boot_time(&self) -> Result<DateTime<Utc>> {
        let secs = System::boot_time();
        match DateTime::<Utc>::from_timestamp(secs as i64, 0) {
            Some(boot) if secs > 0 => Ok(boot),
            _ => bail!("Could not determine boot time"),
        }
    }
}
