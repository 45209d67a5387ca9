// src/indicator/driver.rs

use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;
use std::process::Command;

use super::commands::{CommandTable, IndicatorCommand};
use crate::sync::status::SyncState;

/// Something that can hand an argument list to the LED tool.
pub trait IndicatorControl {
    fn run(&mut self, args: &[String]) -> Result<()>;
}

/// Runs the RGB command line tool and waits for it.
pub struct CliIndicator {
    program: PathBuf,
}

impl CliIndicator {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl IndicatorControl for CliIndicator {
    fn run(&mut self, args: &[String]) -> Result<()> {
        log::debug!("Executing {} {}", self.program.display(), args.join(" "));
        let status = Command::new(&self.program)
            .args(args)
            .status()
            .with_context(|| format!("Failed to run {}", self.program.display()))?;

        if !status.success() {
            return Err(anyhow!("{} exited with {}", self.program.display(), status));
        }
        Ok(())
    }
}

/// Only logs what would have been executed.
#[derive(Default)]
pub struct DryRunIndicator;

impl IndicatorControl for DryRunIndicator {
    fn run(&mut self, args: &[String]) -> Result<()> {
        log::info!("Dry run: {}", args.join(" "));
        Ok(())
    }
}

pub struct IndicatorDriver<C> {
    control: C,
    table: CommandTable,
    last_applied: Option<SyncState>,
}

impl<C: IndicatorControl> IndicatorDriver<C> {
    pub fn new(control: C) -> Self {
        Self::with_table(control, CommandTable::default())
    }

    pub fn with_table(control: C, table: CommandTable) -> Self {
        Self {
            control,
            table,
            last_applied: None,
        }
    }

    pub fn last_applied(&self) -> Option<SyncState> {
        self.last_applied
    }

    pub fn control(&self) -> &C {
        &self.control
    }

    /// Push `state` to the LEDs unless it is already showing.
    ///
    /// Failures of the tool are logged and otherwise ignored; the state still
    /// counts as applied, so the LEDs may lag until the next transition.
    pub fn apply(&mut self, state: SyncState) {
        if self.last_applied == Some(state) {
            return;
        }
        self.last_applied = Some(state);

        log::info!("Updating state to {}", state);
        let command = self.table.resolve(state);
        if command == IndicatorCommand::Restore {
            log::warn!("LED: no command for state {} -> restore defaults", state);
        }

        if let Err(e) = self.control.run(&command.to_args()) {
            log::warn!("LED: failed to apply state {}: {:#}", state, e);
        }
    }
}
