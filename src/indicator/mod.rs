// src/indicator/mod.rs

// Cooler LED control
pub mod commands;
pub mod driver;

pub use commands::{CommandTable, IndicatorCommand};
pub use driver::{CliIndicator, DryRunIndicator, IndicatorControl, IndicatorDriver};
