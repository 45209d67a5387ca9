use anyhow::{Context, Result};
use clap::Parser;
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};
use std::path::PathBuf;

use syncled::config::{load_config, Config};
use syncled::indicator::{CliIndicator, DryRunIndicator, IndicatorControl, IndicatorDriver};
use syncled::sync::activity::TransferActivityDetector;
use syncled::sync::api::SyncthingClient;
use syncled::sync::http::create_http_client;
use syncled::sync::process::SystemProcessTable;
use syncled::sync::signals::SyncSignalSource;
use syncled::sync::Monitor;

/// Show the Syncthing sync status on the cooler LEDs.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Settings file (TOML). Environment variables override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level: off, error, warn, info, debug, trace.
    #[arg(long, default_value = "info")]
    log_level: LevelFilter,

    /// Log the LED commands instead of running the RGB tool.
    #[arg(long)]
    dry_run: bool,

    /// Run a single cycle, print the state and exit.
    #[arg(long)]
    once: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    TermLogger::init(
        cli.log_level,
        ConfigBuilder::new().set_time_format_rfc3339().build(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .context("Failed to initialise logging")?;

    // Load configuration at startup
    let config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;

    if cli.dry_run {
        run(&config, DryRunIndicator, cli.once)
    } else {
        run(&config, CliIndicator::new(&config.indicator_cli), cli.once)
    }
}

fn run<C: IndicatorControl>(config: &Config, control: C, once: bool) -> Result<()> {
    let http = create_http_client(
        &config.api_key,
        Some(config.cert_file.as_path()),
        config.request_timeout(),
    )?;
    let api = SyncthingClient::new(&config.syncthing_url, http)?;
    let processes = SystemProcessTable::new()?;
    let signals = SyncSignalSource::new(api, processes)?;

    let mut monitor = Monitor::new(
        signals,
        TransferActivityDetector::new(config.activity_settings()),
        IndicatorDriver::new(control),
        config.poll_interval(),
    );

    if once {
        std::thread::sleep(config.poll_interval());
        let state = monitor.tick()?;
        println!("{}", state);
        return Ok(());
    }

    monitor.run()
}
