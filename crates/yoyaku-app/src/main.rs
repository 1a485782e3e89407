use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};
use yoyaku_core::config::load_config;
use yoyaku_service::Scheduler;

mod cli;
mod error;
mod render;

fn main() -> anyhow::Result<ExitCode> {
    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    let args = cli::Cli::parse();

    let mut config = load_config(args.config.as_deref())?;
    args.apply_overrides(&mut config);

    if let Ok(filter) = EnvFilter::try_new(config.logging.level.as_str()) {
        if let Err(e) = filter_handle.modify(|current| *current = filter) {
            tracing::warn!(error = %e, "Failed to update log filter from config");
        }
    } else {
        tracing::warn!(level = %config.logging.level, "Invalid log level in config, keeping warn");
    }

    tracing::debug!(config = ?config, "Configuration resolved");

    let mut scheduler = Scheduler::open(&config)?;

    Ok(cli::run(&args.command, &mut scheduler)?)
}
