// polis - terminal client for a school administration backend
//
// Browses teachers, courses and students through paged, filterable lists
// and edits them and their relationships.
//
// Architecture:
// - API client (reqwest): JSON POST endpoints of the backend
// - Paging: one PagedSearchController per list, fed by a FilterPort
// - TUI (ratatui): tabs, detail/editor/picker modals, async results over mpsc
// - CLI (clap): config management plus headless list/show/delete/associate

mod api;
mod cli;
mod config;
mod detail;
mod editor;
mod entity;
mod logging;
mod paging;
mod tui;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use config::{Config, LogRotation, LoggingConfig};
use logging::{LogBuffer, TuiLogLayer};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

type BoxedLayer = Box<dyn Layer<tracing_subscriber::Registry> + Send + Sync>;

/// Non-blocking rolling JSON file layer, if file logging is on and the
/// directory is usable
fn file_layer(
    logging: &LoggingConfig,
) -> Option<(BoxedLayer, tracing_appender::non_blocking::WorkerGuard)> {
    if !logging.file_enabled {
        return None;
    }
    if let Err(e) = std::fs::create_dir_all(&logging.file_dir) {
        eprintln!(
            "Warning: Could not create log directory {:?}: {}",
            logging.file_dir, e
        );
        return None;
    }

    let appender = match logging.file_rotation {
        LogRotation::Hourly => tracing_appender::rolling::hourly(&logging.file_dir, &logging.file_prefix),
        LogRotation::Daily => tracing_appender::rolling::daily(&logging.file_dir, &logging.file_prefix),
        LogRotation::Never => tracing_appender::rolling::never(&logging.file_dir, &logging.file_prefix),
    };
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(writer)
        .with_ansi(false)
        .boxed();
    Some((layer, guard))
}

/// Install the global subscriber
///
/// TUI mode captures into `log_buffer` so nothing writes over the alternate
/// screen; headless mode logs to stderr so stdout stays clean for output.
/// Precedence: RUST_LOG env var > config file > default "info".
fn init_logging(
    config: &Config,
    tui_mode: bool,
    log_buffer: &LogBuffer,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let default_filter = format!("polis={}", config.logging.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());

    let mut layers: Vec<BoxedLayer> = Vec::new();
    if tui_mode {
        layers.push(TuiLogLayer::new(log_buffer.clone()).boxed());
    } else {
        layers.push(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .boxed(),
        );
    }

    let guard = file_layer(&config.logging).map(|(layer, guard)| {
        layers.push(layer);
        guard
    });

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config management runs before anything else is set up
    if cli::handle_config_command(cli.command.as_ref()) {
        return Ok(());
    }

    Config::ensure_config_exists();
    let config = Config::from_env();

    let tui_mode = cli.command.is_none() && config.enable_tui;
    let log_buffer = LogBuffer::new();
    // Keep alive until exit so buffered file logs flush
    let _file_guard = init_logging(&config, tui_mode, &log_buffer);

    tracing::debug!("polis {} using backend {}", config::VERSION, config.api_url);

    let client = Arc::new(
        api::SchoolClient::new(&config.api_url, config.request_timeout())
            .context("Failed to create backend client")?,
    );

    match cli.command {
        Some(command) if command.is_remote() => cli::run_command(command, client, &config).await,
        Some(_) => Ok(()),
        None if tui_mode => tui::run_tui(client, log_buffer, config).await,
        None => {
            eprintln!("TUI disabled (POLIS_NO_TUI is set); run a subcommand instead.");
            eprintln!("See `polis --help`.");
            Ok(())
        }
    }
}
