//! `storefront-tui` — Terminal admin console for a hosted product catalog.
//!
//! Built on [ratatui](https://ratatui.rs) with reactive snapshots from
//! `storefront-core`'s [`ProductStream`](storefront_core::ProductStream).
//! Two screens: a sign-in form and the product table with its
//! create/edit/delete modal.
//!
//! Logs are written to a file (default `/tmp/storefront-tui.log`) to avoid
//! corrupting the terminal UI. A background data bridge task streams
//! catalog snapshots and auth changes into the TUI action loop.
//!
//! Entry point: CLI argument parsing, tracing setup, panic hooks, and app launch.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod screen;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result, eyre};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use storefront_config::FileTokenStore;
use storefront_core::Catalog;

use crate::app::App;

/// Terminal admin console for managing a shop's product catalog.
#[derive(Parser, Debug)]
#[command(name = "storefront-tui", version, about)]
struct Cli {
    /// API base URL (e.g., https://vue-course-api.example.com)
    #[arg(short = 'u', long, env = "STOREFRONT_URL")]
    url: Option<String>,

    /// Merchant path segment identifying the shop
    #[arg(short = 'm', long, env = "STOREFRONT_MERCHANT")]
    merchant: Option<String>,

    /// Log file path (defaults to /tmp/storefront-tui.log)
    #[arg(long, default_value = "/tmp/storefront-tui.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Set up file-based tracing. We MUST NOT log to stdout/stderr — that would
/// corrupt the TUI output. Returns a guard that must be held for the
/// lifetime of the application to ensure logs are flushed.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("storefront={log_level}")));

    let log_dir = cli
        .log_file
        .parent()
        .unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("storefront-tui.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

/// Build the catalog handle: config file first, CLI flags on top.
fn build_catalog(cli: &Cli) -> Result<Catalog> {
    let mut cfg = storefront_config::load_config_or_default();
    if let Some(url) = &cli.url {
        cfg.url.clone_from(url);
    }
    if let Some(merchant) = &cli.merchant {
        cfg.merchant.clone_from(merchant);
    }

    let catalog_config = storefront_config::to_catalog_config(&cfg)
        .map_err(|e| eyre!("invalid configuration: {e}"))?;
    let tokens = Box::new(FileTokenStore::at_default_location());

    Catalog::new(catalog_config, tokens).map_err(|e| eyre!("failed to build catalog: {e}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Install panic/error hooks BEFORE entering the terminal
    tui::install_hooks()?;

    // Tracing to file — hold the guard so logs flush on exit
    let _log_guard = setup_tracing(&cli);

    info!(
        url = cli.url.as_deref().unwrap_or("(from config)"),
        merchant = cli.merchant.as_deref().unwrap_or("(from config)"),
        "starting storefront-tui"
    );

    let catalog = build_catalog(&cli)?;
    let mut app = App::new(catalog);
    app.run().await?;

    Ok(())
}
