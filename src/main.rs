//! esa-diary CLI - Entry point
//!
//! Usage: esa-diary [--config <path>] [--history-limit <n>] [--log-file <path>]

use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use esa_diary::cli::Cli;
use esa_diary::config::Config;
use esa_diary::core::reconcile::Reconciler;
use esa_diary::remote::EsaClient;

#[tokio::main]
async fn main() -> Result<()> {
    // .env first so env-backed flags see it too
    let dotenv = match dotenvy::dotenv() {
        Ok(path) => Some(path),
        Err(e) if e.not_found() => None,
        Err(e) => return Err(e).context("Failed to load .env"),
    };

    let cli = Cli::parse();
    init_tracing(&cli)?;
    if let Some(path) = dotenv {
        debug!(path = %path.display(), "loaded .env");
    }

    let mut config = Config::load(cli.config.as_deref())?;
    cli.apply(&mut config);
    let credentials = config.credentials()?;

    let client = EsaClient::from_config(&config.esa, &credentials)?;
    let reconciler = Reconciler::new(
        Arc::new(client),
        config.diary.clone(),
        config.retry.clone(),
    );

    info!(team = %credentials.team, history_limit = config.diary.history_limit, "starting session");
    esa_diary::session::run(reconciler, config.diary.history_limit).await?;
    info!("session ended");

    println!("{}", "👋 See you!".truecolor(0x7d, 0x56, 0xf4).bold());
    Ok(())
}

/// The session owns the terminal, so logs only go to a file when one is given.
fn init_tracing(cli: &Cli) -> Result<()> {
    let Some(path) = &cli.log_file else {
        return Ok(());
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let filter = if cli.verbose {
        EnvFilter::new("esa_diary=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("esa_diary=info"))
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .with(filter)
        .init();

    Ok(())
}
