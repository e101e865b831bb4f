//! referral-tui - Terminal client for the hospital referral API
//!
//! Browse patients, hospitals, referrals and equipment, and file new
//! referrals from an SSH-friendly terminal UI.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use libreferral::logging::{self, LogFormat, LogTarget};
use libreferral::Config;
use referral_tui::{
    app::{event::EventHandler, reduce, AppState},
    services::ServiceHandle,
    terminal::{install_panic_hook, restore_terminal, setup_terminal, Tui},
    ui, TuiError,
};

#[derive(Parser, Debug)]
#[command(name = "referral-tui")]
#[command(about = "Terminal client for the hospital referral API", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the config file
    #[arg(short, long, env = "REFERRAL_CONFIG")]
    config: Option<PathBuf>,

    /// Override the API base URL
    #[arg(long, env = "REFERRAL_API_URL")]
    api_url: Option<String>,

    /// Minimum log level (error, warn, info, debug, trace)
    #[arg(long, env = "REFERRAL_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Log format (text, json or pretty)
    #[arg(long, env = "REFERRAL_LOG_FORMAT", default_value = "text")]
    log_format: LogFormat,

    /// Log file; the terminal owns stderr while the UI runs
    #[arg(long, env = "REFERRAL_LOG_FILE")]
    log_file: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        let code = e
            .downcast_ref::<TuiError>()
            .map(TuiError::exit_code)
            .unwrap_or(1);
        std::process::exit(code);
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load().context("Failed to load config")?,
    };

    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }

    Ok(config)
}

fn log_path(cli: &Cli) -> anyhow::Result<PathBuf> {
    match &cli.log_file {
        Some(path) => Ok(path.clone()),
        None => Ok(libreferral::config::resolve_data_path()?.join("referral-tui.log")),
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let log_file = log_path(&cli)?;
    logging::LoggingConfig::new(cli.log_format, cli.log_level.clone(), false)
        .with_target(LogTarget::File(log_file.clone()))
        .init()
        .with_context(|| format!("Failed to open log file {}", log_file.display()))?;

    let config = load_config(&cli)?;
    tracing::info!(base_url = %config.api.base_url, "Starting referral-tui");

    // Build services before touching the terminal so setup errors print normally
    let services = ServiceHandle::new(config)?;

    install_panic_hook();
    let mut terminal = setup_terminal()?;

    let result = run_app(&mut terminal, services);

    restore_terminal(terminal)?;
    tracing::info!("Exiting referral-tui");

    result.map_err(Into::into)
}

fn run_app(terminal: &mut Tui, mut services: ServiceHandle) -> referral_tui::Result<()> {
    let mut state = AppState::new();
    let event_handler = EventHandler::new(state.config.tick_rate_ms);

    loop {
        // Run whatever the last reductions queued
        for effect in state.take_effects() {
            services.dispatch(state.visit, effect);
        }
        services.cancel_stale(state.visit);

        terminal.draw(|frame| ui::render(frame, &state))?;

        let event = event_handler.next()?;
        state = reduce(state, event.into());

        for action in services.drain() {
            state = reduce(state, action);
        }

        if state.should_quit {
            break;
        }
    }

    // Dropping the handle aborts whatever is still running
    let pending = services.in_flight();
    if pending > 0 {
        tracing::debug!(pending, "Abandoning in-flight requests");
    }

    Ok(())
}
