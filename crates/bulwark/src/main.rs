//! # Bulwark - Login Defense Simulator
//!
//! Demonstrates common authentication throttling strategies and a scripted
//! brute-force attacker that has to live with them.
//!
//! ## Architecture
//! ```text
//! Attacker / manual session
//!            ↓
//!      DefenseEngine ──► users.json
//!   (CAPTCHA gate → lockout → unknown user → rate limit → digest)
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod attack;
mod candidates;
mod captcha;
mod clock;
mod config;
mod console;
mod digest;
mod engine;
mod report;
mod seed;
mod session;
mod state;
mod store;
mod wait;

use attack::BruteForceAttack;
use bulwark_common::EventCategory;
use candidates::FileCandidates;
use captcha::AutoSolver;
use config::AppConfig;
use report::{ConsoleSummary, JsonReportSink, ReportSink};
use state::AppState;

/// Bulwark - login throttling simulator
#[derive(Parser, Debug)]
#[command(name = "bulwark")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/bulwark.toml")]
    config: String,

    /// User store path (overrides config)
    #[arg(long, env = "BULWARK_USERS_FILE")]
    users_file: Option<PathBuf>,

    /// Candidate password list path (overrides config)
    #[arg(long, env = "BULWARK_PASSWORD_LIST")]
    password_list: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "LOG_LEVEL")]
    log_level: String,

    /// Enable JSON logging output
    #[arg(long, default_value = "false")]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in by hand
    Login,

    /// Brute-force a username with the candidate list
    Attack {
        /// Username to attack
        target: String,

        /// Answer CAPTCHAs automatically instead of prompting
        #[arg(long)]
        auto_solve: bool,

        /// Write the attack timelines to this JSON file
        #[arg(long)]
        report: Option<PathBuf>,

        /// Hide countdown bars
        #[arg(long)]
        quiet: bool,
    },

    /// Create the default user store and password list if missing
    Seed,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(&args.log_level, args.json_logs)?;

    info!("Starting Bulwark v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = AppConfig::load(&args.config, &args)?;

    seed::ensure_defaults(&config.files.users_file, &config.files.password_list)?;
    if let Command::Seed = args.command {
        info!(category = %EventCategory::Info, "Defaults in place");
        return Ok(());
    }

    // Ctrl-C cancels any countdown or prompt in progress
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received");
            let _ = shutdown_tx.send(true);
        }
    });

    let mut state = AppState::new(config, shutdown_rx);

    match args.command {
        Command::Login => {
            let mut waiter = state.waiter();
            let mut console = state.console();
            session::manual_login(&mut state.engine, &mut console, &mut waiter, true)
                .await
                .context("Login session failed")?;
        }
        Command::Attack {
            target,
            auto_solve,
            report,
            quiet,
        } => {
            let source = FileCandidates::new(state.config.files.password_list.clone());
            let settings = state.attack_settings(!quiet);
            let waiter = state.waiter();
            let console = state.console();
            let json_report = report.is_some();

            let mut sink: Box<dyn ReportSink> = match report {
                Some(path) => Box::new(JsonReportSink::new(path)),
                None => Box::new(ConsoleSummary),
            };

            let result = if auto_solve {
                BruteForceAttack::new(&mut state.engine, waiter, AutoSolver, settings)
                    .simulate_attack(&target, &source, sink.as_mut())
                    .await
            } else {
                BruteForceAttack::new(&mut state.engine, waiter, console, settings)
                    .simulate_attack(&target, &source, sink.as_mut())
                    .await
            };

            match result {
                Ok(report) if json_report => print!("{}", ConsoleSummary::render(&report)),
                Ok(_) => {}
                Err(e) if e.is_recoverable() => {
                    error!(category = %EventCategory::Error, error = %e, "Attack aborted");
                }
                Err(e) => return Err(e).context("Attack failed"),
            }
        }
        Command::Seed => {}
    }

    info!(category = %EventCategory::Info, "Program terminated");

    if state.shutdown_requested() {
        // The blocking stdin reader would otherwise hold up runtime shutdown.
        std::process::exit(130);
    }
    Ok(())
}

/// Initialize structured logging with tracing
fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false))
            .init();
    }

    Ok(())
}
