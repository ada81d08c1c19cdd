// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! `LedgerLens` CLI - accounting reports with a temperature overlay.
//!
//! # Examples
//!
//! ```bash
//! # Authorize once
//! ledgerlens auth url
//! ledgerlens auth exchange --code <code> --realm-id 4620816365
//!
//! # Profit and loss for the trailing year, row hierarchy kept
//! ledgerlens report
//!
//! # Same report bucketed by month, as JSON
//! ledgerlens report flat --format json --pretty
//!
//! # Monthly mean temperatures
//! ledgerlens temps --location 78701 --year 2024
//!
//! # Net income next to temperature, month by month
//! ledgerlens chart --location 78701
//! ```

mod app;
mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use ledgerlens_fetch::FetchError;
use ledgerlens_store::{LogLevel, StoreError};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{auth, chart, config, report, temps};

// ============================================================================
// CLI Definition
// ============================================================================

/// `LedgerLens` CLI - accounting reports with a temperature overlay.
#[derive(Parser)]
#[command(name = "ledgerlens")]
#[command(about = "QuickBooks reports, normalized, with monthly temperatures")]
#[command(long_about = r"
LedgerLens fetches QuickBooks Online reports, normalizes them into month
buckets or a row matrix, and lines them up with monthly mean temperatures.

Configuration comes from settings.json in the config dir, overridden by
QB_ENV, QB_CLIENT_ID, QB_CLIENT_SECRET, QB_REDIRECT_URI, QB_MINOR_VERSION,
QB_SCOPE and WEATHER_API_KEY (a .env file is honored).

Examples:
  ledgerlens auth url                  # Consent page URL
  ledgerlens report                    # P&L matrix, trailing year
  ledgerlens report flat -f json       # Month buckets as JSON
  ledgerlens temps -l 78701            # Monthly mean temperatures
  ledgerlens chart -l 78701            # Net income vs temperature
")]
#[command(version)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Credential context (defaults to the configured one).
    #[arg(long, global = true)]
    pub context: Option<String>,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (no logging, no error text).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Fetch and normalize a report.
    #[command(visible_alias = "r")]
    Report(report::ReportArgs),

    /// Show monthly mean temperatures.
    #[command(visible_alias = "t")]
    Temps(temps::TempsArgs),

    /// Show the monthly report series next to temperatures.
    #[command(visible_alias = "c")]
    Chart(chart::ChartArgs),

    /// Manage QuickBooks authorization.
    Auth(auth::AuthArgs),

    /// Manage configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// Stored authorization is missing or no longer usable.
    AuthRequired = 2,
    /// Settings are missing or invalid.
    ConfigError = 3,
}

impl ExitCode {
    /// Picks the exit code for a failed command.
    pub fn for_error(error: &anyhow::Error) -> Self {
        if let Some(fetch) = error.downcast_ref::<FetchError>() {
            if fetch.requires_reauthentication() {
                return ExitCode::AuthRequired;
            }
            if matches!(fetch, FetchError::Config(_)) {
                return ExitCode::ConfigError;
            }
        }
        if matches!(
            error.downcast_ref::<StoreError>(),
            Some(StoreError::Config(_) | StoreError::Parse(_))
        ) {
            return ExitCode::ConfigError;
        }
        ExitCode::Error
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool, level: LogLevel) {
    if quiet {
        return;
    }

    let filter = if verbose {
        EnvFilter::new("ledgerlens=debug,info")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("ledgerlens={level}")))
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = app::App::load(cli.context.as_deref()).await;
    let level = loaded
        .as_ref()
        .map_or(LogLevel::default(), |a| a.settings.log_level);
    setup_logging(cli.verbose, cli.quiet, level);

    let result = match loaded {
        Ok(app) => run(&cli, &app).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        let code = ExitCode::for_error(&e);
        if !cli.quiet {
            eprintln!("Error: {e:#}");
            if code == ExitCode::AuthRequired {
                eprintln!("Run `ledgerlens auth url` and `ledgerlens auth exchange` to authorize again.");
            }
        }
        std::process::exit(code as i32);
    }
}

async fn run(cli: &Cli, app: &app::App) -> Result<()> {
    match &cli.command {
        Commands::Report(args) => report::run(args, cli, app).await,
        Commands::Temps(args) => temps::run(args, cli, app).await,
        Commands::Chart(args) => chart::run(args, cli, app).await,
        Commands::Auth(args) => auth::run(args, cli, app).await,
        Commands::Config(args) => config::run(args, cli, app).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_exit_codes() {
        let auth = anyhow::Error::new(FetchError::NotAuthenticated("x".into()));
        assert_eq!(ExitCode::for_error(&auth), ExitCode::AuthRequired);

        let refresh = anyhow::Error::new(FetchError::RefreshFailed("x".into()));
        assert_eq!(ExitCode::for_error(&refresh), ExitCode::AuthRequired);

        let config = anyhow::Error::new(FetchError::Config("x".into()));
        assert_eq!(ExitCode::for_error(&config), ExitCode::ConfigError);

        let store = anyhow::Error::new(StoreError::Config("x".into()));
        assert_eq!(ExitCode::for_error(&store), ExitCode::ConfigError);

        let status = anyhow::Error::new(FetchError::Status {
            status: 500,
            body: String::new(),
        });
        assert_eq!(ExitCode::for_error(&status), ExitCode::Error);
        assert_eq!(ExitCode::Success as i32, 0);
    }

    #[test]
    fn test_report_args() {
        let cli = Cli::try_parse_from([
            "ledgerlens",
            "report",
            "flat",
            "--type",
            "balance_sheet",
            "--start",
            "2024-01-01",
            "--end",
            "2024-12-31",
            "--param",
            "accounting_method=Cash",
            "-f",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.format, OutputFormat::Json);
        let Commands::Report(args) = cli.command else {
            panic!("expected report");
        };
        assert_eq!(args.view, report::ReportView::Flat);
        assert_eq!(args.params, vec!["accounting_method=Cash".to_string()]);
    }
}
