//! Temps command - monthly mean temperatures.

use anyhow::Result;
use chrono::{Datelike, Local};
use clap::Args;
use ledgerlens_core::PeriodKey;
use ledgerlens_providers::TemperatureSource;
use tracing::{info, warn};

use crate::app::App;
use crate::output::{JsonFormatter, TemperatureOutput, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the temps command.
#[derive(Args)]
pub struct TempsArgs {
    /// Location (zip code, city, `lat,lon`). Defaults to the configured one.
    #[arg(long, short)]
    pub location: Option<String>,

    /// Calendar year. Defaults to the current year.
    #[arg(long, short)]
    pub year: Option<i32>,

    /// Only this month (`Mar` or `3`); the others read as zero.
    #[arg(long, short)]
    pub month: Option<PeriodKey>,
}

/// Runs the temps command.
pub async fn run(args: &TempsArgs, cli: &Cli, app: &App) -> Result<()> {
    let location = app.location(args.location.as_deref())?;
    let year = args.year.unwrap_or_else(|| Local::now().year());
    let aggregator = app.aggregator()?;

    if !aggregator.source().is_configured() {
        warn!("WEATHER_API_KEY is not set, temperatures read as zero");
    }
    info!(location = %location, year, month = ?args.month, "Fetching temperatures");

    let months = aggregator.aggregate(&location, year, args.month).await;

    let output = match cli.format {
        OutputFormat::Text => TextFormatter::new(!cli.no_color).format_months(
            &format!("Mean temperature, {location} {year}"),
            &months,
            "°F",
        ),
        OutputFormat::Json => JsonFormatter::new(cli.pretty).format(&TemperatureOutput {
            location,
            year,
            months,
        })?,
    };

    println!("{output}");
    Ok(())
}
