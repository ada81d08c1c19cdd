//! Chart command - the monthly report series next to temperatures.
//!
//! Covers one calendar year so each month column lines up with that year's
//! temperature for the same month.

use anyhow::Result;
use chrono::{Datelike, Local, NaiveDate};
use clap::Args;
use ledgerlens_providers::{ReportRequest, ReportType, join_series};
use tracing::info;

use crate::app::App;
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the chart command.
#[derive(Args)]
pub struct ChartArgs {
    /// Location (zip code, city, `lat,lon`). Defaults to the configured one.
    #[arg(long, short)]
    pub location: Option<String>,

    /// Calendar year. Defaults to the current year.
    #[arg(long, short)]
    pub year: Option<i32>,

    /// Report type to chart.
    #[arg(long = "type", short = 't', default_value = "ProfitAndLoss")]
    pub report_type: ReportType,
}

/// Runs the chart command.
pub async fn run(args: &ChartArgs, cli: &Cli, app: &App) -> Result<()> {
    let location = app.location(args.location.as_deref())?;
    let today = Local::now().date_naive();
    let year = args.year.unwrap_or_else(|| today.year());
    let request = year_request(args.report_type, year, today)?;

    info!(location = %location, year, report = %args.report_type, "Building chart");

    let service = app.report_service()?;
    let aggregator = app.aggregator()?;

    // Both sides run concurrently; the report error wins.
    let (series, temps) = tokio::join!(
        service.column_series(&request),
        aggregator.aggregate(&location, year, None)
    );
    let points = join_series(&series?, &temps);

    let title = format!("{} vs temperature, {location} {year}", args.report_type);
    let output = match cli.format {
        OutputFormat::Text => TextFormatter::new(!cli.no_color).format_chart(&title, &points),
        OutputFormat::Json => JsonFormatter::new(cli.pretty).format(&points)?,
    };

    println!("{output}");
    Ok(())
}

/// January 1st through December 31st of `year`, cut at `today`.
fn year_request(report_type: ReportType, year: i32, today: NaiveDate) -> Result<ReportRequest> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1)
        .ok_or_else(|| anyhow::anyhow!("year {year} is out of range"))?;
    let end = NaiveDate::from_ymd_opt(year, 12, 31)
        .ok_or_else(|| anyhow::anyhow!("year {year} is out of range"))?
        .min(today);
    if end < start {
        anyhow::bail!("year {year} has not started yet");
    }
    Ok(ReportRequest::new(report_type, start, end))
}
