//! Report command - fetch and normalize a QuickBooks report.

use anyhow::{Result, bail};
use chrono::{Days, Local, NaiveDate};
use clap::{Args, ValueEnum};
use ledgerlens_providers::{ReportRequest, ReportType};
use tracing::info;

use crate::app::App;
use crate::output::{JsonFormatter, TextFormatter, columns_output};
use crate::{Cli, OutputFormat};

/// How the report is shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum ReportView {
    /// Per-month sums of every dated row.
    Flat,
    /// Row hierarchy with one value per period column.
    #[default]
    Matrix,
    /// One value per period column (net income when the report has it).
    Columns,
}

/// Arguments for the report command.
#[derive(Args)]
pub struct ReportArgs {
    /// Output shape.
    #[arg(value_enum, default_value_t = ReportView::Matrix)]
    pub view: ReportView,

    /// Report type, e.g. `profit_and_loss`, `BalanceSheet`, `cash-flow`.
    #[arg(long = "type", short = 't', default_value = "ProfitAndLoss")]
    pub report_type: ReportType,

    /// First day (YYYY-MM-DD). Defaults to 365 days before the end.
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last day (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Extra report parameter as `name=value`; repeatable.
    #[arg(long = "param", short = 'p', value_name = "NAME=VALUE")]
    pub params: Vec<String>,
}

/// Runs the report command.
pub async fn run(args: &ReportArgs, cli: &Cli, app: &App) -> Result<()> {
    let request = build_request(args, Local::now().date_naive())?;
    info!(
        report = %request.report_type,
        start = %request.start_date,
        end = %request.end_date,
        view = ?args.view,
        "Running report"
    );

    let service = app.report_service()?;
    let json = JsonFormatter::new(cli.pretty);
    let text = TextFormatter::new(!cli.no_color);

    let output = match args.view {
        ReportView::Flat => {
            let values = service.flat(&request).await?;
            match cli.format {
                OutputFormat::Text => {
                    text.format_months(&request.report_type.to_string(), &values, "")
                }
                OutputFormat::Json => json.format(&values)?,
            }
        }
        ReportView::Matrix => {
            let matrix = service.matrix(&request).await?;
            match cli.format {
                OutputFormat::Text => text.format_matrix(&matrix),
                OutputFormat::Json => json.format(&matrix)?,
            }
        }
        ReportView::Columns => {
            let series = service.column_series(&request).await?;
            match cli.format {
                OutputFormat::Text => {
                    text.format_columns(&request.report_type.to_string(), &series)
                }
                OutputFormat::Json => json.format(&columns_output(&series))?,
            }
        }
    };

    println!("{output}");
    Ok(())
}

/// Resolves the date window and parameters.
pub fn build_request(args: &ReportArgs, today: NaiveDate) -> Result<ReportRequest> {
    let mut request = match (args.start, args.end) {
        (None, None) => ReportRequest::trailing_year(args.report_type, today),
        (start, end) => {
            let end = end.unwrap_or(today);
            let start = match start {
                Some(start) => start,
                None => end
                    .checked_sub_days(Days::new(365))
                    .unwrap_or(NaiveDate::MIN),
            };
            ReportRequest::new(args.report_type, start, end)
        }
    };

    if request.start_date > request.end_date {
        bail!(
            "start date {} is after end date {}",
            request.start_date,
            request.end_date
        );
    }

    for param in &args.params {
        let Some((name, value)) = param.split_once('=') else {
            bail!("report parameter must look like name=value, got '{param}'");
        };
        let name = name.trim();
        if name.is_empty() {
            bail!("report parameter name is empty in '{param}'");
        }
        request = request.with_param(name, value.trim());
    }

    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn args(start: Option<NaiveDate>, end: Option<NaiveDate>, params: &[&str]) -> ReportArgs {
        ReportArgs {
            view: ReportView::Flat,
            report_type: ReportType::ProfitAndLoss,
            start,
            end,
            params: params.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn test_default_window_is_trailing_year() {
        let today = date(2024, 6, 15);
        let request = build_request(&args(None, None, &[]), today).unwrap();
        assert_eq!(request.end_date, today);
        assert_eq!(request.start_date, date(2023, 6, 16));
    }

    #[test]
    fn test_end_only_window() {
        let request = build_request(&args(None, Some(date(2024, 12, 31)), &[]), date(2025, 3, 1))
            .unwrap();
        assert_eq!(request.start_date, date(2024, 1, 1));
    }

    #[test]
    fn test_inverted_window_is_rejected() {
        let result = build_request(
            &args(Some(date(2024, 5, 1)), Some(date(2024, 4, 1)), &[]),
            date(2024, 6, 1),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_params() {
        let request = build_request(
            &args(None, None, &["accounting_method=Cash", "customer = 42"]),
            date(2024, 6, 1),
        )
        .unwrap();
        let query = request.query("75");
        assert!(query.contains(&("accounting_method", "Cash".to_string())));
        assert!(query.contains(&("customer", "42".to_string())));

        assert!(build_request(&args(None, None, &["nope"]), date(2024, 6, 1)).is_err());
        assert!(build_request(&args(None, None, &["=x"]), date(2024, 6, 1)).is_err());
    }
}
