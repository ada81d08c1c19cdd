//! Text output formatting with optional colors.

use std::collections::BTreeMap;

use chrono::{DateTime, Local, Utc};
use ledgerlens_core::report::ReportMatrix;
use ledgerlens_core::{ColumnKey, CredentialState, PeriodKey};
use ledgerlens_providers::ChartPoint;
use ledgerlens_store::Settings;

use super::json::AuthStatusOutput;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

// Bar characters
const BAR_FULL: char = '█';
const BAR_EMPTY: char = '░';

/// Widest label column in the matrix view.
const MAX_LABEL_WIDTH: usize = 40;

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
    bar_width: usize,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self {
            use_colors,
            bar_width: 20,
        }
    }

    // ========================================================================
    // Reports
    // ========================================================================

    /// Formats a 12-month map, one line per month.
    pub fn format_months(
        &self,
        title: &str,
        values: &BTreeMap<PeriodKey, f64>,
        unit: &str,
    ) -> String {
        let mut lines = vec![self.bold(title), "─".repeat(40)];

        for (month, value) in values {
            let number = format!("{:>16}", format!("{}{unit}", format_amount(*value)));
            lines.push(format!("{:<5} {}", month.code(), self.signed(*value, &number)));
        }

        let total: f64 = values.values().sum();
        if unit.is_empty() {
            lines.push("─".repeat(40));
            let total = format!("{:>16}", format_amount(total));
            lines.push(format!("{:<5} {}", "Total", self.bold(&total)));
        }

        lines.join("\n")
    }

    /// Formats a column series, one line per column.
    pub fn format_columns(&self, title: &str, series: &[(ColumnKey, f64)]) -> String {
        let mut lines = vec![self.bold(title), "─".repeat(40)];
        if series.is_empty() {
            lines.push(self.dim("No period columns"));
        }
        for (key, value) in series {
            let number = format!("{:>16}", format_amount(*value));
            lines.push(format!("{:<5} {}", key.to_string(), self.signed(*value, &number)));
        }
        lines.join("\n")
    }

    /// Formats the row matrix as an indented table.
    pub fn format_matrix(&self, matrix: &ReportMatrix) -> String {
        if matrix.is_empty() {
            return self.dim("Report has no rows");
        }

        let label_width = matrix
            .rows
            .iter()
            .map(|r| r.level * 2 + r.label.chars().count())
            .max()
            .unwrap_or(0)
            .clamp(8, MAX_LABEL_WIDTH);
        let cell_width = matrix
            .periods
            .iter()
            .map(|p| p.title.chars().count())
            .max()
            .unwrap_or(0)
            .max(12);

        let mut header = format!("{:<label_width$}", "");
        for period in &matrix.periods {
            header.push_str(&format!(" {:>cell_width$}", period.title));
        }
        let rule = "─".repeat(label_width + (cell_width + 1) * matrix.periods.len());

        let mut lines = vec![self.bold(&header), rule];
        for row in &matrix.rows {
            let label = truncate(&format!("{}{}", "  ".repeat(row.level), row.label), label_width);
            let mut line = format!("{label:<label_width$}");
            for value in &row.values {
                let cell = match value {
                    Some(v) => format!(" {:>cell_width$}", format_amount(*v)),
                    None => format!(" {:>cell_width$}", ""),
                };
                line.push_str(&cell);
            }
            lines.push(if row.is_total { self.bold(&line) } else { line });
        }

        lines.join("\n")
    }

    /// Formats the combined chart with a temperature bar per month.
    pub fn format_chart(&self, title: &str, points: &[ChartPoint]) -> String {
        let mut lines = vec![
            self.bold(title),
            "─".repeat(40 + self.bar_width),
            format!("{:<5} {:>16} {:>8}", "Month", "Amount", "Temp"),
        ];
        if points.is_empty() {
            lines.push(self.dim("No month columns in the report"));
        }

        let max_temp = points.iter().map(|p| p.temp).fold(0.0_f64, f64::max);
        for point in points {
            let amount = format!("{:>16}", format_amount(point.pnl));
            lines.push(format!(
                "{:<5} {} {:>6.1}°F {}",
                point.month.code(),
                self.signed(point.pnl, &amount),
                point.temp,
                self.cyan(&self.bar(point.temp, max_temp))
            ));
        }

        lines.join("\n")
    }

    /// A horizontal bar for `value` scaled against `max`.
    pub fn bar(&self, value: f64, max: f64) -> String {
        let ratio = if max > 0.0 { (value / max).clamp(0.0, 1.0) } else { 0.0 };
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let filled = (ratio * self.bar_width as f64).round() as usize;
        let empty = self.bar_width.saturating_sub(filled);
        format!(
            "{}{}",
            BAR_FULL.to_string().repeat(filled),
            BAR_EMPTY.to_string().repeat(empty)
        )
    }

    // ========================================================================
    // Auth and settings
    // ========================================================================

    /// Formats the stored credential summary.
    pub fn format_auth_status(&self, status: &AuthStatusOutput) -> String {
        let state = status.state.to_string();
        let state = match status.state {
            CredentialState::Valid => self.green(&state),
            CredentialState::Expired => self.yellow(&state),
            CredentialState::Missing => self.red(&state),
        };

        let mut lines = vec![
            format!("Context:  {}", self.bold(&status.context)),
            format!("State:    {state}"),
        ];
        if let Some(realm) = &status.realm_id {
            lines.push(format!("Realm:    {realm}"));
        }
        if let Some(expires) = status.expires_at {
            let remaining = status.seconds_remaining.unwrap_or(0);
            lines.push(format!(
                "Expires:  {} ({})",
                format_local(expires),
                format_duration(remaining)
            ));
        }
        if let Some(refresh) = status.refresh_expires_at {
            lines.push(format!("Re-auth:  by {}", format_local(refresh)));
        }
        lines.join("\n")
    }

    /// Formats settings; secrets are expected to be redacted already.
    pub fn format_settings(&self, settings: &Settings) -> String {
        let show = |value: &Option<String>| value.clone().unwrap_or_else(|| self.dim("(not set)"));

        let lines = vec![
            self.bold("LedgerLens Configuration"),
            "─".repeat(40),
            String::new(),
            format!("Environment:        {}", settings.environment),
            format!("Client id:          {}", show(&settings.client_id)),
            format!("Client secret:      {}", show(&settings.client_secret)),
            format!("Redirect URI:       {}", show(&settings.redirect_uri)),
            format!("Scope:              {}", show(&settings.scope)),
            format!("Minor version:      {}", show(&settings.minor_version)),
            format!("Context:            {}", settings.context),
            format!("Credential backend: {}", settings.credential_backend),
            String::new(),
            format!("Weather API key:    {}", show(&settings.weather_api_key)),
            format!("Default location:   {}", show(&settings.default_location)),
            format!("Concurrency:        {}", settings.weather_concurrency),
            format!("Synthetic fallback: {}", settings.synthetic_fallback),
            format!("Log level:          {}", settings.log_level),
        ];
        lines.join("\n")
    }

    // ========================================================================
    // Color/style helpers
    // ========================================================================

    fn signed(&self, value: f64, text: &str) -> String {
        if value < 0.0 { self.red(text) } else { text.to_string() }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.use_colors {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }

    fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }
}

// ============================================================================
// Number and time helpers
// ============================================================================

/// Two decimals with thousands separators: `-1,234.50`.
pub fn format_amount(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::new();
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if value < 0.0 && formatted != "0.00" { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}

/// Compact duration: `2d 3h`, `45m`, `expired`.
pub fn format_duration(seconds: i64) -> String {
    if seconds <= 0 {
        return "expired".to_string();
    }
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let minutes = (seconds % 3_600) / 60;

    if days > 0 {
        format!("{days}d {hours}h")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{}m", minutes.max(1))
    }
}

fn format_local(instant: DateTime<Utc>) -> String {
    instant
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

// ============================================================================
// Tests
// ============================================================================
