//! Joins the report's month series with the temperature series.

use std::collections::BTreeMap;

use ledgerlens_core::{ColumnKey, PeriodKey};
use serde::Serialize;

/// One month on the combined chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    /// Month code, `Jan..Dec`.
    pub month: PeriodKey,
    /// Report value for the month.
    pub pnl: f64,
    /// Mean temperature for the month, 0 when unknown.
    pub temp: f64,
}

/// Pairs each month column of `pnl` with the temperature of the same month.
///
/// Columns that do not name a month (a trailing "Total", say) are left out.
/// Report order is kept.
pub fn join_series(
    pnl: &[(ColumnKey, f64)],
    temps: &BTreeMap<PeriodKey, f64>,
) -> Vec<ChartPoint> {
    pnl.iter()
        .filter_map(|&(key, value)| {
            let month = key.period()?;
            Some(ChartPoint {
                month,
                pnl: value,
                temp: temps.get(&month).copied().unwrap_or(0.0),
            })
        })
        .collect()
}
