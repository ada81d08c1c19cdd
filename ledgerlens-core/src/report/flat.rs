//! Flat per-period aggregation.
//!
//! Two flat views are offered:
//!
//! - [`aggregate`] buckets transaction-style reports (one date column, one
//!   amount column) by the month of each row's date.
//! - [`column_totals`] sums column-by-period reports (one money column per
//!   month, e.g. a Profit and Loss summarized by month) per column.
//! - [`net_income`] reads a Profit and Loss report's own bottom line.
//!
//! Both round to cents on every addition so repeated runs are bit-stable.

use std::collections::BTreeMap;

use tracing::debug;

use super::coerce::{coerce, round_cents};
use super::document::{ColumnDescriptor, ReportDocument};
use super::matrix::period_columns;
use super::period::{from_column_title, from_date_string};
use super::walker::{walk, FacetKind};
use crate::models::{ColumnKey, PeriodKey};

/// Column types that mark the date axis.
const DATE_COLUMN_TYPES: &[&str] = &["tx_date", "Date", "date"];

/// Column types that mark the monetary axis.
const AMOUNT_COLUMN_TYPES: &[&str] = &["subt_nat_amount", "Money", "Amount", "amount"];

/// Title fragments that mark the date axis when no type matches.
const DATE_TITLE_HINTS: &[&str] = &["date"];

/// Title fragments that mark the monetary axis when no type matches.
const AMOUNT_TITLE_HINTS: &[&str] = &["amount", "total"];

/// Row group of the bottom-line row in a Profit and Loss report.
const NET_INCOME_GROUP: &str = "NetIncome";

/// Sums every facet's amount into the month of its date.
///
/// Returns an empty map when the date or amount column cannot be located.
/// Facets whose date does not parse (headers, summaries, blank dates) are
/// skipped rather than zero-filled.
pub fn aggregate(document: &ReportDocument) -> BTreeMap<PeriodKey, f64> {
    let columns = document.columns();
    let (Some(date_idx), Some(amount_idx)) = (
        locate(columns, DATE_COLUMN_TYPES, DATE_TITLE_HINTS),
        locate(columns, AMOUNT_COLUMN_TYPES, AMOUNT_TITLE_HINTS),
    ) else {
        debug!(columns = columns.len(), "No date/amount axis, nothing to aggregate");
        return BTreeMap::new();
    };

    let mut totals = BTreeMap::new();
    let mut skipped = 0usize;

    for facet in walk(document) {
        let Some(period) = facet.raw(date_idx).and_then(from_date_string) else {
            skipped += 1;
            continue;
        };
        let amount = coerce(facet.raw(amount_idx));
        let bucket = totals.entry(period).or_insert(0.0);
        *bucket = round_cents(*bucket + amount);
    }

    debug!(buckets = totals.len(), skipped, "Aggregated report by date");
    totals
}

/// Sums the data rows of a column-by-period report, per period column.
///
/// Headers and summaries are left out so section subtotals are not counted
/// twice. Columns are keyed with [`from_column_title`]; the result keeps
/// source column order.
pub fn column_totals(document: &ReportDocument) -> Vec<(ColumnKey, f64)> {
    let periods = period_columns(document.columns());
    let mut totals = vec![0.0_f64; periods.len()];

    for facet in walk(document).into_iter().filter(|f| f.kind == FacetKind::Data) {
        for (slot, column) in totals.iter_mut().zip(&periods) {
            *slot = round_cents(*slot + coerce(facet.raw(column.ordinal)));
        }
    }

    periods
        .iter()
        .enumerate()
        .map(|(i, column)| (from_column_title(&column.title, i), totals[i]))
        .collect()
}

/// Reads the report's own net income line, per period column.
///
/// Profit and Loss reports end with a summary-only row grouped as
/// `NetIncome`. Returns `None` when the report has no such row.
pub fn net_income(document: &ReportDocument) -> Option<Vec<(ColumnKey, f64)>> {
    let row = document
        .rows()
        .iter()
        .find(|r| r.group.as_deref() == Some(NET_INCOME_GROUP))?;
    let cells = row.summary_cells()?;
    let periods = period_columns(document.columns());

    Some(
        periods
            .iter()
            .enumerate()
            .map(|(i, column)| {
                let raw = cells.get(column.ordinal).and_then(|c| c.value.as_deref());
                (from_column_title(&column.title, i), round_cents(coerce(raw)))
            })
            .collect(),
    )
}

/// Finds the axis column: exact type (or `ColKey` metadata) match first,
/// then a title substring.
fn locate(columns: &[ColumnDescriptor], types: &[&str], title_hints: &[&str]) -> Option<usize> {
    columns
        .iter()
        .position(|c| {
            types.contains(&c.kind()) || c.meta("ColKey").is_some_and(|k| types.contains(&k))
        })
        .or_else(|| {
            columns.iter().position(|c| {
                let title = c.title().to_lowercase();
                title_hints.iter().any(|hint| title.contains(hint))
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transactions() -> ReportDocument {
        ReportDocument::from_json(
            r#"{
            "Columns": {"Column": [
                {"ColTitle": "Date", "ColType": "tx_date"},
                {"ColTitle": "Transaction Type", "ColType": "txn_type"},
                {"ColTitle": "Amount", "ColType": "subt_nat_amount"}
            ]},
            "Rows": {"Row": [
                {"ColData": [{"value": "2024-01-05"}, {"value": "Invoice"}, {"value": "1,000.10"}]},
                {"ColData": [{"value": "2024-01-20"}, {"value": "Invoice"}, {"value": "0.20"}]},
                {"ColData": [{"value": "02/03/2024"}, {"value": "Expense"}, {"value": "(250.00)"}]},
                {"ColData": [{"value": "not a date"}, {"value": "Invoice"}, {"value": "999"}]},
                {"Summary": {"ColData": [{"value": "Total"}, {"value": ""}, {"value": "750.30"}]}}
            ]}
        }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_aggregate_buckets_by_month() {
        let totals = aggregate(&transactions());
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[&PeriodKey::Jan], 1000.30);
        assert_eq!(totals[&PeriodKey::Feb], -250.0);
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let doc = transactions();
        assert_eq!(aggregate(&doc), aggregate(&doc));
    }

    #[test]
    fn test_aggregate_without_axes_is_empty() {
        let doc = ReportDocument::from_json(
            r#"{
            "Columns": {"Column": [{"ColTitle": "Name", "ColType": "Account"}]},
            "Rows": {"Row": [{"ColData": [{"value": "Sales"}]}]}
        }"#,
        )
        .unwrap();
        assert!(aggregate(&doc).is_empty());
        assert!(aggregate(&ReportDocument::default()).is_empty());
    }

    #[test]
    fn test_aggregate_title_fallback() {
        let doc = ReportDocument::from_json(
            r#"{
            "Columns": {"Column": [
                {"ColTitle": "Posting Date"},
                {"ColTitle": "Open Balance Amount"}
            ]},
            "Rows": {"Row": [
                {"ColData": [{"value": "2024-06-01"}, {"value": "12.5"}]},
                {"ColData": [{"value": "2024-06-30"}]}
            ]}
        }"#,
        )
        .unwrap();
        let totals = aggregate(&doc);
        assert_eq!(totals[&PeriodKey::Jun], 12.5);
    }

    #[test]
    fn test_column_totals_sum_data_rows_only() {
        let doc = ReportDocument::from_json(
            r#"{
            "Columns": {"Column": [
                {"ColTitle": "", "ColType": "Account"},
                {"ColTitle": "Jan 2024", "ColType": "Money"},
                {"ColTitle": "Feb 2024", "ColType": "Money"},
                {"ColTitle": "Total", "ColType": "Money"}
            ]},
            "Rows": {"Row": [{
                "Header": {"ColData": [{"value": "Income"}]},
                "Rows": {"Row": [
                    {"ColData": [{"value": "Sales"}, {"value": "100.00"}, {"value": "200.00"}, {"value": "300.00"}]},
                    {"ColData": [{"value": "Refunds"}, {"value": "(10.00)"}, {"value": ""}, {"value": "(10.00)"}]}
                ]},
                "Summary": {"ColData": [{"value": "Total Income"}, {"value": "90.00"}, {"value": "200.00"}, {"value": "290.00"}]}
            }]}
        }"#,
        )
        .unwrap();

        let totals = column_totals(&doc);
        assert_eq!(
            totals,
            vec![
                (ColumnKey::Period(PeriodKey::Jan), 90.0),
                (ColumnKey::Period(PeriodKey::Feb), 200.0),
                (ColumnKey::Positional(3), 290.0),
            ]
        );
    }
}
