//! Matrix projection.
//!
//! Keeps every header, line, and subtotal of the report as a row of a
//! rectangular table, one value per period column, along with its nesting
//! level and a totals flag. This is what a renderer needs to redraw the
//! report with its indentation.

use serde::Serialize;

use super::coerce::coerce;
use super::document::{ColumnDescriptor, ReportDocument};
use super::period::from_column_title;
use super::walker::{walk, Facet, FacetKind};
use crate::models::ColumnKey;

/// Column type of the label (account) axis.
const LABEL_COLUMN_TYPE: &str = "Account";

/// Summary label used when the summary's first cell is blank.
const DEFAULT_TOTAL_LABEL: &str = "Total";

// ============================================================================
// Output Types
// ============================================================================

/// A discovered period column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodColumn {
    /// Position of the column in the report (and of its cell in each row).
    #[serde(skip)]
    pub ordinal: usize,
    /// Month bucket (or positional fallback).
    pub key: ColumnKey,
    /// Display title as sent by the report.
    pub title: String,
}

/// One row of the projected matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRow {
    /// Row label.
    pub label: String,
    /// One value per period column; `None` for header rows.
    pub values: Vec<Option<f64>>,
    /// Nesting depth.
    pub level: usize,
    /// True for summary (subtotal/total) rows.
    pub is_total: bool,
}

/// The projected report.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportMatrix {
    /// Period columns in source order.
    pub periods: Vec<PeriodColumn>,
    /// Rows in display order.
    pub rows: Vec<NormalizedRow>,
}

impl ReportMatrix {
    /// Returns true if the matrix has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the period column titles.
    pub fn titles(&self) -> Vec<&str> {
        self.periods.iter().map(|p| p.title.as_str()).collect()
    }
}

// ============================================================================
// Projection
// ============================================================================

/// Projects `document` into a [`ReportMatrix`].
///
/// Row order follows the walker: header, own line, children, summary.
pub fn project(document: &ReportDocument) -> ReportMatrix {
    let periods = period_columns(document.columns());
    let rows = walk(document)
        .iter()
        .map(|facet| normalize(facet, &periods))
        .collect();

    ReportMatrix { periods, rows }
}

/// Discovers the period columns.
///
/// Every column whose type is not the label axis counts, in source order.
/// When no column carries a type tag, every column but the first counts.
pub fn period_columns(columns: &[ColumnDescriptor]) -> Vec<PeriodColumn> {
    let tagged = columns.iter().any(|c| !c.kind().is_empty());

    columns
        .iter()
        .enumerate()
        .filter(|(ordinal, c)| {
            if tagged {
                c.kind() != LABEL_COLUMN_TYPE
            } else {
                *ordinal > 0
            }
        })
        .enumerate()
        .map(|(i, (ordinal, c))| PeriodColumn {
            ordinal,
            key: from_column_title(c.title(), i),
            title: c.title().to_string(),
        })
        .collect()
}

fn normalize(facet: &Facet<'_>, periods: &[PeriodColumn]) -> NormalizedRow {
    match facet.kind {
        FacetKind::Header => NormalizedRow {
            label: facet.label().to_string(),
            values: vec![None; periods.len()],
            level: facet.level,
            is_total: false,
        },
        FacetKind::Data => NormalizedRow {
            label: facet.label().to_string(),
            values: values(facet, periods),
            level: facet.level,
            is_total: false,
        },
        FacetKind::Summary => {
            let label = match facet.label().trim() {
                "" => DEFAULT_TOTAL_LABEL.to_string(),
                label => label.to_string(),
            };
            NormalizedRow {
                label,
                values: values(facet, periods),
                level: facet.level,
                is_total: true,
            }
        }
    }
}

/// Coerces each period cell; missing trailing cells read as zero.
fn values(facet: &Facet<'_>, periods: &[PeriodColumn]) -> Vec<Option<f64>> {
    periods
        .iter()
        .map(|p| Some(coerce(facet.raw(p.ordinal))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PeriodKey;

    fn income_report() -> ReportDocument {
        ReportDocument::from_json(
            r#"{
            "Columns": {"Column": [
                {"ColTitle": "", "ColType": "Account"},
                {"ColTitle": "Jan 2024", "ColType": "Money"},
                {"ColTitle": "Feb 2024", "ColType": "Money"}
            ]},
            "Rows": {"Row": [{
                "Header": {"ColData": [{"value": "Income"}, {"value": ""}, {"value": ""}]},
                "Rows": {"Row": [
                    {"ColData": [{"value": "Sales"}, {"value": "100"}, {"value": "200"}], "type": "Data"}
                ]},
                "Summary": {"ColData": [{"value": "Total Income"}, {"value": "100"}, {"value": "200"}]},
                "type": "Section"
            }]}
        }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_section_projection() {
        let matrix = project(&income_report());

        assert_eq!(matrix.titles(), vec!["Jan 2024", "Feb 2024"]);
        assert_eq!(matrix.periods[0].key, ColumnKey::Period(PeriodKey::Jan));
        assert_eq!(
            matrix.rows,
            vec![
                NormalizedRow {
                    label: "Income".to_string(),
                    values: vec![None, None],
                    level: 0,
                    is_total: false,
                },
                NormalizedRow {
                    label: "Sales".to_string(),
                    values: vec![Some(100.0), Some(200.0)],
                    level: 1,
                    is_total: false,
                },
                NormalizedRow {
                    label: "Total Income".to_string(),
                    values: vec![Some(100.0), Some(200.0)],
                    level: 0,
                    is_total: true,
                },
            ]
        );
    }

    #[test]
    fn test_short_rows_are_padded_and_long_rows_truncated() {
        let doc = ReportDocument::from_json(
            r#"{
            "Columns": {"Column": [
                {"ColType": "Account"}, {"ColType": "Money"}, {"ColType": "Money"}
            ]},
            "Rows": {"Row": [
                {"ColData": [{"value": "Short"}, {"value": "1"}]},
                {"ColData": [{"value": "Long"}, {"value": "1"}, {"value": "2"}, {"value": "3"}]}
            ]}
        }"#,
        )
        .unwrap();

        let matrix = project(&doc);
        assert_eq!(matrix.rows[0].values, vec![Some(1.0), Some(0.0)]);
        assert_eq!(matrix.rows[1].values, vec![Some(1.0), Some(2.0)]);
    }

    #[test]
    fn test_blank_summary_label_defaults_to_total() {
        let doc = ReportDocument::from_json(
            r#"{
            "Columns": {"Column": [{"ColType": "Account"}, {"ColType": "Money"}]},
            "Rows": {"Row": [{"Summary": {"ColData": [{"value": ""}, {"value": "(5.00)"}]}}]}
        }"#,
        )
        .unwrap();

        let row = &project(&doc).rows[0];
        assert_eq!(row.label, "Total");
        assert_eq!(row.values, vec![Some(-5.0)]);
        assert!(row.is_total);
    }

    #[test]
    fn test_untyped_columns_skip_first() {
        let doc = ReportDocument::from_json(
            r#"{"Columns": {"Column": [
                {"ColTitle": "Account"}, {"ColTitle": "Mar"}, {"ColTitle": "Apr"}
            ]}}"#,
        )
        .unwrap();

        let periods = period_columns(doc.columns());
        assert_eq!(periods.len(), 2);
        assert_eq!(periods[0].ordinal, 1);
        assert_eq!(periods[1].key, ColumnKey::Period(PeriodKey::Apr));
    }

    #[test]
    fn test_empty_document_projects_to_empty_matrix() {
        let matrix = project(&ReportDocument::default());
        assert!(matrix.is_empty());
        assert!(matrix.periods.is_empty());
    }
}
