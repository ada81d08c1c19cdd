//! Upstream report document shape.
//!
//! Mirrors the accounting API's report JSON:
//!
//! ```json
//! {
//!   "Header": { "ReportName": "ProfitAndLoss", "StartPeriod": "2024-01-01" },
//!   "Columns": { "Column": [ { "ColTitle": "", "ColType": "Account" } ] },
//!   "Rows": { "Row": [
//!     { "Header":  { "ColData": [ { "value": "Income" } ] },
//!       "Rows":    { "Row": [ { "ColData": [ { "value": "Sales" }, { "value": "100.00" } ] } ] },
//!       "Summary": { "ColData": [ { "value": "Total Income" }, { "value": "100.00" } ] } }
//!   ] }
//! }
//! ```
//!
//! Every section is optional and tolerated as `null`; the normalizers treat
//! missing pieces as "no data" rather than as errors. A section of the wrong
//! JSON type reads as absent, a malformed list entry reads as an empty one,
//! and numeric cell values are kept as their text.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::CoreError;

// ============================================================================
// Document
// ============================================================================

/// A report as returned by the upstream API.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReportDocument {
    /// Report metadata.
    #[serde(default, deserialize_with = "lenient")]
    pub header: Option<ReportHeader>,
    /// Column descriptors.
    #[serde(default, deserialize_with = "lenient")]
    pub columns: Option<ColumnList>,
    /// Top-level rows.
    #[serde(default, deserialize_with = "lenient")]
    pub rows: Option<RowList>,
}

impl ReportDocument {
    /// Parses a report from its JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Serialization`] if the text is not a JSON object.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Returns the column descriptors in source order.
    pub fn columns(&self) -> &[ColumnDescriptor] {
        self.columns
            .as_ref()
            .and_then(|c| c.column.as_deref())
            .unwrap_or_default()
    }

    /// Returns the top-level rows.
    pub fn rows(&self) -> &[ReportRow] {
        self.rows.as_ref().map(RowList::rows).unwrap_or_default()
    }
}

/// Report metadata block.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReportHeader {
    /// Report name, e.g. "ProfitAndLoss".
    #[serde(default, deserialize_with = "lenient_text")]
    pub report_name: Option<String>,
    /// First day covered.
    #[serde(default, deserialize_with = "lenient_text")]
    pub start_period: Option<String>,
    /// Last day covered.
    #[serde(default, deserialize_with = "lenient_text")]
    pub end_period: Option<String>,
    /// Reporting currency.
    #[serde(default, deserialize_with = "lenient_text")]
    pub currency: Option<String>,
    /// Column summarization, e.g. "Month".
    #[serde(default, deserialize_with = "lenient_text")]
    pub summarize_columns_by: Option<String>,
}

// ============================================================================
// Columns
// ============================================================================

/// Wrapper around the column list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ColumnList {
    /// Columns in ordinal order.
    #[serde(default, deserialize_with = "lenient_list")]
    pub column: Option<Vec<ColumnDescriptor>>,
}

/// One column of the report. Its ordinal is its index in the column list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ColumnDescriptor {
    /// Display title, e.g. "Jan 2024".
    #[serde(default, deserialize_with = "lenient_text")]
    pub col_title: Option<String>,
    /// Type tag, e.g. "Account", "Money", "tx_date".
    #[serde(default, deserialize_with = "lenient_text")]
    pub col_type: Option<String>,
    /// Extra name/value pairs.
    #[serde(default, deserialize_with = "lenient_list")]
    pub meta_data: Option<Vec<MetaData>>,
}

impl ColumnDescriptor {
    /// Returns the title, or "" when absent.
    pub fn title(&self) -> &str {
        self.col_title.as_deref().unwrap_or_default()
    }

    /// Returns the type tag, or "" when absent.
    pub fn kind(&self) -> &str {
        self.col_type.as_deref().unwrap_or_default()
    }

    /// Looks up a metadata value by name.
    pub fn meta(&self, name: &str) -> Option<&str> {
        self.meta_data
            .as_deref()?
            .iter()
            .find(|m| m.name.as_deref() == Some(name))
            .and_then(|m| m.value.as_deref())
    }
}

/// Column metadata entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MetaData {
    /// Entry name, e.g. "ColKey" or "StartDate".
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    /// Entry value.
    #[serde(default, deserialize_with = "lenient_text")]
    pub value: Option<String>,
}

// ============================================================================
// Rows
// ============================================================================

/// Wrapper around a row list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RowList {
    /// Rows in display order.
    #[serde(default, deserialize_with = "lenient_list")]
    pub row: Option<Vec<ReportRow>>,
}

impl RowList {
    /// Returns the rows, or an empty slice.
    pub fn rows(&self) -> &[ReportRow] {
        self.row.as_deref().unwrap_or_default()
    }
}

/// A report row.
///
/// A row may carry any combination of a header, its own cells, nested
/// children, and a trailing summary. Section rows usually have header,
/// children, and summary; data rows only have cells.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReportRow {
    /// Section header.
    #[serde(default, deserialize_with = "lenient")]
    pub header: Option<CellGroup>,
    /// The row's own cells.
    #[serde(default, deserialize_with = "lenient_list")]
    pub col_data: Option<Vec<Cell>>,
    /// Nested rows.
    #[serde(default, deserialize_with = "lenient")]
    pub rows: Option<RowList>,
    /// Section summary (subtotal).
    #[serde(default, deserialize_with = "lenient")]
    pub summary: Option<CellGroup>,
    /// Row type tag ("Section", "Data").
    #[serde(default, rename = "type", deserialize_with = "lenient_text")]
    pub row_type: Option<String>,
    /// Group tag, e.g. "Income" or "NetIncome".
    #[serde(default, deserialize_with = "lenient_text")]
    pub group: Option<String>,
}

impl ReportRow {
    /// Header cells, if the row has a header.
    pub fn header_cells(&self) -> Option<&[Cell]> {
        self.header.as_ref().map(CellGroup::cells)
    }

    /// The row's own cells, if any.
    pub fn data_cells(&self) -> Option<&[Cell]> {
        self.col_data.as_deref()
    }

    /// Nested rows, or an empty slice.
    pub fn children(&self) -> &[ReportRow] {
        self.rows.as_ref().map(RowList::rows).unwrap_or_default()
    }

    /// Summary cells, if the row has a summary.
    pub fn summary_cells(&self) -> Option<&[Cell]> {
        self.summary.as_ref().map(CellGroup::cells)
    }
}

/// Header or summary cell group.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CellGroup {
    /// Cells in column order.
    #[serde(default, deserialize_with = "lenient_list")]
    pub col_data: Option<Vec<Cell>>,
}

impl CellGroup {
    /// Returns the cells, or an empty slice.
    pub fn cells(&self) -> &[Cell] {
        self.col_data.as_deref().unwrap_or_default()
    }
}

/// A single report cell.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Cell {
    /// Raw display value, e.g. "1,234.50" or "(500.00)".
    #[serde(default, deserialize_with = "lenient_text")]
    pub value: Option<String>,
    /// Entity id the cell links to.
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: Option<String>,
}

impl Cell {
    /// Returns the value, or "" when absent.
    pub fn text(&self) -> &str {
        self.value.as_deref().unwrap_or_default()
    }
}

// ============================================================================
// Lenient field readers
// ============================================================================

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

fn lenient_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    // Entries keep their position so cells stay aligned with columns.
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(Some(
            items
                .into_iter()
                .map(|item| serde_json::from_value(item).unwrap_or_default())
                .collect(),
        )),
        _ => Ok(None),
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(text) => Ok(Some(text)),
        Value::Number(number) => Ok(Some(number.to_string())),
        _ => Ok(None),
    }
}
