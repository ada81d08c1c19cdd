//! Report normalization.
//!
//! Turns a nested accounting report into:
//!
//! - a flat per-month aggregate ([`aggregate`], [`column_totals`]) for charts;
//! - a [`ReportMatrix`] ([`project`]) that keeps the report's indentation and
//!   subtotal rows.
//!
//! Everything here is pure: no I/O, no shared state, safe to call from any
//! number of tasks at once. Malformed cells, unparsable dates, and missing
//! columns never fail; they just contribute nothing.
//!
//! ## Submodules
//!
//! - [`document`] - Upstream JSON shape
//! - [`coerce`] - Accounting-format number parsing
//! - [`period`] - Column titles and dates to month keys
//! - [`walker`] - Depth-first row traversal
//! - [`flat`] - Per-period sums
//! - [`matrix`] - Row-preserving projection

pub mod coerce;
pub mod document;
pub mod flat;
pub mod matrix;
pub mod period;
pub mod walker;

pub use coerce::{coerce, round_cents};
pub use document::{Cell, CellGroup, ColumnDescriptor, ReportDocument, ReportRow};
pub use flat::{aggregate, column_totals, net_income};
pub use matrix::{project, NormalizedRow, PeriodColumn, ReportMatrix};
pub use period::{from_column_title, from_date_string};
pub use walker::{walk, Facet, FacetKind};
