//! Depth-first traversal of the report row tree.
//!
//! The walker flattens the nested rows into [`Facet`]s. For each row it
//! visits, in order, the header, the row's own cells, the children, and the
//! summary. That order reproduces the on-screen layout of the accounting
//! report: section title, section lines, then the subtotal.
//!
//! Nesting:
//! - header and own cells sit at the current level;
//! - children sit one level deeper when the row has a header with cells,
//!   otherwise at the same level;
//! - the summary sits at the current level when the row has such a header,
//!   otherwise one level up (never below zero).
//!
//! A header without cells is treated as no header, so children never hang
//! under a title that was not emitted.

use super::document::{Cell, ReportDocument, ReportRow};

/// Which part of a row a facet came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacetKind {
    /// Section header.
    Header,
    /// The row's own cells.
    Data,
    /// Section summary.
    Summary,
}

/// One visited piece of a row, with the metadata needed to place it.
#[derive(Debug, Clone, Copy)]
pub struct Facet<'a> {
    /// Origin of the facet.
    pub kind: FacetKind,
    /// Nesting depth.
    pub level: usize,
    /// Raw cells, column-aligned.
    pub cells: &'a [Cell],
}

impl<'a> Facet<'a> {
    /// Returns true for summary facets.
    pub fn is_total(&self) -> bool {
        self.kind == FacetKind::Summary
    }

    /// Returns the first cell's text, or "" when there is none.
    pub fn label(&self) -> &'a str {
        self.cells.first().map(Cell::text).unwrap_or_default()
    }

    /// Returns the raw value of the cell at `index`, if present.
    pub fn raw(&self, index: usize) -> Option<&'a str> {
        self.cells.get(index).and_then(|c| c.value.as_deref())
    }
}

/// Walks every row of `document`, depth-first.
///
/// Facets without cells are skipped; nothing here fails on malformed rows.
pub fn walk(document: &ReportDocument) -> Vec<Facet<'_>> {
    let mut facets = Vec::new();
    for row in document.rows() {
        visit(row, 0, &mut facets);
    }
    facets
}

fn visit<'a>(row: &'a ReportRow, level: usize, out: &mut Vec<Facet<'a>>) {
    let header = row.header_cells().filter(|c| !c.is_empty());

    if let Some(cells) = header {
        out.push(Facet {
            kind: FacetKind::Header,
            level,
            cells,
        });
    }

    if let Some(cells) = row.data_cells().filter(|c| !c.is_empty()) {
        out.push(Facet {
            kind: FacetKind::Data,
            level,
            cells,
        });
    }

    let child_level = if header.is_some() { level + 1 } else { level };
    for child in row.children() {
        visit(child, child_level, out);
    }

    if let Some(cells) = row.summary_cells().filter(|c| !c.is_empty()) {
        let summary_level = if header.is_some() {
            level
        } else {
            level.saturating_sub(1)
        };
        out.push(Facet {
            kind: FacetKind::Summary,
            level: summary_level,
            cells,
        });
    }
}
