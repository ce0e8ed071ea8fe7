//! Conversion of classified table roots into [`CanonicalTable`]s.
//!
//! Each markup convention has its own [`Normalizer`]. They share two rules:
//! once the header count is known every cell past it is dropped, and a row
//! left with no cells is dropped entirely.

use markup5ever_rcdom::Handle;

use crate::classify::{ClassificationHandle, MarkupKind};
use crate::dom;
use crate::table::{CanonicalTable, synthetic_header, synthetic_headers};

/// Turns one markup convention into the canonical model.
pub trait Normalizer {
    fn normalize(&self, root: &Handle) -> CanonicalTable;
}

/// Plain `<table>` markup.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardNormalizer;

/// Element UI grids (`.el-table`).
#[derive(Debug, Clone, Copy, Default)]
pub struct ElementUiNormalizer;

/// Ant Design grids (`.ant-table-wrapper`).
#[derive(Debug, Clone, Copy, Default)]
pub struct AntDesignNormalizer;

impl MarkupKind {
    #[must_use]
    pub fn normalizer(self) -> &'static dyn Normalizer {
        match self {
            Self::Standard => &StandardNormalizer,
            Self::ElementUi => &ElementUiNormalizer,
            Self::AntDesign => &AntDesignNormalizer,
        }
    }
}

/// Builds the canonical table behind a classification handle.
#[must_use]
pub fn normalize(handle: &ClassificationHandle) -> CanonicalTable {
    handle.kind().normalizer().normalize(handle.node())
}

/// Keeps at most `headers.len()` cells once a header count is known.
fn truncate_to_headers(mut cells: Vec<String>, headers: &[String]) -> Vec<String> {
    if !headers.is_empty() {
        cells.truncate(headers.len());
    }
    cells
}

fn push_row(rows: &mut Vec<Vec<String>>, cells: Vec<String>, headers: &[String]) {
    let cells = truncate_to_headers(cells, headers);
    if !cells.is_empty() {
        rows.push(cells);
    }
}

/// Synthesizes `col_N` headers from the first row when none were found.
fn ensure_headers(table: &mut CanonicalTable) {
    if table.headers.is_empty() {
        if let Some(first) = table.rows.first() {
            table.headers = synthetic_headers(first.len());
        }
    }
}

fn is_cell(h: &Handle) -> bool {
    dom::is_tag(h, "th") || dom::is_tag(h, "td")
}

/// `<tag>` elements under `root` that sit inside a `<section>` element,
/// the equivalent of the selector `section tag` scoped to `root`.
fn section_descendants(root: &Handle, section: &str, tag: &str) -> Vec<Handle> {
    dom::descendants(root, |h| {
        dom::is_tag(h, tag) && dom::has_ancestor_below(h, root, |a| dom::is_tag(a, section))
    })
}

fn td_texts(row: &Handle) -> Vec<String> {
    dom::descendants(row, |h| dom::is_tag(h, "td"))
        .iter()
        .map(dom::node_text)
        .collect()
}

impl Normalizer for StandardNormalizer {
    /// If the first row holds any `<th>`, it becomes the header row and data
    /// starts at the second row. Otherwise headers are synthesized from the
    /// first row's cell count and that row is kept as data.
    fn normalize(&self, root: &Handle) -> CanonicalTable {
        let rows = dom::descendants(root, |h| dom::is_tag(h, "tr"));
        let Some(first) = rows.first() else {
            return CanonicalTable::default();
        };

        let has_header_row = dom::any_descendant(first, |h| dom::is_tag(h, "th"));
        let headers: Vec<String> = if has_header_row {
            dom::descendants(first, is_cell)
                .iter()
                .enumerate()
                .map(|(i, cell)| {
                    let text = dom::node_text(cell);
                    if text.is_empty() {
                        synthetic_header(i + 1)
                    } else {
                        text
                    }
                })
                .collect()
        } else {
            synthetic_headers(dom::descendants(first, |h| dom::is_tag(h, "td")).len())
        };

        let start = usize::from(has_header_row);
        let mut data = Vec::new();
        for row in &rows[start..] {
            push_row(&mut data, td_texts(row), &headers);
        }
        CanonicalTable::new(headers, data)
    }
}

/// Visible text of an Element UI cell: its `.cell` wrapper if present.
fn element_ui_text(cell: &Handle) -> String {
    dom::first_descendant(cell, |h| dom::has_class(h, "cell"))
        .map_or_else(|| dom::node_text(cell), |inner| dom::node_text(&inner))
}

impl Normalizer for ElementUiNormalizer {
    fn normalize(&self, root: &Handle) -> CanonicalTable {
        let mut table = CanonicalTable::default();

        if let Some(header) = dom::first_descendant(root, |h| dom::has_class(h, "el-table__header"))
        {
            table.headers = dom::descendants(&header, |h| dom::is_tag(h, "th"))
                .iter()
                .filter(|th| !dom::has_class(th, "gutter"))
                .map(element_ui_text)
                .filter(|text| !text.is_empty())
                .collect();
        }

        if let Some(body) = dom::first_descendant(root, |h| dom::has_class(h, "el-table__body")) {
            for row in section_descendants(&body, "tbody", "tr") {
                if !dom::has_class(&row, "el-table__row") {
                    continue;
                }
                let cells = dom::descendants(&row, |h| dom::is_tag(h, "td"))
                    .iter()
                    .map(element_ui_text)
                    .collect();
                push_row(&mut table.rows, cells, &table.headers);
            }
        }

        ensure_headers(&mut table);
        table
    }
}

impl Normalizer for AntDesignNormalizer {
    fn normalize(&self, root: &Handle) -> CanonicalTable {
        let mut table = CanonicalTable::default();
        let Some(inner) = dom::first_descendant(root, |h| dom::is_tag(h, "table")) else {
            return table;
        };

        table.headers = section_descendants(&inner, "thead", "th")
            .iter()
            .map(dom::node_text)
            .filter(|text| !text.is_empty())
            .collect();

        for row in section_descendants(&inner, "tbody", "tr") {
            push_row(&mut table.rows, td_texts(&row), &table.headers);
        }

        ensure_headers(&mut table);
        table
    }
}
