//! Fixed-width text rendering of a canonical table.
//!
//! Every cell occupies its column's display width plus two slots. Selected
//! cells use those slots for `[` and `]`, so highlighting never shifts the
//! column grid.

use unicode_width::UnicodeWidthStr;

use crate::selection::{Bounds, Cell, HEADER_ROW};
use crate::table::CanonicalTable;

/// Cell text on a single line.
fn flatten(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\n', '\r', '\t'], " ")
}

fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(UnicodeWidthStr::width(text));
    format!("{text}{}", " ".repeat(fill))
}

pub(crate) fn calculate_widths(rows: &[Vec<String>], cols: usize) -> Vec<usize> {
    let mut widths = vec![0; cols];
    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(cols) {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(cell.as_str()));
        }
    }
    widths
}

fn format_row(row: &[String], widths: &[usize], grid_row: isize, sel: Option<Bounds>) -> String {
    let slots: Vec<String> = widths
        .iter()
        .enumerate()
        .map(|(col, &w)| {
            let text = pad(row.get(col).map_or("", String::as_str), w);
            if sel.is_some_and(|b| b.contains(Cell::new(grid_row, col))) {
                format!("[{text}]")
            } else {
                format!(" {text} ")
            }
        })
        .collect();
    format!("|{}|", slots.join("|"))
}

/// Renders the header row, a rule, then every data row. Cells inside
/// `selection` are bracketed.
#[must_use]
pub fn render_grid(table: &CanonicalTable, selection: Option<Bounds>) -> String {
    let cols = table.width();
    if cols == 0 {
        return String::new();
    }
    let headers: Vec<String> = table.headers.iter().map(|h| flatten(h)).collect();
    let rows: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|r| r.iter().map(|c| flatten(c)).collect())
        .collect();

    let mut all = Vec::with_capacity(rows.len() + 1);
    all.push(headers);
    all.extend(rows);
    let widths = calculate_widths(&all, cols);

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(w + 2)).collect();
    let mut out = Vec::with_capacity(all.len() + 1);
    let mut grid_row = HEADER_ROW;
    for (idx, row) in all.iter().enumerate() {
        out.push(format_row(row, &widths, grid_row, selection));
        if idx == 0 {
            out.push(format!("|{}|", rule.join("|")));
        }
        grid_row += 1;
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::SelectionRange;

    fn table() -> CanonicalTable {
        CanonicalTable::new(
            vec!["名前".into(), "Age".into()],
            vec![vec!["Ann".into(), "31".into()], vec!["Bo\nb".into()]],
        )
    }

    #[test]
    fn widths_count_display_columns() {
        let widths = calculate_widths(&[vec!["名前".into(), "x".into()]], 2);
        assert_eq!(widths, vec![4, 1]);
    }

    #[test]
    fn plain_grid() {
        assert_eq!(
            render_grid(&table(), None),
            "| 名前 | Age |\n\
             |------|-----|\n\
             | Ann  | 31  |\n\
             | Bo b |     |"
        );
    }

    #[test]
    fn selected_cells_are_bracketed() {
        let range: SelectionRange = "-1,1:0,1".parse().unwrap();
        let out = render_grid(&table(), Some(range.bounds()));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "| 名前 |[Age]|");
        assert_eq!(lines[2], "| Ann  |[31 ]|");
        assert_eq!(lines[3], "| Bo b |     |");
    }

    #[test]
    fn empty_table_renders_nothing() {
        assert_eq!(render_grid(&CanonicalTable::default(), None), "");
    }
}
