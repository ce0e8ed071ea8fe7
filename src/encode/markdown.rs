//! Markdown pipe tables.

use crate::table::CanonicalTable;

/// Escapes a cell for a single-line Markdown table row.
fn escape_cell(cell: &str) -> String {
    cell.replace('|', "\\|")
        .replace("\r\n", "<br>")
        .replace(['\n', '\r'], "<br>")
}

fn format_row<'a>(cells: impl Iterator<Item = &'a str>) -> String {
    let cells: Vec<String> = cells.map(escape_cell).collect();
    format!("| {} |", cells.join(" | "))
}

/// Renders a header line, a `---` separator line and one line per row.
#[must_use]
pub fn to_markdown(table: &CanonicalTable) -> String {
    let width = table.width();
    let mut lines = Vec::with_capacity(table.rows.len() + 2);
    lines.push(format_row(table.padded_headers().into_iter()));
    lines.push(format_row(std::iter::repeat_n("---", width)));
    for row in 0..table.rows.len() {
        lines.push(format_row(table.padded_row(row).into_iter()));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_pipes_and_newlines() {
        assert_eq!(escape_cell("a|b\nc\r\nd"), "a\\|b<br>c<br>d");
    }

    #[test]
    fn short_rows_are_padded() {
        let table = CanonicalTable::new(
            vec!["A".into(), "B".into()],
            vec![vec!["1".into()]],
        );
        assert_eq!(to_markdown(&table), "| A | B |\n| --- | --- |\n| 1 |  |");
    }

    #[test]
    fn headers_only() {
        let table = CanonicalTable::new(vec!["A".into()], vec![]);
        assert_eq!(to_markdown(&table), "| A |\n| --- |");
    }
}
