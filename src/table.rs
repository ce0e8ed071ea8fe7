//! The canonical `{headers, rows}` model every encoder consumes.

use serde::Serialize;

/// Normalized table data.
///
/// Column `i` of every row corresponds to `headers[i]` by position only.
/// Rows may be shorter than `headers`; a missing cell reads as `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CanonicalTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CanonicalTable {
    #[must_use]
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Returns `true` when there are no data rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of columns an encoder has to emit: the header count, or the
    /// widest row if a hand-built table carries more cells than headers.
    #[must_use]
    pub fn width(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .max()
            .unwrap_or(0)
            .max(self.headers.len())
    }

    /// Cell text at (`row`, `col`), or `""` when the row is short.
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map_or("", String::as_str)
    }

    /// Header text at `col`, or `""` past the last header.
    #[must_use]
    pub fn header(&self, col: usize) -> &str {
        self.headers.get(col).map_or("", String::as_str)
    }

    /// The row padded with `""` up to [`width`](Self::width).
    #[must_use]
    pub fn padded_row(&self, row: usize) -> Vec<&str> {
        (0..self.width()).map(|col| self.cell(row, col)).collect()
    }

    /// The headers padded with `""` up to [`width`](Self::width).
    #[must_use]
    pub fn padded_headers(&self) -> Vec<&str> {
        (0..self.width()).map(|col| self.header(col)).collect()
    }
}

/// Synthesized header names `col_1..col_n`.
#[must_use]
pub fn synthetic_headers(n: usize) -> Vec<String> {
    (1..=n).map(synthetic_header).collect()
}

/// Synthesized header for a 1-based column number.
#[must_use]
pub fn synthetic_header(n: usize) -> String {
    format!("col_{n}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_rows_read_as_empty() {
        let table = CanonicalTable::new(
            vec!["a".into(), "b".into(), "c".into()],
            vec![vec!["1".into()]],
        );
        assert_eq!(table.width(), 3);
        assert_eq!(table.cell(0, 2), "");
        assert_eq!(table.cell(5, 0), "");
        assert_eq!(table.padded_row(0), vec!["1", "", ""]);
    }

    #[test]
    fn width_covers_rows_wider_than_headers() {
        let table = CanonicalTable::new(vec![], vec![vec!["x".into(), "y".into()]]);
        assert_eq!(table.width(), 2);
        assert_eq!(table.padded_headers(), vec!["", ""]);
    }

    #[test]
    fn synthetic_headers_are_one_based() {
        assert_eq!(synthetic_headers(3), vec!["col_1", "col_2", "col_3"]);
        assert!(synthetic_headers(0).is_empty());
    }
}
