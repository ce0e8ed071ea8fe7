//! JSON array-of-objects output.

use serde_json::{Map, Value};

use crate::table::CanonicalTable;

/// One object per row, keyed by header text in header order.
///
/// Duplicate header text collapses to one key holding the last column's
/// value. Missing cells map to `""`.
#[must_use]
pub fn to_json(table: &CanonicalTable) -> String {
    let records: Vec<Value> = (0..table.rows.len())
        .map(|row| {
            let mut obj = Map::new();
            for (col, header) in table.headers.iter().enumerate() {
                obj.insert(header.clone(), Value::String(table.cell(row, col).to_string()));
            }
            Value::Object(obj)
        })
        .collect();
    serde_json::to_string_pretty(&records).unwrap_or_else(|_| String::from("[]"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_headers_keep_first_position_and_last_value() {
        let table = CanonicalTable::new(
            vec!["a".into(), "b".into(), "a".into()],
            vec![vec!["1".into(), "2".into(), "3".into()]],
        );
        let out = to_json(&table);
        assert_eq!(out, "[\n  {\n    \"a\": \"3\",\n    \"b\": \"2\"\n  }\n]");
    }

    #[test]
    fn no_rows_is_an_empty_array() {
        let table = CanonicalTable::new(vec!["a".into()], vec![]);
        assert_eq!(to_json(&table), "[]");
    }
}
