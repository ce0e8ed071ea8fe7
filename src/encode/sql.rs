//! SQL `INSERT` / `UPDATE` statement generation.

use std::sync::LazyLock;

use regex::Regex;

use crate::mapping::{ColumnMapping, Role};
use crate::table::CanonicalTable;

/// Table name used when none is given.
pub const DEFAULT_TABLE_NAME: &str = "table_data";

/// Output of an encode over a table without data rows.
pub const NO_DATA_COMMENT: &str = "-- No data to export";
/// Output of an `INSERT` encode with every column excluded.
pub const NO_INSERT_COLUMNS_COMMENT: &str = "-- Select at least one column to INSERT";
/// Output of an `UPDATE` encode missing `SET` or `WHERE` columns.
pub const INCOMPLETE_UPDATE_COMMENT: &str =
    "-- Select at least one SET column and one WHERE column to build UPDATE statements";

static NON_IDENT_RE: LazyLock<Regex> =
    lazy_regex!(r"[^A-Za-z0-9_\x{4e00}-\x{9fa5}]", "identifier pattern");

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SqlMode {
    #[default]
    Insert,
    Update,
}

#[derive(Debug, Clone, Copy)]
pub struct SqlOptions<'a> {
    pub table_name: &'a str,
    pub mode: SqlMode,
    pub mapping: &'a ColumnMapping,
}

/// Replaces every character that is not ASCII alphanumeric, `_` or a CJK
/// ideograph with `_`.
#[must_use]
pub fn sanitize_identifier(raw: &str) -> String {
    NON_IDENT_RE.replace_all(raw, "_").into_owned()
}

fn quote_column(raw: &str) -> String {
    format!("`{}`", sanitize_identifier(raw))
}

/// The trimmed text when it round-trips through a finite number unchanged.
fn numeric_literal(cell: &str) -> Option<&str> {
    let trimmed = cell.trim();
    let value: f64 = trimmed.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    (number_to_string(value)? == trimmed).then_some(trimmed)
}

/// Canonical text of a finite number: shortest round-trip digits, plain
/// notation for decimal exponents in `-7..21`, otherwise `d.ddde±x`.
/// Negative zero prints as `0`.
fn number_to_string(value: f64) -> Option<String> {
    if value == 0.0 {
        return Some("0".to_string());
    }
    let sci = format!("{:e}", value.abs());
    let (mantissa, exp) = sci.split_once('e')?;
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let k = i32::try_from(digits.len()).ok()?;
    let n = exp.parse::<i32>().ok()? + 1;

    let body = if k <= n && n <= 21 {
        format!("{digits}{}", "0".repeat(usize::try_from(n - k).ok()?))
    } else if 0 < n && n <= 21 {
        let (int, frac) = digits.split_at(usize::try_from(n).ok()?);
        format!("{int}.{frac}")
    } else if -6 < n && n <= 0 {
        format!("0.{}{digits}", "0".repeat(usize::try_from(-n).ok()?))
    } else {
        let (lead, rest) = digits.split_at(1);
        let sign = if n > 0 { '+' } else { '-' };
        let point = if rest.is_empty() { "" } else { "." };
        format!("{lead}{point}{rest}e{sign}{}", (n - 1).abs())
    };
    Some(if value < 0.0 { format!("-{body}") } else { body })
}

/// Formats a cell as a SQL literal: `NULL`, a bare number or a quoted string.
#[must_use]
pub fn format_value(cell: &str) -> String {
    if cell.is_empty() {
        return "NULL".to_string();
    }
    if let Some(number) = numeric_literal(cell) {
        return number.to_string();
    }
    format!("'{}'", cell.replace('\'', "''"))
}

fn table_identifier(name: &str) -> String {
    let name = name.trim();
    sanitize_identifier(if name.is_empty() {
        DEFAULT_TABLE_NAME
    } else {
        name
    })
}

/// Renders one statement per row, or an explanatory comment when no
/// statement can be built.
#[must_use]
pub fn to_sql(table: &CanonicalTable, options: &SqlOptions<'_>) -> String {
    if table.is_empty() {
        return NO_DATA_COMMENT.to_string();
    }
    let name = table_identifier(options.table_name);
    match options.mode {
        SqlMode::Insert => insert_statements(table, &name, options.mapping),
        SqlMode::Update => update_statements(table, &name, options.mapping),
    }
}

fn insert_statements(table: &CanonicalTable, name: &str, mapping: &ColumnMapping) -> String {
    let cols = mapping.columns_for(Role::Insert, table.width());
    if cols.is_empty() {
        return NO_INSERT_COLUMNS_COMMENT.to_string();
    }
    let column_list = cols
        .iter()
        .map(|&c| quote_column(&mapping.name(c, &table.headers)))
        .collect::<Vec<_>>()
        .join(", ");

    let mut lines = vec!["-- INSERT statements\n".to_string()];
    for row in 0..table.rows.len() {
        let values = cols
            .iter()
            .map(|&c| format_value(table.cell(row, c)))
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("INSERT INTO {name} ({column_list}) VALUES ({values});"));
    }
    lines.join("\n")
}

fn update_statements(table: &CanonicalTable, name: &str, mapping: &ColumnMapping) -> String {
    let width = table.width();
    let set_cols = mapping.columns_for(Role::Set, width);
    let where_cols = mapping.columns_for(Role::Where, width);
    if set_cols.is_empty() || where_cols.is_empty() {
        return INCOMPLETE_UPDATE_COMMENT.to_string();
    }
    let ident = |c: usize| quote_column(&mapping.name(c, &table.headers));

    let mut lines = vec!["-- UPDATE statements\n".to_string()];
    for row in 0..table.rows.len() {
        let assignments = set_cols
            .iter()
            .map(|&c| format!("{} = {}", ident(c), format_value(table.cell(row, c))))
            .collect::<Vec<_>>()
            .join(", ");
        let conditions = where_cols
            .iter()
            .map(|&c| {
                let value = format_value(table.cell(row, c));
                if value == "NULL" {
                    format!("{} IS NULL", ident(c))
                } else {
                    format!("{} = {value}", ident(c))
                }
            })
            .collect::<Vec<_>>()
            .join(" AND ");
        lines.push(format!("UPDATE {name} SET {assignments} WHERE {conditions};"));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> CanonicalTable {
        CanonicalTable::new(
            vec!["id".into(), "User Name!".into(), "note".into()],
            vec![
                vec!["1".into(), "O'Brien".into(), String::new()],
                vec!["2".into(), "Lee".into()],
            ],
        )
    }

    #[test]
    fn values() {
        assert_eq!(format_value("42"), "42");
        assert_eq!(format_value("-3.5"), "-3.5");
        assert_eq!(format_value("42abc"), "'42abc'");
        assert_eq!(format_value("042"), "'042'");
        assert_eq!(format_value("1e3"), "'1e3'");
        assert_eq!(format_value("NaN"), "'NaN'");
        assert_eq!(format_value("inf"), "'inf'");
        assert_eq!(format_value(""), "NULL");
        assert_eq!(format_value("it's"), "'it''s'");
    }

    #[test]
    fn numbers_must_match_their_canonical_text() {
        assert_eq!(format_value("1e-7"), "1e-7");
        assert_eq!(format_value("1.5e+21"), "1.5e+21");
        assert_eq!(format_value("0.000001"), "0.000001");
        assert_eq!(format_value("0.0000001"), "'0.0000001'");
        assert_eq!(format_value("1e21"), "'1e21'");
        assert_eq!(format_value("-0"), "'-0'");
        assert_eq!(format_value("0"), "0");
        assert_eq!(format_value("1200"), "1200");
        assert_eq!(format_value("-12.25"), "-12.25");
        assert_eq!(format_value("100000000000000000000"), "100000000000000000000");
        assert_eq!(format_value("1.50"), "'1.50'");
    }

    #[test]
    fn identifiers() {
        assert_eq!(sanitize_identifier("User Name!"), "User_Name_");
        assert_eq!(sanitize_identifier("订单 ID"), "订单_ID");
        assert_eq!(sanitize_identifier("a-b.c"), "a_b_c");
    }

    #[test]
    fn insert_uses_all_columns_by_default() {
        let mapping = ColumnMapping::new();
        let out = to_sql(
            &table(),
            &SqlOptions {
                table_name: "my table",
                mode: SqlMode::Insert,
                mapping: &mapping,
            },
        );
        assert_eq!(
            out,
            "-- INSERT statements\n\n\
             INSERT INTO my_table (`id`, `User_Name_`, `note`) VALUES (1, 'O''Brien', NULL);\n\
             INSERT INTO my_table (`id`, `User_Name_`, `note`) VALUES (2, 'Lee', NULL);"
        );
    }

    #[test]
    fn update_with_null_condition() {
        let mut mapping = ColumnMapping::new();
        mapping.set_included(0, Role::Where, false);
        mapping.set_included(0, Role::Set, true);
        mapping.set_included(2, Role::Set, false);
        mapping.set_included(2, Role::Where, true);
        mapping.set_name(1, "name");
        let out = to_sql(
            &table(),
            &SqlOptions {
                table_name: "",
                mode: SqlMode::Update,
                mapping: &mapping,
            },
        );
        assert_eq!(
            out,
            "-- UPDATE statements\n\n\
             UPDATE table_data SET `id` = 1, `name` = 'O''Brien' WHERE `note` IS NULL;\n\
             UPDATE table_data SET `id` = 2, `name` = 'Lee' WHERE `note` IS NULL;"
        );
    }

    #[test]
    fn update_without_where_columns_is_a_placeholder() {
        let mut mapping = ColumnMapping::new();
        mapping.set_included(0, Role::Where, false);
        let out = to_sql(
            &table(),
            &SqlOptions {
                table_name: "t",
                mode: SqlMode::Update,
                mapping: &mapping,
            },
        );
        assert_eq!(out, INCOMPLETE_UPDATE_COMMENT);
    }

    #[test]
    fn no_rows_is_a_comment() {
        let mapping = ColumnMapping::new();
        let empty = CanonicalTable::new(vec!["a".into()], vec![]);
        for mode in [SqlMode::Insert, SqlMode::Update] {
            let out = to_sql(
                &empty,
                &SqlOptions {
                    table_name: "t",
                    mode,
                    mapping: &mapping,
                },
            );
            assert_eq!(out, NO_DATA_COMMENT);
        }
    }
}
