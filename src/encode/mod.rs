//! Text encoders over [`CanonicalTable`].
//!
//! Every encoder is a total function: any table, including one with no rows
//! or rows shorter than the header list, has a defined output.

mod csv;
mod json;
mod markdown;
pub mod sql;
mod xml;

use std::fmt;
use std::str::FromStr;

pub use self::csv::to_csv;
pub use self::json::to_json;
pub use self::markdown::to_markdown;
pub use self::sql::{SqlMode, SqlOptions, to_sql};
pub use self::xml::to_spreadsheet_xml;
use crate::error::Error;
use crate::mapping::ColumnMapping;
use crate::table::CanonicalTable;

/// Output encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Markdown,
    Json,
    Csv,
    SqlInsert,
    SqlUpdate,
    SpreadsheetXml,
}

impl Format {
    pub const ALL: [Self; 6] = [
        Self::Markdown,
        Self::Json,
        Self::Csv,
        Self::SqlInsert,
        Self::SqlUpdate,
        Self::SpreadsheetXml,
    ];

    /// File extension used for exports.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Json => "json",
            Self::Csv => "csv",
            Self::SqlInsert | Self::SqlUpdate => "sql",
            Self::SpreadsheetXml => "xml",
        }
    }

    #[must_use]
    pub fn is_sql(self) -> bool {
        self.sql_mode().is_some()
    }

    #[must_use]
    pub fn sql_mode(self) -> Option<SqlMode> {
        match self {
            Self::SqlInsert => Some(SqlMode::Insert),
            Self::SqlUpdate => Some(SqlMode::Update),
            _ => None,
        }
    }

    /// The SQL format producing statements of `mode`.
    #[must_use]
    pub fn sql(mode: SqlMode) -> Self {
        match mode {
            SqlMode::Insert => Self::SqlInsert,
            SqlMode::Update => Self::SqlUpdate,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Markdown => "markdown",
            Self::Json => "json",
            Self::Csv => "csv",
            Self::SqlInsert => "sql-insert",
            Self::SqlUpdate => "sql-update",
            Self::SpreadsheetXml => "spreadsheet-xml",
        })
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "sql" | "sql-insert" | "insert" => Ok(Self::SqlInsert),
            "sql-update" | "update" => Ok(Self::SqlUpdate),
            "spreadsheet-xml" | "xml" | "excel" => Ok(Self::SpreadsheetXml),
            other => Err(Error::InvalidFormat(other.to_string())),
        }
    }
}

/// Inputs an encoder may need beyond the table itself.
#[derive(Debug, Clone, Default)]
pub struct EncodeOptions {
    /// Target table name for SQL; blank means `table_data`.
    pub table_name: String,
    pub mapping: ColumnMapping,
}

/// Renders `table` in `format`.
#[must_use]
pub fn encode(format: Format, table: &CanonicalTable, options: &EncodeOptions) -> String {
    match format {
        Format::Markdown => to_markdown(table),
        Format::Json => to_json(table),
        Format::Csv => to_csv(table),
        Format::SpreadsheetXml => to_spreadsheet_xml(table),
        Format::SqlInsert | Format::SqlUpdate => {
            let mode = format.sql_mode().unwrap_or_default();
            to_sql(
                table,
                &SqlOptions {
                    table_name: &options.table_name,
                    mode,
                    mapping: &options.mapping,
                },
            )
        }
    }
}
