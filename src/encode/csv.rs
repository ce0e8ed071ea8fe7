//! Comma-separated output with every field quoted.

use ::csv::{QuoteStyle, Terminator, WriterBuilder};
use tracing::warn;

use crate::table::CanonicalTable;

/// Renders the header line and one line per row, `\n`-separated with no
/// trailing terminator. Every field is double-quoted and embedded quotes are
/// doubled; embedded newlines stay inside the quoted field.
#[must_use]
pub fn to_csv(table: &CanonicalTable) -> String {
    match write_records(table) {
        Ok(out) => out,
        Err(err) => {
            warn!(%err, "csv encoding failed");
            String::new()
        }
    }
}

fn write_records(table: &CanonicalTable) -> Result<String, Box<dyn std::error::Error>> {
    if table.width() == 0 {
        return Ok(String::new());
    }
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .flexible(true)
        .from_writer(Vec::new());
    writer.write_record(table.padded_headers())?;
    for row in 0..table.rows.len() {
        writer.write_record(table.padded_row(row))?;
    }
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    let mut out = String::from_utf8(bytes)?;
    if out.ends_with('\n') {
        out.pop();
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_everything() {
        let table = CanonicalTable::new(
            vec!["name".into(), "note".into()],
            vec![vec!["Ann".into(), "say \"hi\", twice".into()]],
        );
        assert_eq!(
            to_csv(&table),
            "\"name\",\"note\"\n\"Ann\",\"say \"\"hi\"\", twice\""
        );
    }

    #[test]
    fn keeps_embedded_newlines_raw() {
        let table = CanonicalTable::new(vec!["a".into()], vec![vec!["x\ny".into()]]);
        assert_eq!(to_csv(&table), "\"a\"\n\"x\ny\"");
    }

    #[test]
    fn empty_table_is_empty_text() {
        assert_eq!(to_csv(&CanonicalTable::default()), "");
    }
}
