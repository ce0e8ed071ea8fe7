//! SpreadsheetML 2003 workbook output.

use quick_xml::escape::escape;

use crate::table::CanonicalTable;

const BOM: char = '\u{feff}';

/// Name of the single worksheet.
pub const SHEET_NAME: &str = "Sheet1";

fn push_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>) {
    out.push_str("   <Row>\n");
    for cell in cells {
        out.push_str("    <Cell><Data ss:Type=\"String\">");
        out.push_str(&escape(cell));
        out.push_str("</Data></Cell>\n");
    }
    out.push_str("   </Row>\n");
}

/// Renders a single-sheet workbook with every cell typed as `String`.
///
/// The output starts with a UTF-8 byte-order mark.
#[must_use]
pub fn to_spreadsheet_xml(table: &CanonicalTable) -> String {
    let mut out = String::new();
    out.push(BOM);
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<?mso-application progid=\"Excel.Sheet\"?>\n");
    out.push_str(
        "<Workbook xmlns=\"urn:schemas-microsoft-com:office:spreadsheet\" \
         xmlns:ss=\"urn:schemas-microsoft-com:office:spreadsheet\">\n",
    );
    out.push_str(&format!(" <Worksheet ss:Name=\"{SHEET_NAME}\">\n"));
    out.push_str("  <Table>\n");
    push_row(&mut out, table.padded_headers().into_iter());
    for row in 0..table.rows.len() {
        push_row(&mut out, table.padded_row(row).into_iter());
    }
    out.push_str("  </Table>\n");
    out.push_str(" </Worksheet>\n");
    out.push_str("</Workbook>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_bom_and_declaration() {
        let out = to_spreadsheet_xml(&CanonicalTable::default());
        assert!(out.starts_with("\u{feff}<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(out.contains("<Worksheet ss:Name=\"Sheet1\">"));
    }

    #[test]
    fn escapes_all_markup_characters() {
        let table = CanonicalTable::new(vec![r#"<a & "b" 'c'>"#.into()], vec![]);
        let out = to_spreadsheet_xml(&table);
        assert!(out.contains(
            "<Data ss:Type=\"String\">&lt;a &amp; &quot;b&quot; &apos;c&apos;&gt;</Data>"
        ));
    }
}
