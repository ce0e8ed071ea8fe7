//! Utility helpers shared across integration tests.
#![allow(dead_code)]

use markup5ever_rcdom::{Handle, RcDom};
use rstest::fixture;
use tablegrab::dom;

/// Build a `Vec<String>` from a list of string slices.
///
/// Used to write HTML documents one line per element so fixtures stay
/// readable.
macro_rules! lines_vec {
    ($($line:expr),* $(,)?) => {
        vec![$($line.to_string()),*]
    };
}

/// Joins fixture lines into one document.
pub fn html(lines: &[String]) -> String {
    lines.join("\n")
}

/// Parses `html` and returns the document with its first `<table>`.
pub fn first_table(html: &str) -> (RcDom, Handle) {
    let doc = dom::parse_html(html);
    let table = dom::first_descendant(&doc.document, |h| dom::is_tag(h, "table"))
        .expect("fixture has a table");
    (doc, table)
}

/// Builds a plain table with a header row and one `<tr>` per data row.
pub fn plain_table(headers: &[&str], rows: &[&[&str]]) -> String {
    let mut out = String::from("<table>");
    out.push_str("<tr>");
    for h in headers {
        out.push_str(&format!("<th>{h}</th>"));
    }
    out.push_str("</tr>");
    for row in rows {
        out.push_str("<tr>");
        for cell in *row {
            out.push_str(&format!("<td>{cell}</td>"));
        }
        out.push_str("</tr>");
    }
    out.push_str("</table>");
    out
}

#[fixture]
pub fn product_page() -> Vec<String> {
    lines_vec![
        "<html><body>",
        "<table class=\"nav-layout\"><tr><td>Home</td><td>About</td></tr><tr><td>A</td><td>B</td></tr></table>",
        "<table id=\"products\">",
        "<thead><tr><th>SKU</th><th>Name</th><th>Price</th></tr></thead>",
        "<tbody>",
        "<tr><td>A-1</td><td>Widget</td><td>9.5</td></tr>",
        "<tr><td>B-2</td><td>Gadget, \"deluxe\"</td><td>12</td></tr>",
        "</tbody>",
        "</table>",
        "</body></html>",
    ]
}

#[fixture]
pub fn element_ui_page() -> Vec<String> {
    lines_vec![
        "<div class=\"el-table el-table--border\">",
        "<div class=\"el-table__header-wrapper\"><table class=\"el-table__header\"><thead><tr>",
        "<th><div class=\"cell\">Date</div></th>",
        "<th><div class=\"cell\">Name</div></th>",
        "<th class=\"gutter\"></th>",
        "</tr></thead></table></div>",
        "<div class=\"el-table__body-wrapper\"><table class=\"el-table__body\"><tbody>",
        "<tr class=\"el-table__row\"><td><div class=\"cell\">2016-05-02</div></td><td><div class=\"cell\">Wang</div></td></tr>",
        "<tr class=\"el-table__row\"><td><div class=\"cell\">2016-05-04</div></td><td><div class=\"cell\">Li</div></td><td><div class=\"cell\">extra</div></td></tr>",
        "</tbody></table></div>",
        "</div>",
    ]
}

#[fixture]
pub fn ant_design_page() -> Vec<String> {
    lines_vec![
        "<div class=\"ant-table-wrapper\"><div class=\"ant-spin-container\"><div class=\"ant-table\">",
        "<table>",
        "<thead class=\"ant-table-thead\"><tr><th>Name</th><th>Age</th><th></th></tr></thead>",
        "<tbody class=\"ant-table-tbody\">",
        "<tr class=\"ant-table-row\"><td>John</td><td>32</td><td><a>Delete</a></td></tr>",
        "<tr class=\"ant-table-row\"><td>Jim</td><td>42</td><td><a>Delete</a></td></tr>",
        "</tbody>",
        "</table>",
        "</div></div></div>",
    ]
}
