//! Detection and conversion of tables embedded in HTML pages.
//!
//! The pipeline runs in four steps:
//!
//! 1. [`classify_and_scan`] finds plain `<table>` elements plus Element UI
//!    and Ant Design grids, judges whether each one holds data, and
//!    registers the data tables once.
//! 2. [`normalize`] turns a registered table into a [`CanonicalTable`].
//! 3. [`encode`] renders that table as Markdown, JSON, CSV, SQL or
//!    SpreadsheetML.
//! 4. [`materialize_selection`] extracts a rectangular range of the
//!    previewed table as tab-separated text.
//!
//! [`session::ExtractionSession`] ties the steps together for a host that
//! shows one table at a time.

#[macro_use]
mod macros;

pub mod classify;
pub mod config;
pub mod dom;
pub mod encode;
pub mod error;
pub mod io;
pub mod mapping;
pub mod normalize;
pub mod preview;
pub mod selection;
pub mod session;
pub mod table;

use markup5ever_rcdom::Handle;

pub use crate::classify::{ClassificationHandle, MarkupKind, Scanner, Verdict};
pub use crate::config::{FilterConfig, Settings, SiteStatus};
pub use crate::encode::{EncodeOptions, Format, encode};
pub use crate::error::{Error, Result};
pub use crate::mapping::{ColumnMapping, Role};
pub use crate::normalize::normalize;
pub use crate::selection::{SelectionRange, materialize_selection};
pub use crate::session::ExtractionSession;
pub use crate::table::CanonicalTable;

/// Scans `root` and returns every registered data table.
///
/// Safe to call repeatedly on a mutating document: tables registered by an
/// earlier call are not registered again.
pub fn classify_and_scan(scanner: &mut Scanner, root: &Handle) -> Vec<ClassificationHandle> {
    scanner.scan(root)
}

/// Parses `html` and returns the canonical form of each data table in
/// document order.
#[must_use]
pub fn extract_tables(html: &str, config: &FilterConfig) -> Vec<CanonicalTable> {
    let dom = dom::parse_html(html);
    let mut scanner = Scanner::new(config.clone());
    classify_and_scan(&mut scanner, &dom.document)
        .iter()
        .map(normalize)
        .collect()
}
