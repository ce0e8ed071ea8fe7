//! File helpers for reading HTML documents and writing exports.

use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use tracing::debug;

use crate::encode::Format;
use crate::error::Result;

/// Prefix of every export file name.
pub const EXPORT_PREFIX: &str = "table_export_";

/// `table_export_<millis>.<ext>` for an export made at `millis` since the
/// Unix epoch.
#[must_use]
pub fn export_file_name(format: Format, millis: u128) -> String {
    format!("{EXPORT_PREFIX}{millis}.{}", format.extension())
}

/// Milliseconds since the Unix epoch, or `0` if the clock is before it.
#[must_use]
pub fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis())
}

/// Reads an HTML document from `path`, or from stdin when `path` is `-`.
///
/// # Errors
/// Returns an error if the source cannot be read.
pub fn read_document(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }
    Ok(fs::read_to_string(path)?)
}

/// Writes `content` to `dir/file_name`, creating `dir` if needed, and
/// returns the written path.
///
/// # Errors
/// Returns an error if the directory or file cannot be written.
pub fn write_export(dir: &Path, file_name: &str, content: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    fs::write(&path, content)?;
    debug!(path = %path.display(), bytes = content.len(), "export written");
    Ok(path)
}
