//! Error type shared by the fallible parts of the crate.
//!
//! Classification, normalization and encoding never fail; errors only come
//! from the edges: settings storage, clipboard writers, file output and
//! parsing of user-supplied arguments.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("unknown output format '{0}'")]
    InvalidFormat(String),

    #[error("invalid selection range '{0}'")]
    InvalidRange(String),

    #[error("clipboard write failed: {0}")]
    Clipboard(String),
}

pub type Result<T> = std::result::Result<T, Error>;
