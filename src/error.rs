//! Domain-specific error types for flowtally.
//!
//! Uses `thiserror` for the parsing taxonomy; `anyhow` adds context at
//! the application boundary in `main`.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading inputs or aggregating records.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("cannot open {kind} '{path}': {source}")]
    MissingSource {
        kind: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("lookup table header is missing required column '{0}'")]
    MalformedRow(&'static str),

    #[error("malformed version-2 record at line {line}: {reason}")]
    MalformedRecord { line: u64, reason: String },

    #[error("failed to read lookup table: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
