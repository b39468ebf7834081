//! Label Resolution
//!
//! Picks the winning class from a score vector and maps it to a
//! human-readable label.

mod argmax;
mod table;

pub use argmax::argmax;
pub use table::{LabelFormat, LabelTable};

use std::path::PathBuf;
use thiserror::Error;

/// Errors during label loading and lookup
#[derive(Debug, Error)]
pub enum LabelError {
    #[error("Failed to read label table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse label table {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Class index {index} not in label table ({len} entries)")]
    MissingIndex { index: usize, len: usize },

    #[error("Score vector has no maximum (empty or all NaN)")]
    NoMaximum,
}
