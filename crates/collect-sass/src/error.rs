//! Error types for stylesheet collection.
//!
//! Copyright (c) 2025 Posit, PBC

use std::path::PathBuf;
use thiserror::Error;

use collect_sass_runtime::RuntimeError;

/// Errors that can occur during stylesheet collection
#[derive(Debug, Error)]
pub enum CollectError {
    /// An include/exclude pattern failed to compile
    #[error("invalid filter pattern `{pattern}`: {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Compilation of the aggregated stylesheet failed.
    ///
    /// Fatal: once fragments are merged there is no safe partial output.
    #[error("stylesheet compilation failed: {message}")]
    Compile { message: String },

    /// The deferred side-artifact write failed
    #[error("failed to write extracted stylesheet to {path}: {source}", path = .path.display())]
    ArtifactWrite {
        path: PathBuf,
        #[source]
        source: RuntimeError,
    },

    /// Commit was requested before a finalize pass produced output
    #[error("no compiled stylesheet to write; the final pass has not run")]
    NothingToCommit,
}
