/*
 * traits.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Defines the BuildRuntime trait and supporting types for the capability
 * layer the collect-sass plugin core consumes.
 *
 * The plugin core never touches the file system, the package resolver, or
 * the SASS compiler directly. Everything goes through this trait, so the
 * core can be exercised against deterministic fakes and the host build tool
 * can substitute its own environment.
 */

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};

/// Result type for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors that can occur during runtime operations
#[derive(Debug)]
pub enum RuntimeError {
    /// Standard I/O error
    Io(io::Error),

    /// Package-style resolution found no matching file
    PackageNotFound(String),

    /// Operation not supported on this runtime
    NotSupported(String),

    /// SASS compilation failed
    SassError(String),
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimeError::Io(e) => write!(f, "I/O error: {}", e),
            RuntimeError::PackageNotFound(request) => {
                write!(f, "Package resolution failed for: {}", request)
            }
            RuntimeError::NotSupported(msg) => write!(f, "Operation not supported: {}", msg),
            RuntimeError::SassError(msg) => write!(f, "SASS compilation error: {}", msg),
        }
    }
}

impl std::error::Error for RuntimeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RuntimeError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for RuntimeError {
    fn from(e: io::Error) -> Self {
        RuntimeError::Io(e)
    }
}

/// Type of filesystem path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// Regular file
    File,
    /// Directory
    Directory,
}

/// Trait defining the runtime operations the plugin core depends on.
///
/// Implementations provide the actual system interaction. `NativeRuntime`
/// backs the trait with `std::fs` and the grass compiler; tests substitute
/// in-memory fakes for deterministic filesystem snapshots.
///
/// All methods are synchronous except [`BuildRuntime::write_file`]: the
/// deferred side-artifact write is the single asynchronous operation in the
/// system, and its failure must propagate as a build failure.
#[async_trait]
pub trait BuildRuntime: Send + Sync {
    /// Check if path exists, optionally filtering by type.
    fn path_exists(&self, path: &Path, kind: Option<PathKind>) -> RuntimeResult<bool>;

    /// Check if path exists and is a file.
    ///
    /// Convenience method that calls `path_exists` with `PathKind::File`.
    fn is_file(&self, path: &Path) -> RuntimeResult<bool> {
        self.path_exists(path, Some(PathKind::File))
    }

    /// Check if path exists and is a directory.
    fn is_dir(&self, path: &Path) -> RuntimeResult<bool> {
        self.path_exists(path, Some(PathKind::Directory))
    }

    /// Node-style package resolution restricted to an extension set.
    ///
    /// Relative (and absolute) requests resolve against `from_dir` with
    /// extension inference; bare specifiers walk ancestor `node_modules`
    /// directories starting at `from_dir`. An `Err` means "no match" — the
    /// caller treats it as a missed resolution strategy, never as fatal.
    fn resolve_package(
        &self,
        request: &str,
        from_dir: &Path,
        extensions: &[String],
    ) -> RuntimeResult<PathBuf>;

    /// Compile SCSS source to CSS.
    ///
    /// Invoked exactly once per build by the final aggregation pass.
    ///
    /// # Arguments
    ///
    /// * `scss` - The SCSS source code to compile
    /// * `load_paths` - Directories to search for @use/@import resolution
    /// * `minified` - Whether to produce compressed output
    fn compile_sass(
        &self,
        scss: &str,
        load_paths: &[PathBuf],
        minified: bool,
    ) -> RuntimeResult<String>;

    /// Write bytes to a file (creates or overwrites).
    ///
    /// Used for the deferred side-artifact write in extract mode. The host
    /// must await completion before considering the build finished.
    async fn write_file(&self, path: &Path, contents: &[u8]) -> RuntimeResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_error_display() {
        let err = RuntimeError::PackageNotFound("theme/_index".to_string());
        assert!(err.to_string().contains("theme/_index"));

        let err = RuntimeError::SassError("undefined variable".to_string());
        assert!(err.to_string().contains("SASS compilation error"));

        let err = RuntimeError::NotSupported("write on read-only runtime".to_string());
        assert!(err.to_string().contains("not supported"));
    }

    #[test]
    fn test_runtime_error_io_source() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err = RuntimeError::from(io_err);
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("denied"));
    }
}
