//! Plugin configuration and module filtering.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! The configuration surface matches what hosts typically hand a stylesheet
//! collection plugin:
//!
//! - `extensions`: import-extension fallback list, probed in order
//! - `include` / `exclude`: glob patterns over module ids
//! - `extract`: inject at runtime (default) or write a side artifact
//! - `import_once`: suppress duplicate imports across the whole build
//! - `minified`: compressed compiler output

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};

use crate::error::CollectError;

/// Where the compiled stylesheet ends up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ExtractMode {
    /// Splice an injection snippet into the carrier text (default).
    #[default]
    Disabled,
    /// Write a side artifact next to the host's output file.
    Enabled,
    /// Write a side artifact to an explicit path.
    ToPath(PathBuf),
}

impl ExtractMode {
    /// True for either extract variant.
    pub fn is_extract(&self) -> bool {
        !matches!(self, ExtractMode::Disabled)
    }
}

/// Configuration for a [`crate::CollectSassPlugin`].
#[derive(Debug, Clone)]
pub struct CollectConfig {
    /// Extension fallback list used during import resolution, in order.
    pub extensions: Vec<String>,

    /// Include patterns for module ids. Empty means include everything.
    pub include: Vec<String>,

    /// Exclude patterns for module ids.
    pub exclude: Vec<String>,

    /// Output disposition for the compiled stylesheet.
    pub extract: ExtractMode,

    /// Suppress re-emission of an import whose resolved path was already
    /// included earlier in the build.
    pub import_once: bool,

    /// Whether to produce compressed CSS.
    pub minified: bool,
}

impl Default for CollectConfig {
    fn default() -> Self {
        Self {
            extensions: vec![".scss".to_string(), ".sass".to_string()],
            include: vec!["**/*.scss".to_string(), "**/*.sass".to_string()],
            exclude: Vec::new(),
            extract: ExtractMode::Disabled,
            import_once: false,
            minified: false,
        }
    }
}

/// Compiled include/exclude filter plus the recognized-extension check.
///
/// Built once at plugin construction; pattern errors surface there rather
/// than per module.
#[derive(Debug)]
pub struct ModuleFilter {
    include: GlobSet,
    exclude: GlobSet,
    extensions: Vec<String>,
}

impl ModuleFilter {
    /// Compile the filter from a configuration.
    pub fn new(config: &CollectConfig) -> Result<Self, CollectError> {
        Ok(Self {
            include: build_globset(&config.include)?,
            exclude: build_globset(&config.exclude)?,
            extensions: config.extensions.clone(),
        })
    }

    /// True when the module should be transformed: included, not excluded,
    /// and carrying a recognized stylesheet extension. Everything else
    /// passes through the host pipeline byte-identical.
    pub fn matches(&self, id: &Path) -> bool {
        if !self.include.is_empty() && !self.include.is_match(id) {
            return false;
        }
        if self.exclude.is_match(id) {
            return false;
        }
        has_recognized_extension(id, &self.extensions)
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet, CollectError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| CollectError::InvalidPattern {
            pattern: pattern.clone(),
            message: e.to_string(),
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| CollectError::InvalidPattern {
        pattern: patterns.join(", "),
        message: e.to_string(),
    })
}

fn has_recognized_extension(id: &Path, extensions: &[String]) -> bool {
    let Some(ext) = id.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    extensions
        .iter()
        .any(|candidate| candidate.trim_start_matches('.') == ext)
}
