//! Stylesheet collection for module bundlers.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! This crate provides:
//! - Import-path resolution reproducing the SASS preprocessor's file lookup
//!   (partial prefixing, extension inference, package-path fallback)
//! - Marker-based fragment transport through an otherwise-unmodified host
//!   bundle, with carrier order as the canonical fragment order
//! - A single compiler invocation per build, spliced back in as a runtime
//!   injection snippet or written out as a side artifact

mod config;
mod context;
mod error;
mod fragment;
mod inject;
mod plugin;
mod resolve;

pub use config::{CollectConfig, ExtractMode, ModuleFilter};
pub use context::BuildContext;
pub use error::CollectError;
pub use fragment::{END_MARKER, FragmentSpan, START_MARKER, scan, wrap};
pub use inject::{HELPER_SOURCE, INJECT_FN_NAME, injection_snippet};
pub use plugin::{CollectSassPlugin, SourceMapStub, TransformOutput};
pub use resolve::{ImportResolution, ImportResolver};
