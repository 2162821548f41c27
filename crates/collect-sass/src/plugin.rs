//! The two-phase plugin surface the host bundler drives.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! Per-module phase: [`CollectSassPlugin::transform`] rewrites a stylesheet
//! module's imports and wraps the result in fragment markers, so the host
//! carries it through bundling as inert text. Final phase:
//! [`CollectSassPlugin::finalize`] scans the concatenated bundle once,
//! compiles every fragment as a single unit, and splices the result back in
//! (inject mode) or retains it for the deferred
//! [`CollectSassPlugin::commit`] write (extract mode).
//!
//! The final phase must not run before the host has concatenated all
//! transformed modules; it is a hard synchronization point.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::Serialize;

use collect_sass_runtime::BuildRuntime;

use crate::config::{CollectConfig, ExtractMode, ModuleFilter};
use crate::context::BuildContext;
use crate::error::CollectError;
use crate::fragment::{self, FragmentSpan};
use crate::inject;
use crate::resolve::ImportResolver;

/// Identity source map attached to every transform result.
///
/// This transform intentionally does not track source positions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceMapStub {
    pub mappings: String,
}

/// One module's transform result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformOutput {
    /// Marker-wrapped stylesheet text standing in for the module's code.
    pub code: String,
    /// Identity map (`mappings: ""`).
    pub map: SourceMapStub,
}

/// Collects stylesheet modules into one compiled artifact.
///
/// Construct once per build. Methods take `&self`; the registry and the
/// retained extract payload live behind their own locks, so a host that
/// parallelizes per-module transforms stays correct.
pub struct CollectSassPlugin<'r> {
    config: CollectConfig,
    filter: ModuleFilter,
    runtime: &'r dyn BuildRuntime,
    context: BuildContext,
    /// Compiled CSS retained between finalize and commit in extract mode.
    extracted: Mutex<Option<String>>,
}

impl<'r> CollectSassPlugin<'r> {
    /// Create a plugin. Fails only on invalid include/exclude patterns.
    pub fn new(config: CollectConfig, runtime: &'r dyn BuildRuntime) -> Result<Self, CollectError> {
        let filter = ModuleFilter::new(&config)?;
        Ok(Self {
            config,
            filter,
            runtime,
            context: BuildContext::new(),
            extracted: Mutex::new(None),
        })
    }

    /// Include/exclude filter plus extension check.
    pub fn should_process(&self, id: &Path) -> bool {
        self.filter.matches(id)
    }

    /// Bundle prelude. In inject mode the host prepends this once; the
    /// snippet emitted by [`CollectSassPlugin::finalize`] calls into it.
    pub fn intro(&self) -> Option<&'static str> {
        if self.config.extract.is_extract() {
            None
        } else {
            Some(inject::HELPER_SOURCE)
        }
    }

    /// Per-module hook. `None` means the module is not a stylesheet module
    /// and must pass through the host pipeline unmodified.
    pub fn transform(&self, source: &str, id: &Path) -> Option<TransformOutput> {
        if !self.should_process(id) {
            return None;
        }

        tracing::debug!(module = %id.display(), "collecting stylesheet module");

        // Resolve imports now, before the relative file context is lost to
        // concatenation.
        let base_dir = id.parent().unwrap_or_else(|| Path::new(""));
        let resolver = ImportResolver::new(
            self.runtime,
            &self.context,
            &self.config.extensions,
            self.config.import_once,
        );
        let rewritten = resolver.rewrite_imports(source, base_dir, id);

        Some(TransformOutput {
            code: fragment::wrap(&rewritten),
            map: SourceMapStub::default(),
        })
    }

    /// Final hook: runs exactly once per build, after the host has
    /// concatenated all modules in final order.
    ///
    /// Compiles the fragments as one unit and returns the carrier text with
    /// every marker span removed — the first replaced by the injection
    /// snippet in inject mode.
    pub fn finalize(&self, carrier: &str) -> Result<String, CollectError> {
        // A re-triggered build starts with a clean registry.
        self.context.reset();

        let spans = fragment::scan(carrier);
        let mut buffer = String::new();
        for span in &spans {
            buffer.push_str(span.body);
        }

        // Exactly one compiler invocation per build, even over an empty
        // buffer.
        let css = self
            .runtime
            .compile_sass(&buffer, &[], self.config.minified)
            .map_err(|e| CollectError::Compile {
                message: e.to_string(),
            })?;

        tracing::debug!(
            fragments = spans.len(),
            bytes = css.len(),
            "compiled collected stylesheet"
        );

        if self.config.extract.is_extract() {
            let mut extracted = self
                .extracted
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            *extracted = Some(css);
            Ok(remove_spans(carrier, &spans, None))
        } else {
            let snippet = inject::injection_snippet(&css);
            Ok(remove_spans(carrier, &spans, Some(&snippet)))
        }
    }

    /// Path of the side artifact for a given host output path: same
    /// directory and base name with the stylesheet extension, unless an
    /// explicit override path is configured.
    pub fn output_path(&self, intended_output: &Path) -> PathBuf {
        if let ExtractMode::ToPath(path) = &self.config.extract {
            return path.clone();
        }
        intended_output.with_extension("css")
    }

    /// Deferred write of the extracted stylesheet, invoked once the host
    /// knows the final artifact path. No-op in inject mode. A write failure
    /// is a build failure.
    pub async fn commit(&self, intended_output: &Path) -> Result<(), CollectError> {
        if !self.config.extract.is_extract() {
            return Ok(());
        }

        let css = {
            let extracted = self
                .extracted
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            extracted.clone().ok_or(CollectError::NothingToCommit)?
        };

        let dest = self.output_path(intended_output);
        self.runtime
            .write_file(&dest, css.as_bytes())
            .await
            .map_err(|source| CollectError::ArtifactWrite { path: dest, source })
    }
}

/// Rebuild the carrier text with every span removed; `first_replacement`
/// (when given) stands in for the first span instead.
fn remove_spans(carrier: &str, spans: &[FragmentSpan<'_>], first_replacement: Option<&str>) -> String {
    let mut out = String::with_capacity(carrier.len());
    let mut cursor = 0;
    for (index, span) in spans.iter().enumerate() {
        out.push_str(&carrier[cursor..span.range.start]);
        if index == 0 {
            if let Some(snippet) = first_replacement {
                out.push_str(snippet);
            }
        }
        cursor = span.range.end;
    }
    out.push_str(&carrier[cursor..]);
    out
}
