//! Build-scoped state shared between the two plugin phases.
//!
//! Copyright (c) 2025 Posit, PBC

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Registry of resolved import paths already emitted during the current
/// build.
///
/// Suppression under import-once is keyed on the resolved path, not the
/// literal source text, so two spellings of the same file collapse. The
/// registry is shared across all per-module transforms; check-and-insert is
/// a single critical section so parallel transforms cannot both observe
/// "not seen".
#[derive(Debug, Default)]
pub struct BuildContext {
    seen_imports: Mutex<HashSet<PathBuf>>,
}

impl BuildContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `path` as seen. Returns `false` when it was already present
    /// (first writer wins).
    pub fn insert_if_unseen(&self, path: &Path) -> bool {
        // A poisoned lock only means another transform panicked; the set
        // itself is still usable.
        let mut seen = self
            .seen_imports
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        seen.insert(path.to_path_buf())
    }

    /// Forget every seen import. Runs at the start of each final pass so a
    /// re-triggered build does not suppress imports it legitimately needs.
    pub fn reset(&self) {
        self.seen_imports
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}
