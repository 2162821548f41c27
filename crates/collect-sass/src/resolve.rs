//! Import-path resolution.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! Reproduces the SASS preprocessor's file lookup for `@import` targets so
//! that relative imports keep working after every fragment is relocated
//! into one compiled unit. For a single target the probe order is:
//!
//! 1. `.css` / `http://` / `url(` targets pass through untouched
//! 2. `dir/file` next to the referencing file
//! 3. `dir/_file` (the partial naming convention)
//! 4. `dir/_file<ext>` for each configured extension, in order
//! 5. `target<ext>` for each configured extension, in order
//! 6. package resolution of `dir/_file`
//! 7. package resolution of `dir/file`
//!
//! The first strategy that finds a match wins. An unresolved target is
//! dropped with a warning rather than failing the build; the stylesheet
//! compiler reports the authoritative file-not-found against the rewritten
//! text later.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::path::{Path, PathBuf};

use collect_sass_runtime::BuildRuntime;

use crate::context::BuildContext;

/// Matches one `@import …;` statement; everything up to the semicolon is
/// captured in group 1.
static IMPORT_STATEMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"@import([^;]*);").unwrap());

/// Outcome of resolving a single import target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportResolution {
    /// Rewritten to an absolute path the relocated fragment can still reach.
    Rewritten(PathBuf),
    /// The preprocessor understands the target natively; left untouched.
    PassThrough(String),
    /// Duplicate under import-once; dropped from the statement.
    Suppressed,
}

/// Resolves import targets for one build.
///
/// Holds no state of its own beyond the shared [`BuildContext`] registry,
/// so a fresh resolver per module is cheap.
pub struct ImportResolver<'a> {
    runtime: &'a dyn BuildRuntime,
    context: &'a BuildContext,
    extensions: &'a [String],
    import_once: bool,
}

impl<'a> ImportResolver<'a> {
    pub fn new(
        runtime: &'a dyn BuildRuntime,
        context: &'a BuildContext,
        extensions: &'a [String],
        import_once: bool,
    ) -> Self {
        Self {
            runtime,
            context,
            extensions,
            import_once,
        }
    }

    /// Rewrite every `@import …;` statement in `source`, resolving targets
    /// relative to `base_dir` (the referencing file's directory). All other
    /// text is left untouched.
    pub fn rewrite_imports(&self, source: &str, base_dir: &Path, module_id: &Path) -> String {
        IMPORT_STATEMENT
            .replace_all(source, |captures: &Captures| {
                self.resolve_statement(&captures[1], base_dir, module_id)
            })
            .into_owned()
    }

    /// Resolve a comma-separated target list and reassemble the statement
    /// from the survivors. Returns the empty string when every target was
    /// suppressed or dropped.
    pub fn resolve_statement(&self, targets: &str, base_dir: &Path, module_id: &Path) -> String {
        let survivors: Vec<String> = targets
            .split(',')
            .filter_map(|raw| match self.resolve_target(raw, base_dir, module_id) {
                Some(ImportResolution::Rewritten(path)) => Some(format!("'{}'", path.display())),
                Some(ImportResolution::PassThrough(text)) => Some(text),
                Some(ImportResolution::Suppressed) | None => None,
            })
            .collect();

        if survivors.is_empty() {
            String::new()
        } else {
            format!("@import {};", survivors.join(", "))
        }
    }

    /// Resolve one target. `None` means the target did not resolve and is
    /// dropped from its statement.
    pub fn resolve_target(
        &self,
        raw: &str,
        base_dir: &Path,
        module_id: &Path,
    ) -> Option<ImportResolution> {
        let original = raw.trim();
        if original.is_empty() {
            return None;
        }
        let name = strip_matching_quotes(original);

        // The preprocessor handles these natively; rewriting would break them.
        if Path::new(name).extension().is_some_and(|ext| ext == "css")
            || name.starts_with("http://")
            || name.starts_with("url(")
        {
            return Some(ImportResolution::PassThrough(original.to_string()));
        }

        let target = Path::new(name);
        let file_name = target
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or(name)
            .to_string();
        let dir_name = target
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty());

        let partial_rel = match dir_name {
            Some(dir) => dir.join(format!("_{}", file_name)),
            None => PathBuf::from(format!("_{}", file_name)),
        };
        let bare_rel = match dir_name {
            Some(dir) => dir.join(&file_name),
            None => PathBuf::from(&file_name),
        };

        // 2. Exact name next to the referencing file
        let exact = base_dir.join(target);
        if self.runtime.is_file(&exact).unwrap_or(false) {
            return Some(self.admit(exact));
        }

        // 3. Partial-prefixed
        let partial = base_dir.join(&partial_rel);
        if self.runtime.is_file(&partial).unwrap_or(false) {
            return Some(self.admit(partial));
        }

        // 4. Partial-prefixed with each extension appended
        for ext in self.extensions {
            let candidate = base_dir.join(append_extension(&partial_rel, ext));
            if self.runtime.is_file(&candidate).unwrap_or(false) {
                return Some(self.admit(candidate));
            }
        }

        // 5. Bare name with each extension appended
        for ext in self.extensions {
            let candidate = base_dir.join(format!("{}{}", name, ext));
            if self.runtime.is_file(&candidate).unwrap_or(false) {
                return Some(self.admit(candidate));
            }
        }

        // 6. Package resolution of the partial-prefixed name
        let partial_request = partial_rel.to_string_lossy();
        if let Ok(found) = self
            .runtime
            .resolve_package(&partial_request, base_dir, self.extensions)
        {
            return Some(self.admit(found));
        }

        // 7. Package resolution of the bare name
        let bare_request = bare_rel.to_string_lossy();
        if let Ok(found) = self
            .runtime
            .resolve_package(&bare_request, base_dir, self.extensions)
        {
            return Some(self.admit(found));
        }

        tracing::warn!(
            module = %module_id.display(),
            import = name,
            "unresolved import target"
        );
        None
    }

    /// Register a resolved path and decide between emission and
    /// import-once suppression. First writer wins.
    fn admit(&self, path: PathBuf) -> ImportResolution {
        let first = self.context.insert_if_unseen(&path);
        if self.import_once && !first {
            ImportResolution::Suppressed
        } else {
            ImportResolution::Rewritten(path)
        }
    }
}

/// Strip one pair of matching surrounding quote characters.
fn strip_matching_quotes(name: &str) -> &str {
    let bytes = name.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        if (first == b'"' || first == b'\'') && bytes[bytes.len() - 1] == first {
            return &name[1..name.len() - 1];
        }
    }
    name
}

/// Append `ext` (which carries its own leading dot) to the file name of
/// `path` without replacing an existing extension.
fn append_extension(path: &Path, ext: &str) -> PathBuf {
    match path.file_name().and_then(|f| f.to_str()) {
        Some(file_name) => path.with_file_name(format!("{}{}", file_name, ext)),
        None => path.to_path_buf(),
    }
}
