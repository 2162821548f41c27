/*
 * native.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Native BuildRuntime backed by std::fs and the grass compiler.
 */

use async_trait::async_trait;
use grass::{Options, OutputStyle};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::traits::{BuildRuntime, PathKind, RuntimeError, RuntimeResult};

/// Runtime with full access to the local file system.
///
/// SASS compilation uses grass, a pure Rust implementation that targets
/// dart-sass 1.54.3.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeRuntime;

impl NativeRuntime {
    /// Create a new native runtime.
    pub fn new() -> Self {
        Self
    }

    /// Probe `base` as a file, then `base` with each extension appended.
    fn probe(&self, base: &Path, extensions: &[String]) -> RuntimeResult<Option<PathBuf>> {
        if self.is_file(base)? {
            return Ok(Some(base.to_path_buf()));
        }

        if let Some(name) = base.file_name().and_then(|n| n.to_str()) {
            for ext in extensions {
                let candidate = base.with_file_name(format!("{}{}", name, ext));
                if self.is_file(&candidate)? {
                    return Ok(Some(candidate));
                }
            }
        }

        Ok(None)
    }
}

#[async_trait]
impl BuildRuntime for NativeRuntime {
    fn path_exists(&self, path: &Path, kind: Option<PathKind>) -> RuntimeResult<bool> {
        match fs::metadata(path) {
            Ok(metadata) => Ok(match kind {
                None => true,
                Some(PathKind::File) => metadata.is_file(),
                Some(PathKind::Directory) => metadata.is_dir(),
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn resolve_package(
        &self,
        request: &str,
        from_dir: &Path,
        extensions: &[String],
    ) -> RuntimeResult<PathBuf> {
        let request_path = Path::new(request);

        // Relative and absolute requests resolve directly, with extension
        // inference but no node_modules search.
        if request.starts_with("./") || request.starts_with("../") || request_path.is_absolute() {
            let base = from_dir.join(request_path);
            if let Some(found) = self.probe(&base, extensions)? {
                return Ok(found);
            }
            return Err(RuntimeError::PackageNotFound(request.to_string()));
        }

        // Bare specifier: walk ancestor node_modules directories.
        for dir in from_dir.ancestors() {
            let base = dir.join("node_modules").join(request_path);
            if let Some(found) = self.probe(&base, extensions)? {
                return Ok(found);
            }
        }

        Err(RuntimeError::PackageNotFound(request.to_string()))
    }

    fn compile_sass(
        &self,
        scss: &str,
        load_paths: &[PathBuf],
        minified: bool,
    ) -> RuntimeResult<String> {
        let style = if minified {
            OutputStyle::Compressed
        } else {
            OutputStyle::Expanded
        };

        let options = Options::default().load_paths(load_paths).style(style);

        grass::from_string(scss, &options).map_err(|e| RuntimeError::SassError(e.to_string()))
    }

    async fn write_file(&self, path: &Path, contents: &[u8]) -> RuntimeResult<()> {
        fs::write(path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_exists_kinds() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("style.scss");
        fs::write(&file, "$x: 1;").unwrap();

        let rt = NativeRuntime::new();
        assert!(rt.path_exists(&file, None).unwrap());
        assert!(rt.is_file(&file).unwrap());
        assert!(!rt.is_dir(&file).unwrap());
        assert!(rt.is_dir(temp.path()).unwrap());
        assert!(!rt.is_file(&temp.path().join("missing.scss")).unwrap());
    }

    #[test]
    fn test_resolve_package_relative_with_extension() {
        let temp = tempfile::tempdir().unwrap();
        let partials = temp.path().join("partials");
        fs::create_dir_all(&partials).unwrap();
        fs::write(partials.join("_grid.scss"), "$cols: 12;").unwrap();

        let rt = NativeRuntime::new();
        let extensions = vec![".scss".to_string(), ".sass".to_string()];

        let found = rt
            .resolve_package("./partials/_grid", temp.path(), &extensions)
            .unwrap();
        assert_eq!(found, partials.join("_grid.scss"));
    }

    #[test]
    fn test_resolve_package_bare_walks_node_modules() {
        let temp = tempfile::tempdir().unwrap();
        let pkg = temp.path().join("node_modules/theme");
        fs::create_dir_all(&pkg).unwrap();
        fs::write(pkg.join("_index.scss"), "$brand: teal;").unwrap();

        // Resolution starts in a nested directory and walks up.
        let nested = temp.path().join("src/components");
        fs::create_dir_all(&nested).unwrap();

        let rt = NativeRuntime::new();
        let extensions = vec![".scss".to_string()];

        let found = rt
            .resolve_package("theme/_index", &nested, &extensions)
            .unwrap();
        assert_eq!(found, pkg.join("_index.scss"));
    }

    #[test]
    fn test_resolve_package_exact_file_wins_over_extension() {
        let temp = tempfile::tempdir().unwrap();
        let pkg = temp.path().join("node_modules/lib");
        fs::create_dir_all(&pkg).unwrap();
        fs::write(pkg.join("main"), "// extensionless").unwrap();
        fs::write(pkg.join("main.scss"), "$x: 1;").unwrap();

        let rt = NativeRuntime::new();
        let extensions = vec![".scss".to_string()];

        let found = rt
            .resolve_package("lib/main", temp.path(), &extensions)
            .unwrap();
        assert_eq!(found, pkg.join("main"));
    }

    #[test]
    fn test_resolve_package_not_found() {
        let temp = tempfile::tempdir().unwrap();
        let rt = NativeRuntime::new();

        let result = rt.resolve_package("nope/_missing", temp.path(), &[".scss".to_string()]);
        assert!(matches!(result, Err(RuntimeError::PackageNotFound(_))));
    }

    #[test]
    fn test_compile_simple_scss() {
        let rt = NativeRuntime::new();
        let scss = "$primary: #007bff; .btn { color: $primary; }";

        let css = rt.compile_sass(scss, &[], false).unwrap();

        assert!(css.contains(".btn"));
        assert!(css.contains("#007bff"));
    }

    #[test]
    fn test_compile_scss_minified() {
        let rt = NativeRuntime::new();
        let scss = "$primary: blue;\n\n.btn {\n  color: $primary;\n}";

        let css = rt.compile_sass(scss, &[], true).unwrap();

        assert!(!css.contains("\n\n"));
        assert!(css.contains(".btn"));
        assert!(css.contains("blue"));
    }

    #[test]
    fn test_compile_empty_source() {
        let rt = NativeRuntime::new();
        let css = rt.compile_sass("", &[], false).unwrap();
        assert!(css.is_empty());
    }

    #[test]
    fn test_compile_scss_error() {
        let rt = NativeRuntime::new();
        let result = rt.compile_sass(".btn { color: $undefined-variable; }", &[], false);

        assert!(matches!(result, Err(RuntimeError::SassError(_))));
    }

    #[test]
    fn test_compile_with_load_path() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join("_vars.scss"), "$accent: #ff6600;").unwrap();

        let rt = NativeRuntime::new();
        let css = rt
            .compile_sass(
                "@import 'vars';\n.link { color: $accent; }",
                &[temp.path().to_path_buf()],
                false,
            )
            .unwrap();

        assert!(css.contains(".link"));
        assert!(css.contains("#ff6600"));
    }

    #[test]
    fn test_write_file() {
        let temp = tempfile::tempdir().unwrap();
        let dest = temp.path().join("out.css");

        let rt = NativeRuntime::new();
        pollster::block_on(rt.write_file(&dest, b".a { color: red; }")).unwrap();

        assert_eq!(fs::read_to_string(&dest).unwrap(), ".a { color: red; }");
    }

    #[test]
    fn test_write_file_missing_directory_fails() {
        let temp = tempfile::tempdir().unwrap();
        let dest = temp.path().join("no-such-dir/out.css");

        let rt = NativeRuntime::new();
        let result = pollster::block_on(rt.write_file(&dest, b""));

        assert!(matches!(result, Err(RuntimeError::Io(_))));
    }
}
