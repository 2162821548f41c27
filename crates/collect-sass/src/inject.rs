//! Runtime style injection.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! In inject mode the compiled stylesheet rides inside the bundle itself:
//! the host prepends [`HELPER_SOURCE`] once, and the final pass splices a
//! single call to it where the first fragment used to be.

/// Name of the helper function installed by [`HELPER_SOURCE`].
pub const INJECT_FN_NAME: &str = "__collectSassInject";

/// Injection helper prepended once to the bundle in inject mode.
///
/// Creates a single `<style>` element on first call and replaces its
/// contents on later calls; a no-op outside a DOM environment.
pub const HELPER_SOURCE: &str = r#"function __collectSassInject(css) {
  if (typeof document === 'undefined') { return; }
  var id = '__collect_sass_style__';
  var style = document.getElementById(id);
  if (!style) {
    style = document.createElement('style');
    style.id = id;
    style.type = 'text/css';
    var head = document.head || document.getElementsByTagName('head')[0];
    head.appendChild(style);
  }
  if (style.styleSheet) {
    style.styleSheet.cssText = css;
  } else {
    style.textContent = css;
  }
}
"#;

/// Build the snippet that replaces the first fragment span.
///
/// The CSS travels as a JSON string literal, which is also a valid JS
/// string literal, so quotes and newlines in the compiled output survive
/// byte-exact.
pub fn injection_snippet(css: &str) -> String {
    // Serializing a plain string cannot fail
    let literal = serde_json::to_string(css).unwrap_or_default();
    format!("{}({});", INJECT_FN_NAME, literal)
}
