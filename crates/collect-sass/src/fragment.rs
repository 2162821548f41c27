//! Fragment markers and carrier-text scanning.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! Each transformed stylesheet module is wrapped in a pair of sentinel
//! markers that together form one JS block comment:
//!
//! ```text
//! /* collect-scss-start .btn { ... } collect-scss-end */
//! ```
//!
//! The host bundler carries the comment through concatenation untouched.
//! The final pass scans the concatenated carrier text for these spans; the
//! order they appear in is the canonical fragment order, regardless of the
//! order modules were transformed in.

use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

/// Opens a fragment span. Forms a JS block comment together with
/// [`END_MARKER`], so the carrier language ignores the fragment body.
pub const START_MARKER: &str = "/* collect-scss-start";

/// Closes a fragment span.
pub const END_MARKER: &str = "collect-scss-end */";

/// Matches one marker-delimited span, body in group 1. Non-greedy, so
/// adjacent spans never merge.
static SPAN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        "(?s){}(.*?){}",
        regex::escape(START_MARKER),
        regex::escape(END_MARKER)
    ))
    .unwrap()
});

/// Wrap one module's transformed stylesheet text for transport through the
/// host pipeline.
pub fn wrap(transformed: &str) -> String {
    format!("{}{}{}", START_MARKER, transformed, END_MARKER)
}

/// One marker-delimited span found in the carrier text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentSpan<'a> {
    /// Byte range of the whole span, markers inclusive.
    pub range: Range<usize>,
    /// The stylesheet text between the markers.
    pub body: &'a str,
}

/// Scan carrier text left to right for all non-overlapping fragment spans,
/// in order of appearance.
pub fn scan(carrier: &str) -> Vec<FragmentSpan<'_>> {
    SPAN.captures_iter(carrier)
        .map(|captures| {
            let whole = captures.get(0).unwrap();
            let body = captures.get(1).unwrap();
            FragmentSpan {
                range: whole.range(),
                body: body.as_str(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_round_trips_through_scan() {
        let wrapped = wrap(".btn { color: red; }");
        let spans = scan(&wrapped);

        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].body, ".btn { color: red; }");
        assert_eq!(spans[0].range, 0..wrapped.len());
    }

    #[test]
    fn test_scan_preserves_carrier_order() {
        let carrier = format!(
            "var a = 1;\n{}\nvar b = 2;\n{}\nvar c = 3;",
            wrap(".second { }"),
            wrap(".first { }")
        );

        let bodies: Vec<&str> = scan(&carrier).iter().map(|s| s.body).collect();
        // Scan order is carrier order, not any per-module order
        assert_eq!(bodies, vec![".second { }", ".first { }"]);
    }

    #[test]
    fn test_scan_empty_carrier() {
        assert!(scan("").is_empty());
        assert!(scan("var x = 1; // no fragments here").is_empty());
    }

    #[test]
    fn test_scan_multiline_body() {
        let body = ".a {\n  color: red;\n}\n\n.b {\n  color: blue;\n}";
        let wrapped = wrap(body);
        let spans = scan(&wrapped);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].body, body);
    }

    #[test]
    fn test_adjacent_spans_do_not_merge() {
        let carrier = format!("{}{}", wrap("a"), wrap("b"));
        let spans = scan(&carrier);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].body, "a");
        assert_eq!(spans[1].body, "b");
    }

    #[test]
    fn test_span_ranges_cover_markers() {
        let carrier = format!("prefix {} suffix", wrap("body"));
        let spans = scan(&carrier);
        let span_text = &carrier[spans[0].range.clone()];
        assert!(span_text.starts_with(START_MARKER));
        assert!(span_text.ends_with(END_MARKER));
    }
}
