//! Diff generation utilities.
//!
//! Provides unified diff output for rename previews using the `similar` crate.

use similar::TextDiff;

/// Unified diff of one file with `a/` and `b/` headers and 3 lines of context.
///
/// Returns an empty string when the contents are equal.
#[must_use]
pub fn generate_unified_diff(path: &str, original: &str, modified: &str) -> String {
    if original == modified {
        return String::new();
    }
    TextDiff::from_lines(original, modified)
        .unified_diff()
        .context_radius(3)
        .header(&format!("a/{path}"), &format!("b/{path}"))
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_diff() {
        let original = "class A {\n    void int() { }\n}\n";
        let modified = "class A {\n    void intValue() { }\n}\n";
        let diff = generate_unified_diff("src/a.cs", original, modified);

        assert!(diff.starts_with("--- a/src/a.cs\n+++ b/src/a.cs\n"));
        assert!(diff.contains("-    void int() { }"));
        assert!(diff.contains("+    void intValue() { }"));
        assert!(diff.contains("@@"));
    }

    #[test]
    fn test_no_changes() {
        let content = "unchanged content";
        assert!(generate_unified_diff("x.cs", content, content).is_empty());
    }
}
