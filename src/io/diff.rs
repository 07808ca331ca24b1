use similar::TextDiff;

/// Lines of unchanged context around each hunk.
pub const CONTEXT_RADIUS: usize = 3;

/// Unified diff from `original` to `refactored` with `original`/`refactored`
/// headers. Empty when the texts are equal.
pub fn generate_diff(original: &str, refactored: &str) -> String {
    generate_diff_with_labels(original, refactored, "original", "refactored")
}

/// Unified diff with caller-chosen file headers.
pub fn generate_diff_with_labels(
    original: &str,
    refactored: &str,
    old_label: &str,
    new_label: &str,
) -> String {
    if original == refactored {
        return String::new();
    }
    TextDiff::from_lines(original, refactored)
        .unified_diff()
        .context_radius(CONTEXT_RADIUS)
        .header(old_label, new_label)
        .to_string()
}

/// `a/<id>` and `b/<id>` headers, or the generic pair without an id.
pub fn labels_for(source_id: Option<&str>) -> (String, String) {
    match source_id {
        Some(id) => (format!("a/{id}"), format!("b/{id}")),
        None => ("original".to_string(), "refactored".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_texts_produce_empty_diff() {
        assert_eq!(generate_diff("x = 1\n", "x = 1\n"), "");
    }

    #[test]
    fn test_diff_has_headers_and_hunk() {
        let diff = generate_diff("a\nb\nc\n", "a\nB\nc\n");
        assert!(diff.starts_with("--- original\n+++ refactored\n"));
        assert!(diff.contains("@@ -1,3 +1,3 @@"));
        assert!(diff.contains("-b\n+B\n"));
    }

    #[test]
    fn test_labels_follow_source_id() {
        assert_eq!(
            labels_for(Some("pkg/mod.py")),
            ("a/pkg/mod.py".to_string(), "b/pkg/mod.py".to_string())
        );
        assert_eq!(labels_for(None).0, "original");
    }
}
