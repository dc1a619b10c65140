//! Label Sanitization
//!
//! Prometheus label values may carry any UTF-8 text, but backslash,
//! double quote, and newline must be escaped before a value can sit
//! inside the text exposition format. Cache and container names
//! coming out of the management interface can contain all three.

/// Escape a raw identifier into a label-safe value.
///
/// Deterministic and total: every input maps to exactly one output,
/// and the output contains no unescaped reserved characters.
pub fn sanitize_label(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_plain_values_pass_through() {
        assert_eq!(sanitize_label("myCache"), "myCache");
        assert_eq!(
            sanitize_label("myReplicatedCache(repl_sync)"),
            "myReplicatedCache(repl_sync)"
        );
    }

    #[test]
    fn test_reserved_characters_are_escaped() {
        assert_eq!(sanitize_label("a\"b"), "a\\\"b");
        assert_eq!(sanitize_label("a\\b"), "a\\\\b");
        assert_eq!(sanitize_label("a\nb"), "a\\nb");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(sanitize_label(""), "");
    }

    proptest! {
        #[test]
        fn prop_sanitize_is_deterministic(s in ".*") {
            prop_assert_eq!(sanitize_label(&s), sanitize_label(&s));
        }

        #[test]
        fn prop_output_has_no_raw_newline(s in ".*") {
            prop_assert!(!sanitize_label(&s).contains('\n'));
        }

        #[test]
        fn prop_quotes_are_always_escaped(s in ".*") {
            let out = sanitize_label(&s);
            let chars: Vec<char> = out.chars().collect();
            for (i, c) in chars.iter().enumerate() {
                if *c == '"' {
                    prop_assert!(i > 0 && chars[i - 1] == '\\');
                }
            }
        }

        #[test]
        fn prop_values_without_reserved_chars_are_unchanged(
            s in "[^\\\\\"\n]*"
        ) {
            prop_assert_eq!(sanitize_label(&s), s);
        }
    }
}
