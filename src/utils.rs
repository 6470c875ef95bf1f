// Utility functions

/// Lowercases `text` and joins its whitespace-separated words with single hyphens.
pub fn to_kebab_case(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// Cuts `text` to at most `max_chars` characters without splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kebab_case_collapses_whitespace_runs() {
        assert_eq!(to_kebab_case("FastHost"), "fasthost");
        assert_eq!(to_kebab_case("Green  Geeks\tPro"), "green-geeks-pro");
        assert_eq!(to_kebab_case("  SiteGround WordPress "), "siteground-wordpress");
        assert_eq!(to_kebab_case(""), "");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }
}
