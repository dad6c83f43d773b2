//! String helpers shared by the analysis stages.

/// Shorten `s` to at most `max_chars` characters, appending `...` when cut.
pub fn preview(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = s.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// Collapse runs of whitespace into single spaces and trim both ends.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_short_text_is_untouched() {
        assert_eq!(preview("steel", 10), "steel");
    }

    #[test]
    fn test_preview_counts_characters_not_bytes() {
        assert_eq!(preview("Zürich → Genève", 9), "Zürich...");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  tariff \n on\tsteel  "), "tariff on steel");
        assert_eq!(collapse_whitespace("   "), "");
    }
}
