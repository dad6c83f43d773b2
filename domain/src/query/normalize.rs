//! Query normalization applied before analysis.

use crate::core::string::collapse_whitespace;
use regex::Regex;
use std::sync::LazyLock;

/// Abbreviation rewrites. Case-sensitive so that the pronoun "us" survives.
static ABBREVIATIONS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"\bUS\b", "United States"),
        (r"\bU\.S\.(?:A\.)?", "United States"),
        (r"\bUK\b", "United Kingdom"),
        (r"\bEU\b", "European Union"),
        (r"\bFTA\b", "Free Trade Agreement"),
        (r"(?i)\bvs\b\.?", "versus"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| {
        let regex = Regex::new(pattern)
            .unwrap_or_else(|e| panic!("invalid abbreviation pattern {pattern:?}: {e}"));
        (regex, replacement)
    })
    .collect()
});

/// Collapse whitespace and expand common trade abbreviations.
///
/// ```
/// use tradedesk_domain::query::normalize::normalize_query;
///
/// assert_eq!(
///     normalize_query("  steel from  China vs   US "),
///     "steel from China versus United States"
/// );
/// ```
pub fn normalize_query(query: &str) -> String {
    let mut text = collapse_whitespace(query);
    for (pattern, replacement) in ABBREVIATIONS.iter() {
        text = pattern.replace_all(&text, *replacement).into_owned();
    }
    text
}
