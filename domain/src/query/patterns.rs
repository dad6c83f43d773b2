//! Compiled keyword patterns and gazetteers used by the analysis stages.
//!
//! All patterns are case-insensitive and anchored on word boundaries so that
//! short keywords ("vs", "us") do not fire inside longer words.

use regex::Regex;
use std::sync::LazyLock;

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern {pattern:?}: {e}"))
}

pub static COMPARISON: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?i)\b(compare|comparison|vs|versus|difference|better|cheaper|more expensive|against|between)\b")
});

pub static COST: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?i)\b(costs?|prices?|expensive|cheap|total|landed|fees?|charges?|calculate)\b")
});

pub static COMPLIANCE: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?i)\b(compliance|regulations?|legal|requirements?|documentation|permits?|licen[cs]es?|certificates?|customs)\b")
});

pub static RISK: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?i)\b(risks?|danger|problems?|issues?|disruptions?|volatility|threats?|vulnerability|impact)\b")
});

pub static MARKET: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?i)\b(markets?|trends?|opportunit(?:y|ies)|demand|supply|forecasts?|intelligence)\b")
});

pub static OPTIMIZATION: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?i)\b(optimi[sz]e|optimal|best|efficient|improve|reduce|minimi[sz]e|maximi[sz]e|strategy|recommend)\b")
});

pub static SCENARIO: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?i)\b(scenario|what if|suppose|assume|consider|alternatives?|options?)\b")
});

pub static TARIFF_KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)\b(tariffs?|dut(?:y|ies))\b"));

pub static CLASSIFICATION_KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)\b(hs\s*codes?|classification|classify|harmonized\s*system)\b"));

/// Words that signal a trade question and pull in tariff analysis.
pub static TRADE_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?i)\b(trade|trading|import(?:s|ing|ed)?|export(?:s|ing|ed)?|tariffs?|customs|dut(?:y|ies))\b")
});

/// Back-references to earlier turns ("the previous option").
pub static CONTEXTUAL_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?i)\b(the|that|this|previous|last|earlier|mentioned|discussed|above)\s+(option|choice|country|product|analysis|calculation|result)s?\b")
});

/// "the steel we discussed" style references into conversation history.
pub static DISCUSSED_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?i)\b(?:the|that|this)\s+(\w+(?:\s+\w+){0,2}?)\s+(?:we|i)\s+(?:discussed|mentioned|talked about|looked at)\b")
});

/// Pronouns that only make sense with earlier turns.
pub static PRONOUN_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)\b(it|its|them|those|these)\b"));

/// Greetings and questions about the assistant itself.
pub static HELP_REQUEST: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?i)\b(help|hello|hi|what can you do|how do you work|what are you|capabilities|features|guide|tutorial)\b")
});

pub static CONJUNCTION: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)\b(?:and|or)\b"));

pub static SEGMENT_SPLIT: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?i)\b(?:and|or|also|additionally|furthermore|moreover)\b")
});

pub static HS_CODE: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?i)\b(?:hs\s*code|harmonized\s*system|classification)\s*:?\s*(\d{4,10})\b|\b(\d{4}\.\d{2}\.\d{2})\b")
});

pub static MONETARY: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?i)\$\s?([\d,]+(?:\.\d{2})?)|\b([\d,]+(?:\.\d{2})?)\s*(dollars?|usd|euros?|eur|pounds?|gbp|yen|jpy)\b")
});

pub static PERCENTAGE: LazyLock<Regex> = LazyLock::new(|| compile(r"(\d+(?:\.\d+)?)\s*%"));

pub static QUANTITY: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?i)\b(\d+(?:,\d{3})*(?:\.\d+)?)\s*(units?|pieces?|tons?|tonnes?|kg|pounds?|lbs|containers?|shipments?)\b")
});

/// Country aliases and the canonical name each resolves to.
///
/// Lowercase "us" is absent since it collides with the pronoun.
/// Uppercase "US" is rewritten to "United States" during normalization.
pub const COUNTRY_ALIASES: &[(&str, &str)] = &[
    ("united states", "United States"),
    ("usa", "United States"),
    ("america", "United States"),
    ("china", "China"),
    ("germany", "Germany"),
    ("japan", "Japan"),
    ("canada", "Canada"),
    ("mexico", "Mexico"),
    ("united kingdom", "United Kingdom"),
    ("uk", "United Kingdom"),
    ("britain", "United Kingdom"),
    ("france", "France"),
    ("italy", "Italy"),
    ("spain", "Spain"),
    ("netherlands", "Netherlands"),
    ("belgium", "Belgium"),
    ("australia", "Australia"),
    ("brazil", "Brazil"),
    ("india", "India"),
    ("south korea", "South Korea"),
    ("korea", "South Korea"),
    ("singapore", "Singapore"),
    ("taiwan", "Taiwan"),
    ("switzerland", "Switzerland"),
    ("sweden", "Sweden"),
    ("norway", "Norway"),
    ("denmark", "Denmark"),
    ("finland", "Finland"),
    ("poland", "Poland"),
    ("czech republic", "Czech Republic"),
    ("hungary", "Hungary"),
    ("romania", "Romania"),
    ("bulgaria", "Bulgaria"),
    ("greece", "Greece"),
    ("portugal", "Portugal"),
    ("ireland", "Ireland"),
    ("austria", "Austria"),
    ("luxembourg", "Luxembourg"),
    ("vietnam", "Vietnam"),
];

/// Product keywords (singular stem, optional plural handled by the pattern).
pub const PRODUCT_KEYWORDS: &[&str] = &[
    "vehicle",
    "car",
    "automobile",
    "electronic",
    "computer",
    "smartphone",
    "textile",
    "clothing",
    "machinery",
    "equipment",
    "steel",
    "aluminum",
    "plastic",
    "chemical",
    "pharmaceutical",
    "medical device",
    "food",
    "beverage",
    "furniture",
    "toy",
    "book",
    "paper",
    "wood",
    "lumber",
    "oil",
    "gas",
    "coal",
    "mineral",
    "solar panel",
    "semiconductor",
];

pub static COUNTRY: LazyLock<Regex> = LazyLock::new(|| {
    let mut aliases: Vec<&str> = COUNTRY_ALIASES.iter().map(|(alias, _)| *alias).collect();
    aliases.sort_by_key(|alias| std::cmp::Reverse(alias.len()));
    let alternatives: Vec<String> = aliases.iter().map(|a| regex::escape(a)).collect();
    compile(&format!(r"(?i)\b({})\b", alternatives.join("|")))
});

pub static PRODUCT: LazyLock<Regex> = LazyLock::new(|| {
    let alternatives: Vec<String> = PRODUCT_KEYWORDS
        .iter()
        .map(|p| format!("{}s?", regex::escape(p)))
        .collect();
    compile(&format!(r"(?i)\b({})\b", alternatives.join("|")))
});

/// Canonical country name for an alias match (case-insensitive).
pub fn canonical_country(alias: &str) -> Option<&'static str> {
    let lower = alias.to_lowercase();
    COUNTRY_ALIASES
        .iter()
        .find(|(a, _)| *a == lower)
        .map(|(_, canonical)| *canonical)
}
