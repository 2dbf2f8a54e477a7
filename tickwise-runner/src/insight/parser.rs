//! Free-form response parsing: sentiment and key factors.
//!
//! Sentiment: case-insensitive whole-word occurrence counts of
//! [`POSITIVE_WORDS`] against [`NEGATIVE_WORDS`]; the larger count wins and a
//! tie is Neutral. "BUYBACK" and "SELLERS" do not count as BUY or SELL.
//!
//! Key factors: a line qualifies when, after trimming, it starts with a bullet
//! (`•`, `-`, `*`) or a numbering marker (`1.`, `2)`, ...). Markers and
//! markdown bold (`**`) are stripped, and the remaining text must be 10 to 200
//! characters long. The first five qualifying lines are kept in order.

use super::Sentiment;

pub const POSITIVE_WORDS: &[&str] = &[
    "BUY",
    "BULLISH",
    "POSITIVE",
    "UPTREND",
    "GROWTH",
    "OUTPERFORM",
];

pub const NEGATIVE_WORDS: &[&str] = &[
    "SELL",
    "BEARISH",
    "NEGATIVE",
    "DOWNTREND",
    "DECLINE",
    "HIGH RISK",
];

pub const MAX_KEY_FACTORS: usize = 5;
pub const MIN_FACTOR_LEN: usize = 10;
pub const MAX_FACTOR_LEN: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedInsight {
    pub sentiment: Sentiment,
    pub key_factors: Vec<String>,
}

pub fn parse_insight_text(text: &str) -> ParsedInsight {
    ParsedInsight {
        sentiment: sentiment_of(text),
        key_factors: key_factors_of(text),
    }
}

pub fn sentiment_of(text: &str) -> Sentiment {
    let upper = text.to_uppercase();
    let count = |words: &[&str]| -> usize { words.iter().map(|w| count_word(&upper, w)).sum() };

    let (positive, negative) = (count(POSITIVE_WORDS), count(NEGATIVE_WORDS));
    match positive.cmp(&negative) {
        std::cmp::Ordering::Greater => Sentiment::Positive,
        std::cmp::Ordering::Less => Sentiment::Negative,
        std::cmp::Ordering::Equal => Sentiment::Neutral,
    }
}

/// Occurrences of `word` in `haystack` not embedded in a longer word.
fn count_word(haystack: &str, word: &str) -> usize {
    let is_word_char = |c: Option<char>| c.is_some_and(char::is_alphanumeric);
    haystack
        .match_indices(word)
        .filter(|(at, _)| {
            let before = haystack[..*at].chars().next_back();
            let after = haystack[at + word.len()..].chars().next();
            !is_word_char(before) && !is_word_char(after)
        })
        .count()
}

pub fn key_factors_of(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(factor_line)
        .take(MAX_KEY_FACTORS)
        .collect()
}

fn factor_line(line: &str) -> Option<String> {
    let body = strip_marker(line.trim())?;
    let clean = body.replace("**", "");
    let clean = clean.trim();
    let len = clean.chars().count();
    (MIN_FACTOR_LEN..=MAX_FACTOR_LEN)
        .contains(&len)
        .then(|| clean.to_string())
}

/// The text after a leading bullet or numbering marker, or `None` when the
/// line does not start with one.
fn strip_marker(line: &str) -> Option<&str> {
    for bullet in ['•', '-', '*'] {
        if let Some(rest) = line.strip_prefix(bullet) {
            // "**Heading**" is bold text, not a bullet
            if bullet == '*' && rest.starts_with('*') {
                return None;
            }
            return Some(rest.trim_start());
        }
    }

    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let rest = &line[digits..];
    rest.strip_prefix('.')
        .or_else(|| rest.strip_prefix(')'))
        .map(str::trim_start)
}
