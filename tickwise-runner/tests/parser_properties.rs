//! Property tests for free-form response parsing.
//!
//! Uses proptest to verify:
//! 1. Key factor bounds: never more than five, each 10 to 200 characters
//! 2. Sentiment majority: whole keyword counts decide, in any letter case
//! 3. Embedded keywords: a keyword inside a longer word is never counted

use proptest::prelude::*;
use tickwise_runner::insight::parser::{
    key_factors_of, sentiment_of, MAX_FACTOR_LEN, MAX_KEY_FACTORS, MIN_FACTOR_LEN,
    NEGATIVE_WORDS, POSITIVE_WORDS,
};
use tickwise_runner::Sentiment;

const FILLER: &[&str] = &["market", "price", "today", "volume", "outlook", "and"];

// ── Strategies (proptest) ────────────────────────────────────────────

/// A response line: optional marker, then free text of varying length.
fn arb_line() -> impl Strategy<Value = String> {
    let marker = prop::sample::select(vec!["", "• ", "- ", "* ", "1. ", "2) ", "**"]);
    (marker, "[a-zA-Z *]{0,240}").prop_map(|(m, body)| format!("{m}{body}"))
}

fn arb_keywords(words: &'static [&'static str]) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec((prop::sample::select(words), any::<bool>()), 0..8).prop_map(|picked| {
        picked
            .into_iter()
            .map(|(w, lower)| if lower { w.to_lowercase() } else { w.to_string() })
            .collect()
    })
}

fn arb_filler() -> impl Strategy<Value = Vec<&'static str>> {
    prop::collection::vec(prop::sample::select(FILLER), 0..6)
}

// ── 1. Key factor bounds ─────────────────────────────────────────────

proptest! {
    #[test]
    fn key_factors_stay_within_bounds(lines in prop::collection::vec(arb_line(), 0..20)) {
        let text = lines.join("\n");
        let factors = key_factors_of(&text);

        prop_assert!(factors.len() <= MAX_KEY_FACTORS);
        for factor in &factors {
            let len = factor.chars().count();
            prop_assert!((MIN_FACTOR_LEN..=MAX_FACTOR_LEN).contains(&len), "{factor:?}");
        }
    }
}

// ── 2. Sentiment majority ────────────────────────────────────────────

proptest! {
    #[test]
    fn keyword_majority_decides_sentiment(
        positive in arb_keywords(POSITIVE_WORDS),
        negative in arb_keywords(NEGATIVE_WORDS),
        filler in arb_filler(),
    ) {
        let mut words: Vec<String> = positive.clone();
        words.extend(filler.iter().map(|w| w.to_string()));
        words.extend(negative.iter().cloned());
        let text = words.join(", ");

        let expected = match positive.len().cmp(&negative.len()) {
            std::cmp::Ordering::Greater => Sentiment::Positive,
            std::cmp::Ordering::Less => Sentiment::Negative,
            std::cmp::Ordering::Equal => Sentiment::Neutral,
        };
        prop_assert_eq!(sentiment_of(&text), expected);
    }

    #[test]
    fn swapping_keyword_sides_flips_sentiment(
        positive in arb_keywords(POSITIVE_WORDS),
        negative in arb_keywords(NEGATIVE_WORDS),
    ) {
        let forward = format!("{} {}", positive.join(" "), negative.join(" "));
        let mirrored = match sentiment_of(&forward) {
            Sentiment::Positive => Sentiment::Negative,
            Sentiment::Negative => Sentiment::Positive,
            Sentiment::Neutral => Sentiment::Neutral,
        };
        let swapped = format!(
            "{} {}",
            positive.iter().map(|_| "bearish").collect::<Vec<_>>().join(" "),
            negative.iter().map(|_| "bullish").collect::<Vec<_>>().join(" "),
        );
        prop_assert_eq!(sentiment_of(&swapped), mirrored);
    }
}

// ── 3. Embedded keywords ─────────────────────────────────────────────

proptest! {
    #[test]
    fn keywords_inside_longer_words_are_ignored(
        positive in arb_keywords(POSITIVE_WORDS),
        negative in arb_keywords(NEGATIVE_WORDS),
        suffix in "[a-z]{1,4}",
    ) {
        let text = positive
            .iter()
            .chain(negative.iter())
            .map(|w| format!("{w}{suffix}"))
            .collect::<Vec<_>>()
            .join(" ");
        prop_assert_eq!(sentiment_of(&text), Sentiment::Neutral);
    }
}
