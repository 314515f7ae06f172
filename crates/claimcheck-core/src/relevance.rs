//! Keyword relevance pre-filter for client-side gating.
//!
//! The classifier was fine-tuned on COVID-19 claims. Clients score text
//! against a fixed keyword list and only submit text at or above
//! [`RELEVANCE_THRESHOLD`]; the server never rejects on relevance.

/// Topic keywords the classifier was trained around.
pub const COVID_KEYWORDS: [&str; 10] = [
    "covid",
    "vaccine",
    "pandemic",
    "coronavirus",
    "mask",
    "quarantine",
    "lockdown",
    "infection",
    "symptoms",
    "immunity",
];

/// Minimum score for text to be worth classifying.
pub const RELEVANCE_THRESHOLD: f64 = 0.1;

/// Fraction of words in `text` that are one of `keywords`.
///
/// Text is lowercased and every character other than ASCII word characters
/// and whitespace becomes a word break. Keywords match whole words only.
/// Text with no words scores 0.
pub fn relevance_score(text: &str, keywords: &[&str]) -> f64 {
    let normalized: String = text
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c.is_whitespace() {
                c.to_ascii_lowercase()
            } else {
                ' '
            }
        })
        .collect();

    let mut words = 0usize;
    let mut hits = 0usize;
    for word in normalized.split_whitespace() {
        words += 1;
        if keywords.contains(&word) {
            hits += 1;
        }
    }

    if words == 0 {
        return 0.0;
    }
    hits as f64 / words as f64
}

/// Whether `text` scores at least [`RELEVANCE_THRESHOLD`] against [`COVID_KEYWORDS`].
pub fn is_relevant(text: &str) -> bool {
    relevance_score(text, &COVID_KEYWORDS) >= RELEVANCE_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_every_keyword_occurrence() {
        let score = relevance_score("Vaccine, vaccine and the pandemic", &COVID_KEYWORDS);
        // 3 hits over 5 words.
        assert!((score - 0.6).abs() < 1e-12);
    }

    #[test]
    fn punctuation_splits_words() {
        let score = relevance_score("covid-19 lockdown!", &COVID_KEYWORDS);
        // "covid", "19", "lockdown"
        assert!((score - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn keywords_match_whole_words_only() {
        assert_eq!(relevance_score("masks vaccines", &COVID_KEYWORDS), 0.0);
        assert_eq!(relevance_score("MASK", &COVID_KEYWORDS), 1.0);
    }

    #[test]
    fn empty_or_symbol_only_text_scores_zero() {
        assert_eq!(relevance_score("", &COVID_KEYWORDS), 0.0);
        assert_eq!(relevance_score("   \n\t", &COVID_KEYWORDS), 0.0);
        assert_eq!(relevance_score("?!...", &COVID_KEYWORDS), 0.0);
    }

    #[test]
    fn threshold_is_inclusive() {
        // 1 keyword in 10 words is exactly 0.1.
        let text = "the covid report was long and dull for most readers";
        assert_eq!(text.split_whitespace().count(), 10);
        assert!(is_relevant(text));

        let text = "the covid report was long and dull for most of readers";
        assert!(!is_relevant(text));
    }

    #[test]
    fn off_topic_text_is_not_relevant() {
        assert!(!is_relevant("The moon is made of cheese"));
        assert!(is_relevant("The vaccine causes magnetism"));
    }
}
