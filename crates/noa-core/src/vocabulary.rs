//! # Consent Vocabulary
//!
//! Affirmation and negation terms for consent stages, kept as data rather
//! than embedded literals so deployments can localize or extend them without
//! touching the sequencer's control flow.
//!
//! Classification is deliberately shallow: the trimmed, lowercased reply —
//! or its leading word with punctuation stripped — is matched against the
//! sets. "Não, nunca utilizei" declines; "concordo plenamente" accepts;
//! "talvez" is neither and re-prompts.

use std::collections::BTreeSet;

// =============================================================================
// CONSENT REPLY
// =============================================================================

/// Outcome of classifying a reply to a consent prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentReply {
    /// The patient agreed to proceed.
    Affirmative,
    /// The patient declined.
    Negative,
}

// =============================================================================
// CONSENT VOCABULARY
// =============================================================================

/// Configurable affirmation/negation term sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsentVocabulary {
    affirmative: BTreeSet<String>,
    negative: BTreeSet<String>,
}

impl Default for ConsentVocabulary {
    /// The Portuguese defaults used by the Nôa Esperanza intake.
    fn default() -> Self {
        Self::new(
            ["sim", "s", "concordo", "ok"],
            ["não", "nao", "n", "nunca"],
        )
    }
}

impl ConsentVocabulary {
    /// Build a vocabulary from affirmative and negative term lists.
    ///
    /// Terms are normalized (trimmed, lowercased) on the way in. A term
    /// present in both sets is treated as negative: consent must be explicit,
    /// so negation always wins.
    #[must_use]
    pub fn new<A, N>(affirmative: A, negative: N) -> Self
    where
        A: IntoIterator,
        A::Item: AsRef<str>,
        N: IntoIterator,
        N::Item: AsRef<str>,
    {
        Self {
            affirmative: affirmative
                .into_iter()
                .map(|t| normalize(t.as_ref()))
                .collect(),
            negative: negative.into_iter().map(|t| normalize(t.as_ref())).collect(),
        }
    }

    /// Classify a free-text reply to a consent prompt.
    ///
    /// Returns `None` when the reply matches neither set (the caller
    /// re-prompts).
    #[must_use]
    pub fn classify(&self, text: &str) -> Option<ConsentReply> {
        let normalized = normalize(text);
        if normalized.is_empty() {
            return None;
        }

        let head = leading_word(&normalized);

        if self.negative.contains(normalized.as_str()) || self.negative.contains(head) {
            return Some(ConsentReply::Negative);
        }
        if self.affirmative.contains(normalized.as_str()) || self.affirmative.contains(head) {
            return Some(ConsentReply::Affirmative);
        }
        None
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// First whitespace-separated word, stripped of surrounding punctuation.
fn leading_word(normalized: &str) -> &str {
    normalized
        .split_whitespace()
        .next()
        .unwrap_or("")
        .trim_matches(|c: char| !c.is_alphanumeric())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_affirmatives() {
        let vocab = ConsentVocabulary::default();
        for text in ["sim", "Sim", "  SIM  ", "s", "concordo", "ok"] {
            assert_eq!(vocab.classify(text), Some(ConsentReply::Affirmative), "{text}");
        }
    }

    #[test]
    fn plain_negatives() {
        let vocab = ConsentVocabulary::default();
        for text in ["não", "nao", "NÃO", "n", "nunca"] {
            assert_eq!(vocab.classify(text), Some(ConsentReply::Negative), "{text}");
        }
    }

    #[test]
    fn leading_word_carries_the_classification() {
        let vocab = ConsentVocabulary::default();
        assert_eq!(
            vocab.classify("não, nunca utilizei"),
            Some(ConsentReply::Negative)
        );
        assert_eq!(
            vocab.classify("sim! podemos prosseguir"),
            Some(ConsentReply::Affirmative)
        );
        assert_eq!(
            vocab.classify("concordo plenamente"),
            Some(ConsentReply::Affirmative)
        );
    }

    #[test]
    fn unrecognized_replies_are_none() {
        let vocab = ConsentVocabulary::default();
        for text in ["talvez", "depende", "", "   ", "o que é isso?"] {
            assert_eq!(vocab.classify(text), None, "{text}");
        }
    }

    #[test]
    fn negation_wins_over_affirmation() {
        let vocab = ConsentVocabulary::new(["sim", "claro"], ["claro"]);
        assert_eq!(vocab.classify("claro"), Some(ConsentReply::Negative));
    }

    #[test]
    fn custom_vocabulary_is_normalized() {
        let vocab = ConsentVocabulary::new(["  YES "], ["NO"]);
        assert_eq!(vocab.classify("yes"), Some(ConsentReply::Affirmative));
        assert_eq!(vocab.classify("no, thanks"), Some(ConsentReply::Negative));
    }
}
