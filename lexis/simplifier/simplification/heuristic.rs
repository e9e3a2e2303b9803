use serde::Serialize;

use crate::lexicon::{
    words::{char_len, count_syllables, is_fully_uppercase, starts_uppercase},
    LexicalResources,
};

/// Rule that decided a verdict, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeuristicRule {
    /// Capitalised original that is not an acronym.
    ProperNounSignal,
    /// Candidate is semantically protected.
    ProtectedCandidate,
    /// Candidate is the original's antonym.
    Antonym,
    /// Original has difficult patterns and the candidate has no more.
    NoMorePatterns,
    /// Long patterned original and a shorter candidate.
    ShorterThanLongPatterned,
    /// Candidate much longer than a short original.
    TooLong,
    /// Candidate has too many extra syllables.
    TooManySyllables,
    /// Candidate at least 80% as frequent.
    Frequent,
    /// Candidate at least 70% as frequent and shorter.
    FrequentAndShorter,
    /// Candidate has fewer difficult patterns.
    FewerPatterns,
    /// Candidate shorter but longer than two characters.
    Shorter,
    /// Original longer than seven characters and candidate shorter.
    ShorterThanLong,
    /// Nothing matched.
    NoRule,
}

/// Outcome of the acceptance heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", content = "rule", rename_all = "snake_case")]
pub enum Verdict {
    /// Candidate is simpler.
    Accept(HeuristicRule),
    /// Candidate is not simpler.
    Reject(HeuristicRule),
}

impl Verdict {
    /// Whether the candidate was accepted.
    #[must_use]
    pub const fn is_accepted(self) -> bool {
        matches!(self, Self::Accept(_))
    }

    /// Deciding rule.
    #[must_use]
    pub const fn rule(self) -> HeuristicRule {
        match self {
            Self::Accept(rule) | Self::Reject(rule) => rule,
        }
    }
}

/// Decides whether a candidate is genuinely simpler for a dyslexic reader.
/// Depends only on its inputs, the pattern list, and the frequency table.
#[derive(Debug, Clone, Copy)]
pub struct AcceptanceHeuristic<'a> {
    lexical: &'a LexicalResources,
}

impl<'a> AcceptanceHeuristic<'a> {
    /// Creates the heuristic.
    #[must_use]
    pub const fn new(lexical: &'a LexicalResources) -> Self {
        Self { lexical }
    }

    /// First matching rule decides.
    #[must_use]
    pub fn judge(&self, candidate: &str, original: &str) -> Verdict {
        use HeuristicRule as R;

        if starts_uppercase(original) && !is_fully_uppercase(original) {
            return Verdict::Reject(R::ProperNounSignal);
        }
        if self.lexical.is_semantically_protected(candidate) {
            return Verdict::Reject(R::ProtectedCandidate);
        }
        let candidate_lower = candidate.to_lowercase();
        if self.lexical.find_antonym(original).as_deref() == Some(candidate_lower.as_str()) {
            return Verdict::Reject(R::Antonym);
        }

        let d_orig = self.lexical.difficulty(original);
        let d_cand = self.lexical.difficulty(candidate);
        let len_orig = char_len(original);
        let len_cand = char_len(candidate);

        if d_orig >= 1 && d_cand <= d_orig {
            return Verdict::Accept(R::NoMorePatterns);
        }
        if len_orig > 6 && d_orig >= 1 && len_cand < len_orig {
            return Verdict::Accept(R::ShorterThanLongPatterned);
        }
        if len_cand > len_orig + 2 && len_orig < 7 {
            return Verdict::Reject(R::TooLong);
        }
        if count_syllables(candidate) > count_syllables(original) + 1 {
            return Verdict::Reject(R::TooManySyllables);
        }
        if let (Some(f_cand), Some(f_orig)) = (
            self.lexical.frequency(candidate),
            self.lexical.frequency(original),
        ) {
            if f_cand > 0.8 * f_orig {
                return Verdict::Accept(R::Frequent);
            }
            if f_cand >= 0.7 * f_orig && len_cand < len_orig {
                return Verdict::Accept(R::FrequentAndShorter);
            }
        }
        if d_cand < d_orig {
            return Verdict::Accept(R::FewerPatterns);
        }
        if 2 < len_cand && len_cand < len_orig {
            return Verdict::Accept(R::Shorter);
        }
        if len_orig > 7 && len_cand < len_orig {
            return Verdict::Accept(R::ShorterThanLong);
        }
        Verdict::Reject(R::NoRule)
    }

    /// Shorthand for an accepting verdict.
    #[must_use]
    pub fn is_simpler(&self, candidate: &str, original: &str) -> bool {
        self.judge(candidate, original).is_accepted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        fixtures::{sample_lexicon, sample_resources},
        lexicon::FrequencyDictionary,
    };
    use std::sync::Arc;

    #[test]
    fn beautiful_becomes_pretty() {
        let lexical = sample_resources();
        let heuristic = AcceptanceHeuristic::new(&lexical);
        let verdict = heuristic.judge("pretty", "beautiful");
        assert!(verdict.is_accepted());
        // shorter candidate of a long original; the length-only rule is reached first
        assert_eq!(verdict.rule(), HeuristicRule::Shorter);
    }

    #[test]
    fn capitalised_originals_and_antonyms_are_refused() {
        let lexical = sample_resources();
        let heuristic = AcceptanceHeuristic::new(&lexical);
        assert_eq!(
            heuristic.judge("pretty", "Beautiful"),
            Verdict::Reject(HeuristicRule::ProperNounSignal)
        );
        assert_eq!(heuristic.judge("bad", "good").rule(), HeuristicRule::Antonym);
        assert_eq!(
            heuristic.judge("amount", "heap").rule(),
            HeuristicRule::ProtectedCandidate
        );
        assert!(heuristic.judge("big", "NASA").rule() != HeuristicRule::ProperNounSignal);
    }

    #[test]
    fn patterns_length_and_syllables_are_ordered() {
        let lexical = sample_resources();
        let heuristic = AcceptanceHeuristic::new(&lexical);
        assert_eq!(
            heuristic.judge("rough", "thorough").rule(),
            HeuristicRule::NoMorePatterns
        );
        assert_eq!(heuristic.judge("complicated", "hard").rule(), HeuristicRule::TooLong);
        assert_eq!(heuristic.judge("area", "site").rule(), HeuristicRule::NoRule);
        assert_eq!(
            heuristic.judge("beautiful", "nice").rule(),
            HeuristicRule::TooLong
        );
    }

    #[test]
    fn frequency_rules_apply_when_both_are_known() {
        let lexical = LexicalResources::new(
            Arc::new(sample_lexicon()),
            FrequencyDictionary::from_pairs([("odd", 3.0), ("weird", 3.9), ("queer", 4.0)]),
        );
        let heuristic = AcceptanceHeuristic::new(&lexical);
        assert_eq!(heuristic.judge("weird", "odd").rule(), HeuristicRule::Frequent);
        assert_eq!(
            heuristic.judge("odd", "weird").rule(),
            HeuristicRule::FrequentAndShorter
        );
    }

    #[test]
    fn verdicts_are_repeatable() {
        let lexical = sample_resources();
        let heuristic = AcceptanceHeuristic::new(&lexical);
        for (candidate, original) in [("pretty", "beautiful"), ("area", "site"), ("rough", "thorough")] {
            assert_eq!(
                heuristic.judge(candidate, original),
                heuristic.judge(candidate, original)
            );
        }
    }
}
