use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{
    lexicon::{
        words::{char_len, is_alphabetic},
        LexicalResources,
    },
    text::{split_sentences, word_tokens, Span},
};

use super::ease::ReadingEaseFormula;

/// Log-frequency below which a known word counts as difficult.
pub const LOW_FREQUENCY: f64 = 3.5;

/// Words a particular reader has marked as difficult.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DifficultyProfile {
    words: HashSet<String>,
}

impl DifficultyProfile {
    /// Builds a profile; words are lowercased.
    #[must_use]
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|word| word.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Case-insensitive membership.
    #[must_use]
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }

    /// Number of words.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the profile is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// School-grade band of a reading-ease score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradeBand {
    /// 90 and above.
    VeryEasy,
    /// 80 to 90.
    Easy,
    /// 70 to 80.
    FairlyEasy,
    /// 60 to 70.
    Standard,
    /// 50 to 60.
    FairlyDifficult,
    /// 30 to 50.
    Difficult,
    /// Below 30.
    VeryDifficult,
}

impl GradeBand {
    /// Band for `score`.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 90.0 => Self::VeryEasy,
            s if s >= 80.0 => Self::Easy,
            s if s >= 70.0 => Self::FairlyEasy,
            s if s >= 60.0 => Self::Standard,
            s if s >= 50.0 => Self::FairlyDifficult,
            s if s >= 30.0 => Self::Difficult,
            _ => Self::VeryDifficult,
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::VeryEasy => "Very Easy - 5th grade",
            Self::Easy => "Easy - 6th grade",
            Self::FairlyEasy => "Fairly Easy - 7th grade",
            Self::Standard => "Standard - 8th-9th grade",
            Self::FairlyDifficult => "Fairly Difficult - 10th-12th grade",
            Self::Difficult => "Difficult - College",
            Self::VeryDifficult => "Very Difficult - College Graduate",
        }
    }
}

/// Readability measurements of one text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyMetrics {
    /// Reading-ease score.
    pub reading_ease: f64,
    /// Share of difficult words, in percent.
    pub difficult_word_percent: f64,
    /// Mean length of alphabetic words.
    pub avg_word_length: f64,
    /// Mean words per sentence.
    pub avg_sentence_length: f64,
    /// Band of the reading-ease score.
    pub grade: GradeBand,
}

/// Signed improvements; positive always means easier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Improvement {
    /// Simplified minus original ease.
    pub reading_ease: f64,
    /// Original minus simplified difficult-word percentage.
    pub difficult_word_percent: f64,
    /// Original minus simplified average word length.
    pub avg_word_length: f64,
    /// Original minus simplified average sentence length.
    pub avg_sentence_length: f64,
    /// Character-length reduction, in percent of the original.
    pub length_reduction_percent: f64,
}

/// Alignment operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffOp {
    /// Present in both.
    Equal,
    /// Only in the original.
    Delete,
    /// Only in the simplified text.
    Insert,
}

/// One aligned word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordDiff {
    /// Operation.
    pub op: DiffOp,
    /// Word.
    pub token: String,
}

/// Before/after comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Metrics of the input.
    pub original: DifficultyMetrics,
    /// Metrics of the output.
    pub simplified: DifficultyMetrics,
    /// Deltas.
    pub improvement: Improvement,
    /// Word-level alignment.
    pub word_diff: Vec<WordDiff>,
}

/// Computes metrics and before/after reports.
#[derive(Clone, Copy)]
pub struct ReadabilityEvaluator<'a> {
    lexical: &'a LexicalResources,
    formula: &'a dyn ReadingEaseFormula,
    profile: &'a DifficultyProfile,
}

impl<'a> ReadabilityEvaluator<'a> {
    /// Creates an evaluator.
    #[must_use]
    pub const fn new(
        lexical: &'a LexicalResources,
        formula: &'a dyn ReadingEaseFormula,
        profile: &'a DifficultyProfile,
    ) -> Self {
        Self {
            lexical,
            formula,
            profile,
        }
    }

    /// Layered difficulty test: profile words always; otherwise only
    /// alphabetic content words longer than three characters, which are
    /// difficult when rare, longer than seven characters, or patterned.
    #[must_use]
    pub fn is_difficult(&self, word: &str) -> bool {
        if self.profile.contains(word) {
            return true;
        }
        if !is_alphabetic(word) || char_len(word) <= 3 || self.lexical.is_function_word(word) {
            return false;
        }
        if self
            .lexical
            .frequency(word)
            .is_some_and(|freq| freq < LOW_FREQUENCY)
        {
            return true;
        }
        char_len(word) > 7 || self.lexical.has_difficult_pattern(word)
    }

    /// Metrics for `text`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn metrics(&self, text: &str) -> DifficultyMetrics {
        let tokens = word_tokens(&text.to_lowercase());
        let alphabetic: Vec<&String> = tokens.iter().filter(|token| is_alphabetic(token)).collect();
        let total = alphabetic.len();
        let difficult = tokens.iter().filter(|token| self.is_difficult(token)).count();
        let letters: usize = alphabetic.iter().map(|word| char_len(word)).sum();
        let sentences = split_sentences(text)
            .iter()
            .filter(|span| matches!(span, Span::Sentence(_)))
            .count();
        let ratio = |num: f64, den: usize| if den == 0 { 0.0 } else { num / den as f64 };
        let reading_ease = self.formula.score(text);
        DifficultyMetrics {
            reading_ease,
            difficult_word_percent: ratio(difficult as f64 * 100.0, total),
            avg_word_length: ratio(letters as f64, total),
            avg_sentence_length: ratio(total as f64, sentences),
            grade: GradeBand::from_score(reading_ease),
        }
    }

    /// Compares `original` and `simplified`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn evaluate(&self, original: &str, simplified: &str) -> EvaluationReport {
        let before = self.metrics(original);
        let after = self.metrics(simplified);
        let original_len = char_len(original);
        let length_reduction_percent = if original_len == 0 {
            0.0
        } else {
            (original_len as f64 - char_len(simplified) as f64) / original_len as f64 * 100.0
        };
        EvaluationReport {
            improvement: Improvement {
                reading_ease: after.reading_ease - before.reading_ease,
                difficult_word_percent: before.difficult_word_percent
                    - after.difficult_word_percent,
                avg_word_length: before.avg_word_length - after.avg_word_length,
                avg_sentence_length: before.avg_sentence_length - after.avg_sentence_length,
                length_reduction_percent,
            },
            original: before,
            simplified: after,
            word_diff: word_diff(original, simplified),
        }
    }
}

fn word_diff(original: &str, simplified: &str) -> Vec<WordDiff> {
    let before = word_tokens(original);
    let after = word_tokens(simplified);
    diff::slice(&before, &after)
        .into_iter()
        .map(|result| match result {
            diff::Result::Left(token) => WordDiff {
                op: DiffOp::Delete,
                token: token.clone(),
            },
            diff::Result::Right(token) => WordDiff {
                op: DiffOp::Insert,
                token: token.clone(),
            },
            diff::Result::Both(token, _) => WordDiff {
                op: DiffOp::Equal,
                token: token.clone(),
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        fixtures::{sample_lexicon, sample_resources},
        lexicon::FrequencyDictionary,
        readability::FleschReadingEase,
    };
    use std::sync::Arc;

    #[test]
    fn identical_texts_have_zero_deltas() {
        let lexical = sample_resources();
        let profile = DifficultyProfile::default();
        let evaluator = ReadabilityEvaluator::new(&lexical, &FleschReadingEase, &profile);
        let report = evaluator.evaluate("The cat runs.", "The cat runs.");
        let delta = report.improvement;
        for value in [
            delta.reading_ease,
            delta.difficult_word_percent,
            delta.avg_word_length,
            delta.avg_sentence_length,
            delta.length_reduction_percent,
        ] {
            assert!(value.abs() < f64::EPSILON, "{value}");
        }
        assert!(report.word_diff.iter().all(|d| d.op == DiffOp::Equal));
        assert_eq!(report.word_diff.len(), 3);
    }

    #[test]
    fn difficulty_is_layered() {
        let lexical = LexicalResources::new(
            Arc::new(sample_lexicon()),
            FrequencyDictionary::from_pairs([("myriad", 2.1), ("garden", 4.2)]),
        );
        let profile = DifficultyProfile::from_words(["Cat"]);
        let evaluator = ReadabilityEvaluator::new(&lexical, &FleschReadingEase, &profile);
        assert!(evaluator.is_difficult("cat"));
        assert!(evaluator.is_difficult("myriad"));
        assert!(!evaluator.is_difficult("garden"));
        assert!(evaluator.is_difficult("elephants"));
        assert!(evaluator.is_difficult("pretty"));
        assert!(!evaluator.is_difficult("dog"));
        assert!(!evaluator.is_difficult("through"));
        assert!(!evaluator.is_difficult("1990s"));
    }

    #[test]
    fn metrics_average_over_alphabetic_words() {
        let lexical = sample_resources();
        let profile = DifficultyProfile::default();
        let evaluator = ReadabilityEvaluator::new(&lexical, &FleschReadingEase, &profile);
        let metrics = evaluator.metrics("The dog ran. The big dog sat, 2 times.");
        // 8 alphabetic words over 2 sentences
        assert!((metrics.avg_sentence_length - 4.0).abs() < 1e-9);
        assert!((metrics.avg_word_length - 26.0 / 8.0).abs() < 1e-9);
        assert!(metrics.difficult_word_percent.abs() < 1e-9);
    }

    #[test]
    fn grade_bands_follow_thresholds() {
        assert_eq!(GradeBand::from_score(95.0), GradeBand::VeryEasy);
        assert_eq!(GradeBand::from_score(60.0), GradeBand::Standard);
        assert_eq!(GradeBand::from_score(29.9), GradeBand::VeryDifficult);
        assert_eq!(GradeBand::Difficult.label(), "Difficult - College");
    }
}
