use crate::{
    lexicon::words::count_syllables,
    text::{split_sentences, word_tokens, Span},
};

/// Reading-ease formula; higher scores are easier.
pub trait ReadingEaseFormula: Send + Sync {
    /// Scores `text`.
    fn score(&self, text: &str) -> f64;
}

/// Flesch reading ease: `206.835 - 1.015 * words/sentences - 84.6 * syllables/words`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FleschReadingEase;

impl ReadingEaseFormula for FleschReadingEase {
    #[allow(clippy::cast_precision_loss)]
    fn score(&self, text: &str) -> f64 {
        let words: Vec<String> = word_tokens(text)
            .into_iter()
            .filter(|word| word.chars().any(char::is_alphabetic))
            .collect();
        if words.is_empty() {
            return 0.0;
        }
        let sentences = split_sentences(text)
            .iter()
            .filter(|span| matches!(span, Span::Sentence(_)))
            .count()
            .max(1);
        let syllables: usize = words.iter().map(|word| count_syllables(word)).sum();
        let words_per_sentence = words.len() as f64 / sentences as f64;
        let syllables_per_word = syllables as f64 / words.len() as f64;
        84.6f64.mul_add(-syllables_per_word, 1.015f64.mul_add(-words_per_sentence, 206.835))
    }
}
