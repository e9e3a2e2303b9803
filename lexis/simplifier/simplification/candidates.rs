use std::sync::Arc;

use regex::{NoExpand, RegexBuilder};

use crate::{
    config::GeneratorSettings,
    lexicon::{words::char_len, LexicalResources},
    services::{MaskedLanguageModel, Prediction, ServiceError},
};

/// How many predictions to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    /// Per-sentence pass.
    BestEffort,
    /// Quota pass.
    Quota,
}

/// Ranked, one-shot sequence of fill predictions.
#[derive(Debug)]
pub struct Candidates {
    inner: std::vec::IntoIter<Prediction>,
}

impl Candidates {
    fn empty() -> Self {
        Self {
            inner: Vec::new().into_iter(),
        }
    }
}

impl Iterator for Candidates {
    type Item = Prediction;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// Masks a target word and asks the model for replacements.
pub struct CandidateGenerator {
    model: Arc<dyn MaskedLanguageModel>,
    settings: GeneratorSettings,
}

impl std::fmt::Debug for CandidateGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CandidateGenerator")
            .field("mask_token", &self.model.mask_token())
            .field("settings", &self.settings)
            .finish()
    }
}

impl CandidateGenerator {
    /// Creates a generator over `model`.
    #[must_use]
    pub const fn new(model: Arc<dyn MaskedLanguageModel>, settings: GeneratorSettings) -> Self {
        Self { model, settings }
    }

    /// K for `mode`.
    #[must_use]
    pub const fn top_k(&self, mode: GenerationMode) -> usize {
        match mode {
            GenerationMode::BestEffort => self.settings.best_effort_top_k,
            GenerationMode::Quota => self.settings.quota_top_k,
        }
    }

    /// Whether the model can be queried.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.model.is_available()
    }

    /// Replaces the first case-insensitive whole-word occurrence of `target`
    /// with the mask token.
    #[must_use]
    pub fn mask(&self, sentence: &str, target: &str) -> Option<String> {
        let pattern = format!(r"\b{}\b", regex::escape(target));
        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .build()
            .ok()?;
        regex.is_match(sentence).then(|| {
            regex
                .replacen(sentence, 1, NoExpand(self.model.mask_token()))
                .into_owned()
        })
    }

    /// Ranked predictions for `target` in `sentence`. Function words, words of
    /// two characters or fewer, an unavailable model, and a target missing
    /// from the sentence all yield no candidates.
    pub fn generate(
        &self,
        sentence: &str,
        target: &str,
        mode: GenerationMode,
        lexical: &LexicalResources,
    ) -> Result<Candidates, ServiceError> {
        if lexical.is_function_word(target) || char_len(target) <= 2 || !self.is_available() {
            return Ok(Candidates::empty());
        }
        let Some(masked) = self.mask(sentence, target) else {
            return Ok(Candidates::empty());
        };
        let top_k = self.top_k(mode);
        let mut predictions = self.model.fill_mask(&masked, top_k)?;
        predictions.truncate(top_k);
        Ok(Candidates {
            inner: predictions.into_iter(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        fixtures::{sample_resources, ScriptedModel},
        services::OfflineModel,
    };

    #[test]
    fn masks_first_whole_word_case_insensitively() {
        let generator = CandidateGenerator::new(
            Arc::new(ScriptedModel::new()),
            GeneratorSettings::default(),
        );
        assert_eq!(
            generator.mask("Enormous dogs and enormous cats.", "enormous").as_deref(),
            Some("<mask> dogs and enormous cats.")
        );
        assert_eq!(generator.mask("Catalogue.", "cat"), None);
        assert_eq!(generator.mask("Costs $5 (approx).", "approx").as_deref(), Some("Costs $5 (<mask>)."));
    }

    #[test]
    fn requests_mode_specific_top_k() {
        let model = Arc::new(
            ScriptedModel::new().with_default(["big", "large", "huge", "vast", "great", "grand"]),
        );
        let generator = CandidateGenerator::new(model.clone(), GeneratorSettings::default());
        let lexical = sample_resources();
        let quota: Vec<String> = generator
            .generate("An enormous dog.", "enormous", GenerationMode::Quota, &lexical)
            .unwrap()
            .map(|prediction| prediction.token)
            .collect();
        assert_eq!(quota.len(), 5);
        let best = generator
            .generate("An enormous dog.", "enormous", GenerationMode::BestEffort, &lexical)
            .unwrap();
        assert_eq!(best.count(), 6);
        assert_eq!(
            model.queries(),
            vec![
                ("An <mask> dog.".to_string(), 5),
                ("An <mask> dog.".to_string(), 15)
            ]
        );
    }

    #[test]
    fn skips_function_words_short_words_and_offline_models() {
        let lexical = sample_resources();
        let model = Arc::new(ScriptedModel::new().with_default(["big"]));
        let generator = CandidateGenerator::new(model.clone(), GeneratorSettings::default());
        for target in ["the", "ox"] {
            let candidates = generator
                .generate("the ox ran", target, GenerationMode::BestEffort, &lexical)
                .unwrap();
            assert_eq!(candidates.count(), 0);
        }
        assert!(model.queries().is_empty());
        let offline = CandidateGenerator::new(Arc::new(OfflineModel::default()), GeneratorSettings::default());
        assert_eq!(
            offline
                .generate("An enormous dog.", "enormous", GenerationMode::BestEffort, &lexical)
                .unwrap()
                .count(),
            0
        );
    }
}
