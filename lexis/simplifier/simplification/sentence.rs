use serde_json::json;
use shared_logging::LogLevel;

use crate::{
    lexicon::{words::match_capitalization, LexicalResources},
    miner::WordMap,
    services::SyntaxTagger,
    telemetry::SimplifierTelemetry,
    text::SentenceUnits,
};

use super::{
    candidates::{CandidateGenerator, GenerationMode},
    guard::{LinguisticGuard, SentenceContext, TargetContext},
    heuristic::AcceptanceHeuristic,
    session::ReplacementSession,
};

/// Best-effort pass over one sentence.
pub struct SentenceSimplifier<'a> {
    lexical: &'a LexicalResources,
    generator: &'a CandidateGenerator,
    tagger: &'a dyn SyntaxTagger,
    word_map: &'a WordMap,
    telemetry: Option<&'a SimplifierTelemetry>,
}

impl<'a> SentenceSimplifier<'a> {
    /// Creates the pass.
    #[must_use]
    pub const fn new(
        lexical: &'a LexicalResources,
        generator: &'a CandidateGenerator,
        tagger: &'a dyn SyntaxTagger,
        word_map: &'a WordMap,
    ) -> Self {
        Self {
            lexical,
            generator,
            tagger,
            word_map,
            telemetry: None,
        }
    }

    /// Attaches telemetry.
    #[must_use]
    pub const fn with_telemetry(mut self, telemetry: Option<&'a SimplifierTelemetry>) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Tags the sentence once, marks preserved words, then replaces each
    /// eligible word with its first candidate that passes the guard and the
    /// heuristic. Words that fail anywhere stay unchanged.
    pub fn simplify(&self, sentence: &mut SentenceUnits, session: &mut ReplacementSession) {
        let original = sentence.text();
        let context = match SentenceContext::annotate(self.tagger, &original) {
            Ok(context) => Some(context),
            Err(err) => {
                self.log(
                    LogLevel::Warn,
                    "simplifier.service.failed",
                    json!({ "service": "tagger", "error": err.to_string() }),
                );
                None
            }
        };
        let preserved = context
            .as_ref()
            .map(SentenceContext::preserved_surfaces)
            .unwrap_or_default();
        for unit in sentence.units_mut().iter_mut().filter(|unit| unit.is_word()) {
            unit.preserved = preserved.contains(&unit.text)
                || self.lexical.is_function_word(&unit.text)
                || !unit.is_alphabetic_word();
        }

        let guard = LinguisticGuard::new(self.lexical, self.tagger);
        for index in 0..sentence.units().len() {
            let unit = &sentence.units()[index];
            if !unit.is_alphabetic_word() {
                continue;
            }
            session.record_checked();
            if unit.preserved {
                continue;
            }
            let word = unit.text.clone();
            if self.lexical.is_semantically_protected(&word) {
                sentence.units_mut()[index].preserved = true;
                continue;
            }
            // an untagged sentence cannot be validated
            let Some(context) = context.as_ref() else {
                continue;
            };
            let target = match guard.inspect_target(context, &word) {
                Ok(target) => target,
                Err(rejection) => {
                    self.log(
                        LogLevel::Debug,
                        "simplifier.token.kept",
                        json!({ "word": word, "reason": rejection.to_string() }),
                    );
                    continue;
                }
            };
            if let Some(replacement) = self.choose(&guard, &target, sentence, index) {
                let unit = &mut sentence.units_mut()[index];
                unit.text = match_capitalization(&word, &replacement);
                unit.replaced = true;
                session.record_replacement();
                self.log(
                    LogLevel::Debug,
                    "simplifier.token.replaced",
                    json!({ "session": session.id(), "word": word, "replacement": unit.text, "pass": "best_effort" }),
                );
            }
        }
    }

    fn choose(
        &self,
        guard: &LinguisticGuard<'_>,
        target: &TargetContext,
        sentence: &SentenceUnits,
        index: usize,
    ) -> Option<String> {
        let current = sentence.text();
        let heuristic = AcceptanceHeuristic::new(self.lexical);
        let accept = |candidate: &str| {
            self.is_usable(candidate, &target.word)
                && guard
                    .admit_candidate(target, &current, &sentence.text_with(index, candidate), candidate)
                    .is_ok()
                && heuristic.is_simpler(candidate, &target.word)
        };

        if let Some(suggestion) = self.word_map.get(&target.word.to_lowercase()) {
            if accept(suggestion) {
                return Some(suggestion.to_string());
            }
        }
        let candidates = match self.generator.generate(
            &current,
            &target.word,
            GenerationMode::BestEffort,
            self.lexical,
        ) {
            Ok(candidates) => candidates,
            Err(err) => {
                self.log(
                    LogLevel::Warn,
                    "simplifier.service.failed",
                    json!({ "service": "model", "word": target.word, "error": err.to_string() }),
                );
                return None;
            }
        };
        candidates
            .map(|prediction| prediction.token.trim().to_lowercase())
            .find(|candidate| accept(candidate))
    }

    fn is_usable(&self, candidate: &str, original: &str) -> bool {
        candidate != original.to_lowercase()
            && candidate.chars().count() >= 2
            && candidate.chars().all(char::is_alphabetic)
            && !self.lexical.is_function_word(candidate)
    }

    fn log(&self, level: LogLevel, message: &str, metadata: serde_json::Value) {
        if let Some(tel) = self.telemetry {
            let _ = tel.log(level, message, metadata);
        }
    }
}
