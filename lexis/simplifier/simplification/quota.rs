use std::collections::HashMap;

use serde_json::json;
use shared_logging::LogLevel;

use crate::{
    lexicon::{
        words::{char_len, is_alphabetic, match_capitalization},
        LexicalResources,
    },
    services::SyntaxTagger,
    telemetry::SimplifierTelemetry,
    text::Document,
};

use super::{
    candidates::{CandidateGenerator, GenerationMode},
    guard::{LinguisticGuard, SentenceContext},
    session::ReplacementSession,
};

#[derive(Debug, Clone)]
struct RankedWord {
    sentence: usize,
    unit: usize,
    word: String,
    complexity: usize,
}

/// Second pass that tops replacements up towards the quota.
pub struct QuotaEnforcer<'a> {
    lexical: &'a LexicalResources,
    generator: &'a CandidateGenerator,
    tagger: &'a dyn SyntaxTagger,
    telemetry: Option<&'a SimplifierTelemetry>,
}

impl<'a> QuotaEnforcer<'a> {
    /// Creates the pass.
    #[must_use]
    pub const fn new(
        lexical: &'a LexicalResources,
        generator: &'a CandidateGenerator,
        tagger: &'a dyn SyntaxTagger,
    ) -> Self {
        Self {
            lexical,
            generator,
            tagger,
            telemetry: None,
        }
    }

    /// Attaches telemetry.
    #[must_use]
    pub const fn with_telemetry(mut self, telemetry: Option<&'a SimplifierTelemetry>) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Replaces the most complex remaining words until the quota target is
    /// met or the ranked list runs out. Returns the number of replacements
    /// made; does nothing when the sample is too small or the ratio is met.
    pub fn enforce(&self, document: &mut Document, session: &mut ReplacementSession) -> usize {
        if !session.needs_enforcement() {
            return 0;
        }
        let target = session.quota_target();
        let additional = session.additional_needed();
        let ranked = self.rank(document);
        let guard = LinguisticGuard::new(self.lexical, self.tagger);
        let mut contexts: HashMap<usize, Option<SentenceContext>> = HashMap::new();
        let mut added = 0;

        for candidate in ranked {
            if added >= additional {
                break;
            }
            let Some(sentence) = document.sentence_mut(candidate.sentence) else {
                continue;
            };
            let text = sentence.text();
            let context = contexts
                .entry(candidate.sentence)
                .or_insert_with(|| match SentenceContext::annotate(self.tagger, &text) {
                    Ok(context) => Some(context),
                    Err(err) => {
                        self.log(
                            LogLevel::Warn,
                            "simplifier.service.failed",
                            json!({ "service": "tagger", "pass": "quota", "error": err.to_string() }),
                        );
                        None
                    }
                });
            let Some(context) = context.as_ref() else {
                continue;
            };
            if guard.inspect_protection(context, &candidate.word).is_err() {
                continue;
            }
            let Some(replacement) = self.forced_replacement(&text, &candidate.word) else {
                continue;
            };
            let unit = &mut sentence.units_mut()[candidate.unit];
            unit.text = match_capitalization(&candidate.word, &replacement);
            unit.replaced = true;
            session.record_enforced();
            added += 1;
            contexts.remove(&candidate.sentence);
            self.log(
                LogLevel::Debug,
                "simplifier.token.replaced",
                json!({ "session": session.id(), "word": candidate.word, "replacement": replacement, "pass": "quota" }),
            );
        }

        self.log(
            LogLevel::Info,
            "simplifier.quota.enforced",
            json!({
                "session": session.id(),
                "target": target,
                "added": added,
                "ratio": session.ratio(),
            }),
        );
        added
    }

    /// Open alphabetic words longer than four characters that are not
    /// function words, by `length + 2 * d(word)` descending. The sort is
    /// stable, so ties keep text order.
    fn rank(&self, document: &Document) -> Vec<RankedWord> {
        let mut ranked: Vec<RankedWord> = document
            .sentences()
            .enumerate()
            .flat_map(|(sentence, units)| {
                units
                    .units()
                    .iter()
                    .enumerate()
                    .filter(|(_, unit)| unit.is_open() && unit.is_alphabetic_word())
                    .map(move |(unit, text_unit)| (sentence, unit, text_unit.text.clone()))
            })
            .filter(|(_, _, word)| char_len(word) > 4 && !self.lexical.is_function_word(word))
            .map(|(sentence, unit, word)| RankedWord {
                complexity: char_len(&word) + 2 * self.lexical.difficulty(&word),
                sentence,
                unit,
                word,
            })
            .collect();
        ranked.sort_by(|a, b| b.complexity.cmp(&a.complexity));
        ranked
    }

    /// First usable model prediction, else the frequency-table fallback.
    fn forced_replacement(&self, sentence: &str, word: &str) -> Option<String> {
        let lower = word.to_lowercase();
        let max_len = char_len(word) + 1;
        match self
            .generator
            .generate(sentence, word, GenerationMode::Quota, self.lexical)
        {
            Ok(candidates) => {
                let antonym = self.lexical.find_antonym(word);
                let found = candidates
                    .map(|prediction| prediction.token.trim().to_lowercase())
                    .find(|candidate| {
                        *candidate != lower
                            && is_alphabetic(candidate)
                            && char_len(candidate) >= 2
                            && !self.lexical.is_function_word(candidate)
                            && char_len(candidate) <= max_len
                            && antonym.as_deref() != Some(candidate.as_str())
                    });
                if found.is_some() {
                    return found;
                }
            }
            Err(err) => self.log(
                LogLevel::Warn,
                "simplifier.service.failed",
                json!({ "service": "model", "pass": "quota", "word": word, "error": err.to_string() }),
            ),
        }
        self.frequency_fallback(word)
    }

    // Picked by frequency alone, with no contextual check.
    fn frequency_fallback(&self, word: &str) -> Option<String> {
        let lower = word.to_lowercase();
        let len = char_len(word);
        let threshold = self.lexical.frequency(&lower).unwrap_or(0.0) * 1.5;
        self.lexical
            .frequency_table()
            .ranked()
            .filter(|(potential, freq)| {
                let potential_len = char_len(potential);
                potential_len <= len && potential_len > 2 && *freq > threshold
            })
            .take(5)
            .find(|(potential, _)| *potential != lower)
            .map(|(potential, _)| potential.to_string())
    }

    fn log(&self, level: LogLevel, message: &str, metadata: serde_json::Value) {
        if let Some(tel) = self.telemetry {
            let _ = tel.log(level, message, metadata);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{GeneratorSettings, QuotaSettings},
        fixtures::{sample_lexicon, sample_resources, sample_tagger, ScriptedModel},
        lexicon::FrequencyDictionary,
        services::OfflineModel,
    };
    use std::sync::Arc;

    const LONG: &str = "The committee carefully considered the extraordinary proposal \
                        before the meeting ended late that evening.";

    fn checked_session(document: &Document, replaced: usize) -> ReplacementSession {
        let mut session = ReplacementSession::new(QuotaSettings::default());
        for unit in document.sentences().flat_map(|s| s.units()) {
            if unit.is_alphabetic_word() {
                session.record_checked();
            }
        }
        (0..replaced).for_each(|_| session.record_replacement());
        session
    }

    #[test]
    fn small_samples_are_left_alone() {
        let lexical = sample_resources();
        let tagger = sample_tagger();
        let generator = CandidateGenerator::new(
            Arc::new(ScriptedModel::new().with_default(["plain"])),
            GeneratorSettings::default(),
        );
        let mut document = Document::parse("An extraordinary proposal arrived.");
        let mut session = checked_session(&document, 0);
        let enforcer = QuotaEnforcer::new(&lexical, &generator, &tagger);
        assert_eq!(enforcer.enforce(&mut document, &mut session), 0);
        assert_eq!(document.render(), "An extraordinary proposal arrived.");
    }

    #[test]
    fn replaces_most_complex_words_first() {
        let lexical = sample_resources();
        let tagger = sample_tagger();
        let model = ScriptedModel::new()
            .fill(
                "The committee carefully considered the <mask> proposal before the meeting ended late that evening.",
                ["extraordinary", "unusual", "odd"],
            );
        let generator = CandidateGenerator::new(Arc::new(model), GeneratorSettings::default());
        let mut document = Document::parse(LONG);
        let mut session = checked_session(&document, 0);
        assert_eq!(session.checked(), 14);
        let enforcer = QuotaEnforcer::new(&lexical, &generator, &tagger);
        // floor(1.4) = 1 = replaced + 1
        assert_eq!(enforcer.enforce(&mut document, &mut session), 1);
        assert_eq!(
            document.render(),
            LONG.replace("extraordinary", "unusual")
        );
        assert_eq!(session.summary().enforced, 1);
    }

    #[test]
    fn enforcement_never_lowers_the_count() {
        let lexical = sample_resources();
        let tagger = sample_tagger();
        let generator = CandidateGenerator::new(
            Arc::new(OfflineModel::default()),
            GeneratorSettings::default(),
        );
        let mut document = Document::parse(LONG);
        let mut session = checked_session(&document, 0);
        let before = session.replaced();
        QuotaEnforcer::new(&lexical, &generator, &tagger).enforce(&mut document, &mut session);
        assert!(session.replaced() >= before);
        assert_eq!(document.render(), LONG);
    }

    #[test]
    fn falls_back_to_more_frequent_words() {
        let lexical = LexicalResources::new(
            Arc::new(sample_lexicon()),
            FrequencyDictionary::from_pairs([
                ("considered", 2.0),
                ("thought", 4.8),
                ("said", 5.5),
                ("it", 6.5),
                ("extraordinarily", 6.0),
            ]),
        );
        let tagger = sample_tagger();
        let generator = CandidateGenerator::new(
            Arc::new(ScriptedModel::failing()),
            GeneratorSettings::default(),
        );
        let enforcer = QuotaEnforcer::new(&lexical, &generator, &tagger);
        assert_eq!(
            enforcer.frequency_fallback("considered").as_deref(),
            Some("said")
        );
        assert_eq!(enforcer.frequency_fallback("it"), None);
    }
}
