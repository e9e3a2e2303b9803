use std::{path::Path, sync::Arc};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use shared_logging::LogLevel;
use thiserror::Error;

use crate::{
    config::SimplifierConfig,
    lexicon::{words::char_len, FrequencyDictionary, LexicalResources},
    miner::{CorpusAlignmentMiner, WordMap},
    readability::{
        DifficultyProfile, EvaluationReport, FleschReadingEase, ReadabilityEvaluator,
        ReadingEaseFormula,
    },
    services::{
        HttpMaskedLanguageModel, HttpSyntaxTagger, LexicalKnowledgeBase, MaskedLanguageModel,
        OfflineModel, OfflineTagger, ServiceError, StaticLexicon, SyntaxTagger,
    },
    simplification::{
        CandidateGenerator, QuotaEnforcer, ReplacementSession, SentenceSimplifier, SessionSummary,
    },
    telemetry::SimplifierTelemetry,
    text::Document,
    tier::Tier,
};

/// Errors surfaced to engine callers.
#[derive(Debug, Error)]
pub enum SimplifierError {
    /// Unknown tier name or invalid configuration value.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Request rejected before any processing.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// A collaborator could not be constructed.
    #[error(transparent)]
    Service(#[from] ServiceError),
    /// A file the caller asked for could not be read.
    #[error("io error: {0}")]
    Io(String),
}

/// Result of one `simplify` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimplificationOutcome {
    /// Simplified text.
    pub text: String,
    /// Tier the request ran under.
    pub tier: Tier,
    /// Final counters.
    pub session: SessionSummary,
    /// Completion time.
    pub completed_at: DateTime<Utc>,
}

impl SimplificationOutcome {
    /// Total replacements made.
    #[must_use]
    pub const fn replacement_count(&self) -> usize {
        self.session.replaced
    }

    /// Alphabetic words checked.
    #[must_use]
    pub const fn total_words_checked(&self) -> usize {
        self.session.checked
    }
}

/// Snapshot of engine state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStatus {
    /// Active tier.
    pub tier: Tier,
    /// Entries in the active Word Map.
    pub word_map_entries: usize,
    /// Entries in the frequency table.
    pub frequency_entries: usize,
    /// Size of the semantic keyword set.
    pub keyword_count: usize,
    /// Size of the antonym index.
    pub antonym_entries: usize,
    /// Whether the masked model can be queried.
    pub model_available: bool,
}

/// Builder wiring collaborators into a [`SimplifierEngine`]. Anything not
/// supplied falls back to the offline stand-ins.
pub struct SimplifierEngineBuilder {
    config: SimplifierConfig,
    model: Option<Arc<dyn MaskedLanguageModel>>,
    tagger: Option<Arc<dyn SyntaxTagger>>,
    knowledge: Option<Arc<dyn LexicalKnowledgeBase>>,
    formula: Option<Arc<dyn ReadingEaseFormula>>,
    frequency: Option<FrequencyDictionary>,
    telemetry: Option<SimplifierTelemetry>,
}

impl SimplifierEngineBuilder {
    /// Starts from `config`.
    #[must_use]
    pub const fn new(config: SimplifierConfig) -> Self {
        Self {
            config,
            model: None,
            tagger: None,
            knowledge: None,
            formula: None,
            frequency: None,
            telemetry: None,
        }
    }

    /// Masked language model.
    #[must_use]
    pub fn model(mut self, model: Arc<dyn MaskedLanguageModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Syntax tagger.
    #[must_use]
    pub fn tagger(mut self, tagger: Arc<dyn SyntaxTagger>) -> Self {
        self.tagger = Some(tagger);
        self
    }

    /// Lexical knowledge base.
    #[must_use]
    pub fn knowledge(mut self, knowledge: Arc<dyn LexicalKnowledgeBase>) -> Self {
        self.knowledge = Some(knowledge);
        self
    }

    /// Reading-ease formula.
    #[must_use]
    pub fn formula(mut self, formula: Arc<dyn ReadingEaseFormula>) -> Self {
        self.formula = Some(formula);
        self
    }

    /// Frequency table, replacing the configured file.
    #[must_use]
    pub fn frequency(mut self, frequency: FrequencyDictionary) -> Self {
        self.frequency = Some(frequency);
        self
    }

    /// Telemetry handle.
    #[must_use]
    pub fn telemetry(mut self, telemetry: Option<SimplifierTelemetry>) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Builds the engine and mines the default tier's Word Map. Unreadable
    /// data files degrade to empty structures.
    #[must_use]
    pub fn build(self) -> SimplifierEngine {
        let telemetry = self.telemetry;
        let frequency = self
            .frequency
            .unwrap_or_else(|| load_frequency(&self.config, telemetry.as_ref()));
        let knowledge = self
            .knowledge
            .unwrap_or_else(|| Arc::new(StaticLexicon::new()));
        let lexical = LexicalResources::new(knowledge, frequency);
        let model = self
            .model
            .unwrap_or_else(|| Arc::new(OfflineModel::default()));
        let generator = CandidateGenerator::new(model, self.config.generator);
        let default_tier = self.config.default_tier;
        let mut engine = SimplifierEngine {
            config: self.config,
            lexical,
            generator,
            tagger: self.tagger.unwrap_or_else(|| Arc::new(OfflineTagger)),
            formula: self.formula.unwrap_or_else(|| Arc::new(FleschReadingEase)),
            tier: default_tier,
            word_map: WordMap::default(),
            profile: DifficultyProfile::default(),
            telemetry,
        };
        engine.select_tier(default_tier);
        engine
    }
}

fn load_frequency(
    config: &SimplifierConfig,
    telemetry: Option<&SimplifierTelemetry>,
) -> FrequencyDictionary {
    let Some(path) = config.corpora.frequency_table.as_deref() else {
        return FrequencyDictionary::new();
    };
    FrequencyDictionary::load(path).unwrap_or_else(|err| {
        if let Some(tel) = telemetry {
            let _ = tel.log(
                LogLevel::Warn,
                "simplifier.frequency.load_failed",
                json!({ "path": path.display().to_string(), "error": format!("{err:#}") }),
            );
        }
        FrequencyDictionary::new()
    })
}

/// Lexical simplification engine. Lexical resources are shared read-mostly
/// state; every `simplify` call gets its own [`ReplacementSession`].
pub struct SimplifierEngine {
    config: SimplifierConfig,
    lexical: LexicalResources,
    generator: CandidateGenerator,
    tagger: Arc<dyn SyntaxTagger>,
    formula: Arc<dyn ReadingEaseFormula>,
    tier: Tier,
    word_map: WordMap,
    profile: DifficultyProfile,
    telemetry: Option<SimplifierTelemetry>,
}

impl SimplifierEngine {
    /// Returns a builder over `config`.
    #[must_use]
    pub const fn builder(config: SimplifierConfig) -> SimplifierEngineBuilder {
        SimplifierEngineBuilder::new(config)
    }

    /// Wires HTTP collaborators for configured endpoints, offline stand-ins
    /// otherwise, and loads the configured lexicon export.
    pub fn from_config(config: SimplifierConfig) -> Result<Self, SimplifierError> {
        let telemetry = config
            .telemetry("simplifier")
            .map_err(|err| SimplifierError::Configuration(format!("{err:#}")))?;
        let policy = config.retry_policy();
        let model = config
            .services
            .model_url
            .as_deref()
            .map(|url| HttpMaskedLanguageModel::new(url, config.services.mask_token.as_str(), policy))
            .transpose()?;
        let tagger = config
            .services
            .tagger_url
            .as_deref()
            .map(|url| HttpSyntaxTagger::new(url, policy))
            .transpose()?;
        let lexicon = config
            .corpora
            .lexicon
            .as_deref()
            .map(StaticLexicon::load)
            .transpose()
            .map_err(|err| SimplifierError::Io(format!("{err:#}")))?;

        let mut builder = Self::builder(config).telemetry(telemetry);
        if let Some(model) = model {
            builder = builder.model(Arc::new(model));
        }
        if let Some(tagger) = tagger {
            builder = builder.tagger(Arc::new(tagger));
        }
        if let Some(lexicon) = lexicon {
            builder = builder.knowledge(Arc::new(lexicon));
        }
        Ok(builder.build())
    }

    /// Switches tier by name. An unknown name leaves the engine unchanged.
    pub fn set_tier(&mut self, name: &str) -> Result<Tier, SimplifierError> {
        let tier = name
            .parse::<Tier>()
            .map_err(|err| SimplifierError::Configuration(err.to_string()))?;
        self.select_tier(tier);
        Ok(tier)
    }

    /// Switches tier and rebuilds the Word Map from the tier's corpus. A
    /// missing corpus leaves the Word Map empty.
    pub fn select_tier(&mut self, tier: Tier) {
        let word_map = match self.config.corpus_for(tier) {
            Some(path) => {
                CorpusAlignmentMiner::new(&self.lexical).mine_file(path, self.telemetry.as_ref())
            }
            None => {
                if !tier.is_passthrough() {
                    self.log(
                        LogLevel::Warn,
                        "simplifier.corpus.load_failed",
                        json!({ "tier": tier, "error": "no corpus configured" }),
                    );
                }
                WordMap::default()
            }
        };
        let previous = self.tier;
        self.tier = tier;
        self.word_map = word_map;
        self.log(
            LogLevel::Info,
            "simplifier.tier.changed",
            json!({ "from": previous, "to": tier, "word_map_entries": self.word_map.len() }),
        );
    }

    /// Active tier.
    #[must_use]
    pub const fn tier(&self) -> Tier {
        self.tier
    }

    /// Active Word Map.
    #[must_use]
    pub const fn word_map(&self) -> &WordMap {
        &self.word_map
    }

    /// Lexical resources.
    #[must_use]
    pub const fn lexical(&self) -> &LexicalResources {
        &self.lexical
    }

    /// Installs the reader's own difficult words.
    pub fn set_difficulty_profile<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.profile = DifficultyProfile::from_words(words);
    }

    /// Runs the best-effort pass over every sentence, then the quota pass
    /// over the document.
    pub fn simplify(&self, text: &str) -> Result<SimplificationOutcome, SimplifierError> {
        let chars = char_len(text);
        if chars > self.config.max_input_chars {
            return Err(SimplifierError::InvalidInput(format!(
                "input has {chars} characters, limit is {}",
                self.config.max_input_chars
            )));
        }
        let mut session = ReplacementSession::new(self.config.quota);
        self.log(
            LogLevel::Info,
            "simplifier.request.start",
            json!({ "session": session.id(), "tier": self.tier, "chars": chars }),
        );

        let text = if self.tier.is_passthrough() {
            text.to_string()
        } else {
            let mut document = Document::parse(text);
            let telemetry = self.telemetry.as_ref();
            let sentences = SentenceSimplifier::new(
                &self.lexical,
                &self.generator,
                self.tagger.as_ref(),
                &self.word_map,
            )
            .with_telemetry(telemetry);
            for sentence in document.sentences_mut() {
                sentences.simplify(sentence, &mut session);
            }
            QuotaEnforcer::new(&self.lexical, &self.generator, self.tagger.as_ref())
                .with_telemetry(telemetry)
                .enforce(&mut document, &mut session);
            document.render()
        };

        let summary = session.summary();
        self.log(
            LogLevel::Info,
            "simplifier.request.complete",
            json!({
                "session": summary.session_id,
                "checked": summary.checked,
                "replaced": summary.replaced,
                "enforced": summary.enforced,
                "ratio": summary.ratio,
            }),
        );
        Ok(SimplificationOutcome {
            text,
            tier: self.tier,
            session: summary,
            completed_at: Utc::now(),
        })
    }

    /// Before/after readability comparison.
    #[must_use]
    pub fn evaluate(&self, original: &str, simplified: &str) -> EvaluationReport {
        ReadabilityEvaluator::new(&self.lexical, self.formula.as_ref(), &self.profile)
            .evaluate(original, simplified)
    }

    /// Simplifies `text` and evaluates the result.
    pub fn simplify_and_evaluate(
        &self,
        text: &str,
    ) -> Result<(SimplificationOutcome, EvaluationReport), SimplifierError> {
        let outcome = self.simplify(text)?;
        let report = self.evaluate(text, &outcome.text);
        Ok((outcome, report))
    }

    /// Mines a corpus file into a Word Map without activating it.
    pub fn mine_corpus(&self, path: impl AsRef<Path>) -> Result<WordMap, SimplifierError> {
        CorpusAlignmentMiner::new(&self.lexical)
            .try_mine_file(path)
            .map_err(|err| SimplifierError::Io(format!("{err:#}")))
    }

    /// Current state snapshot.
    #[must_use]
    pub fn status(&self) -> EngineStatus {
        EngineStatus {
            tier: self.tier,
            word_map_entries: self.word_map.len(),
            frequency_entries: self.lexical.frequency_table().len(),
            keyword_count: self.lexical.keywords().len(),
            antonym_entries: self.lexical.antonyms().len(),
            model_available: self.generator.is_available(),
        }
    }

    /// Telemetry handle, if configured.
    #[must_use]
    pub const fn telemetry(&self) -> Option<&SimplifierTelemetry> {
        self.telemetry.as_ref()
    }

    fn log(&self, level: LogLevel, message: &str, metadata: serde_json::Value) {
        if let Some(tel) = &self.telemetry {
            let _ = tel.log(level, message, metadata);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        fixtures::{sample_lexicon, sample_tagger, ScriptedModel},
        text::is_separator,
    };
    use std::fs;
    use tempfile::tempdir;

    const LONG: &str = "The committee carefully considered the extraordinary proposal \
                        before the meeting ended late that evening.";

    fn engine_with(config: SimplifierConfig, model: ScriptedModel) -> SimplifierEngine {
        SimplifierEngine::builder(config)
            .model(Arc::new(model))
            .tagger(Arc::new(sample_tagger()))
            .knowledge(Arc::new(sample_lexicon()))
            .build()
    }

    fn separators(text: &str) -> String {
        text.chars().filter(|ch| is_separator(*ch)).collect()
    }

    #[test]
    fn text_without_candidates_is_unchanged() {
        let engine = engine_with(SimplifierConfig::default(), ScriptedModel::new());
        let outcome = engine.simplify("The cat is sitting on the mat.").unwrap();
        assert_eq!(outcome.text, "The cat is sitting on the mat.");
        assert_eq!(outcome.replacement_count(), 0);
        assert_eq!(outcome.total_words_checked(), 7);
        assert_eq!(outcome.tier, Tier::Beginner);
    }

    #[test]
    fn proper_nouns_are_never_targets() {
        let engine = engine_with(
            SimplifierConfig::default(),
            ScriptedModel::new().with_default(["city", "place", "town", "big"]),
        );
        let input = "Washington is a large city where many people live and work every day \
                     because the enormous buildings attract curious visitors.";
        let outcome = engine.simplify(input).unwrap();
        assert_eq!(outcome.total_words_checked(), 20);
        assert!(outcome.text.starts_with("Washington is a "));
        assert_eq!(outcome.text.matches("Washington").count(), 1);
    }

    #[test]
    fn separator_layout_is_preserved() {
        let engine = engine_with(
            SimplifierConfig::default(),
            ScriptedModel::new().with_default(["big", "fast", "huge"]),
        );
        let input = "  The enormous dog ran,  quickly!\n\nIt  ended...  ";
        let outcome = engine.simplify(input).unwrap();
        assert_eq!(separators(&outcome.text), separators(input));
        assert_eq!(
            crate::text::word_tokens(&outcome.text).len(),
            crate::text::word_tokens(input).len()
        );
    }

    #[test]
    fn small_inputs_skip_the_quota_pass() {
        let engine = SimplifierEngine::builder(SimplifierConfig::default())
            .model(Arc::new(ScriptedModel::failing()))
            .tagger(Arc::new(sample_tagger()))
            .knowledge(Arc::new(sample_lexicon()))
            .frequency(FrequencyDictionary::from_pairs([("said", 5.5), ("thought", 4.8)]))
            .build();
        let outcome = engine.simplify("The committee considered it.").unwrap();
        assert_eq!(outcome.text, "The committee considered it.");
        assert_eq!(outcome.session.enforced, 0);
    }

    #[test]
    fn quota_pass_only_adds_replacements() {
        let model = ScriptedModel::new().fill(
            "The committee carefully considered the <mask> proposal before the meeting ended late that evening.",
            ["extraordinary", "unusual"],
        );
        let engine = engine_with(SimplifierConfig::default(), model);
        let outcome = engine.simplify(LONG).unwrap();
        assert_eq!(outcome.total_words_checked(), 14);
        assert_eq!(outcome.replacement_count(), 1);
        assert!(outcome.session.replaced >= outcome.session.best_effort_replaced);
        assert_eq!(outcome.text, LONG.replace("extraordinary", "unusual"));
    }

    #[test]
    fn unknown_tier_keeps_previous_state() {
        let mut engine = engine_with(SimplifierConfig::default(), ScriptedModel::new());
        engine.set_tier("intermediate").unwrap();
        let err = engine.set_tier("expert").unwrap_err();
        assert!(matches!(err, SimplifierError::Configuration(_)));
        assert_eq!(engine.tier(), Tier::Intermediate);
    }

    #[test]
    fn advanced_tier_is_a_passthrough() {
        let mut engine = engine_with(
            SimplifierConfig::default(),
            ScriptedModel::new().with_default(["unusual"]),
        );
        assert_eq!(engine.set_tier("Advanced").unwrap(), Tier::Advanced);
        let outcome = engine.simplify(LONG).unwrap();
        assert_eq!(outcome.text, LONG);
        assert_eq!(outcome.total_words_checked(), 0);
        assert_eq!(outcome.tier, Tier::Advanced);
    }

    #[test]
    fn tier_corpus_feeds_the_word_map() {
        let dir = tempdir().unwrap();
        let corpus = dir.path().join("ADV-ELE.txt");
        fs::write(
            &corpus,
            "The enormous dog barked.\nThe big dog barked.\n*******\n",
        )
        .unwrap();
        let mut config = SimplifierConfig::default();
        config.corpora.beginner = Some(corpus);
        config.corpora.intermediate = Some(dir.path().join("missing.txt"));
        let mut engine = engine_with(config, ScriptedModel::new());
        assert_eq!(engine.word_map().get("enormous"), Some("big"));

        let outcome = engine.simplify("They saw an enormous dog.").unwrap();
        assert_eq!(outcome.text, "They saw an big dog.");

        // unreadable corpus still switches tier
        assert_eq!(engine.set_tier("adv-int").unwrap(), Tier::Intermediate);
        assert!(engine.word_map().is_empty());
        assert_eq!(engine.status().word_map_entries, 0);
    }

    #[test]
    fn oversized_input_is_rejected() {
        let mut config = SimplifierConfig::default();
        config.max_input_chars = 10;
        let engine = engine_with(config, ScriptedModel::new());
        let err = engine.simplify("This is far too long.").unwrap_err();
        assert!(matches!(err, SimplifierError::InvalidInput(_)));
    }

    #[test]
    fn tier_changes_are_logged() {
        let dir = tempdir().unwrap();
        let log = dir.path().join("lexis.log");
        let telemetry = SimplifierTelemetry::builder("simplifier")
            .log_path(&log)
            .build()
            .unwrap();
        let mut engine = SimplifierEngine::builder(SimplifierConfig::default())
            .telemetry(Some(telemetry))
            .build();
        engine.set_tier("advanced").unwrap();
        engine.simplify("Hello there.").unwrap();
        let contents = fs::read_to_string(&log).unwrap();
        assert!(contents.contains("simplifier.tier.changed"));
        assert!(contents.contains("simplifier.request.complete"));
    }

    #[test]
    fn status_reports_offline_defaults() {
        let engine = SimplifierEngine::builder(SimplifierConfig::default()).build();
        let status = engine.status();
        assert_eq!(status.tier, Tier::Beginner);
        assert!(!status.model_available);
        assert_eq!(status.frequency_entries, 0);
        assert!(status.keyword_count > 0);
    }

    #[test]
    fn simplify_and_evaluate_reports_the_change() {
        let mut engine = engine_with(
            SimplifierConfig::default(),
            ScriptedModel::new().fill("She has a <mask> garden.", ["pretty"]),
        );
        engine.set_difficulty_profile(["garden"]);
        let (outcome, report) = engine
            .simplify_and_evaluate("She has a beautiful garden.")
            .unwrap();
        assert_eq!(outcome.text, "She has a pretty garden.");
        assert!(report.improvement.length_reduction_percent > 0.0);
        assert!(report.original.difficult_word_percent > 0.0);
    }

    #[test]
    fn simplification_never_raises_difficulty() {
        let dir = tempdir().unwrap();
        let corpus = dir.path().join("ADV-ELE.txt");
        fs::write(
            &corpus,
            "The enormous dog barked.\nThe big dog barked.\n*******\n",
        )
        .unwrap();
        let mut config = SimplifierConfig::default();
        config.corpora.beginner = Some(corpus);
        let model = ScriptedModel::new().fill(
            "The committee carefully considered the <mask> proposal about the big garden \
             before the meeting ended late that evening.",
            ["extraordinary", "unusual"],
        );
        let engine = engine_with(config, model);
        let input = "The committee carefully considered the extraordinary proposal about the \
                     enormous garden before the meeting ended late that evening.";

        let (outcome, report) = engine.simplify_and_evaluate(input).unwrap();
        assert_eq!(outcome.total_words_checked(), 18);
        assert_eq!(outcome.session.best_effort_replaced, 1);
        assert_eq!(outcome.session.enforced, 1);
        assert_eq!(
            outcome.text,
            input
                .replace("enormous", "big")
                .replace("extraordinary", "unusual")
        );
        assert!(report.original.difficult_word_percent > 0.0);
        assert!(
            report.simplified.difficult_word_percent <= report.original.difficult_word_percent
        );
        assert!(report.improvement.difficult_word_percent >= 0.0);
    }

    #[test]
    fn missing_lexicon_export_is_an_io_error() {
        let mut config = SimplifierConfig::default();
        config.corpora.lexicon = Some("/nonexistent/lexicon.json".into());
        let err = SimplifierEngine::from_config(config).err().unwrap();
        assert!(matches!(err, SimplifierError::Io(_)));
    }
}
