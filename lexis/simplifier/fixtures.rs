//! Deterministic collaborators for unit tests.

use std::{collections::HashMap, sync::Arc};

use parking_lot::Mutex;

use crate::{
    lexicon::{FrequencyDictionary, LexicalResources},
    services::{
        EntityType, MaskedLanguageModel, PartOfSpeech, Prediction, Sense, ServiceError,
        StaticLexicon, SyntaxTagger, TaggedToken,
    },
    text::word_tokens,
};

/// Masked model answering from scripted tables and recording every query.
#[derive(Default)]
pub struct ScriptedModel {
    default: Vec<String>,
    fills: HashMap<String, Vec<String>>,
    failing: bool,
    queries: Mutex<Vec<(String, usize)>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Model whose every call fails with a transport error.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Answer for masked sentences without a scripted fill.
    pub fn with_default<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default = tokens.into_iter().map(Into::into).collect();
        self
    }

    /// Answer for one exact masked sentence.
    pub fn fill<I, S>(mut self, masked: &str, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fills
            .insert(masked.to_string(), tokens.into_iter().map(Into::into).collect());
        self
    }

    pub fn queries(&self) -> Vec<(String, usize)> {
        self.queries.lock().clone()
    }
}

impl MaskedLanguageModel for ScriptedModel {
    fn mask_token(&self) -> &str {
        "<mask>"
    }

    #[allow(clippy::cast_precision_loss)]
    fn fill_mask(&self, masked: &str, top_k: usize) -> Result<Vec<Prediction>, ServiceError> {
        self.queries.lock().push((masked.to_string(), top_k));
        if self.failing {
            return Err(ServiceError::Transport("scripted failure".into()));
        }
        let tokens = self.fills.get(masked).unwrap_or(&self.default);
        Ok(tokens
            .iter()
            .take(top_k)
            .enumerate()
            .map(|(rank, token)| Prediction::new(token.clone(), 1.0 - rank as f32 * 0.05))
            .collect())
    }
}

/// Tagger driven by a word list. Unlisted words are tagged `X`.
#[derive(Debug, Default)]
pub struct LexiconTagger {
    pos: HashMap<String, PartOfSpeech>,
    entities: HashMap<String, EntityType>,
    attachments: Vec<(String, String)>,
}

impl LexiconTagger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn word(mut self, word: &str, pos: PartOfSpeech) -> Self {
        self.pos.insert(word.to_lowercase(), pos);
        self
    }

    /// Proper noun carrying an entity type.
    pub fn proper(mut self, word: &str, entity: EntityType) -> Self {
        let key = word.to_lowercase();
        self.pos.insert(key.clone(), PartOfSpeech::Propn);
        self.entities.insert(key, entity);
        self
    }

    /// Makes `head` the syntactic head of `modifier` wherever both occur.
    pub fn attach(mut self, modifier: &str, head: &str) -> Self {
        self.attachments
            .push((modifier.to_lowercase(), head.to_lowercase()));
        self
    }
}

impl SyntaxTagger for LexiconTagger {
    fn tag(&self, sentence: &str) -> Result<Vec<TaggedToken>, ServiceError> {
        let mut tokens: Vec<TaggedToken> = word_tokens(sentence)
            .into_iter()
            .map(|text| {
                let key = text.to_lowercase();
                let pos = self.pos.get(&key).copied().unwrap_or(PartOfSpeech::X);
                let token = TaggedToken::new(text, pos);
                match self.entities.get(&key) {
                    Some(entity) => token.with_entity(entity.clone()),
                    None => token,
                }
            })
            .collect();
        for (modifier, head) in &self.attachments {
            let position = |word: &str| tokens.iter().position(|t| t.text.to_lowercase() == word);
            if let (Some(m), Some(h)) = (position(modifier), position(head)) {
                tokens[m].head = Some(h);
            }
        }
        Ok(tokens)
    }
}

/// Small knowledge base: the protected domains with a few lemmas, and two
/// antonym pairs.
pub fn sample_lexicon() -> StaticLexicon {
    StaticLexicon::new()
        .with_sense(
            "change",
            Sense::new("an event that occurs when something passes from one state to another")
                .with_lemma("alteration")
                .with_lemma("modification")
                .with_hypernym("action"),
        )
        .with_sense(
            "quantity",
            Sense::new("how much there is of something").with_lemma("amount"),
        )
        .with_sense("time", Sense::new("an instance or single occasion").with_lemma("occasion"))
        .with_sense(
            "direction",
            Sense::new("the spatial relation between something and its course").with_lemma("bearing"),
        )
        .with_sense("state", Sense::new("the way something is").with_lemma("condition"))
        .with_sense(
            "good",
            Sense::new("having desirable or positive qualities").with_antonym("good", "bad"),
        )
        .with_sense(
            "increase",
            Sense::new("a process of becoming larger").with_antonym("increase", "decrease"),
        )
}

/// [`sample_lexicon`] with an empty frequency table.
pub fn sample_resources() -> LexicalResources {
    LexicalResources::new(Arc::new(sample_lexicon()), FrequencyDictionary::new())
}

/// Tagger covering the vocabulary of the pipeline tests.
pub fn sample_tagger() -> LexiconTagger {
    let adjectives = ["enormous", "big", "beautiful", "pretty", "nice", "huge", "fast", "unusual"];
    let adverbs = ["beautifully", "quickly"];
    let nouns = [
        "dog", "garden", "city", "mat", "cat", "committee", "proposal", "meeting", "evening",
        "amount", "house", "tree",
    ];
    let verbs = ["sitting", "considered", "run", "ended"];
    let tagger = [
        (&adjectives[..], PartOfSpeech::Adj),
        (&adverbs[..], PartOfSpeech::Adv),
        (&nouns[..], PartOfSpeech::Noun),
        (&verbs[..], PartOfSpeech::Verb),
    ]
    .into_iter()
    .fold(LexiconTagger::new(), |tagger, (words, pos)| {
        words.iter().fold(tagger, |tagger, word| tagger.word(word, pos))
    });
    tagger.proper("Washington", EntityType::GeoPolitical)
}
