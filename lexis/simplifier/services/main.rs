//! Collaborator contracts consumed by the engine: masked language model,
//! syntax tagger, and lexical knowledge base.

/// HTTP clients for remotely hosted model and tagger services.
pub mod http;
/// Stand-ins used when no service endpoint is configured.
pub mod offline;
/// In-memory lexical knowledge base loaded from a JSON export.
pub mod static_lexicon;

pub use http::{HttpMaskedLanguageModel, HttpSyntaxTagger, RetryPolicy};
pub use offline::{OfflineModel, OfflineTagger};
pub use static_lexicon::StaticLexicon;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure of a single collaborator call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// Service is not configured or refused to start.
    #[error("service unavailable: {0}")]
    Unavailable(String),
    /// Connection or HTTP status failure.
    #[error("transport error: {0}")]
    Transport(String),
    /// No answer within the configured timeout.
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    /// Response could not be decoded.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ServiceError {
    /// Transport and timeout failures may succeed on another attempt.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout(_))
    }
}

/// One ranked fill prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Predicted token text.
    pub token: String,
    /// Model confidence.
    pub score: f32,
}

impl Prediction {
    /// Creates a prediction.
    #[must_use]
    pub fn new(token: impl Into<String>, score: f32) -> Self {
        Self {
            token: token.into(),
            score,
        }
    }
}

/// Masked-language-model service proposing fills for a masked sentence.
pub trait MaskedLanguageModel: Send + Sync {
    /// Placeholder the model expects in place of the masked word.
    fn mask_token(&self) -> &str;

    /// Whether the model can be queried at all.
    fn is_available(&self) -> bool {
        true
    }

    /// Returns up to `top_k` predictions ranked by confidence.
    fn fill_mask(&self, masked: &str, top_k: usize) -> Result<Vec<Prediction>, ServiceError>;
}

/// Universal part-of-speech tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartOfSpeech {
    /// Adjective.
    Adj,
    /// Adposition.
    Adp,
    /// Adverb.
    Adv,
    /// Auxiliary verb.
    Aux,
    /// Coordinating conjunction.
    Cconj,
    /// Determiner.
    Det,
    /// Interjection.
    Intj,
    /// Common noun.
    Noun,
    /// Numeral.
    Num,
    /// Particle.
    Part,
    /// Pronoun.
    Pron,
    /// Proper noun.
    Propn,
    /// Punctuation.
    Punct,
    /// Subordinating conjunction.
    Sconj,
    /// Symbol.
    Sym,
    /// Verb.
    Verb,
    /// Whitespace token.
    Space,
    /// Anything else.
    X,
}

impl PartOfSpeech {
    /// Maps a tagger label (case-insensitive) onto the enum. Unknown labels become `X`.
    #[must_use]
    pub fn parse(label: &str) -> Self {
        match label.trim().to_ascii_uppercase().as_str() {
            "ADJ" => Self::Adj,
            "ADP" => Self::Adp,
            "ADV" => Self::Adv,
            "AUX" => Self::Aux,
            "CCONJ" | "CONJ" => Self::Cconj,
            "DET" => Self::Det,
            "INTJ" => Self::Intj,
            "NOUN" => Self::Noun,
            "NUM" => Self::Num,
            "PART" => Self::Part,
            "PRON" => Self::Pron,
            "PROPN" => Self::Propn,
            "PUNCT" => Self::Punct,
            "SCONJ" => Self::Sconj,
            "SYM" => Self::Sym,
            "VERB" => Self::Verb,
            "SPACE" => Self::Space,
            _ => Self::X,
        }
    }

    /// Adjectives and adverbs may stand in for each other.
    #[must_use]
    pub const fn is_modifier(self) -> bool {
        matches!(self, Self::Adj | Self::Adv)
    }
}

/// Named-entity categories reported by the tagger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    /// People, including fictional.
    Person,
    /// Non-political locations.
    Location,
    /// Companies, agencies, institutions.
    Organization,
    /// Countries, cities, states.
    GeoPolitical,
    /// Any other entity label.
    Other(String),
}

impl EntityType {
    /// Maps a tagger label onto the enum. Empty labels mean "no entity".
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim();
        if label.is_empty() {
            return None;
        }
        Some(match label.to_ascii_uppercase().as_str() {
            "PERSON" | "PER" => Self::Person,
            "LOC" => Self::Location,
            "ORG" => Self::Organization,
            "GPE" => Self::GeoPolitical,
            other => Self::Other(other.to_string()),
        })
    }

    /// Entities that must never be replaced.
    #[must_use]
    pub const fn is_protected(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

/// One token of a tagged sentence.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedToken {
    /// Surface text.
    pub text: String,
    /// Coarse part of speech.
    pub pos: PartOfSpeech,
    /// Fine-grained tag (e.g. `VBD`).
    pub tag: String,
    /// Dependency relation to the head.
    pub dependency: String,
    /// Index of the syntactic head, `None` for the root.
    pub head: Option<usize>,
    /// Morphological tense.
    pub tense: Option<String>,
    /// Morphological number.
    pub number: Option<String>,
    /// Named-entity type.
    pub entity: Option<EntityType>,
    /// Base form.
    pub lemma: String,
}

impl TaggedToken {
    /// Creates a token with the lowercase text as lemma and no syntax attached.
    #[must_use]
    pub fn new(text: impl Into<String>, pos: PartOfSpeech) -> Self {
        let text = text.into();
        let lemma = text.to_lowercase();
        Self {
            text,
            pos,
            tag: String::new(),
            dependency: String::new(),
            head: None,
            tense: None,
            number: None,
            entity: None,
            lemma,
        }
    }

    /// Sets the lemma.
    #[must_use]
    pub fn with_lemma(mut self, lemma: impl Into<String>) -> Self {
        self.lemma = lemma.into();
        self
    }

    /// Sets the head index.
    #[must_use]
    pub const fn with_head(mut self, head: usize) -> Self {
        self.head = Some(head);
        self
    }

    /// Sets the entity type.
    #[must_use]
    pub fn with_entity(mut self, entity: EntityType) -> Self {
        self.entity = Some(entity);
        self
    }
}

/// POS/dependency/entity tagging service.
pub trait SyntaxTagger: Send + Sync {
    /// Tags every token of `sentence` in order.
    fn tag(&self, sentence: &str) -> Result<Vec<TaggedToken>, ServiceError>;
}

/// Lemma belonging to a sense, with its recorded antonyms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenseLemma {
    /// Lemma name (may contain underscores for multi-word lemmas).
    pub name: String,
    /// Antonym lemma names.
    #[serde(default)]
    pub antonyms: Vec<String>,
}

/// A word sense: its synonym set, gloss, and one level of hypernyms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sense {
    /// Gloss.
    #[serde(default)]
    pub definition: String,
    /// Synonym set members.
    #[serde(default)]
    pub lemmas: Vec<SenseLemma>,
    /// Lemma names of the direct hypernyms.
    #[serde(default)]
    pub hypernyms: Vec<String>,
}

impl Sense {
    /// Creates a sense with the given gloss.
    #[must_use]
    pub fn new(definition: impl Into<String>) -> Self {
        Self {
            definition: definition.into(),
            ..Self::default()
        }
    }

    /// Adds a synonym lemma.
    #[must_use]
    pub fn with_lemma(mut self, name: impl Into<String>) -> Self {
        self.lemmas.push(SenseLemma {
            name: name.into(),
            antonyms: Vec::new(),
        });
        self
    }

    /// Adds a synonym lemma together with one antonym.
    #[must_use]
    pub fn with_antonym(mut self, name: impl Into<String>, antonym: impl Into<String>) -> Self {
        self.lemmas.push(SenseLemma {
            name: name.into(),
            antonyms: vec![antonym.into()],
        });
        self
    }

    /// Adds a hypernym lemma.
    #[must_use]
    pub fn with_hypernym(mut self, name: impl Into<String>) -> Self {
        self.hypernyms.push(name.into());
        self
    }
}

/// Lexical database answering sense queries.
pub trait LexicalKnowledgeBase: Send + Sync {
    /// All senses of `word`. Unknown words yield an empty list.
    fn senses(&self, word: &str) -> Result<Vec<Sense>, ServiceError>;
}
