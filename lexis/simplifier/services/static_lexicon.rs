use std::{collections::HashMap, fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::{LexicalKnowledgeBase, Sense, ServiceError};

/// Lexical knowledge base held in memory, keyed by lowercase word.
///
/// The JSON export format is `{"word": [{"definition", "lemmas": [{"name", "antonyms"}], "hypernyms"}]}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticLexicon {
    entries: HashMap<String, Vec<Sense>>,
}

impl StaticLexicon {
    /// Creates an empty lexicon.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON export.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let parsed: HashMap<String, Vec<Sense>> =
            serde_json::from_str(raw).context("parsing lexicon export")?;
        let mut lexicon = Self::new();
        for (word, senses) in parsed {
            lexicon.insert(&word, senses);
        }
        Ok(lexicon)
    }

    /// Loads a JSON export from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading lexicon {}", path.display()))?;
        Self::from_json_str(&raw).with_context(|| format!("loading lexicon {}", path.display()))
    }

    /// Appends senses for `word`.
    pub fn insert(&mut self, word: &str, senses: Vec<Sense>) {
        self.entries
            .entry(word.to_lowercase())
            .or_default()
            .extend(senses);
    }

    /// Builder-style single sense insertion.
    #[must_use]
    pub fn with_sense(mut self, word: &str, sense: Sense) -> Self {
        self.insert(word, vec![sense]);
        self
    }

    /// Number of words with at least one sense.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the lexicon has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl LexicalKnowledgeBase for StaticLexicon {
    fn senses(&self, word: &str) -> Result<Vec<Sense>, ServiceError> {
        Ok(self
            .entries
            .get(&word.to_lowercase())
            .cloned()
            .unwrap_or_default())
    }
}
