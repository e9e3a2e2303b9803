//! Read-mostly lexical state shared by every request: function words,
//! dyslexia patterns, semantic keywords, antonyms, and frequencies.

/// Symmetric, growing antonym index.
pub mod antonyms;
/// Frequency table loading.
pub mod frequency;
/// Semantic keyword set.
pub mod keywords;
/// Function words, orthographic patterns, and syllables.
pub mod words;

pub use antonyms::AntonymIndex;
pub use frequency::FrequencyDictionary;
pub use keywords::SemanticKeywords;
pub use words::DyslexiaPatterns;

use std::{collections::HashSet, fmt, sync::Arc};

use crate::services::LexicalKnowledgeBase;

/// Lexical resources owned by one engine instance.
pub struct LexicalResources {
    knowledge: Arc<dyn LexicalKnowledgeBase>,
    function_words: HashSet<String>,
    patterns: DyslexiaPatterns,
    keywords: SemanticKeywords,
    antonyms: AntonymIndex,
    frequency: FrequencyDictionary,
}

impl fmt::Debug for LexicalResources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LexicalResources")
            .field("function_words", &self.function_words.len())
            .field("keywords", &self.keywords.len())
            .field("antonyms", &self.antonyms.len())
            .field("frequency", &self.frequency.len())
            .finish_non_exhaustive()
    }
}

impl LexicalResources {
    /// Builds the keyword set and seeds the antonym index from `knowledge`.
    #[must_use]
    pub fn new(knowledge: Arc<dyn LexicalKnowledgeBase>, frequency: FrequencyDictionary) -> Self {
        let keywords = SemanticKeywords::build(knowledge.as_ref());
        let antonyms = AntonymIndex::seeded(knowledge.as_ref());
        Self {
            knowledge,
            function_words: words::function_words(),
            patterns: DyslexiaPatterns::default(),
            keywords,
            antonyms,
            frequency,
        }
    }

    /// Closed-class word check, case-insensitive.
    #[must_use]
    pub fn is_function_word(&self, word: &str) -> bool {
        self.function_words.contains(&word.to_lowercase())
    }

    /// `d(w)`: number of dyslexia-difficult patterns present in `word`.
    #[must_use]
    pub fn difficulty(&self, word: &str) -> usize {
        self.patterns.count(word)
    }

    /// Whether `word` contains any dyslexia-difficult pattern.
    #[must_use]
    pub fn has_difficult_pattern(&self, word: &str) -> bool {
        self.patterns.any(word)
    }

    /// Keyword set membership, or a sense whose gloss mentions a protected
    /// domain. A failed knowledge-base lookup counts as protected.
    #[must_use]
    pub fn is_semantically_protected(&self, word: &str) -> bool {
        if self.keywords.contains(word) {
            return true;
        }
        match self.knowledge.senses(&word.to_lowercase()) {
            Ok(senses) => senses
                .iter()
                .any(|sense| keywords::definition_mentions_domain(&sense.definition)),
            Err(_) => true,
        }
    }

    /// Recorded or newly discovered antonym of `word`.
    #[must_use]
    pub fn find_antonym(&self, word: &str) -> Option<String> {
        self.antonyms.discover(word, self.knowledge.as_ref())
    }

    /// Log-scale frequency of `word`.
    #[must_use]
    pub fn frequency(&self, word: &str) -> Option<f64> {
        self.frequency.get(word)
    }

    /// The frequency table.
    #[must_use]
    pub const fn frequency_table(&self) -> &FrequencyDictionary {
        &self.frequency
    }

    /// The keyword set.
    #[must_use]
    pub const fn keywords(&self) -> &SemanticKeywords {
        &self.keywords
    }

    /// The antonym index.
    #[must_use]
    pub const fn antonyms(&self) -> &AntonymIndex {
        &self.antonyms
    }
}
