use std::collections::HashMap;

use parking_lot::RwLock;

use crate::services::LexicalKnowledgeBase;

/// Words whose antonym pairs are recorded at startup.
pub const SEED_WORDS: [&str; 27] = [
    "increase", "decrease", "rise", "fall", "up", "down", "high", "low", "more", "less", "large",
    "small", "big", "positive", "negative", "good", "bad", "start", "stop", "begin", "end",
    "create", "destroy", "build", "collapse", "finally", "already",
];

/// Symmetric antonym map that only grows. Concurrent discoveries of the same
/// pair write identical values.
#[derive(Debug, Default)]
pub struct AntonymIndex {
    pairs: RwLock<HashMap<String, String>>,
}

impl AntonymIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records every antonym pair found under the senses of [`SEED_WORDS`].
    #[must_use]
    pub fn seeded(knowledge: &dyn LexicalKnowledgeBase) -> Self {
        let index = Self::new();
        for word in SEED_WORDS {
            let Ok(senses) = knowledge.senses(word) else {
                continue;
            };
            for lemma in senses.iter().flat_map(|sense| &sense.lemmas) {
                for antonym in &lemma.antonyms {
                    index.record(&lemma.name, antonym);
                }
            }
        }
        index
    }

    /// Stores `a` and `b` as opposites of each other.
    pub fn record(&self, a: &str, b: &str) {
        let (a, b) = (a.to_lowercase(), b.to_lowercase());
        let mut pairs = self.pairs.write();
        pairs.insert(a.clone(), b.clone());
        pairs.insert(b, a);
    }

    /// Recorded antonym of `word`.
    #[must_use]
    pub fn get(&self, word: &str) -> Option<String> {
        self.pairs.read().get(&word.to_lowercase()).cloned()
    }

    /// Recorded antonym of `word`, or the first antonym found in the
    /// knowledge base, which is then recorded. Knowledge-base failures mean
    /// "no antonym".
    pub fn discover(&self, word: &str, knowledge: &dyn LexicalKnowledgeBase) -> Option<String> {
        if let Some(found) = self.get(word) {
            return Some(found);
        }
        let senses = knowledge.senses(word).ok()?;
        let antonym = senses
            .iter()
            .flat_map(|sense| &sense.lemmas)
            .find_map(|lemma| lemma.antonyms.first())?
            .to_lowercase();
        self.record(word, &antonym);
        Some(antonym)
    }

    /// Number of stored directions (each pair counts twice).
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.read().len()
    }

    /// Whether nothing is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{Sense, StaticLexicon};

    #[test]
    fn seeds_pairs_symmetrically() {
        let lexicon = StaticLexicon::new().with_sense(
            "increase",
            Sense::new("a process of becoming larger").with_antonym("increase", "decrease"),
        );
        let index = AntonymIndex::seeded(&lexicon);
        assert_eq!(index.get("Decrease").as_deref(), Some("increase"));
        assert_eq!(index.get("increase").as_deref(), Some("decrease"));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn discovery_grows_the_index() {
        let lexicon = StaticLexicon::new().with_sense(
            "ancient",
            Sense::new("belonging to times long past").with_antonym("ancient", "modern"),
        );
        let index = AntonymIndex::new();
        assert_eq!(index.discover("ancient", &lexicon).as_deref(), Some("modern"));
        assert_eq!(index.get("modern").as_deref(), Some("ancient"));
        assert_eq!(index.discover("pretty", &lexicon), None);
        assert_eq!(index.len(), 2);
    }
}
