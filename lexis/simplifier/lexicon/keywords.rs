use std::collections::HashSet;

use crate::services::LexicalKnowledgeBase;

/// Domains whose vocabulary is protected from substitution.
pub const SEMANTIC_DOMAINS: [&str; 5] = ["change", "quantity", "direction", "time", "state"];

/// Domains checked against sense definitions.
pub const DEFINITION_DOMAINS: [&str; 4] = ["change", "quantity", "direction", "time"];

/// Immutable set of protected words, built once from the knowledge base.
#[derive(Debug, Clone, Default)]
pub struct SemanticKeywords {
    words: HashSet<String>,
}

impl SemanticKeywords {
    /// Expands every domain word through its senses' lemmas and direct
    /// hypernyms. Entries of two characters or fewer are dropped.
    #[must_use]
    pub fn build(knowledge: &dyn LexicalKnowledgeBase) -> Self {
        let mut words = HashSet::new();
        for domain in SEMANTIC_DOMAINS {
            words.insert(domain.to_string());
            let Ok(senses) = knowledge.senses(domain) else {
                continue;
            };
            for sense in senses {
                words.extend(sense.lemmas.iter().map(|lemma| normalize(&lemma.name)));
                words.extend(sense.hypernyms.iter().map(|name| normalize(name)));
            }
        }
        words.retain(|word| word.chars().count() > 2);
        Self { words }
    }

    /// Case-insensitive membership.
    #[must_use]
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }

    /// Number of protected words.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Whether a gloss mentions one of the definition domains anywhere, word
/// fragments included (`lifetime`, `exchange`).
#[must_use]
pub fn definition_mentions_domain(definition: &str) -> bool {
    let definition = definition.to_lowercase();
    DEFINITION_DOMAINS
        .iter()
        .any(|domain| definition.contains(domain))
}

fn normalize(name: &str) -> String {
    name.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{Sense, StaticLexicon};

    #[test]
    fn expands_domains_through_lemmas_and_hypernyms() {
        let lexicon = StaticLexicon::new()
            .with_sense(
                "change",
                Sense::new("the action of changing something")
                    .with_lemma("alteration")
                    .with_lemma("modification")
                    .with_hypernym("action"),
            )
            .with_sense("time", Sense::new("a period").with_lemma("clip").with_lemma("go"));
        let keywords = SemanticKeywords::build(&lexicon);
        assert!(keywords.contains("Alteration"));
        assert!(keywords.contains("action"));
        assert!(keywords.contains("clip"));
        assert!(keywords.contains("state"));
        assert!(!keywords.contains("go"));
    }

    #[test]
    fn definitions_match_domain_substrings() {
        assert!(definition_mentions_domain("a change of position"));
        assert!(definition_mentions_domain("Changes over Time"));
        assert!(definition_mentions_domain("the greatest quantity possible"));
        assert!(definition_mentions_domain("lasting for a lifetime"));
        assert!(definition_mentions_domain("happening sometimes"));
        assert!(definition_mentions_domain("an exchange of goods"));
        assert!(definition_mentions_domain("interchangeable parts"));
        assert!(!definition_mentions_domain("pleasing to the senses"));
    }
}
