use std::collections::HashSet;

use thiserror::Error;

use crate::{
    lexicon::LexicalResources,
    services::{EntityType, PartOfSpeech, ServiceError, SyntaxTagger, TaggedToken},
    text::word_tokens,
};

/// Annotation of one target token.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenAnnotation {
    /// Position in the tagged sentence.
    pub index: usize,
    /// Coarse part of speech.
    pub pos: PartOfSpeech,
    /// Fine-grained tag.
    pub tag: String,
    /// Dependency relation.
    pub dependency: String,
    /// Morphological tense.
    pub tense: Option<String>,
    /// Morphological number.
    pub number: Option<String>,
    /// Tagged as a proper noun.
    pub is_proper: bool,
    /// Named-entity type.
    pub entity: Option<EntityType>,
    /// Base form.
    pub lemma: String,
}

impl TokenAnnotation {
    fn from_token(index: usize, token: &TaggedToken) -> Self {
        Self {
            index,
            pos: token.pos,
            tag: token.tag.clone(),
            dependency: token.dependency.clone(),
            tense: token.tense.clone(),
            number: token.number.clone(),
            is_proper: token.pos == PartOfSpeech::Propn,
            entity: token.entity.clone(),
            lemma: token.lemma.clone(),
        }
    }
}

/// A tagged sentence.
#[derive(Debug, Clone, PartialEq)]
pub struct SentenceContext {
    tokens: Vec<TaggedToken>,
}

impl SentenceContext {
    /// Tags `sentence`.
    pub fn annotate(tagger: &dyn SyntaxTagger, sentence: &str) -> Result<Self, ServiceError> {
        Ok(Self {
            tokens: tagger.tag(sentence)?,
        })
    }

    /// Wraps already tagged tokens.
    #[must_use]
    pub const fn from_tokens(tokens: Vec<TaggedToken>) -> Self {
        Self { tokens }
    }

    /// First token whose text equals `word`, case-insensitive.
    #[must_use]
    pub fn find(&self, word: &str) -> Option<TokenAnnotation> {
        let word = word.to_lowercase();
        self.tokens
            .iter()
            .position(|token| token.text.to_lowercase() == word)
            .map(|index| TokenAnnotation::from_token(index, &self.tokens[index]))
    }

    /// Tokens whose head is `index`.
    pub fn children(&self, index: usize) -> impl Iterator<Item = &TaggedToken> + '_ {
        self.tokens
            .iter()
            .enumerate()
            .filter(move |(i, token)| *i != index && token.head == Some(index))
            .map(|(_, token)| token)
    }

    /// Syntactic head of `index`, `None` for the root.
    #[must_use]
    pub fn head(&self, index: usize) -> Option<&TaggedToken> {
        let head = self.tokens.get(index)?.head?;
        if head == index {
            None
        } else {
            self.tokens.get(head)
        }
    }

    /// Surfaces that must stay unchanged: proper nouns, protected entities,
    /// and common nouns.
    #[must_use]
    pub fn preserved_surfaces(&self) -> HashSet<String> {
        self.tokens
            .iter()
            .filter(|token| {
                matches!(token.pos, PartOfSpeech::Propn | PartOfSpeech::Noun)
                    || token.entity.as_ref().is_some_and(EntityType::is_protected)
            })
            .map(|token| token.text.clone())
            .collect()
    }

    /// Tagged tokens.
    #[must_use]
    pub fn tokens(&self) -> &[TaggedToken] {
        &self.tokens
    }
}

/// Why a target or candidate was refused.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GuardRejection {
    /// Target missing from the tagger output.
    #[error("`{0}` not found in tagged sentence")]
    NotTagged(String),
    /// Target is a proper noun.
    #[error("proper noun")]
    ProperNoun,
    /// Target is a protected named entity.
    #[error("named entity {0:?}")]
    NamedEntity(EntityType),
    /// Target is semantically protected.
    #[error("semantically protected")]
    SemanticKeyword,
    /// Adjective attached to a protected noun.
    #[error("modifies protected noun `{0}`")]
    ModifiesProtectedNoun(String),
    /// An antonym of the target or candidate is already in the sentence.
    #[error("antonym `{0}` present in sentence")]
    AntonymInSentence(String),
    /// Candidate tagged with an incompatible part of speech.
    #[error("part of speech {found:?} does not match {expected:?}")]
    PartOfSpeechMismatch {
        /// Target POS.
        expected: PartOfSpeech,
        /// Candidate POS.
        found: PartOfSpeech,
    },
    /// Re-tagging with the candidate failed.
    #[error("tagger failed: {0}")]
    Tagger(ServiceError),
}

/// Target that passed the per-token checks.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetContext {
    /// Surface text.
    pub word: String,
    /// Tagger annotation.
    pub annotation: TokenAnnotation,
    /// Antonym of the target's lemma, if one is known.
    pub lemma_antonym: Option<String>,
}

/// Ordered predicate chain deciding whether a token may be replaced and
/// whether a candidate fits its sentence.
#[derive(Clone, Copy)]
pub struct LinguisticGuard<'a> {
    lexical: &'a LexicalResources,
    tagger: &'a dyn SyntaxTagger,
}

impl<'a> LinguisticGuard<'a> {
    /// Creates a guard.
    #[must_use]
    pub const fn new(lexical: &'a LexicalResources, tagger: &'a dyn SyntaxTagger) -> Self {
        Self { lexical, tagger }
    }

    /// Annotation lookup, proper-noun/entity check, and semantic protection.
    /// This relaxed chain is what the quota pass applies.
    pub fn inspect_protection(
        &self,
        context: &SentenceContext,
        word: &str,
    ) -> Result<TokenAnnotation, GuardRejection> {
        let annotation = context
            .find(word)
            .ok_or_else(|| GuardRejection::NotTagged(word.to_string()))?;
        if annotation.is_proper {
            return Err(GuardRejection::ProperNoun);
        }
        if let Some(entity) = annotation.entity.as_ref().filter(|e| e.is_protected()) {
            return Err(GuardRejection::NamedEntity(entity.clone()));
        }
        if self.lexical.is_semantically_protected(word) {
            return Err(GuardRejection::SemanticKeyword);
        }
        Ok(annotation)
    }

    /// Full per-token chain: protection checks plus the adjective attachment
    /// check.
    pub fn inspect_target(
        &self,
        context: &SentenceContext,
        word: &str,
    ) -> Result<TargetContext, GuardRejection> {
        let annotation = self.inspect_protection(context, word)?;
        if annotation.pos == PartOfSpeech::Adj {
            let index = annotation.index;
            let attached = context
                .children(index)
                .chain(context.head(index))
                .find(|token| {
                    token.pos == PartOfSpeech::Noun
                        && self.lexical.is_semantically_protected(&token.text)
                });
            if let Some(noun) = attached {
                return Err(GuardRejection::ModifiesProtectedNoun(noun.text.clone()));
            }
        }
        let lemma_antonym = self.lexical.find_antonym(&annotation.lemma);
        Ok(TargetContext {
            word: word.to_string(),
            annotation,
            lemma_antonym,
        })
    }

    /// Per-candidate checks: no antonym of the target lemma or of the
    /// candidate in `sentence`, and a compatible part of speech once
    /// `substituted` (the sentence with the candidate in place) is re-tagged.
    pub fn admit_candidate(
        &self,
        target: &TargetContext,
        sentence: &str,
        substituted: &str,
        candidate: &str,
    ) -> Result<(), GuardRejection> {
        let words: HashSet<String> = word_tokens(sentence)
            .into_iter()
            .map(|word| word.to_lowercase())
            .collect();
        let candidate_antonym = self.lexical.find_antonym(candidate);
        for antonym in [target.lemma_antonym.as_ref(), candidate_antonym.as_ref()]
            .into_iter()
            .flatten()
        {
            if words.contains(antonym) {
                return Err(GuardRejection::AntonymInSentence(antonym.clone()));
            }
        }
        let retagged =
            SentenceContext::annotate(self.tagger, substituted).map_err(GuardRejection::Tagger)?;
        let found = retagged
            .find(candidate)
            .ok_or_else(|| GuardRejection::NotTagged(candidate.to_string()))?
            .pos;
        let expected = target.annotation.pos;
        let compatible = found == expected || (expected.is_modifier() && found.is_modifier());
        if compatible {
            Ok(())
        } else {
            Err(GuardRejection::PartOfSpeechMismatch { expected, found })
        }
    }
}
