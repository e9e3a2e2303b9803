use std::{fs, path::Path};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::json;
use shared_logging::LogLevel;

use crate::{
    lexicon::{words::is_alphabetic, LexicalResources},
    simplification::AcceptanceHeuristic,
    telemetry::SimplifierTelemetry,
    text::word_tokens,
};

/// Marker line separating sentence pairs in a tier corpus.
pub const PAIR_DELIMITER: &str = "*******";

/// Complex word to preferred simple word for one tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WordMap {
    entries: IndexMap<String, String>,
}

impl WordMap {
    /// Adds a mapping. Identity mappings are ignored.
    pub fn insert(&mut self, complex: &str, simple: &str) {
        let (complex, simple) = (complex.to_lowercase(), simple.to_lowercase());
        if complex != simple {
            self.entries.insert(complex, simple);
        }
    }

    /// Preferred replacement for `word` (lowercase key).
    #[must_use]
    pub fn get(&self, word: &str) -> Option<&str> {
        self.entries.get(word).map(String::as_str)
    }

    /// Entries in mining order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.entries
            .iter()
            .map(|(complex, simple)| (complex.as_str(), simple.as_str()))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Writes the map as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(self)?;
        fs::write(path, raw).with_context(|| format!("writing word map {}", path.display()))
    }
}

/// Mines complex to simple substitutions from a parallel corpus.
#[derive(Debug, Clone, Copy)]
pub struct CorpusAlignmentMiner<'a> {
    lexical: &'a LexicalResources,
}

impl<'a> CorpusAlignmentMiner<'a> {
    /// Creates a miner.
    #[must_use]
    pub const fn new(lexical: &'a LexicalResources) -> Self {
        Self { lexical }
    }

    /// Aligns every two-line pair, tallies single-token substitutions, and
    /// keeps for each complex word the most frequent strictly simpler
    /// replacement. Ties keep the first one seen.
    #[must_use]
    pub fn mine(&self, corpus: &str) -> WordMap {
        let mut tallies: IndexMap<(String, String), usize> = IndexMap::new();
        for block in corpus.split(PAIR_DELIMITER) {
            let lines: Vec<&str> = block.trim().lines().collect();
            let [complex, simple] = lines.as_slice() else {
                continue;
            };
            let complex = lowercase_tokens(complex);
            let simple = lowercase_tokens(simple);
            for (from, to) in substitutions(&complex, &simple) {
                if self.admissible(from, to) {
                    *tallies.entry((from.clone(), to.clone())).or_insert(0) += 1;
                }
            }
        }

        let heuristic = AcceptanceHeuristic::new(self.lexical);
        let mut best: IndexMap<&str, (&str, usize)> = IndexMap::new();
        for ((from, to), count) in &tallies {
            let improves = best
                .get(from.as_str())
                .is_none_or(|(_, current)| count > current);
            if improves && heuristic.is_simpler(to, from) {
                best.insert(from, (to, *count));
            }
        }
        let mut map = WordMap::default();
        for (from, (to, _)) in best {
            map.insert(from, to);
        }
        map
    }

    /// Reads and mines a corpus file.
    pub fn try_mine_file(&self, path: impl AsRef<Path>) -> Result<WordMap> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading tier corpus {}", path.display()))?;
        Ok(self.mine(&raw))
    }

    /// Like [`Self::try_mine_file`], but a failure is logged and yields an
    /// empty map.
    pub fn mine_file(
        &self,
        path: impl AsRef<Path>,
        telemetry: Option<&SimplifierTelemetry>,
    ) -> WordMap {
        let path = path.as_ref();
        self.try_mine_file(path).unwrap_or_else(|err| {
            if let Some(tel) = telemetry {
                let _ = tel.log(
                    LogLevel::Warn,
                    "simplifier.corpus.load_failed",
                    json!({ "path": path.display().to_string(), "error": format!("{err:#}") }),
                );
            }
            WordMap::default()
        })
    }

    fn admissible(&self, from: &str, to: &str) -> bool {
        from != to
            && is_alphabetic(from)
            && is_alphabetic(to)
            && !self.lexical.is_function_word(from)
            && !self.lexical.is_function_word(to)
            && !self.lexical.is_semantically_protected(from)
            && !self.lexical.is_semantically_protected(to)
            && self.lexical.find_antonym(from).as_deref() != Some(to)
    }
}

fn lowercase_tokens(line: &str) -> Vec<String> {
    word_tokens(&line.to_lowercase())
}

/// Pairs from change runs holding exactly one removed and one added token.
fn substitutions<'t>(complex: &'t [String], simple: &'t [String]) -> Vec<(&'t String, &'t String)> {
    let mut pairs = Vec::new();
    let mut removed = Vec::new();
    let mut added = Vec::new();
    let mut flush = |removed: &mut Vec<&'t String>, added: &mut Vec<&'t String>| {
        if let ([from], [to]) = (removed.as_slice(), added.as_slice()) {
            pairs.push((*from, *to));
        }
        removed.clear();
        added.clear();
    };
    for result in diff::slice(complex, simple) {
        match result {
            diff::Result::Left(token) => removed.push(token),
            diff::Result::Right(token) => added.push(token),
            diff::Result::Both(_, _) => flush(&mut removed, &mut added),
        }
    }
    flush(&mut removed, &mut added);
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_resources;
    use tempfile::tempdir;

    const CORPUS: &str = "\
The enormous dog barked.
The big dog barked.
*******
An enormous house stood there.
A huge house stood there.
*******
The enormous tree fell.
The big tree fell.
*******
She felt good about it.
She felt bad about it.
*******
only one line here
*******
The city changed quickly.
The city changed fast.
";

    #[test]
    fn keeps_most_frequent_simpler_substitution() {
        let lexical = sample_resources();
        let map = CorpusAlignmentMiner::new(&lexical).mine(CORPUS);
        assert_eq!(map.get("enormous"), Some("big"));
        // antonyms are never mined
        assert_eq!(map.get("good"), None);
        assert_eq!(map.get("quickly"), Some("fast"));
        assert!(map.iter().all(|(complex, simple)| complex != simple));
    }

    #[test]
    fn multi_token_changes_are_not_substitutions() {
        let complex = lowercase_tokens("he departed from the station");
        let simple = lowercase_tokens("he went away from the station");
        assert!(substitutions(&complex, &simple).is_empty());
    }

    #[test]
    fn unreadable_corpus_yields_empty_map() {
        let lexical = sample_resources();
        let miner = CorpusAlignmentMiner::new(&lexical);
        assert!(miner.try_mine_file("/nonexistent/ADV-ELE.txt").is_err());
        assert!(miner.mine_file("/nonexistent/ADV-ELE.txt", None).is_empty());
    }

    #[test]
    fn word_map_round_trips_through_json_file() {
        let dir = tempdir().unwrap();
        let mut map = WordMap::default();
        map.insert("Enormous", "big");
        map.insert("same", "same");
        let path = dir.path().join("maps/beginner.json");
        map.save(&path).unwrap();
        let loaded: WordMap =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded, map);
        assert_eq!(loaded.len(), 1);
    }
}
