//! Closed-class vocabulary and orthographic measures.

use std::collections::HashSet;

/// Orthographic substrings that slow dyslexic readers down: digraphs,
/// silent-letter clusters, suffix blends, and doubled letters.
pub const DYSLEXIA_PATTERNS: [&str; 29] = [
    "tion", "sion", "cial", "tial", "cian", "igh", "ough", "augh", "ph", "gh", "rh", "wh", "sch",
    "tch", "qu", "thr", "wr", "kn", "dge", "ck", "rr", "ll", "mm", "nn", "tt", "pp", "cc", "ee",
    "oo",
];

/// Returns the closed-class words that are never replaced.
#[must_use]
pub fn function_words() -> HashSet<String> {
    [
        // articles, determiners, quantifiers
        "a", "an", "the", "this", "that", "these", "those", "each", "every", "either", "neither",
        "both", "all", "any", "some", "such", "another", "other", "others", "enough", "few",
        "many", "much", "more", "most", "less", "least", "lot", "lots", "several", "same",
        // pronouns
        "i", "me", "my", "mine", "myself", "you", "your", "yours", "yourself", "yourselves",
        "he", "him", "his", "himself", "she", "her", "hers", "herself", "it", "its", "itself",
        "we", "us", "our", "ours", "ourselves", "they", "them", "their", "theirs", "themselves",
        "who", "whom", "whose", "which", "what", "whatever", "whoever", "someone", "something",
        "anyone", "anything", "anyhow", "anyway", "anywhere", "everyone", "everything",
        "everywhere", "nobody", "none", "nothing", "nowhere",
        // prepositions
        "about", "above", "across", "after", "against", "along", "among", "around", "at",
        "before", "behind", "below", "beneath", "beside", "besides", "between", "beyond", "by",
        "despite", "down", "during", "except", "for", "from", "in", "inside", "into", "near",
        "of", "off", "on", "onto", "out", "outside", "over", "per", "since", "through",
        "throughout", "thru", "to", "toward", "towards", "under", "until", "up", "upon", "via",
        "with", "within", "without",
        // conjunctions
        "and", "but", "or", "nor", "so", "yet", "if", "then", "than", "because", "although",
        "though", "while", "whereas", "whether", "unless", "once", "as",
        // auxiliaries and modals
        "am", "is", "are", "was", "were", "be", "been", "being", "became", "do", "does", "did",
        "done", "have", "has", "had", "can", "cannot", "could", "may", "might", "must", "shall",
        "should", "will", "would", "ought", "need", "dare", "used",
        // adverbs and discourse markers
        "afterwards", "again", "almost", "alone", "already", "also", "always", "else",
        "elsewhere", "even", "ever", "here", "hereby", "there", "how", "however", "indeed",
        "instead", "never", "not", "no", "yes", "now", "often", "oftentimes", "only", "perhaps",
        "rather", "still", "thus", "hence", "therefore", "too", "very", "well", "when",
        "whenever", "where", "wherever", "why", "somehow", "sometime", "sometimes", "somewhere",
        "otherwise", "moreover", "nevertheless", "meanwhile", "namely", "mostly", "further",
        "former", "formerly", "next", "first", "second", "third", "last", "one", "top", "eg",
        "ie", "etc", "re",
    ]
    .iter()
    .map(|word| (*word).to_string())
    .collect()
}

/// The dyslexia-difficult pattern list with presence counting.
#[derive(Debug, Clone)]
pub struct DyslexiaPatterns {
    patterns: Vec<String>,
}

impl Default for DyslexiaPatterns {
    fn default() -> Self {
        Self::new(DYSLEXIA_PATTERNS)
    }
}

impl DyslexiaPatterns {
    /// Creates a pattern list; patterns are matched case-insensitively.
    #[must_use]
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(|pattern| pattern.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Number of distinct patterns present in `word`.
    #[must_use]
    pub fn count(&self, word: &str) -> usize {
        let word = word.to_lowercase();
        self.patterns
            .iter()
            .filter(|pattern| word.contains(pattern.as_str()))
            .count()
    }

    /// Whether any pattern is present in `word`.
    #[must_use]
    pub fn any(&self, word: &str) -> bool {
        let word = word.to_lowercase();
        self.patterns
            .iter()
            .any(|pattern| word.contains(pattern.as_str()))
    }

    /// Number of patterns in the list.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Approximate syllable count: words of three letters or fewer are one
/// syllable, a trailing silent `e` is dropped, then vowel runs are counted.
#[must_use]
pub fn count_syllables(word: &str) -> usize {
    let word = word.to_lowercase();
    if char_len(&word) <= 3 {
        return 1;
    }
    let stem = word.strip_suffix('e').unwrap_or(&word);
    let mut count = 0;
    let mut previous_vowel = false;
    for ch in stem.chars() {
        let vowel = matches!(ch, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
        if vowel && !previous_vowel {
            count += 1;
        }
        previous_vowel = vowel;
    }
    count.max(1)
}

/// Length in characters.
#[must_use]
pub fn char_len(word: &str) -> usize {
    word.chars().count()
}

/// Non-empty and made only of alphabetic characters.
#[must_use]
pub fn is_alphabetic(word: &str) -> bool {
    !word.is_empty() && word.chars().all(char::is_alphabetic)
}

/// Has at least one cased character and no lowercase ones (`NASA`, `I`).
#[must_use]
pub fn is_fully_uppercase(word: &str) -> bool {
    word.chars().any(char::is_uppercase) && !word.chars().any(char::is_lowercase)
}

/// Starts with an uppercase letter.
#[must_use]
pub fn starts_uppercase(word: &str) -> bool {
    word.chars().next().is_some_and(char::is_uppercase)
}

/// Copies the original's leading capital onto the replacement.
#[must_use]
pub fn match_capitalization(original: &str, replacement: &str) -> String {
    if !starts_uppercase(original) {
        return replacement.to_string();
    }
    let mut chars = replacement.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syllables_follow_vowel_runs() {
        assert_eq!(count_syllables("cat"), 1);
        assert_eq!(count_syllables("make"), 1);
        assert_eq!(count_syllables("pretty"), 2);
        assert_eq!(count_syllables("beautiful"), 3);
        assert_eq!(count_syllables("rhythm"), 1);
        assert_eq!(count_syllables("Tsktsk"), 1);
    }

    #[test]
    fn patterns_count_presence_not_occurrences() {
        let patterns = DyslexiaPatterns::default();
        assert_eq!(patterns.count("station"), 1);
        assert_eq!(patterns.count("thoughtful"), 2);
        assert_eq!(patterns.count("beautiful"), 0);
        assert_eq!(patterns.count("PRETTY"), 1);
        assert!(!patterns.any("cat"));
    }

    #[test]
    fn capitalization_is_copied_from_original() {
        assert_eq!(match_capitalization("Enormous", "big"), "Big");
        assert_eq!(match_capitalization("enormous", "big"), "big");
        assert_eq!(match_capitalization("Enormous", ""), "");
    }

    #[test]
    fn uppercase_detection_matches_acronyms() {
        assert!(is_fully_uppercase("NASA"));
        assert!(is_fully_uppercase("I"));
        assert!(!is_fully_uppercase("Nasa"));
        assert!(!is_fully_uppercase("42"));
    }

    #[test]
    fn function_words_cover_closed_classes() {
        let words = function_words();
        for word in ["the", "of", "because", "would", "themselves"] {
            assert!(words.contains(word), "{word}");
        }
        assert!(!words.contains("enormous"));
    }
}
