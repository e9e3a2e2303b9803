//! Lossless segmentation: text into sentences and gaps, sentences into word
//! and separator units. Concatenating the pieces always yields the input.

/// Kind of a sentence unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    /// Run of non-separator characters.
    Word,
    /// A single whitespace or punctuation character.
    Separator,
}

/// One unit of a sentence with its simplification state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextUnit {
    /// Current surface text.
    pub text: String,
    /// Word or separator.
    pub kind: UnitKind,
    /// Never to be replaced.
    pub preserved: bool,
    /// Already replaced in this request.
    pub replaced: bool,
}

impl TextUnit {
    fn new(text: String, kind: UnitKind) -> Self {
        Self {
            text,
            kind,
            preserved: false,
            replaced: false,
        }
    }

    /// Whether this is a word unit.
    #[must_use]
    pub fn is_word(&self) -> bool {
        self.kind == UnitKind::Word
    }

    /// Word unit made only of letters.
    #[must_use]
    pub fn is_alphabetic_word(&self) -> bool {
        self.is_word() && crate::lexicon::words::is_alphabetic(&self.text)
    }

    /// A word unit that is neither preserved nor already replaced.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.is_word() && !self.preserved && !self.replaced
    }
}

/// Whether `ch` separates words: whitespace, ASCII punctuation, or
/// typographic quotes and dashes.
#[must_use]
pub fn is_separator(ch: char) -> bool {
    ch.is_whitespace()
        || ch.is_ascii_punctuation()
        || matches!(
            ch,
            '\u{2018}' | '\u{2019}' | '\u{201C}' | '\u{201D}' | '\u{2013}' | '\u{2014}' | '\u{2026}'
        )
}

/// A sentence held as ordered units.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SentenceUnits {
    units: Vec<TextUnit>,
}

impl SentenceUnits {
    /// Splits a sentence: every separator character is its own unit, and
    /// maximal runs of other characters are word units.
    #[must_use]
    pub fn parse(sentence: &str) -> Self {
        let mut units = Vec::new();
        let mut word = String::new();
        for ch in sentence.chars() {
            if is_separator(ch) {
                if !word.is_empty() {
                    units.push(TextUnit::new(std::mem::take(&mut word), UnitKind::Word));
                }
                units.push(TextUnit::new(ch.to_string(), UnitKind::Separator));
            } else {
                word.push(ch);
            }
        }
        if !word.is_empty() {
            units.push(TextUnit::new(word, UnitKind::Word));
        }
        Self { units }
    }

    /// Reassembles the current text by plain concatenation.
    #[must_use]
    pub fn text(&self) -> String {
        self.units.iter().map(|unit| unit.text.as_str()).collect()
    }

    /// Current text with the unit at `index` swapped for `replacement`.
    #[must_use]
    pub fn text_with(&self, index: usize, replacement: &str) -> String {
        self.units
            .iter()
            .enumerate()
            .map(|(i, unit)| {
                if i == index {
                    replacement
                } else {
                    unit.text.as_str()
                }
            })
            .collect()
    }

    /// All units in order.
    #[must_use]
    pub fn units(&self) -> &[TextUnit] {
        &self.units
    }

    /// Mutable access to the units.
    pub fn units_mut(&mut self) -> &mut [TextUnit] {
        &mut self.units
    }
}

/// Piece of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// A sentence.
    Sentence(SentenceUnits),
    /// Whitespace between or around sentences.
    Gap(String),
}

/// A whole text as sentences and gaps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    segments: Vec<Segment>,
}

impl Document {
    /// Segments `text` into sentences and the whitespace around them.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let segments = split_sentences(text)
            .into_iter()
            .map(|span| match span {
                Span::Sentence(sentence) => Segment::Sentence(SentenceUnits::parse(sentence)),
                Span::Gap(gap) => Segment::Gap(gap.to_string()),
            })
            .collect();
        Self { segments }
    }

    /// Reassembles the current text.
    #[must_use]
    pub fn render(&self) -> String {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Sentence(sentence) => sentence.text(),
                Segment::Gap(gap) => gap.clone(),
            })
            .collect()
    }

    /// Sentences in order.
    pub fn sentences(&self) -> impl Iterator<Item = &SentenceUnits> + '_ {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Sentence(sentence) => Some(sentence),
            Segment::Gap(_) => None,
        })
    }

    /// Mutable sentences in order.
    pub fn sentences_mut(&mut self) -> impl Iterator<Item = &mut SentenceUnits> + '_ {
        self.segments.iter_mut().filter_map(|segment| match segment {
            Segment::Sentence(sentence) => Some(sentence),
            Segment::Gap(_) => None,
        })
    }

    /// Sentence at `index` among sentences only.
    pub fn sentence_mut(&mut self, index: usize) -> Option<&mut SentenceUnits> {
        self.sentences_mut().nth(index)
    }

    /// Number of sentences.
    #[must_use]
    pub fn sentence_count(&self) -> usize {
        self.sentences().count()
    }
}

/// Borrowed sentence or gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Span<'a> {
    /// Sentence text without surrounding whitespace.
    Sentence(&'a str),
    /// Whitespace.
    Gap(&'a str),
}

const CLOSERS: [char; 7] = ['"', '\'', ')', ']', '\u{2019}', '\u{201D}', '.'];

/// Splits after `.`, `!`, or `?` (plus trailing closers) when followed by
/// whitespace or the end of the text.
#[must_use]
pub fn split_sentences(text: &str) -> Vec<Span<'_>> {
    let mut spans = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((index, ch)) = chars.next() {
        if !matches!(ch, '.' | '!' | '?') {
            continue;
        }
        let mut end = index + ch.len_utf8();
        while let Some(&(next_index, next)) = chars.peek() {
            if matches!(next, '!' | '?') || CLOSERS.contains(&next) {
                end = next_index + next.len_utf8();
                chars.next();
            } else {
                break;
            }
        }
        let at_boundary = chars.peek().is_none_or(|&(_, next)| next.is_whitespace());
        if at_boundary {
            push_piece(&mut spans, &text[start..end]);
            start = end;
        }
    }
    push_piece(&mut spans, &text[start..]);
    spans
}

fn push_piece<'a>(spans: &mut Vec<Span<'a>>, piece: &'a str) {
    if piece.is_empty() {
        return;
    }
    let body = piece.trim();
    if body.is_empty() {
        spans.push(Span::Gap(piece));
        return;
    }
    let lead = piece.len() - piece.trim_start().len();
    let tail = lead + body.len();
    if lead > 0 {
        spans.push(Span::Gap(&piece[..lead]));
    }
    spans.push(Span::Sentence(body));
    if tail < piece.len() {
        spans.push(Span::Gap(&piece[tail..]));
    }
}

/// Word tokens of `text` in order, punctuation and whitespace removed.
#[must_use]
pub fn word_tokens(text: &str) -> Vec<String> {
    text.split(is_separator)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reassembly_is_exact() {
        let text = "  The cat sat.  Did it?\n\"Yes!\" it said...   \tDone";
        let document = Document::parse(text);
        assert_eq!(document.render(), text);
        assert_eq!(document.sentence_count(), 5);
    }

    #[test]
    fn splits_sentences_after_terminators_and_closers() {
        let spans = split_sentences("He said \"stop.\" Then 3.5 left!");
        assert_eq!(
            spans,
            vec![
                Span::Sentence("He said \"stop.\""),
                Span::Gap(" "),
                Span::Sentence("Then 3.5 left!"),
            ]
        );
    }

    #[test]
    fn units_separate_each_separator_character() {
        let sentence = SentenceUnits::parse("Well, don't  go—now.");
        let texts: Vec<&str> = sentence.units().iter().map(|u| u.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["Well", ",", " ", "don", "'", "t", " ", " ", "go", "—", "now", "."]
        );
        assert_eq!(sentence.units().iter().filter(|u| u.is_word()).count(), 5);
        assert_eq!(sentence.text_with(0, "So"), "So, don't  go—now.");
    }

    #[test]
    fn word_tokens_drop_separators() {
        assert_eq!(word_tokens("The cat, it runs."), vec!["The", "cat", "it", "runs"]);
        assert!(word_tokens(" ... ").is_empty());
    }
}
