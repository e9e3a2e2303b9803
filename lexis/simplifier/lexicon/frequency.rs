use std::{collections::HashMap, fs, path::Path};

use anyhow::{bail, Context, Result};

/// Word to log-scale corpus frequency, loaded once per engine.
#[derive(Debug, Clone, Default)]
pub struct FrequencyDictionary {
    entries: HashMap<String, f64>,
    ranked: Vec<(String, f64)>,
}

impl FrequencyDictionary {
    /// Creates an empty dictionary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a dictionary from explicit pairs. Words are lowercased.
    #[must_use]
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let entries = pairs
            .into_iter()
            .map(|(word, freq)| (word.as_ref().to_lowercase(), freq))
            .collect();
        Self::from_entries(entries)
    }

    fn from_entries(entries: HashMap<String, f64>) -> Self {
        let mut ranked: Vec<(String, f64)> = entries
            .iter()
            .map(|(word, freq)| (word.clone(), *freq))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Self { entries, ranked }
    }

    /// Loads a delimited table (comma, tab, or semicolon). The word column is
    /// the last header containing `word`; the frequency column is the last
    /// other header containing `freq`, `count`, or `lg10`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let is_spreadsheet = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx"));
        if is_spreadsheet {
            bail!(
                "spreadsheet frequency tables are not supported, export {} as CSV",
                path.display()
            );
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading frequency table {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("parsing frequency table {}", path.display()))
    }

    /// Parses table text with a header row.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut lines = raw.lines().filter(|line| !line.trim().is_empty());
        let Some(header) = lines.next() else {
            bail!("frequency table is empty");
        };
        let delimiter = detect_delimiter(header);
        let mut word_col = None;
        let mut freq_col = None;
        for (index, column) in split_row(header, delimiter).enumerate() {
            let column = column.to_lowercase();
            if column.contains("word") {
                word_col = Some(index);
            } else if ["freq", "count", "lg10"]
                .iter()
                .any(|needle| column.contains(needle))
            {
                freq_col = Some(index);
            }
        }
        let (Some(word_col), Some(freq_col)) = (word_col, freq_col) else {
            bail!("could not identify word and frequency columns in header `{header}`");
        };
        let mut entries = HashMap::new();
        for line in lines {
            let fields: Vec<&str> = split_row(line, delimiter).collect();
            let (Some(word), Some(freq)) = (fields.get(word_col), fields.get(freq_col)) else {
                continue;
            };
            if word.is_empty() {
                continue;
            }
            if let Ok(freq) = freq.parse::<f64>() {
                entries.insert(word.to_lowercase(), freq);
            }
        }
        Ok(Self::from_entries(entries))
    }

    /// Frequency of `word`, case-insensitive.
    #[must_use]
    pub fn get(&self, word: &str) -> Option<f64> {
        self.entries.get(&word.to_lowercase()).copied()
    }

    /// Entries ordered by descending frequency, ties by word.
    pub fn ranked(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.ranked.iter().map(|(word, freq)| (word.as_str(), *freq))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the dictionary is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn detect_delimiter(header: &str) -> char {
    ['\t', ',', ';']
        .into_iter()
        .find(|delimiter| header.contains(*delimiter))
        .unwrap_or(',')
}

fn split_row(line: &str, delimiter: char) -> impl Iterator<Item = &str> {
    line.split(delimiter)
        .map(|field| field.trim().trim_matches('"').trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn detects_columns_by_header_substring() {
        let dict = FrequencyDictionary::parse(
            "Word,FREQcount,Lg10WF\nThe,1501908,6.1765\npretty,10101,4.0043\nbeautiful,5000,3.6990\n",
        )
        .unwrap();
        // last matching frequency column wins
        assert_eq!(dict.get("the"), Some(6.1765));
        assert_eq!(dict.get("Pretty"), Some(4.0043));
        assert_eq!(dict.len(), 3);
        let ranked: Vec<&str> = dict.ranked().map(|(word, _)| word).collect();
        assert_eq!(ranked, vec!["the", "pretty", "beautiful"]);
    }

    #[test]
    fn reads_tab_separated_files_and_skips_bad_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("subtlex.tsv");
        fs::write(&path, "word\tlg10\nbig\t4.5\nhuge\tn/a\n\t3.0\n").unwrap();
        let dict = FrequencyDictionary::load(&path).unwrap();
        assert_eq!(dict.get("big"), Some(4.5));
        assert_eq!(dict.get("huge"), None);
        assert_eq!(dict.len(), 1);
    }

    #[test]
    fn rejects_tables_without_recognisable_columns() {
        assert!(FrequencyDictionary::parse("term,score\nbig,4.5\n").is_err());
        assert!(FrequencyDictionary::parse("").is_err());
        assert!(FrequencyDictionary::load("/nonexistent/table.xlsx").is_err());
    }
}
