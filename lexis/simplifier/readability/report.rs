use std::fmt;

use super::evaluator::{DiffOp, DifficultyMetrics, EvaluationReport};

fn write_metrics(f: &mut fmt::Formatter<'_>, title: &str, m: &DifficultyMetrics) -> fmt::Result {
    writeln!(f, "{title}:")?;
    writeln!(
        f,
        "  reading ease         {:>7.2}  ({})",
        m.reading_ease,
        m.grade.label()
    )?;
    writeln!(f, "  difficult words      {:>6.1}%", m.difficult_word_percent)?;
    writeln!(f, "  avg word length      {:>7.2}", m.avg_word_length)?;
    writeln!(f, "  avg sentence length  {:>7.2}", m.avg_sentence_length)
}

/// Plain-text summary. The alternate form (`{:#}`) appends the word diff.
impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_metrics(f, "Original", &self.original)?;
        write_metrics(f, "Simplified", &self.simplified)?;
        let delta = &self.improvement;
        writeln!(f, "Improvement:")?;
        writeln!(f, "  reading ease         {:>+7.2}", delta.reading_ease)?;
        writeln!(f, "  difficult words      {:>+6.1}%", delta.difficult_word_percent)?;
        writeln!(f, "  avg word length      {:>+7.2}", delta.avg_word_length)?;
        writeln!(f, "  avg sentence length  {:>+7.2}", delta.avg_sentence_length)?;
        write!(f, "  length reduction     {:>+6.1}%", delta.length_reduction_percent)?;
        if f.alternate() {
            writeln!(f)?;
            write!(f, "Changes:")?;
            for entry in &self.word_diff {
                match entry.op {
                    DiffOp::Equal => {}
                    DiffOp::Delete => write!(f, " -{}", entry.token)?,
                    DiffOp::Insert => write!(f, " +{}", entry.token)?,
                }
            }
        }
        Ok(())
    }
}
