//! Before/after readability measurement of a simplification.

/// Reading-ease formulas.
pub mod ease;
/// Difficulty metrics and comparison reports.
pub mod evaluator;
/// Text rendering of reports.
pub mod report;

pub use ease::{FleschReadingEase, ReadingEaseFormula};
pub use evaluator::{
    DiffOp, DifficultyMetrics, DifficultyProfile, EvaluationReport, GradeBand, Improvement,
    ReadabilityEvaluator, WordDiff, LOW_FREQUENCY,
};
