#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rust_2018_idioms,
    missing_docs
)]

//! Lexical simplification engine for readers with dyslexia: guarded word
//! substitution, a replacement quota, and readability evaluation.

/// TOML configuration.
#[path = "../config.rs"]
pub mod config;

/// Telemetry builder/hook for simplifier components.
#[path = "../telemetry.rs"]
pub mod telemetry;

/// Simplification tiers.
#[path = "../tier.rs"]
pub mod tier;

/// Sentence and word segmentation.
#[path = "../text.rs"]
pub mod text;

/// Shared lexical resources.
#[path = "../lexicon/main.rs"]
pub mod lexicon;

/// Collaborator traits and implementations.
#[path = "../services/main.rs"]
pub mod services;

/// Two-pass decision pipeline.
#[path = "../simplification/main.rs"]
pub mod simplification;

/// Parallel-corpus Word Map mining.
#[path = "../miner.rs"]
pub mod miner;

/// Readability metrics and reports.
#[path = "../readability/main.rs"]
pub mod readability;

/// Engine entry point.
#[path = "../main.rs"]
pub mod runtime;

#[cfg(test)]
#[path = "../fixtures.rs"]
mod fixtures;

pub use config::SimplifierConfig;
pub use miner::{CorpusAlignmentMiner, WordMap};
pub use readability::{DifficultyProfile, EvaluationReport, FleschReadingEase, ReadingEaseFormula};
pub use runtime::{
    EngineStatus, SimplificationOutcome, SimplifierEngine, SimplifierEngineBuilder,
    SimplifierError,
};
pub use services::{
    LexicalKnowledgeBase, MaskedLanguageModel, ServiceError, StaticLexicon, SyntaxTagger,
};
pub use simplification::SessionSummary;
pub use telemetry::{SimplifierTelemetry, SimplifierTelemetryBuilder};
pub use tier::{Tier, UnknownTier};
