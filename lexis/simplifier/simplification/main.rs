//! The two-pass decision pipeline: a best-effort pass per sentence, then a
//! quota pass over the whole document.

/// Masked-model candidate generation.
pub mod candidates;
/// Per-token and per-candidate linguistic checks.
pub mod guard;
/// "Is this simpler?" rules.
pub mod heuristic;
/// Quota top-up pass.
pub mod quota;
/// Best-effort sentence pass.
pub mod sentence;
/// Per-request counters.
pub mod session;

pub use candidates::{CandidateGenerator, Candidates, GenerationMode};
pub use guard::{GuardRejection, LinguisticGuard, SentenceContext, TargetContext, TokenAnnotation};
pub use heuristic::{AcceptanceHeuristic, HeuristicRule, Verdict};
pub use quota::QuotaEnforcer;
pub use sentence::SentenceSimplifier;
pub use session::{ReplacementSession, SessionSummary};
