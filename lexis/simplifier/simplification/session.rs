use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::QuotaSettings;

/// Per-request replacement counters. Created by `simplify` and never shared.
#[derive(Debug, Clone)]
pub struct ReplacementSession {
    id: Uuid,
    checked: usize,
    replaced: usize,
    best_effort_replaced: usize,
    min_ratio: f64,
    min_checked: usize,
}

impl ReplacementSession {
    /// Starts a session with the given quota.
    #[must_use]
    pub fn new(quota: QuotaSettings) -> Self {
        Self {
            id: Uuid::new_v4(),
            checked: 0,
            replaced: 0,
            best_effort_replaced: 0,
            min_ratio: quota.min_ratio,
            min_checked: quota.min_checked,
        }
    }

    /// Session identifier used in logs.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Counts one alphabetic word.
    pub const fn record_checked(&mut self) {
        self.checked += 1;
    }

    /// Counts one best-effort replacement.
    pub const fn record_replacement(&mut self) {
        self.replaced += 1;
        self.best_effort_replaced += 1;
    }

    /// Counts one quota-pass replacement.
    pub const fn record_enforced(&mut self) {
        self.replaced += 1;
    }

    /// Alphabetic words seen.
    #[must_use]
    pub const fn checked(&self) -> usize {
        self.checked
    }

    /// Words replaced so far.
    #[must_use]
    pub const fn replaced(&self) -> usize {
        self.replaced
    }

    /// `replaced / checked`, zero when nothing was checked.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn ratio(&self) -> f64 {
        if self.checked == 0 {
            0.0
        } else {
            self.replaced as f64 / self.checked as f64
        }
    }

    /// Enough words were checked and the ratio is under the quota.
    #[must_use]
    pub fn needs_enforcement(&self) -> bool {
        self.checked >= self.min_checked && self.ratio() < self.min_ratio
    }

    /// `max(floor(checked * min_ratio), replaced + 1)`.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn quota_target(&self) -> usize {
        let floor = (self.checked as f64 * self.min_ratio).floor() as usize;
        floor.max(self.replaced + 1)
    }

    /// Replacements still missing to reach [`Self::quota_target`].
    #[must_use]
    pub fn additional_needed(&self) -> usize {
        self.quota_target().saturating_sub(self.replaced)
    }

    /// Snapshot returned to the caller.
    #[must_use]
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            session_id: self.id,
            checked: self.checked,
            replaced: self.replaced,
            best_effort_replaced: self.best_effort_replaced,
            enforced: self.replaced - self.best_effort_replaced,
            ratio: self.ratio(),
        }
    }
}

/// Final counters of one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Session identifier.
    pub session_id: Uuid,
    /// Alphabetic words checked.
    pub checked: usize,
    /// Total replacements.
    pub replaced: usize,
    /// Replacements from the best-effort pass.
    pub best_effort_replaced: usize,
    /// Replacements from the quota pass.
    pub enforced: usize,
    /// Final `replaced / checked`.
    pub ratio: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(checked: usize, replaced: usize) -> ReplacementSession {
        let mut session = ReplacementSession::new(QuotaSettings::default());
        (0..checked).for_each(|_| session.record_checked());
        (0..replaced).for_each(|_| session.record_replacement());
        session
    }

    #[test]
    fn small_samples_are_never_enforced() {
        assert!(!session(9, 0).needs_enforcement());
        assert!(session(10, 0).needs_enforcement());
        assert!(!session(10, 1).needs_enforcement());
        assert!((session(0, 0).ratio()).abs() < f64::EPSILON);
    }

    #[test]
    fn target_asks_for_at_least_one_more() {
        let s = session(25, 0);
        assert_eq!(s.quota_target(), 2);
        assert_eq!(s.additional_needed(), 2);
        let s = session(12, 1);
        // floor(1.2) = 1, so one more than already replaced
        assert_eq!(s.quota_target(), 2);
        assert_eq!(s.additional_needed(), 1);
    }

    #[test]
    fn summary_splits_passes() {
        let mut s = session(20, 1);
        s.record_enforced();
        let summary = s.summary();
        assert_eq!(summary.replaced, 2);
        assert_eq!(summary.best_effort_replaced, 1);
        assert_eq!(summary.enforced, 1);
        assert!((summary.ratio - 0.1).abs() < 1e-9);
    }
}
