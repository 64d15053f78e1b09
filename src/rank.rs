//! Deterministic ranking with cursor-based navigation.
//!
//! Scores are ordered ascending by mean pairing distance; ties break by the
//! candidate's position in the caller-supplied enumeration order, so the
//! ranking is reproducible across runs and across sequential/parallel
//! execution. The cursor models single-step browsing: it clamps at both ends
//! and never wraps.

use serde::{Deserialize, Serialize};

use crate::score::CandidateScore;

/// Ranked candidate scores plus a navigation cursor.
///
/// `cursor` is `None` only for an empty set, the explicit "nothing to
/// browse" state. For a non-empty set it always points at a valid entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankedResultSet {
    entries: Vec<CandidateScore>,
    cursor: Option<usize>,
}

impl RankedResultSet {
    /// Build a ranked set from unordered scores. The cursor starts on the
    /// best-ranked entry, or in the empty state.
    pub fn from_scores(mut scores: Vec<CandidateScore>) -> Self {
        scores.sort_by(|a, b| {
            a.mean_distance
                .total_cmp(&b.mean_distance)
                .then(a.position.cmp(&b.position))
        });
        let cursor = if scores.is_empty() { None } else { Some(0) };
        Self {
            entries: scores,
            cursor,
        }
    }

    /// Entry under the cursor; `None` for an empty set. No side effect.
    pub fn current(&self) -> Option<&CandidateScore> {
        self.cursor.and_then(|idx| self.entries.get(idx))
    }

    /// Advance the cursor one step, clamped at the last entry, and return
    /// the entry now under it. A no-op at the end (and on an empty set).
    pub fn next(&mut self) -> Option<&CandidateScore> {
        if let Some(idx) = self.cursor {
            if idx + 1 < self.entries.len() {
                self.cursor = Some(idx + 1);
            }
        }
        self.current()
    }

    /// Retreat the cursor one step, clamped at the first entry, and return
    /// the entry now under it. A no-op at the start (and on an empty set).
    pub fn previous(&mut self) -> Option<&CandidateScore> {
        if let Some(idx) = self.cursor {
            self.cursor = Some(idx.saturating_sub(1));
        }
        self.current()
    }

    /// Current cursor index, `None` for an empty set.
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in rank order, best first.
    pub fn entries(&self) -> &[CandidateScore] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CandidateScore> {
        self.entries.iter()
    }
}
