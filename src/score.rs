//! Per-candidate score aggregation.
//!
//! Reduces the pairings between the query and one candidate into a single
//! similarity score: the mean pairing distance (lower = more similar). A
//! candidate with zero pairings is reported as [`ScoreOutcome::Unscorable`]
//! instead of risking an undefined division; it is excluded from ranking
//! but never dropped silently.

use serde::{Deserialize, Serialize};

use crate::matcher::MatchPair;

/// Similarity score for one candidate. Only exists for candidates with at
/// least one accepted pairing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    /// Caller-supplied candidate identifier (typically a file path).
    pub id: String,
    /// Index of the candidate in the caller-supplied enumeration order.
    /// Breaks ranking ties reproducibly, independent of completion order.
    pub position: usize,
    /// Mean Hamming distance over all accepted pairings.
    pub mean_distance: f64,
    /// Number of accepted pairings.
    pub pair_count: usize,
}

/// Result of aggregating one candidate's pairings.
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreOutcome {
    Scored(CandidateScore),
    /// Zero mutual-nearest-neighbor pairings against the query.
    Unscorable,
}

/// Aggregate `pairs` into a [`CandidateScore`], or [`ScoreOutcome::Unscorable`]
/// when there are none.
pub fn score_candidate(id: &str, position: usize, pairs: &[MatchPair]) -> ScoreOutcome {
    if pairs.is_empty() {
        return ScoreOutcome::Unscorable;
    }
    let total: u64 = pairs.iter().map(|p| u64::from(p.distance)).sum();
    ScoreOutcome::Scored(CandidateScore {
        id: id.to_string(),
        position,
        mean_distance: total as f64 / pairs.len() as f64,
        pair_count: pairs.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(distance: u32) -> MatchPair {
        MatchPair {
            query_idx: 0,
            candidate_idx: 0,
            distance,
        }
    }

    #[test]
    fn zero_pairs_is_unscorable() {
        assert_eq!(score_candidate("a.png", 0, &[]), ScoreOutcome::Unscorable);
    }

    #[test]
    fn mean_over_known_distances() {
        let pairs = [pair(10), pair(20), pair(60)];
        match score_candidate("b.png", 3, &pairs) {
            ScoreOutcome::Scored(score) => {
                assert_eq!(score.id, "b.png");
                assert_eq!(score.position, 3);
                assert_eq!(score.pair_count, 3);
                assert_eq!(score.mean_distance, 30.0);
            }
            ScoreOutcome::Unscorable => panic!("three pairs must be scorable"),
        }
    }

    #[test]
    fn single_zero_distance_pair_scores_zero() {
        match score_candidate("c.png", 1, &[pair(0)]) {
            ScoreOutcome::Scored(score) => {
                assert_eq!(score.mean_distance, 0.0);
                assert_eq!(score.pair_count, 1);
            }
            ScoreOutcome::Unscorable => panic!("one pair must be scorable"),
        }
    }
}
