//! Descriptor-set comparison with a mutual-nearest-neighbor constraint.
//!
//! For every query descriptor the matcher finds its nearest candidate
//! descriptor by Hamming distance, and independently the reverse; a pairing
//! is emitted only when the two relations agree (cross-check). This caps
//! pairings at `min(|query|, |candidate|)` and guarantees each descriptor
//! participates in at most one pairing, eliminating one-to-many ambiguity.
//!
//! Nearest-neighbor ties resolve to the lowest index on both sides, so
//! matching is fully deterministic.

use serde::{Deserialize, Serialize};

use crate::descriptor::Descriptor;

/// One mutually-confirmed pairing between a query descriptor and a candidate
/// descriptor, with their Hamming distance. Indices refer to the respective
/// descriptor sets in extraction order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchPair {
    pub query_idx: usize,
    pub candidate_idx: usize,
    pub distance: u32,
}

/// Cross-checked brute-force matching between two descriptor sets.
///
/// Either side empty yields an empty result; that is an expected outcome the
/// caller must handle (see [`crate::score::ScoreOutcome::Unscorable`]), not
/// an error. Output is ordered by query index.
pub fn match_descriptors(query: &[Descriptor], candidate: &[Descriptor]) -> Vec<MatchPair> {
    if query.is_empty() || candidate.is_empty() {
        return Vec::new();
    }

    let forward: Vec<(usize, u32)> = query.iter().map(|d| nearest(d, candidate)).collect();
    let reverse: Vec<(usize, u32)> = candidate.iter().map(|d| nearest(d, query)).collect();

    forward
        .iter()
        .enumerate()
        .filter(|(query_idx, (candidate_idx, _))| reverse[*candidate_idx].0 == *query_idx)
        .map(|(query_idx, &(candidate_idx, distance))| MatchPair {
            query_idx,
            candidate_idx,
            distance,
        })
        .collect()
}

/// Index and distance of the nearest descriptor in `set`; the first minimum
/// wins, so ties go to the lowest index. `set` must be non-empty.
fn nearest(d: &Descriptor, set: &[Descriptor]) -> (usize, u32) {
    let mut best_idx = 0;
    let mut best_distance = u32::MAX;
    for (idx, other) in set.iter().enumerate() {
        let distance = d.hamming(other);
        if distance < best_distance {
            best_idx = idx;
            best_distance = distance;
        }
    }
    (best_idx, best_distance)
}
