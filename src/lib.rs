//! # lookalike
//!
//! Visual similarity search over local keypoint descriptors: given one query
//! image and an ordered collection of candidate images, find the candidates
//! most visually similar to the query and browse them in ranked order.
//!
//! ## Pipeline
//!
//! 1. **Extract**: the query image is decoded, reduced to its intensity
//!    channel, and turned into a set of 256-bit binary descriptors
//!    ([`FastBriefExtractor`], pluggable via [`FeatureExtractor`]).
//! 2. **Match**: each candidate's descriptor set is compared against the
//!    query's by Hamming distance under a mutual-nearest-neighbor
//!    constraint ([`match_descriptors`]), eliminating one-to-many pairings.
//! 3. **Score**: accepted pairings reduce to one mean distance per
//!    candidate ([`score_candidate`]); candidates with zero pairings are
//!    [`ScoreOutcome::Unscorable`], excluded from ranking but reported.
//! 4. **Rank**: scores order ascending by mean distance with ties broken by
//!    the caller-supplied enumeration order ([`RankedResultSet`]), and a
//!    clamped cursor supports sequential browsing.
//!
//! [`MatchSession`] orchestrates the whole pass and is the only type an
//! integration layer needs to talk to.
//!
//! ## Contract
//!
//! - The core is an in-process, synchronous library: no I/O beyond reading
//!   the images it is pointed at, no wire format, no persisted state.
//! - Candidate enumeration order is an explicit caller input; the core never
//!   lists directories or filters by file type.
//! - Per-candidate failures (undecodable file, no keypoints, no pairings)
//!   are absorbed into a diagnostics list and never abort a session.
//!
//! Invariant: for the same query image, the same candidate identifiers in
//! the same order, and the same [`SessionConfig`], two runs produce
//! bit-identical rankings, including across the sequential and parallel
//! execution paths.
//!
//! ## Example
//!
//! ```no_run
//! use lookalike::{MatchSession, SessionConfig, SessionState};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut session = MatchSession::new(SessionConfig::default())?;
//! let candidates = vec!["shots/a.png", "shots/b.png", "shots/c.png"];
//!
//! match session.begin("query.png", &candidates)? {
//!     SessionState::Ready => {
//!         let best = session.current().expect("non-empty ranking");
//!         println!("best match: {} (mean distance {:.1})", best.id, best.mean_distance);
//!         session.next(); // step to the runner-up
//!     }
//!     _ => println!("no candidate produced a usable score"),
//! }
//!
//! for skipped in session.diagnostics() {
//!     eprintln!("skipped {}: {}", skipped.id, skipped.kind);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod descriptor;
pub mod error;
pub mod extract;
pub mod matcher;
pub mod rank;
pub mod score;
pub mod session;

pub use crate::config::{ConfigError, ExtractorConfig, SessionConfig};
pub use crate::descriptor::{Descriptor, DescriptorSet, Keypoint, DESCRIPTOR_BYTES};
pub use crate::error::SessionError;
pub use crate::extract::{
    FastBriefExtractor, FeatureExtractor, EXTRACT_ALGORITHM, EXTRACT_VERSION,
};
pub use crate::matcher::{match_descriptors, MatchPair};
pub use crate::rank::RankedResultSet;
pub use crate::score::{score_candidate, CandidateScore, ScoreOutcome};
pub use crate::session::{Diagnostic, DiagnosticKind, MatchSession, SessionState};
