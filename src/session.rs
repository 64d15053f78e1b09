//! Session orchestration: one query against many candidates.
//!
//! [`MatchSession`] is the single entry point for collaborators (a UI or
//! CLI). It owns the query descriptor set, the ranked results, the
//! diagnostics list, and the navigation cursor for its lifetime; candidate
//! descriptor sets are transient and consumed as soon as they are matched.
//!
//! A run is synchronous and run-to-completion: `begin` decodes, extracts,
//! matches, and scores every candidate before returning, because ranking
//! needs global knowledge of all scores. Interactive callers should invoke
//! it from a background execution context; that responsibility belongs to
//! the integration layer, not this crate.
//!
//! Candidate identifiers are supplied by the caller in a fixed order. That
//! order (not filesystem iteration order, and not completion order) defines
//! the ranking tie-break, so runs are reproducible across platforms and
//! across the sequential/parallel execution paths.

use image::GrayImage;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn, Level};

use crate::config::{ConfigError, SessionConfig};
use crate::descriptor::DescriptorSet;
use crate::error::SessionError;
use crate::extract::{FastBriefExtractor, FeatureExtractor};
use crate::matcher::match_descriptors;
use crate::rank::RankedResultSet;
use crate::score::{score_candidate, CandidateScore, ScoreOutcome};

/// Session lifecycle. `Running` is terminal-free: once a run starts it
/// always completes in `Ready` or `ReadyEmpty`; fatal start errors return
/// the session to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No run started, or the last run failed to start.
    Idle,
    /// A run is in progress.
    Running,
    /// All candidates processed; at least one was ranked.
    Ready,
    /// All candidates processed; none produced a usable score.
    ReadyEmpty,
}

/// Why one candidate was excluded from the ranking. Absorbed locally and
/// reported through [`MatchSession::diagnostics`]; never aborts the run.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// The candidate path did not resolve to a readable image.
    #[error("failed to decode image: {message}")]
    Decode { message: String },
    /// The extractor found no keypoints (uniform or low-texture image).
    #[error("no keypoints detected")]
    NoKeypoints,
    /// Zero mutual-nearest-neighbor pairings against the query.
    #[error("no mutual nearest-neighbor pairings against the query")]
    Unscorable,
}

/// One excluded candidate with its failure reason and its position in the
/// caller-supplied enumeration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub id: String,
    pub position: usize,
    pub kind: DiagnosticKind,
}

/// Orchestrates extract → match → score → rank for one query against many
/// candidates, and answers the collaborator's "current candidate" queries.
pub struct MatchSession<E: FeatureExtractor = FastBriefExtractor> {
    extractor: E,
    use_parallel: bool,
    state: SessionState,
    query: DescriptorSet,
    results: RankedResultSet,
    diagnostics: Vec<Diagnostic>,
}

impl MatchSession<FastBriefExtractor> {
    /// Build a session with the default FAST+BRIEF extractor.
    pub fn new(cfg: SessionConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let extractor = FastBriefExtractor::new(cfg.extractor)?;
        Ok(Self::with_extractor(extractor, cfg.use_parallel))
    }
}

impl<E: FeatureExtractor> MatchSession<E> {
    /// Build a session around a custom extractor implementation.
    pub fn with_extractor(extractor: E, use_parallel: bool) -> Self {
        Self {
            extractor,
            use_parallel,
            state: SessionState::Idle,
            query: DescriptorSet::default(),
            results: RankedResultSet::default(),
            diagnostics: Vec::new(),
        }
    }

    /// Run the full pipeline: extract the query once, then decode → extract
    /// → match → score each candidate in the supplied order. Blocks until
    /// every candidate is processed.
    ///
    /// Per-candidate failures land in [`diagnostics`](Self::diagnostics);
    /// only an empty query path or an undecodable query image is fatal. An
    /// empty candidate sequence is a valid run that completes
    /// [`SessionState::ReadyEmpty`].
    pub fn begin<S>(
        &mut self,
        query_path: &str,
        candidates: &[S],
    ) -> Result<SessionState, SessionError>
    where
        S: AsRef<str> + Sync,
    {
        if query_path.trim().is_empty() {
            self.state = SessionState::Idle;
            return Err(SessionError::EmptyQueryPath);
        }

        self.state = SessionState::Running;
        self.results = RankedResultSet::default();
        self.diagnostics.clear();

        let span = tracing::span!(
            Level::INFO,
            "lookalike.session",
            query = %query_path,
            candidates = candidates.len()
        );
        let _guard = span.enter();

        let query_image = match decode_luma(query_path) {
            Ok(image) => image,
            Err(source) => {
                self.state = SessionState::Idle;
                warn!(error = %source, "session_start_failure");
                return Err(SessionError::QueryDecode {
                    path: query_path.to_string(),
                    source,
                });
            }
        };
        self.query = self.extractor.extract(&query_image);
        drop(query_image);

        if self.query.is_empty() {
            // Soft: the run still completes, with every candidate Unscorable.
            warn!("query_no_keypoints");
        } else {
            debug!(query_descriptors = self.query.len(), "query_extracted");
        }

        let extractor = &self.extractor;
        let query = &self.query;
        let outcomes: Vec<Result<CandidateScore, DiagnosticKind>> = if self.use_parallel {
            candidates
                .par_iter()
                .enumerate()
                .map(|(position, id)| process_candidate(extractor, query, id.as_ref(), position))
                .collect()
        } else {
            candidates
                .iter()
                .enumerate()
                .map(|(position, id)| process_candidate(extractor, query, id.as_ref(), position))
                .collect()
        };

        let mut scores = Vec::with_capacity(outcomes.len());
        for (position, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                Ok(score) => scores.push(score),
                Err(kind) => {
                    let id = candidates[position].as_ref().to_string();
                    debug!(candidate = %id, reason = %kind, "candidate_skipped");
                    self.diagnostics.push(Diagnostic { id, position, kind });
                }
            }
        }

        self.results = RankedResultSet::from_scores(scores);
        self.state = if self.results.is_empty() {
            SessionState::ReadyEmpty
        } else {
            SessionState::Ready
        };
        info!(
            ranked = self.results.len(),
            skipped = self.diagnostics.len(),
            state = ?self.state,
            "session_ready"
        );
        Ok(self.state)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Ranked results of the last completed run.
    pub fn results(&self) -> &RankedResultSet {
        &self.results
    }

    /// Candidates excluded from the ranking, in enumeration order, with
    /// their failure reasons. Nothing is skipped without an entry here.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// The query's descriptor set from the last run (owned by the session).
    pub fn query_descriptors(&self) -> &DescriptorSet {
        &self.query
    }

    /// Ranked entry under the cursor; `None` before a run or when the last
    /// run produced no usable score.
    pub fn current(&self) -> Option<&CandidateScore> {
        self.results.current()
    }

    /// Step the cursor to the next-ranked candidate (clamped, no wraparound).
    pub fn next(&mut self) -> Option<&CandidateScore> {
        self.results.next()
    }

    /// Step the cursor back to the previous-ranked candidate (clamped).
    pub fn previous(&mut self) -> Option<&CandidateScore> {
        self.results.previous()
    }
}

/// Decode → extract → match → score for one candidate. Every failure maps
/// to the [`DiagnosticKind`] that explains the exclusion.
fn process_candidate<E: FeatureExtractor>(
    extractor: &E,
    query: &DescriptorSet,
    id: &str,
    position: usize,
) -> Result<CandidateScore, DiagnosticKind> {
    let image = decode_luma(id).map_err(|err| DiagnosticKind::Decode {
        message: err.to_string(),
    })?;
    let set = extractor.extract(&image);
    drop(image);

    if set.is_empty() {
        return Err(DiagnosticKind::NoKeypoints);
    }

    let pairs = match_descriptors(query.descriptors(), set.descriptors());
    match score_candidate(id, position, &pairs) {
        ScoreOutcome::Scored(score) => {
            debug!(
                candidate = %id,
                pairs = score.pair_count,
                mean_distance = score.mean_distance,
                "candidate_scored"
            );
            Ok(score)
        }
        ScoreOutcome::Unscorable => Err(DiagnosticKind::Unscorable),
    }
}

/// Load an image and reduce it to the 8-bit intensity channel used for
/// extraction.
fn decode_luma(path: &str) -> Result<GrayImage, image::ImageError> {
    Ok(image::open(path)?.to_luma8())
}
