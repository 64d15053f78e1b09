//! Session-fatal error taxonomy.
//!
//! Only failures that prevent a session from starting live here: a missing
//! or undecodable query, or a rejected configuration. Per-candidate failures
//! are absorbed into the session's diagnostics list (see
//! [`crate::session::DiagnosticKind`]) and never abort a run.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors that prevent a [`crate::session::MatchSession`] run from starting.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The query image path is missing or empty.
    #[error("query image path is empty")]
    EmptyQueryPath,

    /// The query image could not be decoded. Fatal: without a query
    /// descriptor set there is nothing to match against.
    #[error("failed to decode query image {path}")]
    QueryDecode {
        path: String,
        #[source]
        source: image::ImageError,
    },

    /// Configuration was rejected during session construction.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
