//! Error types for the owner report pipeline.
//!
//! Every error is terminal for the run: the pipeline never retries and never
//! continues with a partial organization list. Each stage has its own enum so
//! the top-level handler can tell which stage stopped the run.

use thiserror::Error;

use crate::http::HttpError;

/// The instance could not be confirmed as new enough to query.
#[derive(Debug, Error)]
pub enum VersionError {
    #[error("failed to fetch instance metadata: {0}")]
    Http(#[from] HttpError),

    #[error("instance metadata request failed with HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("failed to parse instance metadata: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot determine instance version from {raw:?}: {source}")]
    UnparsableVersion {
        raw: String,
        #[source]
        source: semver::Error,
    },

    #[error("need GitHub Enterprise Server version >= {minimum}, but got {installed}")]
    Unsupported {
        installed: semver::Version,
        minimum: semver::Version,
    },
}

/// A paginated GraphQL query failed.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("GraphQL request failed: {0}")]
    Http(#[from] HttpError),

    #[error("GraphQL API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("failed to decode GraphQL response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("GraphQL query returned errors: {}", .messages.join("; "))]
    GraphQl { messages: Vec<String> },

    #[error("GraphQL response contained no data")]
    MissingData,

    #[error("enterprise {slug:?} not found on this instance")]
    EnterpriseNotFound { slug: String },

    #[error("{connection} reported another page without an end cursor")]
    MissingCursor { connection: &'static str },
}

/// The report sink could not be created, written or flushed.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error on report {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write report row: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to flush report: {0}")]
    Flush(#[source] std::io::Error),
}

/// Any error that stops an owner report run.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Version(#[from] VersionError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

/// Extract a short error message suitable for display.
///
/// Takes the first line of the error's display form and truncates long
/// API bodies, which can contain whole HTML error pages.
pub fn short_error_message(err: &ReportError) -> String {
    let full = err.to_string();
    let first_line = full.lines().next().unwrap_or_default();
    if first_line.chars().count() > 120 {
        let truncated: String = first_line.chars().take(117).collect();
        format!("{truncated}...")
    } else {
        first_line.to_string()
    }
}
