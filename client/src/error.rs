//! Error taxonomy for the conversion pipeline.

use chrono::NaiveDate;
use curex_common::CurrencyCode;
use thiserror::Error;

/// Errors surfaced by rate sources, the conversion engine, and the
/// history builder.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A single endpoint failed at the transport level: connect failure,
    /// non-success status other than 404, or body decode failure.
    #[error("request to {url} failed: {detail}")]
    Transport { url: String, detail: String },

    /// The endpoint answered 404: no document is published there.
    #[error("no document at {url}")]
    DocumentMissing { url: String },

    /// Every configured host failed for the same logical request.
    /// Carries no partial data.
    #[error("all rate sources failed for {path}")]
    SourceUnavailable { path: String },

    /// The fetched document has no usable rate for the requested target.
    #[error("rate not found for {from} to {to}")]
    RateNotFound { from: CurrencyCode, to: CurrencyCode },

    /// A day's request in the history window failed at the transport
    /// level, discarding the whole series.
    #[error("historical fetch failed for {date}: {detail}")]
    HistoricalFetchFailed { date: NaiveDate, detail: String },
}

/// Result type for pipeline operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Rejected user input. Suppressed into a no-op at the session boundary
/// by default; callers may surface it instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The amount text does not parse as a finite number.
    #[error("amount does not parse as a number")]
    UnparseableAmount,

    /// The amount parsed but is negative.
    #[error("amount must not be negative")]
    NegativeAmount,

    /// One of the currency selections is empty.
    #[error("currency selection is empty")]
    EmptyCurrency,
}
