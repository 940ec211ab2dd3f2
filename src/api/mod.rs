mod client;

pub use client::ApiClient;

use thiserror::Error;

/// What went wrong talking to the backend.
///
/// Mutating operations surface these directly. Refreshes never do; they
/// fold the error into a stale-cache outcome instead (see `crate::sync`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The server did not answer before the configured timeout.
    #[error("server timed out")]
    ConnectionTimeout,

    /// DNS failure or connection refused; the host could not be reached.
    #[error("server unreachable")]
    UnknownHost,

    /// HTTP 404: the record does not exist server-side.
    #[error("record not found")]
    NotFound,

    /// HTTP 403: the server rejected the submitted data. `message` is the
    /// server's own wording, passed through verbatim.
    #[error("{message}")]
    ValidationRejected { message: String },

    /// Anything else: other non-2xx statuses, undecodable response bodies,
    /// or calling a data endpoint without a saved session.
    #[error("request failed: {detail}")]
    Other { detail: String },
}
