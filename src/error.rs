//! The crate's public error surface.
//!
//! Callers of [`crate::session::Initiator::get_code`] /
//! [`crate::session::Initiator::get_data`] (and the `Receiver` equivalents)
//! are expected to match on the specific variant — "wrong code" and "relay
//! unreachable" call for different user-facing behavior. An opaque
//! `anyhow::Error` would hide that distinction, so this crate enumerates
//! every failure mode up front instead, in the style of
//! `agents::orchestrator::OrchestratorError` in the daemon this core was
//! carved out of.

use reqwest::StatusCode;

/// Everything that can terminate a rendezvous session.
#[derive(Debug, thiserror::Error)]
pub enum RendezvousError {
    /// The session deadline elapsed while waiting on a poll loop.
    #[error("session timed out after {elapsed_secs}s waiting for peer")]
    Timeout { elapsed_secs: u64 },

    /// The relay returned a non-2xx HTTP status.
    #[error("relay returned HTTP {status} for {endpoint}")]
    RelayError {
        status: StatusCode,
        endpoint: &'static str,
    },

    /// The relay's response body didn't match the expected JSON shape.
    #[error("relay response malformed: {0}")]
    RelayMalformed(String),

    /// `set_code`/`input_code` was given a string that isn't a valid code.
    #[error("malformed code: {0}")]
    MalformedCode(String),

    /// Authenticated decryption failed — almost always a mismatched code
    /// between the two peers (or, within a single peer's own payload, a
    /// mismatched `appid`).
    #[error("bad code: payload authentication failed")]
    BadCode,

    /// The session was cancelled via its `CancellationToken` before it
    /// completed.
    #[error("session cancelled")]
    Cancelled,

    /// Transport-level failure constructing or sending an HTTP request
    /// (DNS failure, connection refused, request-level timeout). Distinct
    /// from `RelayError`, which means the relay was reached and answered
    /// with a bad status.
    #[error("relay request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, RendezvousError>;
