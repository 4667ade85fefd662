//! Session construction parameters.
//!
//! There is no on-disk or environment-backed config layer here — unlike
//! `clawd::config::DaemonConfig`'s CLI/env/TOML layering, this crate has no
//! CLI and writes no files, so `RendezvousConfig` collapses that layering
//! down to "explicit constructor argument, falling back to a documented
//! built-in default" and nothing more.

use std::time::Duration;

/// Tunable parameters for one rendezvous session.
///
/// Construct with [`RendezvousConfig::new`] and override individual fields,
/// or start from [`RendezvousConfig::default`].
#[derive(Debug, Clone)]
pub struct RendezvousConfig {
    /// Base URL of the relay. Must end with `/`.
    pub relay_url: String,
    /// Interval between successive `poll` requests while waiting for a peer
    /// message. Default: 500ms.
    pub poll_interval: Duration,
    /// Upper bound on how long a session will wait for a peer message
    /// before failing with [`crate::error::RendezvousError::Timeout`].
    /// Default: 180s.
    pub session_timeout: Duration,
    /// Number of wordlist words drawn for a code (excluding the channel-id
    /// prefix). Default: 2.
    pub num_words: usize,
    /// Per-HTTP-request timeout passed to the `reqwest::Client`. Bounds a
    /// single `allocate`/`post`/`poll`/`deallocate` call so one stalled
    /// request cannot silently eat the whole session deadline without the
    /// poll loop ever getting a chance to retry. Default: 10s.
    pub request_timeout: Duration,
}

impl Default for RendezvousConfig {
    fn default() -> Self {
        Self {
            relay_url: "https://relay.example.org/".to_string(),
            poll_interval: Duration::from_millis(500),
            session_timeout: Duration::from_secs(180),
            num_words: 2,
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl RendezvousConfig {
    /// Build a config pointing at a specific relay, otherwise using defaults.
    pub fn new(relay_url: impl Into<String>) -> Self {
        Self {
            relay_url: relay_url.into(),
            ..Self::default()
        }
    }

    /// A config tuned for fast, deterministic tests: short poll interval and
    /// short session deadline so timeout scenarios don't cost real wall-clock
    /// minutes. Mirrors `retry::RetryConfig::instant()` in the daemon this
    /// core was carved out of.
    pub fn for_tests(relay_url: impl Into<String>) -> Self {
        Self {
            relay_url: relay_url.into(),
            poll_interval: Duration::from_millis(5),
            session_timeout: Duration::from_millis(200),
            num_words: 2,
            request_timeout: Duration::from_secs(5),
        }
    }
}
