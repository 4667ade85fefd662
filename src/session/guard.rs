//! RAII cleanup for a relay channel.
//!
//! Grounded on `config::ConfigWatcher` holding a resource-owning handle
//! alive only as long as needed and letting `Drop` tear it down, generalized
//! from "stop watching a file" to "release a relay channel."

use std::sync::Arc;

use tracing::warn;

use crate::relay::{RelayClient, Side};

/// Deallocates `(channel_id, side)` on the relay when dropped, unless the
/// session already did so explicitly via [`ChannelGuard::deallocate`].
///
/// The orchestrator never calls `RelayClient::deallocate` directly; every
/// exit path — success, `?`-propagated error, panic — goes through one of
/// these, so the channel is always released exactly once.
pub struct ChannelGuard {
    relay: Arc<RelayClient>,
    channel_id: u32,
    side: Side,
    armed: bool,
}

impl ChannelGuard {
    pub fn new(relay: Arc<RelayClient>, channel_id: u32, side: Side) -> Self {
        Self {
            relay,
            channel_id,
            side,
            armed: true,
        }
    }

    /// Deallocate now. Best-effort: a failure here is logged and never
    /// propagated, so it cannot mask whatever error or result the caller is
    /// already returning.
    pub async fn deallocate(mut self) {
        self.armed = false;
        if let Err(e) = self.relay.deallocate(self.channel_id, self.side).await {
            warn!(channel_id = self.channel_id, error = %e, "deallocate failed");
        }
    }

    /// Release without ever deallocating. Only for tests that need to
    /// inspect a guard's fields without triggering relay traffic on drop.
    #[cfg(test)]
    pub fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for ChannelGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let relay = self.relay.clone();
        let channel_id = self.channel_id;
        let side = self.side;
        // Drop can't be async; the fallback deallocate runs as a detached
        // task. The explicit `deallocate(self)` path above is the one every
        // orchestrator exit takes in practice.
        tokio::spawn(async move {
            if let Err(e) = relay.deallocate(channel_id, side).await {
                warn!(channel_id, error = %e, "deallocate failed (drop path)");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn explicit_deallocate_hits_the_relay() {
        let mut server = mockito::Server::new_async().await;
        let m = server
            .mock("POST", "/5/initiator/deallocate")
            .with_status(200)
            .expect(1)
            .create_async()
            .await;

        let relay = Arc::new(RelayClient::new(
            format!("{}/", server.url()),
            Duration::from_secs(5),
        ));
        let guard = ChannelGuard::new(relay, 5, Side::Initiator);
        guard.deallocate().await;

        m.assert_async().await;
    }

    #[tokio::test]
    async fn disarmed_guard_never_calls_relay() {
        let mut server = mockito::Server::new_async().await;
        let m = server
            .mock("POST", "/5/initiator/deallocate")
            .expect(0)
            .create_async()
            .await;

        let relay = Arc::new(RelayClient::new(
            format!("{}/", server.url()),
            Duration::from_secs(5),
        ));
        let mut guard = ChannelGuard::new(relay, 5, Side::Initiator);
        guard.disarm();
        drop(guard);

        m.assert_async().await;
    }
}
