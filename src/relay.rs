//! HTTP client for the relay's allocate / post / poll / deallocate / list
//! endpoints.
//!
//! Grounded on `license::call_verify` and `update::mod`'s use of `reqwest`
//! in the daemon this core was carved out of: one `reqwest::Client` built
//! once with a bounded timeout, `.error_for_status()` to turn non-2xx
//! responses into an error before deserializing, and a typed response
//! struct per endpoint.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{RendezvousError, Result};

/// Which mailbox half a request is posted/polled against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Initiator,
    Receiver,
}

impl Side {
    fn as_str(self) -> &'static str {
        match self {
            Side::Initiator => "initiator",
            Side::Receiver => "receiver",
        }
    }
}

#[derive(Serialize)]
struct MessageBody {
    message: String,
}

#[derive(Deserialize)]
struct MessagesResponse {
    messages: Vec<String>,
}

#[derive(Deserialize)]
struct AllocateResponse {
    #[serde(rename = "channel-id")]
    channel_id: u32,
}

#[derive(Deserialize)]
struct ListResponse {
    #[serde(rename = "channel-ids")]
    channel_ids: Vec<u32>,
}

/// Thin wrapper over a `reqwest::Client` scoped to one relay base URL.
pub struct RelayClient {
    client: reqwest::Client,
    base_url: String,
}

impl RelayClient {
    /// `base_url` must end with `/`.
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .expect("reqwest::Client::builder with only a timeout never fails");

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// `POST <relay>/allocate` — allocate a new channel-id.
    pub async fn allocate(&self) -> Result<u32> {
        let url = format!("{}allocate", self.base_url);
        let resp = self
            .client
            .post(&url)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| relay_error(e, "allocate"))?;

        let body: AllocateResponse = resp
            .json()
            .await
            .map_err(|e| RendezvousError::RelayMalformed(e.to_string()))?;
        Ok(body.channel_id)
    }

    /// `POST <relay>/<cid>/<side>/pake/post` — post a PAKE message, also
    /// returning any peer messages already queued.
    pub async fn post_pake(&self, channel_id: u32, side: Side, message: &[u8]) -> Result<Vec<Vec<u8>>> {
        self.post(channel_id, side, "pake/post", message).await
    }

    /// `POST <relay>/<cid>/<side>/pake/poll` — poll for queued PAKE messages.
    pub async fn poll_pake(&self, channel_id: u32, side: Side) -> Result<Vec<Vec<u8>>> {
        self.poll(channel_id, side, "pake/poll").await
    }

    /// `POST <relay>/<cid>/<side>/data/post` — post a ciphertext, also
    /// returning any peer ciphertexts already queued.
    pub async fn post_data(&self, channel_id: u32, side: Side, message: &[u8]) -> Result<Vec<Vec<u8>>> {
        self.post(channel_id, side, "data/post", message).await
    }

    /// `POST <relay>/<cid>/<side>/data/poll` — poll for queued ciphertexts.
    pub async fn poll_data(&self, channel_id: u32, side: Side) -> Result<Vec<Vec<u8>>> {
        self.poll(channel_id, side, "data/poll").await
    }

    /// `POST <relay>/<cid>/<side>/deallocate` — release the channel.
    ///
    /// Best-effort from the caller's point of view: see
    /// `session::guard::ChannelGuard`, which is the only caller of this
    /// method and never lets its failure override the session's primary
    /// outcome.
    pub async fn deallocate(&self, channel_id: u32, side: Side) -> Result<()> {
        let url = format!("{}{}/{}/deallocate", self.base_url, channel_id, side.as_str());
        self.client
            .post(&url)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| relay_error(e, "deallocate"))?;
        Ok(())
    }

    /// `GET <relay>/list` — active channel-ids, for tab-completion.
    pub async fn list(&self) -> Result<Vec<u32>> {
        let url = format!("{}list", self.base_url);
        let resp = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| relay_error(e, "list"))?;

        let body: ListResponse = resp
            .json()
            .await
            .map_err(|e| RendezvousError::RelayMalformed(e.to_string()))?;
        Ok(body.channel_ids)
    }

    async fn post(
        &self,
        channel_id: u32,
        side: Side,
        endpoint: &'static str,
        message: &[u8],
    ) -> Result<Vec<Vec<u8>>> {
        let url = format!("{}{}/{}/{}", self.base_url, channel_id, side.as_str(), endpoint);
        let resp = self
            .client
            .post(&url)
            .json(&MessageBody {
                message: hex::encode(message),
            })
            .send()
            .await?
            .error_for_status()
            .map_err(|e| relay_error(e, endpoint))?;

        decode_messages(resp, endpoint).await
    }

    async fn poll(&self, channel_id: u32, side: Side, endpoint: &'static str) -> Result<Vec<Vec<u8>>> {
        let url = format!("{}{}/{}/{}", self.base_url, channel_id, side.as_str(), endpoint);
        let resp = self
            .client
            .post(&url)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| relay_error(e, endpoint))?;

        decode_messages(resp, endpoint).await
    }
}

async fn decode_messages(resp: reqwest::Response, endpoint: &'static str) -> Result<Vec<Vec<u8>>> {
    let body: MessagesResponse = resp
        .json()
        .await
        .map_err(|e| RendezvousError::RelayMalformed(e.to_string()))?;

    body.messages
        .iter()
        .map(|hex_msg| {
            hex::decode(hex_msg).map_err(|_| {
                RendezvousError::RelayMalformed(format!(
                    "non-hex message in {endpoint} response"
                ))
            })
        })
        .collect()
}

fn relay_error(e: reqwest::Error, endpoint: &'static str) -> RendezvousError {
    match e.status() {
        Some(status) => RendezvousError::RelayError { status, endpoint },
        None => RendezvousError::Transport(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn allocate_parses_channel_id() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/allocate")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"channel-id": 42}"#)
            .create_async()
            .await;

        let client = RelayClient::new(format!("{}/", server.url()), Duration::from_secs(5));
        assert_eq!(client.allocate().await.unwrap(), 42);
    }

    #[tokio::test]
    async fn allocate_surfaces_relay_error_on_500() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/allocate")
            .with_status(500)
            .create_async()
            .await;

        let client = RelayClient::new(format!("{}/", server.url()), Duration::from_secs(5));
        let err = client.allocate().await.unwrap_err();
        assert!(matches!(err, RendezvousError::RelayError { .. }));
    }

    #[tokio::test]
    async fn post_pake_round_trips_hex_messages() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/7/initiator/pake/post")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"messages": ["deadbeef"]}"#)
            .create_async()
            .await;

        let client = RelayClient::new(format!("{}/", server.url()), Duration::from_secs(5));
        let msgs = client
            .post_pake(7, Side::Initiator, b"hello")
            .await
            .unwrap();
        assert_eq!(msgs, vec![vec![0xde, 0xad, 0xbe, 0xef]]);
    }

    #[tokio::test]
    async fn malformed_json_surfaces_relay_malformed() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/allocate")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"not-channel-id": 42}"#)
            .create_async()
            .await;

        let client = RelayClient::new(format!("{}/", server.url()), Duration::from_secs(5));
        let err = client.allocate().await.unwrap_err();
        assert!(matches!(err, RendezvousError::RelayMalformed(_)));
    }
}
