//! The session orchestrator: drives one side of a rendezvous from code
//! establishment through authenticated payload exchange.
//!
//! `Session<R: Role>` is the shared state machine body; [`Initiator`] and
//! [`Receiver`] are thin role-specific façades over it that differ only in
//! how they reach the point of having posted a PAKE message — allocating a
//! fresh channel and code, versus parsing a caller-supplied one.

pub mod guard;

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Instant;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::RendezvousConfig;
use crate::error::{RendezvousError, Result};
use crate::kdf::hkdf_32;
use crate::pake::PakeEngine;
use crate::relay::{RelayClient, Side as RelaySide};
use crate::role::{self, Role};
use crate::secretbox::{self, DirectionalKey};
use crate::wordlist::{self, Code};

use guard::ChannelGuard;

enum PollTarget {
    Pake,
    Data,
}

/// Shared plumbing for both roles: allocation-independent, generic over
/// [`Role`] so the relay `side`, SPAKE2 constructor, and HKDF context pair
/// are all resolved once from the trait instead of re-decided per role.
struct Session<R: Role> {
    relay: Arc<RelayClient>,
    config: RendezvousConfig,
    appid: Vec<u8>,
    payload: Vec<u8>,
    cancel: CancellationToken,
    _role: PhantomData<R>,
}

impl<R: Role> Session<R> {
    fn new(config: RendezvousConfig, appid: Vec<u8>, payload: Vec<u8>) -> Self {
        let relay = Arc::new(RelayClient::new(
            config.relay_url.clone(),
            config.request_timeout,
        ));
        Self {
            relay,
            config,
            appid,
            payload,
            cancel: CancellationToken::new(),
            _role: PhantomData,
        }
    }

    fn relay_side() -> RelaySide {
        match R::SIDE {
            "initiator" => RelaySide::Initiator,
            "receiver" => RelaySide::Receiver,
            other => unreachable!("Role::SIDE must be \"initiator\" or \"receiver\", got {other}"),
        }
    }

    /// Build the PAKE engine for `code` against the already-allocated
    /// `channel_id` and post its outbound message, arming a [`ChannelGuard`]
    /// in the same step so every later `?` tears the channel down.
    async fn post_pake(
        &self,
        channel_id: u32,
        code: &str,
    ) -> Result<(PakeEngine<R>, Vec<Vec<u8>>, ChannelGuard)> {
        let side = Self::relay_side();
        let guard = ChannelGuard::new(self.relay.clone(), channel_id, side);

        let engine = PakeEngine::<R>::start(code, &self.appid);
        info!(channel_id, side = R::SIDE, "posting pake message");
        let initial = self
            .relay
            .post_pake(channel_id, side, engine.outbound_message())
            .await?;

        Ok((engine, initial, guard))
    }

    /// Finish the exchange: wait for the peer's PAKE message, derive
    /// directional keys, exchange the payload, and deallocate exactly once
    /// regardless of outcome.
    async fn complete(
        &self,
        channel_id: u32,
        engine: PakeEngine<R>,
        initial_pake: Vec<Vec<u8>>,
        guard: ChannelGuard,
    ) -> Result<Vec<u8>> {
        let side = Self::relay_side();
        let deadline = Instant::now() + self.config.session_timeout;

        let result = self
            .run_to_completion(channel_id, side, deadline, engine, initial_pake)
            .await;

        match &result {
            Ok(_) => info!(channel_id, "session completed"),
            Err(e) => warn!(channel_id, error = %e, "session failed"),
        }
        guard.deallocate().await;
        result
    }

    async fn run_to_completion(
        &self,
        channel_id: u32,
        side: RelaySide,
        deadline: Instant,
        engine: PakeEngine<R>,
        initial_pake: Vec<Vec<u8>>,
    ) -> Result<Vec<u8>> {
        let inbound_pake = self
            .wait_for(channel_id, side, initial_pake, deadline, PollTarget::Pake)
            .await?;
        let session_key = engine
            .finish(&inbound_pake)
            .map_err(|_| RendezvousError::BadCode)?;

        let outbound_key = DirectionalKey::new(hkdf_32(&session_key.0, R::OUTBOUND_CONTEXT));
        let inbound_key = DirectionalKey::new(hkdf_32(&session_key.0, R::INBOUND_CONTEXT));

        let ciphertext = secretbox::encrypt(&outbound_key, &self.payload);
        info!(channel_id, "posting data message");
        let initial_data = self.relay.post_data(channel_id, side, &ciphertext).await?;

        let inbound_ct = self
            .wait_for(channel_id, side, initial_data, deadline, PollTarget::Data)
            .await?;

        secretbox::decrypt(&inbound_key, &inbound_ct)
    }

    /// The long-poll loop: return the first queued message immediately if
    /// one is already available, otherwise sleep at a fixed interval and
    /// re-poll until one arrives or `deadline` passes.
    async fn wait_for(
        &self,
        channel_id: u32,
        side: RelaySide,
        initial: Vec<Vec<u8>>,
        deadline: Instant,
        target: PollTarget,
    ) -> Result<Vec<u8>> {
        let mut queued = initial;
        loop {
            if let Some(first) = queued.first() {
                if queued.len() > 1 {
                    warn!(
                        channel_id,
                        extra = queued.len() - 1,
                        "discarding extra queued relay messages"
                    );
                }
                return Ok(first.clone());
            }

            if Instant::now() >= deadline {
                return Err(RendezvousError::Timeout {
                    elapsed_secs: self.config.session_timeout.as_secs(),
                });
            }

            tokio::select! {
                _ = sleep(self.config.poll_interval) => {}
                _ = self.cancel.cancelled() => return Err(RendezvousError::Cancelled),
            }

            queued = match target {
                PollTarget::Pake => self.relay.poll_pake(channel_id, side).await?,
                PollTarget::Data => self.relay.poll_data(channel_id, side).await?,
            };
        }
    }
}

type PendingInitiator = (u32, PakeEngine<role::Initiator>, Vec<Vec<u8>>, ChannelGuard);

/// The side that allocates the channel and publishes the code.
pub struct Initiator {
    session: Session<role::Initiator>,
    pending: Option<PendingInitiator>,
}

impl Initiator {
    pub fn new(
        appid: impl Into<Vec<u8>>,
        payload: impl Into<Vec<u8>>,
        config: RendezvousConfig,
    ) -> Self {
        Self {
            session: Session::new(config, appid.into(), payload.into()),
            pending: None,
        }
    }

    /// Token for external cancellation of a poll loop in progress.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.session.cancel.clone()
    }

    /// `Fresh → Allocated → PakePosted`. The code is considered published
    /// the moment this returns — the caller is free to hand it to the peer
    /// out of band immediately.
    pub async fn get_code(&mut self) -> Result<Code> {
        let channel_id = self.session.relay.allocate().await?;
        let code = wordlist::make_code(channel_id, self.session.config.num_words);

        let (engine, initial, guard) = self.session.post_pake(channel_id, &code).await?;
        self.pending = Some((channel_id, engine, initial, guard));
        Ok(code)
    }

    /// `PakePosted → KeyKnown → DataPosted → DataReceived → Deallocated`.
    pub async fn get_data(&mut self) -> Result<Vec<u8>> {
        let (channel_id, engine, initial, guard) = self
            .pending
            .take()
            .expect("get_data called before get_code succeeded");
        self.session.complete(channel_id, engine, initial, guard).await
    }
}

type PendingReceiver = (u32, PakeEngine<role::Receiver>, Vec<Vec<u8>>, ChannelGuard);

/// The side that receives a code out of band and joins the channel.
pub struct Receiver {
    session: Session<role::Receiver>,
    pending: Option<PendingReceiver>,
}

impl Receiver {
    pub fn new(
        appid: impl Into<Vec<u8>>,
        payload: impl Into<Vec<u8>>,
        config: RendezvousConfig,
    ) -> Self {
        Self {
            session: Session::new(config, appid.into(), payload.into()),
            pending: None,
        }
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.session.cancel.clone()
    }

    /// The relay's currently active channel-ids, for driving
    /// [`Receiver::input_code`] from a terminal UI.
    pub async fn list_channel_ids(&self) -> Result<Vec<u32>> {
        self.session.relay.list().await
    }

    /// Non-interactive tab-completion primitive: given what the caller has
    /// typed so far and a list of active channel-ids, return completion
    /// candidates. Does not touch the network or commit to a channel.
    pub fn input_code(&self, prefix: &str, known_channel_ids: &[u32]) -> Vec<String> {
        wordlist::completion_candidates(prefix, known_channel_ids)
    }

    /// `Fresh → CodeSet → PakePosted`, given a fully-typed code.
    pub async fn set_code(&mut self, code: &str) -> Result<()> {
        let canon = wordlist::canonicalize(code)?;
        let channel_id = wordlist::extract_channel_id(&canon)?;

        let (engine, initial, guard) = self.session.post_pake(channel_id, &canon).await?;
        self.pending = Some((channel_id, engine, initial, guard));
        Ok(())
    }

    /// `PakePosted → KeyKnown → DataPosted → DataReceived → Deallocated`.
    pub async fn get_data(&mut self) -> Result<Vec<u8>> {
        let (channel_id, engine, initial, guard) = self
            .pending
            .take()
            .expect("get_data called before set_code succeeded");
        self.session.complete(channel_id, engine, initial, guard).await
    }
}
