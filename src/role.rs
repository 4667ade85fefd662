//! Compile-time role polymorphism.
//!
//! The original two-class-plus-mixin design duplicates the post/poll/derive
//! plumbing once per role and swaps a pair of string literals
//! (`"sender"`/`"receiver"`) between them — exactly the kind of footgun a
//! tagged variant resolved once, in one place, is meant to prevent. Here
//! that's a private `Role` trait implemented by two zero-sized marker
//! types; every role-dependent value (the relay `side` string, which SPAKE2
//! constructor to call, which HKDF context is outbound vs. inbound) is
//! resolved from the trait instead of being re-decided at each call site.

use spake2::{Ed25519Group, Identity, Password, Spake2};

use crate::kdf::{CONTEXT_RECEIVER, CONTEXT_SENDER};

/// Distinguishes the two peers of a rendezvous session.
pub trait Role: Send + Sync + 'static {
    /// The relay mailbox tag this role posts under — `"initiator"` or
    /// `"receiver"`.
    const SIDE: &'static str;

    /// HKDF context used to derive this role's *outbound* directional key.
    const OUTBOUND_CONTEXT: &'static [u8];

    /// HKDF context used to derive this role's *inbound* directional key.
    const INBOUND_CONTEXT: &'static [u8];

    /// Construct this role's half of the SPAKE2 exchange.
    ///
    /// `id_a`/`id_b` are always `<appid>:Initiator` / `<appid>:Receiver`
    /// regardless of which role is starting — SPAKE2's A/B asymmetry is a
    /// property of the primitive, not of who initiated the rendezvous.
    fn start(
        password: &Password,
        id_a: &Identity,
        id_b: &Identity,
    ) -> (Spake2<Ed25519Group>, Vec<u8>);
}

/// The side that allocates the channel and publishes the code.
pub struct Initiator;

impl Role for Initiator {
    const SIDE: &'static str = "initiator";
    const OUTBOUND_CONTEXT: &'static [u8] = CONTEXT_SENDER;
    const INBOUND_CONTEXT: &'static [u8] = CONTEXT_RECEIVER;

    fn start(
        password: &Password,
        id_a: &Identity,
        id_b: &Identity,
    ) -> (Spake2<Ed25519Group>, Vec<u8>) {
        Spake2::<Ed25519Group>::start_a(password, id_a, id_b)
    }
}

/// The side that receives a code out-of-band and joins the channel.
pub struct Receiver;

impl Role for Receiver {
    const SIDE: &'static str = "receiver";
    // Swapped relative to Initiator: outbound is "receiver", inbound "sender".
    const OUTBOUND_CONTEXT: &'static [u8] = CONTEXT_RECEIVER;
    const INBOUND_CONTEXT: &'static [u8] = CONTEXT_SENDER;

    fn start(
        password: &Password,
        id_a: &Identity,
        id_b: &Identity,
    ) -> (Spake2<Ed25519Group>, Vec<u8>) {
        Spake2::<Ed25519Group>::start_b(password, id_a, id_b)
    }
}
