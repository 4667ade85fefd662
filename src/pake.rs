//! SPAKE2 key agreement with role-asymmetric identity strings.
//!
//! Grounded on `holi_wasm_crypto::pake`'s `Spake2A`/`Spake2B` wrappers (start
//! → message → finish) generalized over the [`Role`] trait instead of
//! duplicated per role.

use spake2::{Ed25519Group, Identity, Password, Spake2};

use crate::role::Role;

/// The raw 32-byte secret shared by both peers after a successful PAKE
/// exchange. Never transmitted; zeroized on drop. The two directional keys
/// are derived from this value directly.
#[derive(Clone, zeroize::Zeroize)]
#[zeroize(drop)]
pub struct SessionKey(pub [u8; 32]);

/// One SPAKE2 instance. Consumed exactly once: `start` produces the
/// outbound wire message, `finish` consumes `self` together with the
/// peer's wire message to produce the [`SessionKey`].
pub struct PakeEngine<R: Role> {
    state: Spake2<Ed25519Group>,
    outbound: Vec<u8>,
    _role: std::marker::PhantomData<R>,
}

impl<R: Role> PakeEngine<R> {
    /// Start a SPAKE2 exchange for `code` scoped to `appid`.
    ///
    /// `code` is the UTF-8 encoded code string (the low-entropy shared
    /// secret); `appid` scopes the identity strings so two applications
    /// sharing a relay cannot interoperate even with the same code.
    pub fn start(code: &str, appid: &[u8]) -> Self {
        let password = Password::new(code.as_bytes());
        let id_a = identity(appid, "Initiator");
        let id_b = identity(appid, "Receiver");

        let (state, outbound) = R::start(&password, &id_a, &id_b);

        Self {
            state,
            outbound,
            _role: std::marker::PhantomData,
        }
    }

    /// The wire message to post to the relay's `pake/post` endpoint.
    pub fn outbound_message(&self) -> &[u8] {
        &self.outbound
    }

    /// Consume this engine and the peer's wire message to derive the
    /// shared [`SessionKey`].
    ///
    /// SPAKE2 itself cannot detect a mismatched code between peers — if the
    /// two sides used different codes they simply derive different keys
    /// silently. Detection happens downstream, the first time the
    /// authenticated box fails to decrypt.
    pub fn finish(self, inbound_message: &[u8]) -> Result<SessionKey, spake2::Error> {
        let raw_shared = self.state.finish(inbound_message)?;
        let mut key = [0u8; 32];
        key.copy_from_slice(&raw_shared);
        Ok(SessionKey(key))
    }
}

fn identity(appid: &[u8], role_name: &str) -> Identity {
    let mut bytes = appid.to_vec();
    bytes.push(b':');
    bytes.extend_from_slice(role_name.as_bytes());
    Identity::new(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::{Initiator, Receiver};

    #[test]
    fn matching_codes_derive_identical_session_keys() {
        let a = PakeEngine::<Initiator>::start("7-crooked-spatula", b"app");
        let b = PakeEngine::<Receiver>::start("7-crooked-spatula", b"app");

        let a_msg = a.outbound_message().to_vec();
        let b_msg = b.outbound_message().to_vec();

        let a_key = a.finish(&b_msg).unwrap();
        let b_key = b.finish(&a_msg).unwrap();

        assert_eq!(a_key.0, b_key.0);
    }

    #[test]
    fn mismatched_codes_derive_different_session_keys() {
        let a = PakeEngine::<Initiator>::start("7-crooked-spatula", b"app");
        let b = PakeEngine::<Receiver>::start("7-wrong-word", b"app");

        let a_msg = a.outbound_message().to_vec();
        let b_msg = b.outbound_message().to_vec();

        let a_key = a.finish(&b_msg).unwrap();
        let b_key = b.finish(&a_msg).unwrap();

        assert_ne!(a_key.0, b_key.0);
    }

    #[test]
    fn mismatched_appid_derives_different_session_keys() {
        let a = PakeEngine::<Initiator>::start("7-crooked-spatula", b"app1");
        let b = PakeEngine::<Receiver>::start("7-crooked-spatula", b"app2");

        let a_msg = a.outbound_message().to_vec();
        let b_msg = b.outbound_message().to_vec();

        let a_key = a.finish(&b_msg).unwrap();
        let b_key = b.finish(&a_msg).unwrap();

        assert_ne!(a_key.0, b_key.0);
    }
}
