//! Authenticated symmetric encryption: XSalsa20 + Poly1305 (secretbox).
//!
//! Mirrors the shape of `holi_wasm_crypto::encryption::EncryptionKey` (fresh
//! random nonce generated per call, nonce prepended to the ciphertext) with
//! XSalsa20Poly1305 in place of XChaCha20Poly1305 for a 24-byte-nonce
//! secretbox construction.

use xsalsa20poly1305::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Key, Nonce, XSalsa20Poly1305,
};

use crate::error::{RendezvousError, Result};

const NONCE_LEN: usize = 24;

/// A 32-byte symmetric key used for one direction of one session.
///
/// Zeroized on drop — this always wraps key material derived fresh per
/// session, never reused, but it is still secret data that shouldn't linger
/// in memory longer than necessary.
#[derive(Clone, zeroize::Zeroize)]
#[zeroize(drop)]
pub struct DirectionalKey(pub(crate) [u8; 32]);

impl DirectionalKey {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    fn cipher(&self) -> XSalsa20Poly1305 {
        XSalsa20Poly1305::new(Key::from_slice(&self.0))
    }
}

/// Encrypt `plaintext` under `key`, returning `nonce (24 bytes) || ciphertext || tag`.
///
/// The nonce comes from an OS CSPRNG (`OsRng`) fresh for every call — never
/// derived from session data.
pub fn encrypt(key: &DirectionalKey, plaintext: &[u8]) -> Vec<u8> {
    let cipher = key.cipher();
    let nonce = XSalsa20Poly1305::generate_nonce(&mut OsRng);

    // Only failure mode of `encrypt` in this AEAD is an over-length plaintext
    // far beyond anything a single rendezvous payload would ever carry.
    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .expect("XSalsa20Poly1305 encryption of a bounded in-memory payload");

    let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&ciphertext);
    out
}

/// Decrypt `nonce || ciphertext || tag` under `key`.
///
/// Fails with [`RendezvousError::BadCode`] on MAC mismatch or truncation —
/// this is how a mismatched code between peers (or a mismatched `appid`)
/// is actually detected, since SPAKE2 itself never observes it.
pub fn decrypt(key: &DirectionalKey, nonce_and_ct: &[u8]) -> Result<Vec<u8>> {
    if nonce_and_ct.len() < NONCE_LEN {
        return Err(RendezvousError::BadCode);
    }
    let (nonce_bytes, ct) = nonce_and_ct.split_at(NONCE_LEN);
    let nonce = Nonce::from_slice(nonce_bytes);

    key.cipher()
        .decrypt(nonce, ct)
        .map_err(|_| RendezvousError::BadCode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn key() -> DirectionalKey {
        DirectionalKey::new([7u8; 32])
    }

    #[test]
    fn round_trip() {
        let k = key();
        let ct = encrypt(&k, b"hello world");
        assert_eq!(decrypt(&k, &ct).unwrap(), b"hello world");
    }

    #[test]
    fn wrong_key_fails() {
        let ct = encrypt(&key(), b"hello world");
        let wrong = DirectionalKey::new([9u8; 32]);
        assert!(matches!(decrypt(&wrong, &ct), Err(RendezvousError::BadCode)));
    }

    #[test]
    fn truncated_ciphertext_fails() {
        let k = key();
        assert!(matches!(decrypt(&k, &[0u8; 4]), Err(RendezvousError::BadCode)));
    }

    #[test]
    fn nonces_are_fresh_each_call() {
        let k = key();
        let mut nonces = HashSet::new();
        for _ in 0..256 {
            let ct = encrypt(&k, b"payload");
            nonces.insert(ct[..24].to_vec());
        }
        assert_eq!(nonces.len(), 256, "expected pairwise-distinct nonces");
    }
}
