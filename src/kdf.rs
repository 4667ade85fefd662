//! HKDF (extract-then-expand, SHA-256) with domain-separation contexts.
//!
//! The two directional keys, derived straight from the raw SPAKE2 session
//! key, go through this one function, the way `relay::crypto::derive_cipher`
//! re-keys an X25519 shared secret in the daemon this core was carved out
//! of.

use hkdf::Hkdf;
use sha2::Sha256;

/// Domain-separation context for the key used to decrypt/encrypt in the
/// "sender" direction.
pub const CONTEXT_SENDER: &[u8] = b"sender";
/// Domain-separation context for the key used to decrypt/encrypt in the
/// "receiver" direction.
pub const CONTEXT_RECEIVER: &[u8] = b"receiver";

/// Derive `length` bytes from `secret`, domain-separated by `context`.
///
/// Uses HKDF-Extract-then-Expand over SHA-256 with an empty salt.
pub fn hkdf(secret: &[u8], context: &[u8], length: usize) -> Vec<u8> {
    let hk = Hkdf::<Sha256>::new(None, secret);
    let mut out = vec![0u8; length];
    // The only way `expand` fails is requesting more than 255*32 bytes of
    // output, which never happens for this crate's fixed 32-byte keys.
    hk.expand(context, &mut out)
        .expect("HKDF output length within RFC 5869 bounds");
    out
}

/// Derive a fixed 32-byte key — the only output length this crate uses.
pub fn hkdf_32(secret: &[u8], context: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&hkdf(secret, context, 32));
    out
}
