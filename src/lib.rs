//! PAKE-mediated rendezvous: two parties turn a short human-typable code
//! into a strong shared key through an untrusted relay, then exchange one
//! authenticated payload.
//!
//! Entry points are [`session::Initiator`] and [`session::Receiver`].

pub mod config;
pub mod error;
pub mod kdf;
pub mod pake;
pub mod relay;
pub mod role;
pub mod secretbox;
pub mod session;
pub mod wordlist;

pub use config::RendezvousConfig;
pub use error::{RendezvousError, Result};
pub use session::{Initiator, Receiver};
pub use wordlist::Code;
