//! # Star Registry Core
//!
//! Pure primitives for the Star Registry: blocks, canonical hashing,
//! ownership challenges, and chain validation.
//!
//! This crate contains no I/O, no storage, no locking. It is pure computation
//! over hash-linked blocks.
//!
//! ## Key Types
//!
//! - [`Block`] - A sealed record in the chain, bound to its predecessor
//! - [`BlockHash`] - Blake3 digest of a block's canonical bytes
//! - [`OwnershipChallenge`] - The message a wallet signs to prove ownership
//! - [`ValidationFinding`] - A tamper or broken-link report
//!
//! ## Canonicalization
//!
//! Blocks are hashed over deterministic CBOR. See the [`canonical`] module.

pub mod block;
pub mod canonical;
pub mod clock;
pub mod crypto;
pub mod error;
pub mod ownership;
pub mod star;
pub mod types;
pub mod validation;

pub use block::{decode_payload, encode_payload, Block, GENESIS_HEIGHT};
pub use canonical::canonical_block_bytes;
pub use clock::{Clock, ManualClock, SystemClock};
pub use crypto::{Ed25519PublicKey, Ed25519Signature, Ed25519Verifier, Keypair, SignatureVerifier};
pub use error::CoreError;
pub use ownership::{OwnershipChallenge, CHALLENGE_TAG};
pub use star::{StarEntry, StarRecord};
pub use types::BlockHash;
pub use validation::{validate_blocks, ValidationFinding};
