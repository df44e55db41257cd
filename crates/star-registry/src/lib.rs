//! # Star Registry
//!
//! A single-writer, append-only, hash-linked chain of blocks, with a workflow
//! for registering stars: a wallet proves it owns an address by signing a
//! time-stamped challenge, then submits a star within the submission window.
//!
//! ## Key Concepts
//!
//! - **Block**: Immutable once appended. Bound to its predecessor by hash.
//! - **Chain**: Sole owner of the blocks. Appends are serialized.
//! - **Challenge**: `{address}:{unix_seconds}:starRegistry`, signed by the wallet.
//! - **Findings**: Tampered blocks and broken links, reported by validation.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use star_registry::{Chain, ChainConfig};
//! use star_registry::core::Keypair;
//!
//! async fn example() {
//!     let chain = Chain::new(ChainConfig::default()).unwrap();
//!     let wallet = Keypair::generate();
//!
//!     // Ask for a challenge and sign it with the wallet
//!     let message = chain.request_ownership_verification(&wallet.address());
//!     let signature = wallet.sign(message.as_bytes()).to_hex();
//!
//!     // Register a star
//!     let star = serde_json::json!({"dec": "68° 52' 56.9", "ra": "16h 29m 1.0s", "story": "found"});
//!     let block = chain
//!         .submit_star(&wallet.address(), &message, &signature, star)
//!         .await
//!         .unwrap();
//!
//!     assert!(chain.validate_chain().await.is_empty());
//!     let _ = block;
//! }
//! ```

pub mod chain;
pub mod error;

// Re-export the core crate
pub use star_registry_core as core;

pub use chain::{Chain, ChainConfig};
pub use error::{RegistryError, Result};

pub use star_registry_core::{
    Block, BlockHash, Clock, Ed25519Verifier, ManualClock, OwnershipChallenge, SignatureVerifier,
    StarEntry, StarRecord, SystemClock, ValidationFinding,
};
