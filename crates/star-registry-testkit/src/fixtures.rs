//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::Arc;

use serde_json::Value;
use star_registry::{Block, Chain, ChainConfig, Result};
use star_registry_core::{Ed25519Verifier, Keypair, ManualClock};

/// Fixed starting time for fixture clocks (2023-11-14T22:13:20Z).
pub const FIXTURE_EPOCH: u64 = 1_700_000_000;

/// Chain type used by fixtures: real Ed25519 verification, manual clock.
pub type FixtureChain = Chain<Ed25519Verifier, Arc<ManualClock>>;

/// A wallet that can answer ownership challenges.
#[derive(Debug, Clone)]
pub struct TestWallet {
    pub keypair: Keypair,
}

impl TestWallet {
    /// Create a wallet with a random keypair.
    pub fn new() -> Self {
        Self {
            keypair: Keypair::generate(),
        }
    }

    /// Create with a deterministic keypair from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self {
            keypair: Keypair::from_seed(&seed),
        }
    }

    pub fn address(&self) -> String {
        self.keypair.address()
    }

    /// Sign a challenge, returning the hex signature.
    pub fn sign(&self, message: &str) -> String {
        self.keypair.sign(message.as_bytes()).to_hex()
    }
}

impl Default for TestWallet {
    fn default() -> Self {
        Self::new()
    }
}

/// A chain on a manual clock.
pub struct TestFixture {
    pub chain: FixtureChain,
    pub clock: Arc<ManualClock>,
}

impl TestFixture {
    /// Create a fixture with the default configuration.
    pub fn new() -> Self {
        Self::with_config(ChainConfig::default())
    }

    pub fn with_config(config: ChainConfig) -> Self {
        let clock = Arc::new(ManualClock::new(FIXTURE_EPOCH));
        let chain = Chain::with_components(config, Ed25519Verifier, Arc::clone(&clock))
            .expect("default genesis payload always encodes");
        Self { chain, clock }
    }

    /// Run the whole workflow for `wallet`: challenge, sign, submit.
    pub async fn register_star(&self, wallet: &TestWallet, star: Value) -> Result<Block> {
        let address = wallet.address();
        let message = self.chain.request_ownership_verification(&address);
        let signature = wallet.sign(&message);
        self.chain
            .submit_star(&address, &message, &signature, star)
            .await
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create multiple wallets for multi-party tests.
pub fn multi_party_wallets(count: usize) -> Vec<TestWallet> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[0] = i as u8;
            seed[1] = (i >> 8) as u8;
            TestWallet::with_seed(seed)
        })
        .collect()
}
