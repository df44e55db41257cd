//! The Chain: sole owner of the block sequence.
//!
//! All mutation goes through [`Chain::append`], which stamps height, time, and
//! previous hash, seals the block, and pushes it while holding the write
//! guard. Readers take the read guard and receive owned copies, so they see
//! either the sequence before an append or the one after it.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use star_registry_core::{
    validate_blocks, Block, BlockHash, Clock, Ed25519Verifier, OwnershipChallenge,
    SignatureVerifier, StarEntry, StarRecord, SystemClock, ValidationFinding,
};

use crate::error::{RegistryError, Result};

/// Configuration for the Chain.
///
/// Missing fields take their defaults when deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// How long a signed ownership challenge may be used, in seconds.
    pub submission_window_secs: u64,
    /// Text stored in the genesis block's sentinel payload.
    pub genesis_note: String,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            submission_window_secs: 300,
            genesis_note: "Genesis Block".to_string(),
        }
    }
}

/// The block sequence and its cached height.
struct ChainState {
    blocks: Vec<Block>,
    /// Mirror of `blocks.len() - 1`; meaningless while `blocks` is empty.
    height: u64,
}

impl ChainState {
    fn empty() -> Self {
        Self {
            blocks: Vec::new(),
            height: 0,
        }
    }

    /// Seal `block` on top of the current tip and push it.
    fn seal_and_push(&mut self, mut block: Block, now: u64) -> Block {
        block.height = self.blocks.len() as u64;
        block.time = now;
        block.previous_block_hash = self.blocks.last().and_then(|tip| tip.hash);
        block.hash = Some(block.compute_hash());

        self.blocks.push(block.clone());
        self.height = block.height;
        block
    }

    /// Append the genesis block if and only if the chain is empty.
    fn seed_genesis(&mut self, note: &str, now: u64) -> Result<Option<Block>> {
        if !self.blocks.is_empty() {
            return Ok(None);
        }
        let genesis = Block::new(&json!({ "data": note }))?;
        Ok(Some(self.seal_and_push(genesis, now)))
    }
}

/// The main Chain struct.
///
/// Provides:
/// - Ownership challenges and signed star submissions
/// - Lookup by hash, height, and wallet address
/// - Full-chain tamper and link validation
pub struct Chain<V = Ed25519Verifier, C = SystemClock> {
    state: RwLock<ChainState>,
    verifier: V,
    clock: C,
    config: ChainConfig,
}

impl Chain {
    /// Create a chain that verifies Ed25519 wallets against the system clock.
    pub fn new(config: ChainConfig) -> Result<Self> {
        Self::with_components(config, Ed25519Verifier, SystemClock)
    }
}

impl<V: SignatureVerifier, C: Clock> Chain<V, C> {
    /// Create a chain with explicit collaborators.
    ///
    /// The genesis block is appended before this returns, so every other
    /// operation may assume it exists.
    pub fn with_components(config: ChainConfig, verifier: V, clock: C) -> Result<Self> {
        let mut state = ChainState::empty();
        if let Some(genesis) = state.seed_genesis(&config.genesis_note, clock.now_secs())? {
            info!(hash = ?genesis.hash, "seeded genesis block");
        }

        Ok(Self {
            state: RwLock::new(state),
            verifier,
            clock,
            config,
        })
    }

    /// Get the configuration.
    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Seed the genesis block if the chain is empty.
    ///
    /// Returns whether a block was appended. Chains built through the
    /// constructors are already seeded, so this is a no-op for them.
    pub async fn initialize(&self) -> Result<bool> {
        let mut state = self.state.write().await;
        let now = self.clock.now_secs();
        let seeded = state.seed_genesis(&self.config.genesis_note, now)?;
        if let Some(genesis) = &seeded {
            info!(hash = ?genesis.hash, "seeded genesis block");
        }
        Ok(seeded.is_some())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Append
    // ─────────────────────────────────────────────────────────────────────────

    /// Seal `block` on top of the chain and append it.
    ///
    /// Height, time, previous hash, and hash are all overwritten. The whole
    /// sequence runs under the write guard, so concurrent appends never share
    /// a height or a parent.
    pub async fn append(&self, block: Block) -> Block {
        let mut state = self.state.write().await;
        let now = self.clock.now_secs();
        let block = state.seal_and_push(block, now);
        debug!(height = block.height, hash = ?block.hash, "appended block");
        block
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Submission
    // ─────────────────────────────────────────────────────────────────────────

    /// Build the challenge a wallet must sign to prove it owns `address`.
    pub fn request_ownership_verification(&self, address: &str) -> String {
        OwnershipChallenge::new(address, self.clock.now_secs()).to_string()
    }

    /// Register a star for `address`.
    ///
    /// The signature and the challenge age are both checked before the chain
    /// is touched; a rejected submission leaves no trace.
    pub async fn submit_star(
        &self,
        address: &str,
        message: &str,
        signature: &str,
        star: Value,
    ) -> Result<Block> {
        if let Err(e) = self.check_submission(address, message, signature) {
            warn!(address, error = %e, "rejected star submission");
            return Err(e);
        }

        let record = StarRecord {
            address: address.to_string(),
            message: message.to_string(),
            signature: signature.to_string(),
            star,
        };
        let block = Block::new(&record)?;
        Ok(self.append(block).await)
    }

    fn check_submission(&self, address: &str, message: &str, signature: &str) -> Result<()> {
        if !self.verifier.verify(message, address, signature) {
            return Err(RegistryError::InvalidSignature);
        }

        let challenge = OwnershipChallenge::parse(message)
            .map_err(|e| RegistryError::MalformedMessage(e.to_string()))?;

        let now = self.clock.now_secs();
        let window_secs = self.config.submission_window_secs;
        if challenge.is_expired(now, window_secs) {
            return Err(RegistryError::MessageExpired {
                age_secs: challenge.age(now),
                window_secs,
            });
        }

        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Query Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Current height (number of blocks minus one).
    pub async fn height(&self) -> u64 {
        self.state.read().await.height
    }

    /// Number of blocks, genesis included.
    pub async fn len(&self) -> usize {
        self.state.read().await.blocks.len()
    }

    /// The most recently appended block.
    pub async fn tip(&self) -> Option<Block> {
        self.state.read().await.blocks.last().cloned()
    }

    /// First block whose hash equals `hash`.
    pub async fn block_by_hash(&self, hash: &BlockHash) -> Option<Block> {
        let state = self.state.read().await;
        state
            .blocks
            .iter()
            .find(|block| block.hash.as_ref() == Some(hash))
            .cloned()
    }

    /// Block at `height`, if the chain is that tall.
    pub async fn block_by_height(&self, height: u64) -> Option<Block> {
        let index = usize::try_from(height).ok()?;
        self.state.read().await.blocks.get(index).cloned()
    }

    /// Every star registered by `address`, in chain order.
    ///
    /// Blocks whose payload cannot be decoded are logged and skipped.
    pub async fn stars_by_wallet_address(&self, address: &str) -> Vec<StarEntry> {
        let state = self.state.read().await;
        let mut stars = Vec::new();

        for block in state.blocks.iter().filter(|b| !b.is_genesis()) {
            match block.payload::<Value>() {
                Ok(Some(payload)) => stars.extend(StarEntry::from_payload(&payload, address)),
                Ok(None) => {}
                Err(e) => {
                    warn!(height = block.height, error = %e, "skipping undecodable block");
                }
            }
        }

        stars
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Validation
    // ─────────────────────────────────────────────────────────────────────────

    /// Check every non-genesis block for tampering and broken links.
    ///
    /// Runs to completion over the whole chain and returns all findings.
    pub async fn validate_chain(&self) -> Vec<ValidationFinding> {
        let state = self.state.read().await;
        let findings = validate_blocks(&state.blocks);

        if findings.is_empty() {
            info!(height = state.height, "chain validated");
        } else {
            for finding in &findings {
                warn!(height = finding.height(), "{}", finding);
            }
        }
        findings
    }

    /// Apply `edit` to a stored block, bypassing the append protocol.
    #[cfg(test)]
    async fn tamper_with(&self, height: usize, edit: impl FnOnce(&mut Block)) {
        let mut state = self.state.write().await;
        edit(&mut state.blocks[height]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use proptest::prelude::*;
    use star_registry_core::{encode_payload, Keypair, ManualClock};

    const T0: u64 = 1_700_000_000;

    type TestChain = Chain<Ed25519Verifier, Arc<ManualClock>>;

    fn test_chain() -> (TestChain, Arc<ManualClock>) {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let clock = Arc::new(ManualClock::new(T0));
        let chain =
            Chain::with_components(ChainConfig::default(), Ed25519Verifier, Arc::clone(&clock))
                .unwrap();
        (chain, clock)
    }

    async fn submit(chain: &TestChain, wallet: &Keypair, star: Value) -> Result<Block> {
        let address = wallet.address();
        let message = chain.request_ownership_verification(&address);
        let signature = wallet.sign(message.as_bytes()).to_hex();
        chain.submit_star(&address, &message, &signature, star).await
    }

    #[test]
    fn test_config_defaults_fill_missing_fields() {
        let config: ChainConfig = serde_json::from_str(r#"{"submission_window_secs": 60}"#).unwrap();
        assert_eq!(config.submission_window_secs, 60);
        assert_eq!(config.genesis_note, "Genesis Block");
        assert_eq!(serde_json::from_str::<ChainConfig>("{}").unwrap(), ChainConfig::default());
    }

    #[tokio::test]
    async fn test_custom_window_and_genesis_note() {
        let clock = Arc::new(ManualClock::new(T0));
        let config = ChainConfig {
            submission_window_secs: 10,
            genesis_note: "hello".into(),
        };
        let chain = Chain::with_components(config, Ed25519Verifier, Arc::clone(&clock)).unwrap();
        let genesis = chain.block_by_height(0).await.unwrap();
        assert_eq!(genesis.body, encode_payload(&json!({"data": "hello"})).unwrap());

        let wallet = Keypair::from_seed(&[0x09; 32]);
        let message = chain.request_ownership_verification(&wallet.address());
        let signature = wallet.sign(message.as_bytes()).to_hex();
        clock.advance(11);
        let result = chain
            .submit_star(&wallet.address(), &message, &signature, json!({}))
            .await;
        assert!(matches!(result, Err(RegistryError::MessageExpired { window_secs: 10, .. })));
    }

    #[tokio::test]
    async fn test_genesis_block() {
        let (chain, _) = test_chain();
        assert_eq!(chain.height().await, 0);
        assert_eq!(chain.len().await, 1);

        let genesis = chain.block_by_height(0).await.unwrap();
        assert_eq!(genesis.height, 0);
        assert_eq!(genesis.time, T0);
        assert!(genesis.previous_block_hash.is_none());
        assert!(genesis.validate());
        assert!(genesis.payload::<Value>().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let (chain, _) = test_chain();
        assert!(!chain.initialize().await.unwrap());
        assert!(!chain.initialize().await.unwrap());
        assert_eq!(chain.len().await, 1);
    }

    #[tokio::test]
    async fn test_append_links_blocks() {
        let (chain, clock) = test_chain();

        for i in 1..=4u64 {
            clock.advance(10);
            let block = chain.append(Block::new(&json!({ "n": i })).unwrap()).await;
            assert_eq!(block.height, i);
            assert_eq!(block.time, T0 + 10 * i);
            assert!(block.validate());
        }

        assert_eq!(chain.height().await, 4);
        for i in 1..=4u64 {
            let block = chain.block_by_height(i).await.unwrap();
            let previous = chain.block_by_height(i - 1).await.unwrap();
            assert_eq!(block.previous_block_hash, previous.hash);
        }
    }

    #[tokio::test]
    async fn test_append_overwrites_caller_fields() {
        let (chain, _) = test_chain();
        let mut raw = Block::new(&json!({})).unwrap();
        raw.height = 99;
        raw.time = 5;
        raw.hash = Some(BlockHash::from_bytes([1; 32]));

        let block = chain.append(raw).await;
        assert_eq!(block.height, 1);
        assert_eq!(block.time, T0);
        assert!(block.validate());
    }

    #[tokio::test]
    async fn test_request_ownership_verification_format() {
        let (chain, _) = test_chain();
        assert_eq!(
            chain.request_ownership_verification("addrX"),
            format!("addrX:{}:starRegistry", T0)
        );
    }

    #[tokio::test]
    async fn test_submit_star_appends_record() {
        let (chain, _) = test_chain();
        let wallet = Keypair::from_seed(&[0x01; 32]);
        let star = json!({"dec": "68° 52' 56.9", "ra": "16h 29m 1.0s", "story": "first"});

        let block = submit(&chain, &wallet, star.clone()).await.unwrap();
        assert_eq!(block.height, 1);

        let record: StarRecord = block.payload().unwrap().unwrap();
        assert_eq!(record.address, wallet.address());
        assert_eq!(record.star, star);
        assert_eq!(chain.tip().await, Some(block));
    }

    #[tokio::test]
    async fn test_invalid_signature_rejected_without_mutation() {
        let (chain, _) = test_chain();
        let owner = Keypair::from_seed(&[0x01; 32]);
        let impostor = Keypair::from_seed(&[0x02; 32]);

        let message = chain.request_ownership_verification(&owner.address());
        let signature = impostor.sign(message.as_bytes()).to_hex();

        let result = chain
            .submit_star(&owner.address(), &message, &signature, json!({}))
            .await;
        assert!(matches!(result, Err(RegistryError::InvalidSignature)));
        assert_eq!(chain.len().await, 1);
    }

    #[tokio::test]
    async fn test_expiry_window_boundaries() {
        let (chain, clock) = test_chain();
        let wallet = Keypair::from_seed(&[0x03; 32]);
        let address = wallet.address();

        let message = chain.request_ownership_verification(&address);
        let signature = wallet.sign(message.as_bytes()).to_hex();

        clock.advance(299);
        assert!(chain
            .submit_star(&address, &message, &signature, json!("ok"))
            .await
            .is_ok());

        clock.advance(2);
        let result = chain
            .submit_star(&address, &message, &signature, json!("late"))
            .await;
        assert!(matches!(
            result,
            Err(RegistryError::MessageExpired {
                age_secs: 301,
                window_secs: 300
            })
        ));
        assert_eq!(chain.len().await, 2);
    }

    #[tokio::test]
    async fn test_signature_is_checked_before_expiry() {
        let (chain, clock) = test_chain();
        let wallet = Keypair::from_seed(&[0x04; 32]);
        let message = chain.request_ownership_verification(&wallet.address());
        clock.advance(1_000);

        let result = chain
            .submit_star(&wallet.address(), &message, "00", json!({}))
            .await;
        assert!(matches!(result, Err(RegistryError::InvalidSignature)));
    }

    #[tokio::test]
    async fn test_malformed_message_rejected() {
        let (chain, _) = test_chain();
        let wallet = Keypair::from_seed(&[0x05; 32]);
        let message = "hello";
        let signature = wallet.sign(message.as_bytes()).to_hex();

        let result = chain
            .submit_star(&wallet.address(), message, &signature, json!({}))
            .await;
        assert!(matches!(result, Err(RegistryError::MalformedMessage(_))));
        assert_eq!(chain.len().await, 1);
    }

    #[tokio::test]
    async fn test_lookup_by_hash_and_height() {
        let (chain, _) = test_chain();
        let wallet = Keypair::from_seed(&[0x06; 32]);
        let block = submit(&chain, &wallet, json!(1)).await.unwrap();
        let hash = block.hash.unwrap();

        assert_eq!(chain.block_by_hash(&hash).await, Some(block.clone()));
        assert_eq!(chain.block_by_height(1).await, Some(block));
        assert!(chain.block_by_hash(&BlockHash::from_bytes([0; 32])).await.is_none());
        assert!(chain.block_by_height(2).await.is_none());
        assert!(chain.block_by_height(u64::MAX).await.is_none());
    }

    #[tokio::test]
    async fn test_stars_by_wallet_address_filters_and_orders() {
        let (chain, _) = test_chain();
        let alice = Keypair::from_seed(&[0x0a; 32]);
        let bob = Keypair::from_seed(&[0x0b; 32]);

        submit(&chain, &alice, json!("a1")).await.unwrap();
        submit(&chain, &bob, json!("b1")).await.unwrap();
        submit(&chain, &alice, json!("a2")).await.unwrap();

        let stars = chain.stars_by_wallet_address(&alice.address()).await;
        let values: Vec<Value> = stars.iter().map(|s| s.star.clone()).collect();
        assert_eq!(values, vec![json!("a1"), json!("a2")]);
        assert!(stars.iter().all(|s| s.owner == alice.address()));

        assert!(chain.stars_by_wallet_address("nobody").await.is_empty());
    }

    #[tokio::test]
    async fn test_star_scan_skips_corrupt_blocks() {
        let (chain, _) = test_chain();
        let wallet = Keypair::from_seed(&[0x0c; 32]);
        for star in ["s1", "s2", "s3"] {
            submit(&chain, &wallet, json!(star)).await.unwrap();
        }

        chain.tamper_with(2, |b| b.body = "zz-not-hex".into()).await;

        let stars = chain.stars_by_wallet_address(&wallet.address()).await;
        let values: Vec<Value> = stars.into_iter().map(|s| s.star).collect();
        assert_eq!(values, vec![json!("s1"), json!("s3")]);
    }

    #[tokio::test]
    async fn test_validate_untouched_chain() {
        let (chain, _) = test_chain();
        let wallet = Keypair::from_seed(&[0x0d; 32]);
        for i in 0..5 {
            submit(&chain, &wallet, json!(i)).await.unwrap();
        }
        assert!(chain.validate_chain().await.is_empty());
    }

    #[tokio::test]
    async fn test_validate_reports_tampered_payload() {
        let (chain, _) = test_chain();
        let wallet = Keypair::from_seed(&[0x0e; 32]);
        for i in 0..4 {
            submit(&chain, &wallet, json!(i)).await.unwrap();
        }

        let forged = encode_payload(&json!({"address": "thief", "star": "stolen"})).unwrap();
        chain.tamper_with(2, |b| b.body = forged).await;

        let findings = chain.validate_chain().await;
        assert_eq!(findings, vec![ValidationFinding::Tampered { height: 2 }]);
        assert_eq!(findings[0].to_string(), "Block #2 is not valid (tampered)");

        // The chain stays readable.
        assert!(chain.block_by_height(2).await.is_some());
    }

    #[tokio::test]
    async fn test_validate_reports_broken_link() {
        let (chain, _) = test_chain();
        let wallet = Keypair::from_seed(&[0x0f; 32]);
        for i in 0..3 {
            submit(&chain, &wallet, json!(i)).await.unwrap();
        }

        chain
            .tamper_with(1, |b| {
                b.time += 1;
                b.hash = Some(b.compute_hash());
            })
            .await;

        let findings = chain.validate_chain().await;
        assert_eq!(findings, vec![ValidationFinding::BrokenLink { height: 2 }]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_appends_serialize() {
        let (chain, _) = test_chain();
        let chain = Arc::new(chain);

        let mut handles = Vec::new();
        for i in 0..32u8 {
            let chain = Arc::clone(&chain);
            handles.push(tokio::spawn(async move {
                let wallet = Keypair::from_seed(&[i; 32]);
                submit(&chain, &wallet, json!(i)).await.unwrap().height
            }));
        }

        let mut heights = Vec::new();
        for handle in handles {
            heights.push(handle.await.unwrap());
        }
        heights.sort_unstable();

        assert_eq!(heights, (1..=32).collect::<Vec<u64>>());
        assert_eq!(chain.height().await, 32);
        assert!(chain.validate_chain().await.is_empty());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn test_any_single_tamper_is_reported_at_its_height(
            len in 1usize..8,
            pick in any::<prop::sample::Index>(),
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let (target, findings) = runtime.block_on(async {
                let (chain, _) = test_chain();
                let wallet = Keypair::from_seed(&[0x10; 32]);
                for i in 0..len {
                    submit(&chain, &wallet, json!(i)).await.unwrap();
                }
                let target = 1 + pick.index(len);
                let forged = encode_payload(&json!({"address": "thief"})).unwrap();
                chain.tamper_with(target, |b| b.body = forged).await;
                (target as u64, chain.validate_chain().await)
            });

            prop_assert_eq!(findings, vec![ValidationFinding::Tampered { height: target }]);
        }
    }
}
