//! Block: the unit of the ledger.
//!
//! A block carries an opaque application record, hex-encoded UTF-8 JSON, and
//! is bound to its predecessor by hash. The chain stamps height, time, and
//! previous hash when it appends; after that a block is never edited.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::canonical::canonical_block_bytes;
use crate::error::{CoreError, Result};
use crate::types::BlockHash;

/// Height reserved for the genesis block.
pub const GENESIS_HEIGHT: u64 = 0;

/// A block in the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Digest over every other field. `None` until the block is sealed.
    pub hash: Option<BlockHash>,

    /// Position in the chain; 0 is genesis.
    pub height: u64,

    /// Payload as hex(utf8(json(record))).
    pub body: String,

    /// Seconds since the Unix epoch at which the block was appended.
    pub time: u64,

    /// Hash of the block at `height - 1`; `None` for genesis.
    pub previous_block_hash: Option<BlockHash>,
}

impl Block {
    /// Create an unsealed block holding `record`.
    pub fn new<T: Serialize + ?Sized>(record: &T) -> Result<Self> {
        Ok(Self {
            hash: None,
            height: GENESIS_HEIGHT,
            body: encode_payload(record)?,
            time: 0,
            previous_block_hash: None,
        })
    }

    /// Re-derive the digest from the block's fields, ignoring `hash`.
    pub fn compute_hash(&self) -> BlockHash {
        BlockHash::digest(&canonical_block_bytes(self))
    }

    /// Check that the stored hash matches the block's contents.
    ///
    /// An unsealed block never validates.
    pub fn validate(&self) -> bool {
        self.hash == Some(self.compute_hash())
    }

    pub fn is_genesis(&self) -> bool {
        self.height == GENESIS_HEIGHT
    }

    /// Decode the stored record.
    ///
    /// Returns `Ok(None)` for the genesis block, whose sentinel payload is not
    /// an application record.
    pub fn payload<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        if self.is_genesis() {
            return Ok(None);
        }
        decode_payload(&self.body).map(Some)
    }
}

/// Encode a record as hex(utf8(json(record))).
pub fn encode_payload<T: Serialize + ?Sized>(record: &T) -> Result<String> {
    let json = serde_json::to_vec(record).map_err(|e| CoreError::Encoding(e.to_string()))?;
    Ok(hex::encode(json))
}

/// Decode a body produced by [`encode_payload`].
pub fn decode_payload<T: DeserializeOwned>(body: &str) -> Result<T> {
    let bytes = hex::decode(body).map_err(|e| CoreError::Decoding(format!("hex: {}", e)))?;
    let text =
        std::str::from_utf8(&bytes).map_err(|e| CoreError::Decoding(format!("utf-8: {}", e)))?;
    serde_json::from_str(text).map_err(|e| CoreError::Decoding(format!("json: {}", e)))
}
