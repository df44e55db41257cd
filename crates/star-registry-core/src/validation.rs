//! Chain validation: per-block tamper checks and hash-link checks.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::block::Block;

/// A problem found while validating a chain.
///
/// Findings are reported, never raised; the chain stays readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationFinding {
    /// The stored hash does not match the block's contents.
    Tampered { height: u64 },
    /// `previous_block_hash` does not match the hash of the block before it.
    BrokenLink { height: u64 },
}

impl ValidationFinding {
    pub fn height(&self) -> u64 {
        match self {
            Self::Tampered { height } | Self::BrokenLink { height } => *height,
        }
    }
}

impl fmt::Display for ValidationFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tampered { height } => write!(f, "Block #{} is not valid (tampered)", height),
            Self::BrokenLink { height } => {
                write!(f, "Block #{} has invalid previous block hash", height)
            }
        }
    }
}

/// Validate every non-genesis block of `blocks`, in order.
///
/// `blocks[i]` is taken to sit at height `i`. Both checks run for every
/// block, so a tampered block still has its link checked.
pub fn validate_blocks(blocks: &[Block]) -> Vec<ValidationFinding> {
    let mut findings = Vec::new();

    for (index, pair) in blocks.windows(2).enumerate() {
        let (previous, block) = (&pair[0], &pair[1]);
        let height = index as u64 + 1;

        if !block.validate() {
            findings.push(ValidationFinding::Tampered { height });
        }
        if block.previous_block_hash != previous.hash {
            findings.push(ValidationFinding::BrokenLink { height });
        }
    }

    findings
}
