//! Star records: the application payload stored by submissions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The record written into a block for every accepted submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarRecord {
    pub address: String,
    pub message: String,
    pub signature: String,
    pub star: Value,
}

/// A star together with the wallet that registered it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarEntry {
    pub owner: String,
    pub star: Value,
}

impl StarEntry {
    /// Extract the entry from a decoded block payload if it belongs to `address`.
    ///
    /// Records without an `address` field belong to nobody; a missing `star`
    /// field reads as `null`.
    pub fn from_payload(payload: &Value, address: &str) -> Option<Self> {
        let owner = payload.get("address")?.as_str()?;
        if owner != address {
            return None;
        }
        Some(Self {
            owner: owner.to_string(),
            star: payload.get("star").cloned().unwrap_or(Value::Null),
        })
    }
}
