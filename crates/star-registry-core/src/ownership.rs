//! Ownership challenges.
//!
//! A client proves it controls an address by signing a challenge of the form
//! `{address}:{unix_seconds}:starRegistry`. The embedded timestamp bounds how
//! long the signed challenge may be used to submit a star.

use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Trailing tag of every ownership challenge.
pub const CHALLENGE_TAG: &str = "starRegistry";

/// A parsed ownership challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnershipChallenge {
    pub address: String,
    pub timestamp: u64,
}

impl OwnershipChallenge {
    pub fn new(address: impl Into<String>, timestamp: u64) -> Self {
        Self {
            address: address.into(),
            timestamp,
        }
    }

    /// Parse a challenge message.
    ///
    /// Splits from the right so the address itself may contain `:`.
    pub fn parse(message: &str) -> Result<Self, CoreError> {
        let mut parts = message.rsplitn(3, ':');
        let tag = parts.next().unwrap_or_default();
        let timestamp = parts.next();
        let address = parts.next();

        let (Some(timestamp), Some(address)) = (timestamp, address) else {
            return Err(CoreError::MalformedChallenge(format!(
                "expected `address:timestamp:{}`",
                CHALLENGE_TAG
            )));
        };
        if tag != CHALLENGE_TAG {
            return Err(CoreError::MalformedChallenge(format!("unknown tag `{}`", tag)));
        }
        if timestamp.is_empty() || !timestamp.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CoreError::MalformedChallenge(format!(
                "timestamp `{}` is not a whole number of seconds",
                timestamp
            )));
        }
        let timestamp = timestamp
            .parse::<u64>()
            .map_err(|e| CoreError::MalformedChallenge(e.to_string()))?;

        Ok(Self::new(address, timestamp))
    }

    /// Seconds elapsed between the challenge and `now`.
    ///
    /// Challenges stamped in the future have age zero.
    pub fn age(&self, now: u64) -> u64 {
        now.saturating_sub(self.timestamp)
    }

    /// Whether the challenge is older than `window_secs` at `now`.
    pub fn is_expired(&self, now: u64, window_secs: u64) -> bool {
        self.age(now) > window_secs
    }
}

impl fmt::Display for OwnershipChallenge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.address, self.timestamp, CHALLENGE_TAG)
    }
}

impl FromStr for OwnershipChallenge {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
