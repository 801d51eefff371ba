//! Solana's three commitment levels, ordered by strictness. The original implementation
//! kept an `invalid` sentinel at ordinal 0; we drop it since `Commitment` here is only ever
//! constructed from one of the three valid wire spellings, and an invalid string is a parse
//! error rather than a representable value.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Ordered `processed < confirmed < finalized`: a subscriber waiting on `confirmed` is
/// satisfied by a `finalized` notification but not by a `processed` one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    Confirmed,
    Finalized,
}

impl Commitment {
    fn rank(self) -> u8 {
        match self {
            Commitment::Processed => 0,
            Commitment::Confirmed => 1,
            Commitment::Finalized => 2,
        }
    }

    /// True if a notification observed at `self` satisfies a waiter that asked for `wanted`.
    pub fn satisfies(self, wanted: Commitment) -> bool {
        self.rank() >= wanted.rank()
    }
}

impl PartialOrd for Commitment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.rank().cmp(&other.rank()))
    }
}

impl Ord for Commitment {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Commitment::Processed => "processed",
            Commitment::Confirmed => "confirmed",
            Commitment::Finalized => "finalized",
        };
        f.write_str(s)
    }
}

impl FromStr for Commitment {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processed" => Ok(Commitment::Processed),
            "confirmed" => Ok(Commitment::Confirmed),
            "finalized" => Ok(Commitment::Finalized),
            other => Err(CoreError::InvalidCommitment(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_by_strictness() {
        assert!(Commitment::Processed < Commitment::Confirmed);
        assert!(Commitment::Confirmed < Commitment::Finalized);
    }

    #[test]
    fn finalized_satisfies_every_request() {
        assert!(Commitment::Finalized.satisfies(Commitment::Processed));
        assert!(Commitment::Finalized.satisfies(Commitment::Confirmed));
        assert!(Commitment::Finalized.satisfies(Commitment::Finalized));
        assert!(!Commitment::Processed.satisfies(Commitment::Finalized));
    }

    #[test]
    fn rejects_unknown_spelling() {
        assert!("invalid".parse::<Commitment>().is_err());
    }
}
