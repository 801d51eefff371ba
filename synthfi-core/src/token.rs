//! The SPL token mint account layout: a fixed 82-byte struct with no length prefix, so it
//! has to be decoded by byte offset rather than through serde. Offsets below are taken
//! directly from the SPL token program's on-chain account layout.

use crate::account::AccountData;
use crate::error::CoreError;
use crate::keys::PublicKey;

const MINT_ACCOUNT_LEN: usize = 82;

const MINT_AUTHORITY_TAG: usize = 0;
const MINT_AUTHORITY: std::ops::Range<usize> = 1..33;
const SUPPLY: std::ops::Range<usize> = 36..44;
const DECIMALS: usize = 44;
const IS_INITIALIZED: usize = 45;
const FREEZE_AUTHORITY_TAG: usize = 46;
const FREEZE_AUTHORITY: std::ops::Range<usize> = 50..82;

/// Decoded `spl_token::state::Mint` account data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenMintAccount {
    pub mint_authority: Option<PublicKey>,
    pub supply: u64,
    pub decimals: u8,
    pub is_initialized: bool,
    pub freeze_authority: Option<PublicKey>,
}

impl TokenMintAccount {
    pub const LEN: usize = MINT_ACCOUNT_LEN;
}

impl AccountData for TokenMintAccount {
    fn decode(data: &[u8]) -> Result<Self, CoreError> {
        if data.len() != MINT_ACCOUNT_LEN {
            return Err(CoreError::InvalidLength { expected: MINT_ACCOUNT_LEN, got: data.len() });
        }

        let mint_authority = if data[MINT_AUTHORITY_TAG] != 0 {
            Some(PublicKey::from_bytes(data[MINT_AUTHORITY].try_into().unwrap()))
        } else {
            None
        };

        let supply = u64::from_le_bytes(data[SUPPLY].try_into().unwrap());
        let decimals = data[DECIMALS];
        let is_initialized = data[IS_INITIALIZED] != 0;

        let freeze_authority = if data[FREEZE_AUTHORITY_TAG] != 0 {
            Some(PublicKey::from_bytes(data[FREEZE_AUTHORITY].try_into().unwrap()))
        } else {
            None
        };

        Ok(TokenMintAccount { mint_authority, supply, decimals, is_initialized, freeze_authority })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(mint_authority: bool, freeze_authority: bool) -> Vec<u8> {
        let mut buf = vec![0u8; MINT_ACCOUNT_LEN];
        if mint_authority {
            buf[MINT_AUTHORITY_TAG] = 1;
            buf[MINT_AUTHORITY].copy_from_slice(&[1u8; 32]);
        }
        buf[SUPPLY].copy_from_slice(&1_000_000u64.to_le_bytes());
        buf[DECIMALS] = 6;
        buf[IS_INITIALIZED] = 1;
        if freeze_authority {
            buf[FREEZE_AUTHORITY_TAG] = 1;
            buf[FREEZE_AUTHORITY].copy_from_slice(&[2u8; 32]);
        }
        buf
    }

    #[test]
    fn decodes_full_mint() {
        let data = sample(true, true);
        let mint = TokenMintAccount::decode(&data).unwrap();
        assert_eq!(mint.supply, 1_000_000);
        assert_eq!(mint.decimals, 6);
        assert!(mint.is_initialized);
        assert_eq!(mint.mint_authority, Some(PublicKey::from_bytes([1u8; 32])));
        assert_eq!(mint.freeze_authority, Some(PublicKey::from_bytes([2u8; 32])));
    }

    #[test]
    fn decodes_without_optional_authorities() {
        let data = sample(false, false);
        let mint = TokenMintAccount::decode(&data).unwrap();
        assert_eq!(mint.mint_authority, None);
        assert_eq!(mint.freeze_authority, None);
    }

    #[test]
    fn rejects_wrong_length() {
        let data = vec![0u8; 10];
        assert!(TokenMintAccount::decode(&data).is_err());
    }
}
