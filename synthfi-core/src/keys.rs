//! Fixed-size, base58-on-the-wire key types. Solana addresses, transaction signatures and
//! block hashes are all opaque byte arrays that only differ in length; we give each its
//! own newtype so a `PublicKey` can't be passed where a `Signature` is expected, the same
//! discipline ethers applies to `Address`/`H256`/`Signature`.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::codec::{decode_base58_fixed, encode_base58};
use crate::error::CoreError;

macro_rules! fixed_base58_type {
    ($name:ident, $len:expr, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            pub const LEN: usize = $len;

            pub fn from_bytes(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&encode_base58(&self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(decode_base58_fixed::<$len>(s)?))
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                serializer.serialize_str(&self.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(de::Error::custom)
            }
        }
    };
}

fixed_base58_type!(PublicKey, 32, "A 32-byte Solana account or program address.");
fixed_base58_type!(Signature, 64, "A 64-byte ed25519 transaction signature.");
fixed_base58_type!(Hash, 32, "A 32-byte blockhash, as returned by `getRecentBlockhash`.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_through_base58() {
        let key = PublicKey([7u8; 32]);
        let s = key.to_string();
        let parsed: PublicKey = s.parse().unwrap();
        assert_eq!(key, parsed);
    }

    #[test]
    fn roundtrips_through_serde() {
        let key = PublicKey([9u8; 32]);
        let json = serde_json::to_string(&key).unwrap();
        let parsed: PublicKey = serde_json::from_str(&json).unwrap();
        assert_eq!(key, parsed);
    }

    #[test]
    fn rejects_wrong_length() {
        let short = bs58::encode([1u8; 10]).into_string();
        assert!(short.parse::<PublicKey>().is_err());
    }
}
