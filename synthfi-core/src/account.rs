//! `AccountInfo` and its `data` field decoding. The Solana RPC node is inconsistent about
//! how it encodes `data` depending on the `encoding` parameter the caller asked for: a plain
//! JSON string means base58, a two-element `[data, "base64"]` array means base64. We accept
//! both on read (matching the C++ client this was ported from) and always request base64
//! when we issue `accountSubscribe`/`getAccountInfo` ourselves.

use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::codec::decode_base64;
use crate::error::CoreError;
use crate::keys::PublicKey;

/// The value side of an `accountNotification`/`getAccountInfo` response.
#[derive(Clone, Debug, Serialize)]
pub struct AccountInfo {
    pub executable: bool,
    pub lamports: u64,
    pub owner: PublicKey,
    pub data: Vec<u8>,
}

impl AccountInfo {
    /// Deserializes `data` into `T` via `T::decode`, the way the original client's
    /// `account_to<T>` combinator chained account fetch with payload decode.
    pub fn decode_as<T: AccountData>(&self) -> Result<T, CoreError> {
        T::decode(&self.data)
    }
}

/// Implemented by fixed-layout SPL account payloads, e.g. `TokenMintAccount`.
pub trait AccountData: Sized {
    fn decode(data: &[u8]) -> Result<Self, CoreError>;
}

#[derive(Deserialize)]
struct RawAccountInfo {
    executable: bool,
    lamports: u64,
    owner: PublicKey,
    data: AccountData_,
}

impl<'de> Deserialize<'de> for AccountInfo {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawAccountInfo::deserialize(deserializer)?;
        Ok(AccountInfo {
            executable: raw.executable,
            lamports: raw.lamports,
            owner: raw.owner,
            data: raw.data.0,
        })
    }
}

/// Wraps the decoded byte payload; exists only to host the hand-rolled `Deserialize` that
/// dispatches on whether `data` arrived as a bare string (base58) or a `[data, encoding]`
/// pair (base64).
#[allow(non_camel_case_types)]
struct AccountData_(Vec<u8>);

impl<'de> Deserialize<'de> for AccountData_ {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DataVisitor;

        impl<'de> Visitor<'de> for DataVisitor {
            type Value = AccountData_;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a base58 string or a [data, \"base64\"] pair")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                let bytes = bs58::decode(v)
                    .into_vec()
                    .map_err(|_| de::Error::custom("invalid base58 in account data"))?;
                Ok(AccountData_(bytes))
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let encoded: String = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(0, &self))?;
                let _encoding: String = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(1, &self))?;
                let bytes = decode_base64(&encoded).map_err(de::Error::custom)?;
                Ok(AccountData_(bytes))
            }
        }

        deserializer.deserialize_any(DataVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_base64_pair() {
        let raw = r#"{
            "executable": false,
            "lamports": 100,
            "owner": "11111111111111111111111111111111",
            "data": ["aGVsbG8=", "base64"]
        }"#;
        let info: AccountInfo = serde_json::from_str(raw).unwrap();
        assert_eq!(info.data, b"hello");
        assert_eq!(info.lamports, 100);
    }

    #[test]
    fn decodes_base58_string() {
        let encoded = bs58::encode(b"hello").into_string();
        let raw = format!(
            r#"{{"executable": true, "lamports": 1, "owner": "11111111111111111111111111111111", "data": "{encoded}"}}"#
        );
        let info: AccountInfo = serde_json::from_str(&raw).unwrap();
        assert_eq!(info.data, b"hello");
        assert!(info.executable);
    }

    #[test]
    fn rejects_other_shapes() {
        let raw = r#"{
            "executable": false,
            "lamports": 1,
            "owner": "11111111111111111111111111111111",
            "data": 42
        }"#;
        assert!(serde_json::from_str::<AccountInfo>(raw).is_err());
    }
}
