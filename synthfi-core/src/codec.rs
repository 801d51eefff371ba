//! Base58/base64 helpers shared by the fixed-size key types and account decoders.

use crate::error::CoreError;

pub fn decode_base58_fixed<const N: usize>(s: &str) -> Result<[u8; N], CoreError> {
    let bytes = bs58::decode(s)
        .into_vec()
        .map_err(|e| CoreError::Base58(e.to_string()))?;
    <[u8; N]>::try_from(bytes.as_slice())
        .map_err(|_| CoreError::InvalidLength { expected: N, got: bytes.len() })
}

pub fn encode_base58(bytes: &[u8]) -> String {
    bs58::encode(bytes).into_string()
}

pub fn decode_base64(s: &str) -> Result<Vec<u8>, CoreError> {
    use base64::Engine as _;
    base64::engine::general_purpose::STANDARD
        .decode(s)
        .map_err(|e| CoreError::Base64(e.to_string()))
}
