//! Key material for transaction signing. `Signer` mirrors `ethers-signers`'s trait split
//! between the signing operation and the concrete key backend, so a future HSM-backed
//! signer slots in without touching callers.

mod keystore;
mod wallet;

pub use keystore::{KeyStore, KeyStoreError};
pub use wallet::LocalWallet;

use async_trait::async_trait;
use synthfi_core::{PublicKey, Signature};

#[async_trait]
pub trait Signer: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn sign_message(&self, message: &[u8]) -> Result<Signature, Self::Error>;

    fn public_key(&self) -> PublicKey;
}
