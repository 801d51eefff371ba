use async_trait::async_trait;
use ed25519_dalek::{Keypair, Signer as _};
use synthfi_core::{PublicKey, Signature};

use crate::Signer;

/// An in-memory ed25519 keypair, the direct counterpart to the original client's
/// `_mangoOwnerKey`: one keypair authorizing every order/wallet operation for an account.
pub struct LocalWallet {
    keypair: Keypair,
}

impl LocalWallet {
    pub fn from_bytes(secret_and_public: &[u8; 64]) -> Result<Self, ed25519_dalek::SignatureError> {
        Ok(Self { keypair: Keypair::from_bytes(secret_and_public)? })
    }

    pub fn generate<R: rand::RngCore + rand::CryptoRng>(rng: &mut R) -> Self {
        Self { keypair: Keypair::generate(rng) }
    }
}

#[async_trait]
impl Signer for LocalWallet {
    type Error = std::convert::Infallible;

    async fn sign_message(&self, message: &[u8]) -> Result<Signature, Self::Error> {
        let sig = self.keypair.sign(message);
        Ok(Signature::from_bytes(sig.to_bytes()))
    }

    fn public_key(&self) -> PublicKey {
        PublicKey::from_bytes(self.keypair.public.to_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    #[tokio::test]
    async fn signs_and_reports_a_stable_public_key() {
        let wallet = LocalWallet::generate(&mut OsRng);
        let pubkey = wallet.public_key();
        let sig = wallet.sign_message(b"order payload").await.unwrap();
        assert_eq!(sig.as_bytes().len(), 64);
        assert_eq!(wallet.public_key(), pubkey);
    }
}
