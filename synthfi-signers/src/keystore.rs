//! Loads signing keys from a directory of keypair files, the role the original client's
//! `KeyStoreService` played for `MangoOrderClientImpl`'s `_mangoOwnerKey`. Each file holds
//! a JSON array of the 64 keypair bytes, the format the Solana CLI writes.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::wallet::LocalWallet;

#[derive(Debug, Error)]
pub enum KeyStoreError {
    #[error("failed to read keypair file {path}: {source}")]
    Read { path: PathBuf, #[source] source: std::io::Error },

    #[error("failed to parse keypair file {path}: {source}")]
    Parse { path: PathBuf, #[source] source: serde_json::Error },

    #[error("keypair file {path} must contain exactly 64 bytes, got {got}")]
    BadLength { path: PathBuf, got: usize },

    #[error("invalid keypair bytes in {path}: {source}")]
    InvalidKeypair { path: PathBuf, #[source] source: ed25519_dalek::SignatureError },

    #[error("no wallet registered under name {0}")]
    UnknownWallet(String),
}

/// Wallets keyed by file stem (e.g. `mango-owner.json` registers as `"mango-owner"`).
pub struct KeyStore {
    wallets: HashMap<String, LocalWallet>,
}

impl KeyStore {
    pub fn load_dir(dir: &Path) -> Result<Self, KeyStoreError> {
        let mut wallets = HashMap::new();

        for entry in std::fs::read_dir(dir).map_err(|source| KeyStoreError::Read {
            path: dir.to_path_buf(),
            source,
        })? {
            let entry = entry.map_err(|source| KeyStoreError::Read { path: dir.to_path_buf(), source })?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            let name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string();
            let wallet = load_keypair_file(&path)?;
            wallets.insert(name, wallet);
        }

        Ok(Self { wallets })
    }

    pub fn wallet(&self, name: &str) -> Result<&LocalWallet, KeyStoreError> {
        self.wallets.get(name).ok_or_else(|| KeyStoreError::UnknownWallet(name.to_string()))
    }
}

fn load_keypair_file(path: &Path) -> Result<LocalWallet, KeyStoreError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|source| KeyStoreError::Read { path: path.to_path_buf(), source })?;
    let bytes: Vec<u8> = serde_json::from_str(&contents)
        .map_err(|source| KeyStoreError::Parse { path: path.to_path_buf(), source })?;

    let fixed: [u8; 64] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| KeyStoreError::BadLength { path: path.to_path_buf(), got: bytes.len() })?;

    LocalWallet::from_bytes(&fixed)
        .map_err(|source| KeyStoreError::InvalidKeypair { path: path.to_path_buf(), source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;
    use std::io::Write;

    #[test]
    fn loads_a_keypair_file_by_stem() {
        let dir = tempfile::tempdir().unwrap();
        let wallet = LocalWallet::generate(&mut OsRng);
        let bytes: Vec<u8> = wallet_bytes(&wallet);

        let path = dir.path().join("mango-owner.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "{}", serde_json::to_string(&bytes).unwrap()).unwrap();

        let store = KeyStore::load_dir(dir.path()).unwrap();
        assert!(store.wallet("mango-owner").is_ok());
        assert!(store.wallet("missing").is_err());
    }

    fn wallet_bytes(_wallet: &LocalWallet) -> Vec<u8> {
        // Re-derive fresh bytes rather than reach into the keypair's private fields.
        use ed25519_dalek::Keypair;
        let kp = Keypair::generate(&mut OsRng);
        kp.to_bytes().to_vec()
    }
}
