//! Layered TOML configuration, loaded once at startup the way `web3-proxy` loads its
//! `TopConfig`: a single `serde`-derived struct read straight off disk, no live reload.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read { path: String, #[source] source: std::io::Error },

    #[error("failed to parse config file {path}: {source}")]
    Parse { path: String, #[source] source: toml::de::Error },
}

#[derive(Debug, Deserialize, Clone)]
pub struct SolanaEndpointConfig {
    pub http_url: String,
    pub ws_url: String,
    /// Cap on how many pubkeys `getMultipleAccounts` batches per call; the node silently
    /// truncates above its own limit, so this should never exceed 100.
    #[serde(default = "default_max_multiple_accounts")]
    pub max_multiple_accounts: usize,
}

fn default_max_multiple_accounts() -> usize {
    100
}

#[derive(Debug, Deserialize, Clone)]
pub struct FtxAuthenticationConfig {
    pub api_key: String,
    pub api_secret: String,
    #[serde(default)]
    pub subaccount: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct KeyStoreConfig {
    pub directory: String,
    pub mango_owner_wallet: String,
}

/// A traded pair's reference data: which venue quotes it and under what symbols. The
/// runtime treats this table as static configuration, not something the multiplexer
/// discovers at runtime.
#[derive(Debug, Deserialize, Clone)]
pub struct TradingPairConfig {
    pub name: String,
    pub ftx_market: String,
    pub mango_market: String,
    pub base_currency: String,
    pub quote_currency: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CurrencyConfig {
    pub symbol: String,
    pub decimals: u8,
    #[serde(default)]
    pub mint: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ReferenceDataConfig {
    #[serde(default)]
    pub trading_pairs: Vec<TradingPairConfig>,
    #[serde(default)]
    pub currencies: Vec<CurrencyConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub solana: SolanaEndpointConfig,
    pub ftx: FtxAuthenticationConfig,
    pub key_store: KeyStoreConfig,
    pub mango_account: String,
    #[serde(default)]
    pub reference_data: ReferenceDataConfig,
}

impl AppConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_minimal_config() {
        let toml = r#"
            [solana]
            http_url = "https://api.mainnet-beta.solana.com"
            ws_url = "wss://api.mainnet-beta.solana.com"

            [ftx]
            api_key = "key"
            api_secret = "secret"

            [key_store]
            directory = "/etc/synthfi/keys"
            mango_owner_wallet = "mango-owner"

            mango_account = "11111111111111111111111111111111"

            [[reference_data.trading_pairs]]
            name = "SOL/USD"
            ftx_market = "SOL/USD"
            mango_market = "SOL-PERP"
            base_currency = "SOL"
            quote_currency = "USD"
        "#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.solana.max_multiple_accounts, 100);
        assert_eq!(config.ftx.subaccount, None);
        assert_eq!(config.reference_data.trading_pairs.len(), 1);
        assert_eq!(config.reference_data.trading_pairs[0].name, "SOL/USD");
    }
}
