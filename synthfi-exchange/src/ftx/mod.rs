mod order;
mod rest;
mod wallet;
mod ws;

pub use order::FtxOrderClient;
pub use rest::{FtxAuthenticationConfig, FtxRestClient};
pub use wallet::FtxWalletClient;
pub use ws::FtxWsClient;
