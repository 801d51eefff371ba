//! CEX/DEX market-making runtime: subscription-multiplexing clients for a Solana node
//! and the FTX exchange, assembled from four library crates.
//!
//! ## `core`
//!
//! Wire primitives shared by every other crate: the JSON-RPC envelope, base58/base64
//! keys, commitment levels, and the `AccountInfo`/`TokenMintAccount` account decoders.
//!
//! ## `providers`
//!
//! The Solana JSON-RPC pub/sub client: one actor owns the websocket, the request
//! correlator, and the subscription mux so at most one upstream subscription exists per
//! resource no matter how many local callers ask for it.
//!
//! ## `signers`
//! `ed25519-dalek` keypair signing behind a `Signer` trait, plus a directory-backed
//! `KeyStore`.
//!
//! ## `exchange`
//!
//! Order and wallet clients for FTX (signed REST + a websocket login/subscribe
//! protocol) and Mango (submit-then-confirm over the Solana pub/sub client).
//!
//! A [`prelude`] module re-exports the commonly needed types from all four crates, plus
//! this crate's own [`config`], [`error`], [`logging`], and [`statistics`] modules.

pub mod config;
pub mod error;
pub mod logging;
pub mod statistics;

pub mod core {
    pub use synthfi_core::*;
}

pub mod providers {
    pub use synthfi_providers::*;
}

pub mod signers {
    pub use synthfi_signers::*;
}

pub mod exchange {
    pub use synthfi_exchange::*;
}

pub use crate::config::AppConfig;
pub use crate::error::SynthfiError;
pub use crate::statistics::{NoopStatisticsSink, StatisticSample, StatisticsSink, TracingStatisticsSink};

pub mod prelude {
    pub use super::config::*;
    pub use super::core::*;
    pub use super::error::SynthfiError;
    pub use super::exchange::*;
    pub use super::providers::*;
    pub use super::signers::*;
    pub use super::statistics::*;
}
