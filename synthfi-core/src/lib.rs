//! Wire-level primitives shared by every Synthfi client crate: base58 key types, the
//! `Commitment` ordering, account decoding, and the JSON-RPC envelope used over both
//! the HTTP and websocket transports.

mod account;
mod codec;
mod commitment;
mod error;
mod jsonrpc;
mod keys;
pub mod statistics;
mod token;

pub use account::AccountInfo;
pub use commitment::Commitment;
pub use error::{CoreError, RpcError};
pub use jsonrpc::{JsonRpcError, Notification, Request, Response};
pub use keys::{Hash, PublicKey, Signature};
pub use statistics::{NoopStatisticsSink, StatisticSample, StatisticsSink, TracingStatisticsSink};
pub use token::TokenMintAccount;
