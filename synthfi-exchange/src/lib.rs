//! Order and wallet clients for the two venues this runtime trades against: FTX (a
//! conventional signed-REST exchange) and Mango (an on-chain Solana market, driven through
//! `synthfi-providers`). Each client collapses the original per-venue
//! service/service-provider/impl split into a single struct owning its own executor
//! state, the way a modern async Rust client owns a `reqwest::Client` or an
//! `EngineHandle` directly rather than through an extra thread-and-io_context layer.

mod order;
mod wallet;

pub mod ftx;
pub mod mango;

pub use order::{Order, OrderError, OrderSide, OrderStatus, OrderType};
pub use wallet::Wallet;
