use std::collections::HashMap;

/// A venue-tagged balance/position snapshot. `FtxWalletClient` and `MangoWalletClient`
/// each produce this from a different upstream shape (an FTX REST/WS balance record vs.
/// a decoded on-chain margin account) so callers work against one type regardless of venue.
#[derive(Clone, Debug, PartialEq)]
pub struct Wallet {
    pub venue: &'static str,
    pub currency: String,
    pub total: f64,
    pub available: f64,
    pub extra: HashMap<String, f64>,
}
