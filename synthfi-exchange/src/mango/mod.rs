mod order;
mod wallet;

pub use order::MangoOrderClient;
pub use wallet::MangoWalletClient;
