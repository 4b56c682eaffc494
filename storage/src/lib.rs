mod chain;
mod engine;
mod schema;

pub use chain::{chain_hmac, ZERO_HMAC};
pub use engine::Storage;
