pub mod token;
pub mod token_cache;
pub mod token_store;
