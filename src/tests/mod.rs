#[cfg(test)]
pub mod common;

pub mod auth_retry;
