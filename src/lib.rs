pub mod analysis;
pub mod config;
pub mod delivery;
pub mod engine;
pub mod error;
pub mod models;
pub mod providers;
pub mod storage;
#[cfg(test)]
pub mod test_helpers;
