//! AIChainX marketplace client library
//!
//! Catalog browsing, the upload wizard with its on-chain mint, email/password
//! sessions and the terminal pages that render them.

pub mod auth;
pub mod catalog;
pub mod cli;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod detail;
pub mod display;
pub mod error;
pub mod filter;
pub mod identity;
pub mod shell;
pub mod store;
pub mod ui;
pub mod version;
pub mod wallet;
pub mod wizard;

pub use error::{ErrorCode, MarketError, Result};

#[cfg(test)]
mod tests {
    pub mod mocks;
    pub mod utils;
}
