// DEX Quote Aggregator Library

pub mod catalog;
pub mod common;
pub mod config;
pub mod dex;
pub mod mocks;
pub mod wallet;

// Core types
pub mod constants;
pub mod types;

// Re-exports for convenience
pub use catalog::Catalog;
pub use config::Config;
pub use dex::{QuoteSession, RandomSource, RequestOutcome};
pub use wallet::{WalletListener, WalletProvider, WalletSessionManager};

pub use common::formatting::*;
pub use common::validation::*;
pub use types::*;
