//! Coinsim Core - paper-trading ledger for simulated crypto trades.
//!
//! This crate provides everything behind the `coinsim` command:
//!
//! - **Ledger**: per-currency balances with dust cleanup, persisted as JSON
//! - **Trading**: buy/sell/deposit/reset workflows, each a single commit
//! - **Coins**: fixed alias table for the four supported coins
//! - **Prices**: live USD prices from the CoinCap API
//! - **Reports**: balance table rendering
//!
//! # Example
//!
//! ```rust
//! use coinsim_core::{trade, Coin, Ledger, USD};
//!
//! let mut ledger = Ledger::in_memory();
//! trade::reset_balance(&mut ledger, 1000.0).unwrap();
//!
//! // Buy 100 DOGE at $2.00
//! let fill = trade::buy(&mut ledger, Coin::Dogecoin, 100.0, 2.0).unwrap();
//! assert_eq!(fill.value, 200.0);
//! assert_eq!(ledger.balance(USD), 800.0);
//! ```

pub mod coins;
pub mod config;
pub mod ledger;
pub mod price;
pub mod prompt;
pub mod report;
pub mod trade;
pub mod types;

// Re-export commonly used types
pub use coins::{resolve_coin, Coin, SUPPORTED_COINS};
pub use config::Config;
pub use ledger::{DebitOutcome, JsonFileStorage, Ledger, LedgerStorage, MemoryStorage};
pub use price::{CoinCapClient, PriceError, PriceSource};
pub use prompt::Prompt;
pub use report::BalanceReport;
pub use types::{ApiResponse, LedgerRow, Trade, TradeSide, DUST_THRESHOLD, USD};

/// Error types for coinsim-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Unsupported or invalid cryptocurrency '{0}'. Supported: {supported}.", supported = SUPPORTED_COINS)]
    UnsupportedCoin(String),

    #[error(transparent)]
    Price(#[from] PriceError),

    #[error("Insufficient USD funds: need ${required:.2}, have ${available:.2}. Operation cancelled")]
    InsufficientFunds { required: f64, available: f64 },

    #[error("Insufficient {coin} funds: need {requested}, have {held}. Operation cancelled")]
    InsufficientHoldings {
        coin: String,
        requested: f64,
        held: f64,
    },

    #[error("Invalid amount: {0}")]
    InvalidAmount(f64),

    #[error("COINCAP_API_KEY is not set. Set it in the environment or in the config file.")]
    MissingApiKey,

    #[error("Input closed before a valid answer was given")]
    InputClosed,
}

/// Result type for coinsim-core operations.
pub type Result<T> = std::result::Result<T, Error>;
