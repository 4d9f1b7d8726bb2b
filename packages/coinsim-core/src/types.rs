//! Core data types for the coinsim ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ledger code of the simulated cash balance.
pub const USD: &str = "USD";

/// Balances at or below this amount are treated as zero and their row removed.
pub const DUST_THRESHOLD: f64 = 0.00001;

/// Decimal places kept when a credit creates a new row.
pub const NEW_ROW_DECIMALS: i32 = 6;

/// One row of the ledger: a currency code and the amount held.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerRow {
    /// `USD` or a canonical coin id such as `bitcoin`
    pub currency: String,
    /// Amount held, never negative
    pub amount: f64,
}

impl LedgerRow {
    pub fn new(currency: &str, amount: f64) -> Self {
        Self {
            currency: currency.to_string(),
            amount,
        }
    }

    /// Whether this row holds the USD cash balance.
    pub fn is_usd(&self) -> bool {
        self.currency == USD
    }
}

/// A completed trade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    /// Canonical coin id
    pub coin: String,
    /// Buy or Sell
    pub side: TradeSide,
    /// Coin quantity
    pub quantity: f64,
    /// USD price per coin at execution
    pub price: f64,
    /// USD moved by the trade (quantity * price)
    pub value: f64,
    /// When the trade was executed
    pub executed_at: DateTime<Utc>,
}

impl Trade {
    /// Create a new trade.
    pub fn new(coin: &str, side: TradeSide, quantity: f64, price: f64) -> Self {
        Self {
            coin: coin.to_string(),
            side,
            quantity,
            price,
            value: quantity * price,
            executed_at: Utc::now(),
        }
    }
}

/// Trade direction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    /// Verb used in prompts and confirmations.
    pub fn verb(&self) -> &'static str {
        match self {
            TradeSide::Buy => "buy",
            TradeSide::Sell => "sell",
        }
    }

    /// Past tense of [`TradeSide::verb`].
    pub fn past_tense(&self) -> &'static str {
        match self {
            TradeSide::Buy => "bought",
            TradeSide::Sell => "sold",
        }
    }
}

/// Envelope for machine-readable CLI output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response.
    pub fn err(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

/// Round `value` to `decimals` decimal places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_row_is_usd() {
        assert!(LedgerRow::new("USD", 10.0).is_usd());
        assert!(!LedgerRow::new("bitcoin", 1.0).is_usd());
    }

    #[test]
    fn test_trade_new() {
        let trade = Trade::new("bitcoin", TradeSide::Buy, 100.0, 2.0);
        assert_eq!(trade.coin, "bitcoin");
        assert_eq!(trade.value, 200.0);
        assert_eq!(trade.side.verb(), "buy");
        assert_eq!(trade.side.past_tense(), "bought");
    }

    #[test]
    fn test_trade_side_serializes_lowercase() {
        let json = serde_json::to_string(&TradeSide::Sell).unwrap();
        assert_eq!(json, "\"sell\"");
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.1234567, 6), 0.123457);
        assert_eq!(round_to(12.345678, 4), 12.3457);
        assert_eq!(round_to(5.0, 6), 5.0);
    }

    #[test]
    fn test_api_response() {
        let response: ApiResponse<String> = ApiResponse::ok("test".to_string());
        assert!(response.ok);
        assert_eq!(response.data, Some("test".to_string()));

        let err_response: ApiResponse<String> = ApiResponse::err("error");
        assert!(!err_response.ok);
        assert_eq!(err_response.error, Some("error".to_string()));
    }
}
