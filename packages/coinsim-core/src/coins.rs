//! Supported coins and the alias table used to resolve user input.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Human-readable list of accepted codes, for error messages.
pub const SUPPORTED_COINS: &str = "btc/bitcoin, eth/ethereum, doge/dogecoin, xrp/ripple";

/// A coin the simulator can trade.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Coin {
    Bitcoin,
    Ethereum,
    Dogecoin,
    Xrp,
}

impl Coin {
    pub const ALL: [Coin; 4] = [Coin::Bitcoin, Coin::Ethereum, Coin::Dogecoin, Coin::Xrp];

    /// Canonical id, used as the price search term and the ledger code.
    pub fn id(&self) -> &'static str {
        match self {
            Coin::Bitcoin => "bitcoin",
            Coin::Ethereum => "ethereum",
            Coin::Dogecoin => "dogecoin",
            Coin::Xrp => "xrp",
        }
    }

    /// Every input string that resolves to this coin.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Coin::Bitcoin => &["btc", "bitcoin"],
            Coin::Ethereum => &["eth", "ethereum"],
            Coin::Dogecoin => &["doge", "dogecoin"],
            Coin::Xrp => &["xrp", "ripple"],
        }
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Lower-case alias → coin.
pub static COIN_ALIASES: LazyLock<HashMap<&'static str, Coin>> = LazyLock::new(|| {
    Coin::ALL
        .iter()
        .flat_map(|coin| coin.aliases().iter().map(move |alias| (*alias, *coin)))
        .collect()
});

/// Resolve a coin code or name, ignoring case and surrounding whitespace.
pub fn resolve_coin(input: &str) -> Option<Coin> {
    COIN_ALIASES
        .get(input.trim().to_lowercase().as_str())
        .copied()
}

impl FromStr for Coin {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        resolve_coin(s).ok_or_else(|| Error::UnsupportedCoin(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitcoin_aliases() {
        for input in ["btc", "BTC", "bitcoin", "BitCoin", "  btc "] {
            assert_eq!(resolve_coin(input), Some(Coin::Bitcoin), "input {input:?}");
        }
    }

    #[test]
    fn test_ripple_maps_to_xrp() {
        assert_eq!(resolve_coin("ripple"), Some(Coin::Xrp));
        assert_eq!(resolve_coin("XRP"), Some(Coin::Xrp));
        assert_eq!(Coin::Xrp.id(), "xrp");
    }

    #[test]
    fn test_other_coins() {
        assert_eq!(resolve_coin("eth"), Some(Coin::Ethereum));
        assert_eq!(resolve_coin("Doge"), Some(Coin::Dogecoin));
        assert_eq!(resolve_coin("dogecoin"), Some(Coin::Dogecoin));
    }

    #[test]
    fn test_unknown_is_not_found() {
        assert_eq!(resolve_coin("foobar"), None);
        assert_eq!(resolve_coin("bit"), None);
        assert_eq!(resolve_coin("bitcoins"), None);
        assert_eq!(resolve_coin(""), None);
    }

    #[test]
    fn test_from_str_error_names_supported_set() {
        let err = "foobar".parse::<Coin>().unwrap_err();
        assert!(matches!(err, Error::UnsupportedCoin(ref s) if s == "foobar"));
        assert!(err.to_string().contains(SUPPORTED_COINS));
    }

    #[test]
    fn test_alias_table_covers_every_coin() {
        assert_eq!(COIN_ALIASES.len(), 8);
        for coin in Coin::ALL {
            assert_eq!(resolve_coin(coin.id()), Some(coin));
        }
    }
}
