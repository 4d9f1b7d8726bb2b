//! Buy, sell, deposit and reset workflows over a [`Ledger`].
//!
//! Each workflow checks its precondition and applies its writes inside one
//! [`Ledger::transaction`], so a refused trade never leaves a half-applied
//! ledger behind.

use crate::coins::Coin;
use crate::ledger::{Ledger, LedgerStorage};
use crate::types::{round_to, Trade, TradeSide, USD};
use crate::{Error, Result};

/// Cost shown to the user before confirming a trade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    pub coin: Coin,
    pub quantity: f64,
    pub price: f64,
    /// `quantity * price`, rounded to four decimals
    pub total: f64,
}

/// Price `quantity` of `coin` at `price`.
pub fn quote(coin: Coin, quantity: f64, price: f64) -> Quote {
    Quote {
        coin,
        quantity,
        price,
        total: round_to(quantity * price, 4),
    }
}

fn check_amount(amount: f64) -> Result<f64> {
    if amount.is_finite() && amount >= 0.0 {
        Ok(amount)
    } else {
        Err(Error::InvalidAmount(amount))
    }
}

fn check_quantity(quantity: f64) -> Result<f64> {
    match check_amount(quantity)? {
        q if q > 0.0 => Ok(q),
        q => Err(Error::InvalidAmount(q)),
    }
}

/// Start the simulation over with `amount` USD. All other balances are lost.
pub fn reset_balance<S: LedgerStorage>(ledger: &mut Ledger<S>, amount: f64) -> Result<()> {
    let amount = check_amount(amount)?;
    ledger.reset(USD, amount)?;
    tracing::info!("Ledger reset to {} USD", amount);
    Ok(())
}

/// Add `amount` USD. Returns the new USD balance.
pub fn deposit<S: LedgerStorage>(ledger: &mut Ledger<S>, amount: f64) -> Result<f64> {
    let amount = check_amount(amount)?;
    let balance = ledger.credit(USD, amount)?;
    tracing::info!("Deposited {} USD, balance {}", amount, balance);
    Ok(balance)
}

/// Spend `quantity * price` USD on `quantity` of `coin`.
pub fn buy<S: LedgerStorage>(
    ledger: &mut Ledger<S>,
    coin: Coin,
    quantity: f64,
    price: f64,
) -> Result<Trade> {
    let quantity = check_quantity(quantity)?;
    let price = check_amount(price)?;
    let required = quantity * price;

    ledger.transaction(|tx| {
        let available = tx.balance(USD);
        if available < required {
            return Err(Error::InsufficientFunds {
                required,
                available,
            });
        }

        tx.debit(USD, required);
        tx.credit(coin.id(), quantity);
        Ok(())
    })?;

    tracing::info!("Bought {} {} at {} USD", quantity, coin, price);
    Ok(Trade::new(coin.id(), TradeSide::Buy, quantity, price))
}

/// Sell `quantity` of `coin` for `quantity * price` USD.
pub fn sell<S: LedgerStorage>(
    ledger: &mut Ledger<S>,
    coin: Coin,
    quantity: f64,
    price: f64,
) -> Result<Trade> {
    let quantity = check_quantity(quantity)?;
    let price = check_amount(price)?;

    ledger.transaction(|tx| {
        let held = tx.balance(coin.id());
        if held < quantity {
            return Err(Error::InsufficientHoldings {
                coin: coin.id().to_string(),
                requested: quantity,
                held,
            });
        }

        tx.debit(coin.id(), quantity);
        tx.credit(USD, quantity * price);
        Ok(())
    })?;

    tracing::info!("Sold {} {} at {} USD", quantity, coin, price);
    Ok(Trade::new(coin.id(), TradeSide::Sell, quantity, price))
}

/// Run `side` for `quantity` of `coin` at `price`.
pub fn execute<S: LedgerStorage>(
    ledger: &mut Ledger<S>,
    side: TradeSide,
    coin: Coin,
    quantity: f64,
    price: f64,
) -> Result<Trade> {
    match side {
        TradeSide::Buy => buy(ledger, coin, quantity, price),
        TradeSide::Sell => sell(ledger, coin, quantity, price),
    }
}
