//! In-memory ledger state and its balance-update rules.

use crate::types::{round_to, LedgerRow, DUST_THRESHOLD, NEW_ROW_DECIMALS};
use std::collections::BTreeMap;
use std::fmt;

/// Ordered mapping from currency code to amount held.
///
/// A code with no entry holds zero. Amounts never go negative: a debit that
/// would leave only dust removes the entry instead.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Balances {
    rows: BTreeMap<String, f64>,
}

/// Result of a [`Balances::debit`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DebitOutcome {
    /// The row now holds this amount.
    Updated(f64),
    /// The remainder was dust and the row was deleted.
    Removed,
    /// Nothing was changed.
    Rejected(DebitRejection),
}

impl DebitOutcome {
    pub fn is_applied(&self) -> bool {
        !matches!(self, DebitOutcome::Rejected(_))
    }
}

/// Why a debit was refused.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DebitRejection {
    /// No row exists for the code.
    MissingCurrency,
    /// The row holds less than the requested amount.
    InsufficientBalance { held: f64 },
}

impl fmt::Display for DebitRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DebitRejection::MissingCurrency => write!(f, "currency not found in ledger"),
            DebitRejection::InsufficientBalance { held } => {
                write!(f, "insufficient balance (held {held})")
            }
        }
    }
}

impl Balances {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build balances from persisted rows. Later duplicates win.
    pub fn from_rows(rows: impl IntoIterator<Item = LedgerRow>) -> Self {
        Self {
            rows: rows.into_iter().map(|r| (r.currency, r.amount)).collect(),
        }
    }

    /// Amount held for `code`, zero when absent.
    pub fn balance(&self, code: &str) -> f64 {
        self.rows.get(code).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.rows.contains_key(code)
    }

    /// All rows in ascending code order.
    pub fn rows(&self) -> Vec<LedgerRow> {
        self.rows
            .iter()
            .map(|(code, amount)| LedgerRow::new(code, *amount))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First amount that is NaN or infinite, if any. Such amounts cannot be
    /// persisted.
    pub fn non_finite(&self) -> Option<f64> {
        self.rows.values().copied().find(|amount| !amount.is_finite())
    }

    /// Drop every row and start over with a single `(code, amount)` row.
    pub fn reset(&mut self, code: &str, amount: f64) {
        self.rows.clear();
        self.rows.insert(code.to_string(), amount);
    }

    /// Add `amount` to `code`, creating the row if needed.
    ///
    /// A new row stores the amount rounded to six decimals; an existing row
    /// stores `old + amount` as is. Callers guarantee `amount >= 0`.
    /// Returns the resulting balance.
    pub fn credit(&mut self, code: &str, amount: f64) -> f64 {
        match self.rows.get_mut(code) {
            Some(current) => {
                *current += amount;
                *current
            }
            None => {
                let stored = round_to(amount, NEW_ROW_DECIMALS);
                self.rows.insert(code.to_string(), stored);
                stored
            }
        }
    }

    /// Subtract `amount` from `code`.
    ///
    /// Refuses without mutating when the row is missing or holds less than
    /// `amount`. A remainder at or below [`DUST_THRESHOLD`] deletes the row.
    pub fn debit(&mut self, code: &str, amount: f64) -> DebitOutcome {
        let Some(current) = self.rows.get(code).copied() else {
            return DebitOutcome::Rejected(DebitRejection::MissingCurrency);
        };

        if current < amount {
            return DebitOutcome::Rejected(DebitRejection::InsufficientBalance { held: current });
        }

        let remaining = current - amount;
        if remaining > DUST_THRESHOLD {
            self.rows.insert(code.to_string(), remaining);
            DebitOutcome::Updated(remaining)
        } else {
            self.rows.remove(code);
            DebitOutcome::Removed
        }
    }
}
