//! Balance ledger keyed by currency code.
//!
//! [`Ledger`] holds the storage handle for the whole run and commits after
//! every mutation. Multi-step updates go through [`Ledger::transaction`],
//! which applies all of their changes with a single commit or none at all.

mod balances;
mod storage;

pub use balances::{Balances, DebitOutcome, DebitRejection};
pub use storage::{JsonFileStorage, LedgerFile, LedgerStorage, MemoryStorage};

use crate::types::LedgerRow;
use crate::{Error, Result};
use std::path::PathBuf;

/// Ledger store bound to one storage backend.
#[derive(Debug)]
pub struct Ledger<S: LedgerStorage = JsonFileStorage> {
    storage: S,
    balances: Balances,
}

impl Ledger<JsonFileStorage> {
    /// Open (or initialize) the JSON ledger at `path`.
    pub fn open_file(path: impl Into<PathBuf>) -> Result<Self> {
        Self::open(JsonFileStorage::open(path)?)
    }
}

impl Ledger<MemoryStorage> {
    /// Ledger that never touches disk.
    pub fn in_memory() -> Self {
        Self {
            storage: MemoryStorage::new(),
            balances: Balances::new(),
        }
    }
}

impl<S: LedgerStorage> Ledger<S> {
    /// Load the current balances from `storage`.
    pub fn open(mut storage: S) -> Result<Self> {
        let balances = storage.load()?;
        Ok(Self { storage, balances })
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Release the storage handle.
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Amount held for `code`, zero when absent.
    pub fn balance(&self, code: &str) -> f64 {
        self.balances.balance(code)
    }

    /// All rows in ascending code order.
    pub fn rows(&self) -> Vec<LedgerRow> {
        self.balances.rows()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    /// Wipe the ledger down to a single `(code, amount)` row.
    pub fn reset(&mut self, code: &str, amount: f64) -> Result<()> {
        self.transaction(|tx| {
            tx.reset(code, amount);
            Ok(())
        })
    }

    /// Add `amount` to `code`. Returns the new balance.
    pub fn credit(&mut self, code: &str, amount: f64) -> Result<f64> {
        self.transaction(|tx| Ok(tx.credit(code, amount)))
    }

    /// Subtract `amount` from `code`.
    ///
    /// A rejected debit is logged and leaves the ledger (and the file)
    /// untouched; it is not an error.
    pub fn debit(&mut self, code: &str, amount: f64) -> Result<DebitOutcome> {
        self.transaction(|tx| Ok(tx.debit(code, amount)))
    }

    /// Run `f` against a working copy of the balances.
    ///
    /// If `f` returns `Ok` the copy becomes the ledger state and is committed
    /// once. On `Err`, or when a balance would stop being a finite number,
    /// nothing is kept. A transaction that changes nothing does not write.
    pub fn transaction<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Transaction) -> Result<T>,
    {
        let mut tx = Transaction {
            working: self.balances.clone(),
        };
        let value = f(&mut tx)?;

        if let Some(amount) = tx.working.non_finite() {
            return Err(Error::InvalidAmount(amount));
        }

        if tx.working != self.balances {
            self.storage.save(&tx.working)?;
            self.balances = tx.working;
        }
        Ok(value)
    }
}

/// Pending changes inside [`Ledger::transaction`].
#[derive(Debug)]
pub struct Transaction {
    working: Balances,
}

impl Transaction {
    pub fn balance(&self, code: &str) -> f64 {
        self.working.balance(code)
    }

    pub fn reset(&mut self, code: &str, amount: f64) {
        self.working.reset(code, amount);
    }

    pub fn credit(&mut self, code: &str, amount: f64) -> f64 {
        self.working.credit(code, amount)
    }

    pub fn debit(&mut self, code: &str, amount: f64) -> DebitOutcome {
        let outcome = self.working.debit(code, amount);
        if let DebitOutcome::Rejected(reason) = outcome {
            tracing::warn!("Debit of {} {} refused: {}", amount, code, reason);
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_reset_then_rows() {
        let mut ledger = Ledger::in_memory();
        ledger.credit("bitcoin", 2.0).unwrap();
        ledger.credit("USD", 15.0).unwrap();

        ledger.reset("USD", 1000.0).unwrap();

        assert_eq!(ledger.rows(), vec![LedgerRow::new("USD", 1000.0)]);
    }

    #[test]
    fn test_every_mutation_commits() {
        let mut ledger = Ledger::in_memory();
        ledger.reset("USD", 100.0).unwrap();
        ledger.credit("USD", 50.0).unwrap();
        ledger.debit("USD", 25.0).unwrap();

        assert_eq!(ledger.storage().commits(), 3);
        assert_eq!(ledger.storage().committed().balance("USD"), 125.0);
    }

    #[test]
    fn test_rejected_debit_does_not_commit() {
        let mut ledger = Ledger::in_memory();
        ledger.credit("USD", 10.0).unwrap();

        let missing = ledger.debit("bitcoin", 1.0).unwrap();
        let short = ledger.debit("USD", 11.0).unwrap();

        assert_eq!(
            missing,
            DebitOutcome::Rejected(DebitRejection::MissingCurrency)
        );
        assert!(!short.is_applied());
        assert_eq!(ledger.balance("USD"), 10.0);
        assert_eq!(ledger.storage().commits(), 1);
    }

    #[test]
    fn test_debit_to_zero_removes_row() {
        let mut ledger = Ledger::in_memory();
        ledger.credit("xrp", 50.0).unwrap();

        assert_eq!(ledger.debit("xrp", 50.0).unwrap(), DebitOutcome::Removed);
        assert!(ledger.is_empty());
        assert!(ledger.storage().committed().is_empty());
    }

    #[test]
    fn test_failed_transaction_keeps_state() {
        let mut ledger = Ledger::in_memory();
        ledger.credit("USD", 100.0).unwrap();

        let result: Result<()> = ledger.transaction(|tx| {
            tx.debit("USD", 60.0);
            tx.credit("bitcoin", 1.0);
            Err(Error::InvalidAmount(-1.0))
        });

        assert!(result.is_err());
        assert_eq!(ledger.balance("USD"), 100.0);
        assert_eq!(ledger.balance("bitcoin"), 0.0);
        assert_eq!(ledger.storage().commits(), 1);
    }

    #[test]
    fn test_transaction_commits_once() {
        let mut ledger = Ledger::in_memory();
        ledger.credit("USD", 100.0).unwrap();

        ledger
            .transaction(|tx| {
                tx.debit("USD", 60.0);
                tx.credit("bitcoin", 1.0);
                Ok(())
            })
            .unwrap();

        assert_eq!(ledger.storage().commits(), 2);
        assert_eq!(ledger.storage().committed().balance("USD"), 40.0);
        assert_eq!(ledger.storage().committed().balance("bitcoin"), 1.0);
    }

    #[test]
    fn test_open_file_persists_across_runs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("portfolio.json");

        {
            let mut ledger = Ledger::open_file(&path).unwrap();
            ledger.reset("USD", 1000.0).unwrap();
            ledger.credit("dogecoin", 250.0).unwrap();
        }

        let ledger = Ledger::open_file(&path).unwrap();
        assert_eq!(ledger.balance("USD"), 1000.0);
        assert_eq!(ledger.balance("dogecoin"), 250.0);
    }

    #[test]
    fn test_overflowing_credit_is_not_saved() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("portfolio.json");

        {
            let mut ledger = Ledger::open_file(&path).unwrap();
            ledger.credit("USD", 1.7e308).unwrap();

            let result = ledger.credit("USD", 1.7e308);

            assert!(matches!(result, Err(Error::InvalidAmount(a)) if a.is_infinite()));
            assert_eq!(ledger.balance("USD"), 1.7e308);
        }

        let mut ledger = Ledger::open_file(&path).unwrap();
        assert_eq!(ledger.balance("USD"), 1.7e308);
        ledger.reset("USD", 100.0).unwrap();
        assert_eq!(ledger.balance("USD"), 100.0);
    }

    #[test]
    fn test_open_with_existing_balances() {
        let mut balances = Balances::new();
        balances.credit("ethereum", 3.0);

        let ledger = Ledger::open(MemoryStorage::with_balances(balances)).unwrap();

        assert_eq!(ledger.balance("ethereum"), 3.0);
    }
}
