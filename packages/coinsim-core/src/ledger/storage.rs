//! Ledger persistence backends.

use super::balances::Balances;
use crate::types::LedgerRow;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Where a [`Ledger`](super::Ledger) reads and commits its balances.
pub trait LedgerStorage {
    /// Load the persisted balances.
    fn load(&mut self) -> Result<Balances>;

    /// Durably replace the persisted balances.
    fn save(&mut self, balances: &Balances) -> Result<()>;
}

/// On-disk layout of the ledger file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerFile {
    /// Rows in ascending currency order
    #[serde(default)]
    pub rows: Vec<LedgerRow>,
    /// When the ledger was first written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// When the ledger was last written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Ledger persisted as a pretty-printed JSON file.
#[derive(Debug)]
pub struct JsonFileStorage {
    path: PathBuf,
    created_at: Option<DateTime<Utc>>,
}

impl JsonFileStorage {
    /// Open the ledger file at `path`, writing an empty one if it is missing.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let mut storage = Self {
            path: path.into(),
            created_at: None,
        };

        if !storage.path.exists() {
            tracing::debug!("Initializing empty ledger at {}", storage.path.display());
            storage.save(&Balances::new())?;
        }

        Ok(storage)
    }

    /// Get the ledger file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(&self) -> Result<LedgerFile> {
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(LedgerFile::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "ledger".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl LedgerStorage for JsonFileStorage {
    fn load(&mut self) -> Result<Balances> {
        let file = self.read_file()?;
        self.created_at = file.created_at;
        tracing::debug!(
            "Loaded {} ledger rows from {}",
            file.rows.len(),
            self.path.display()
        );
        Ok(Balances::from_rows(file.rows))
    }

    fn save(&mut self, balances: &Balances) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let now = Utc::now();
        let created_at = *self.created_at.get_or_insert(now);
        let file = LedgerFile {
            rows: balances.rows(),
            created_at: Some(created_at),
            updated_at: Some(now),
        };

        // Write beside the target and rename so readers never see a partial file.
        let content = serde_json::to_string_pretty(&file)?;
        let temp = self.temp_path();
        fs::write(&temp, content)?;
        fs::rename(&temp, &self.path)?;

        tracing::debug!(
            "Saved {} ledger rows to {}",
            balances.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// Non-persistent storage, for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    balances: Balances,
    commits: usize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing balances.
    pub fn with_balances(balances: Balances) -> Self {
        Self {
            balances,
            commits: 0,
        }
    }

    /// Last committed balances.
    pub fn committed(&self) -> &Balances {
        &self.balances
    }

    /// Number of successful saves.
    pub fn commits(&self) -> usize {
        self.commits
    }
}

impl LedgerStorage for MemoryStorage {
    fn load(&mut self) -> Result<Balances> {
        Ok(self.balances.clone())
    }

    fn save(&mut self, balances: &Balances) -> Result<()> {
        self.balances = balances.clone();
        self.commits += 1;
        Ok(())
    }
}
