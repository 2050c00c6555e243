//! Snapshot persistence over an embedded sled database
//!
//! Each aggregate is stored as a single CBOR blob under a fixed key, and the
//! shutdown snapshot writes every key in one [`sled::Batch`] so a crash mid
//! save can never leave the catalog and the ledger from different sessions
//! on disk.
use crate::audit::AuditTrail;
use crate::catalog::Catalog;
use crate::ledger::Ledger;
use crate::registry::Registry;
use anyhow::Context;
use sled::Batch;
use std::sync::Arc;

pub const CATALOG_KEY: &str = "catalog";
pub const PATRONS_KEY: &str = "patrons";
pub const LEDGER_KEY: &str = "ledger";
pub const AUDIT_KEY: &str = "audit";
pub const CREDENTIALS_KEY: &str = "credentials";

pub struct Archive {
    db: Arc<sled::Db>,
}

impl Archive {
    pub fn new(db: Arc<sled::Db>) -> Self {
        Self { db }
    }

    /// Opens (or creates) the archive at the given path.
    pub fn open(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let db = sled::open(path.as_ref())
            .with_context(|| format!("failed to open archive at {}", path.as_ref().display()))?;
        Ok(Self::new(Arc::new(db)))
    }

    /// Serializes `value` and stores it under `key`.
    pub fn save<T>(&self, key: &str, value: &T) -> anyhow::Result<()>
    where
        T: minicbor::Encode<()>,
    {
        let blob = minicbor::to_vec(value)?;
        self.db.insert(key, blob)?;
        self.db.flush()?;
        Ok(())
    }

    /// Loads and decodes the blob stored under `key`. A missing key is
    /// `Ok(None)`; a blob that fails to decode is an error.
    pub fn load<T>(&self, key: &str) -> anyhow::Result<Option<T>>
    where
        T: for<'b> minicbor::Decode<'b, ()>,
    {
        match self.db.get(key)? {
            Some(blob) => {
                let value = minicbor::decode(&blob)
                    .with_context(|| format!("stored blob under '{key}' failed to decode"))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    pub fn exists(&self, key: &str) -> anyhow::Result<bool> {
        Ok(self.db.contains_key(key)?)
    }

    /// Writes the whole application state in a single atomic batch.
    pub fn save_snapshot(
        &self,
        catalog: &Catalog,
        registry: &Registry,
        ledger: &Ledger,
        audit: &AuditTrail,
    ) -> anyhow::Result<()> {
        let mut batch = Batch::default();
        batch.insert(CATALOG_KEY, minicbor::to_vec(catalog)?);
        batch.insert(PATRONS_KEY, minicbor::to_vec(registry)?);
        batch.insert(LEDGER_KEY, minicbor::to_vec(ledger)?);
        batch.insert(AUDIT_KEY, minicbor::to_vec(audit.history())?);

        self.db.apply_batch(batch)?;
        self.db.flush()?;
        Ok(())
    }
}
