//! `RocksDB` storage implementation.
//!
//! This module provides the `RocksStore` implementation of the `Store`
//! trait.

use std::path::Path;
use std::sync::Arc;

use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, IteratorMode, MultiThreaded,
    Options, WriteBatch,
};

use chrono::{DateTime, Utc};
use stock_ledger_core::{Movement, ProductId, RebuildJob, StockEvent};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{all_column_families, cf};
use crate::{StockSnapshot, Store};

/// RocksDB-backed storage implementation.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Get a column family handle, or `None` when the family has not been
    /// provisioned. Callers degrade instead of failing: reads return
    /// empty results, writes skip.
    fn cf_opt(&self, name: &str) -> Option<Arc<BoundColumnFamily<'_>>> {
        let handle = self.db.cf_handle(name);
        if handle.is_none() {
            tracing::debug!(column_family = name, "column family not provisioned, degrading");
        }
        handle
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Fetch one movement by its primary key.
    fn get_movement(&self, key: &[u8]) -> Result<Option<Movement>> {
        let Some(cf) = self.cf_opt(cf::MOVEMENTS) else {
            return Ok(None);
        };

        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    /// Delete every key in a column family.
    fn clear_cf(&self, name: &str) -> Result<()> {
        let Some(cf) = self.cf_opt(name) else {
            return Ok(());
        };

        let mut batch = WriteBatch::default();
        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            let (key, _) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            batch.delete_cf(&cf, key);
        }

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }
}

impl Store for RocksStore {
    // =========================================================================
    // Movement Ledger Operations
    // =========================================================================

    fn insert_movement(&self, movement: &Movement) -> Result<()> {
        movement.validate()?;

        let (Some(cf_rows), Some(cf_index)) = (
            self.cf_opt(cf::MOVEMENTS),
            self.cf_opt(cf::MOVEMENTS_BY_PRODUCT),
        ) else {
            return Ok(());
        };

        let row_key = keys::movement_key(&movement.id);
        let index_key =
            keys::product_movement_key(movement.product_id, movement.created_at, &movement.id);
        let value = Self::serialize(movement)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_rows, &row_key, &value);
        batch.put_cf(&cf_index, &index_key, []); // Index entry (empty value)

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn movements_for_product(
        &self,
        product_id: ProductId,
        limit: usize,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Movement>> {
        let Some(cf_index) = self.cf_opt(cf::MOVEMENTS_BY_PRODUCT) else {
            return Ok(Vec::new());
        };

        let prefix = keys::product_prefix(product_id);
        let start = since.map_or_else(
            || prefix.clone(),
            |at| keys::product_window_start(product_id, at),
        );

        // Collect matching index keys oldest-first (the key layout is
        // chronological), then reverse for newest-first listing.
        let iter = self.db.iterator_cf(
            &cf_index,
            IteratorMode::From(&start, rocksdb::Direction::Forward),
        );

        let mut all_keys: Vec<Vec<u8>> = Vec::new();
        for item in iter {
            let (key, _) = item.map_err(|e| StoreError::Database(e.to_string()))?;

            if !key.starts_with(&prefix) {
                break;
            }

            all_keys.push(key.to_vec());
        }

        all_keys.reverse();

        let mut movements = Vec::new();
        for key in all_keys {
            if movements.len() >= limit {
                break;
            }

            let movement_id = keys::extract_movement_id_from_product_key(&key);
            if let Some(movement) = self.get_movement(&keys::movement_key(&movement_id))? {
                movements.push(movement);
            }
        }

        Ok(movements)
    }

    fn clear_product_window(&self, product_id: ProductId, since: DateTime<Utc>) -> Result<u64> {
        let (Some(cf_rows), Some(cf_index)) = (
            self.cf_opt(cf::MOVEMENTS),
            self.cf_opt(cf::MOVEMENTS_BY_PRODUCT),
        ) else {
            return Ok(0);
        };

        let prefix = keys::product_prefix(product_id);
        let start = keys::product_window_start(product_id, since);

        let iter = self.db.iterator_cf(
            &cf_index,
            IteratorMode::From(&start, rocksdb::Direction::Forward),
        );

        let mut batch = WriteBatch::default();
        let mut removed = 0u64;
        for item in iter {
            let (key, _) = item.map_err(|e| StoreError::Database(e.to_string()))?;

            if !key.starts_with(&prefix) {
                break;
            }

            let movement_id = keys::extract_movement_id_from_product_key(&key);
            batch.delete_cf(&cf_rows, keys::movement_key(&movement_id));
            batch.delete_cf(&cf_index, key);
            removed += 1;
        }

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(removed)
    }

    fn truncate_movements(&self) -> Result<()> {
        self.clear_cf(cf::MOVEMENTS)?;
        self.clear_cf(cf::MOVEMENTS_BY_PRODUCT)?;
        Ok(())
    }

    // =========================================================================
    // Raw Event Log Operations
    // =========================================================================

    fn append_event(&self, event: &StockEvent) -> Result<()> {
        let Some(cf) = self.cf_opt(cf::EVENTS) else {
            return Ok(());
        };

        let key = keys::event_key(&event.id);
        let value = Self::serialize(event)?;

        self.db
            .put_cf(&cf, key, value)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn recent_events(&self, limit: usize) -> Result<Vec<StockEvent>> {
        let Some(cf) = self.cf_opt(cf::EVENTS) else {
            return Ok(Vec::new());
        };

        // Event keys are ULIDs, so reverse iteration is newest-first.
        let mut events = Vec::new();
        for item in self.db.iterator_cf(&cf, IteratorMode::End) {
            if events.len() >= limit {
                break;
            }

            let (_, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            events.push(Self::deserialize(&value)?);
        }

        Ok(events)
    }

    // =========================================================================
    // Rebuild Job Operations
    // =========================================================================

    fn put_job(&self, job: &RebuildJob) -> Result<()> {
        let Some(cf) = self.cf_opt(cf::REBUILD_JOB) else {
            return Ok(());
        };

        let value = Self::serialize(job)?;
        self.db
            .put_cf(&cf, keys::JOB_KEY, value)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn get_job(&self) -> Result<Option<RebuildJob>> {
        let Some(cf) = self.cf_opt(cf::REBUILD_JOB) else {
            return Ok(None);
        };

        self.db
            .get_cf(&cf, keys::JOB_KEY)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn clear_job(&self) -> Result<()> {
        let Some(cf) = self.cf_opt(cf::REBUILD_JOB) else {
            return Ok(());
        };

        self.db
            .delete_cf(&cf, keys::JOB_KEY)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    // =========================================================================
    // Stock Snapshot Operations
    // =========================================================================

    fn put_stock_snapshot(&self, snapshot: &StockSnapshot) -> Result<()> {
        let Some(cf) = self.cf_opt(cf::STOCK_SNAPSHOTS) else {
            return Ok(());
        };

        let key = keys::snapshot_key(snapshot.product_id);
        let value = Self::serialize(snapshot)?;

        self.db
            .put_cf(&cf, key, value)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn get_stock_snapshot(&self, product_id: ProductId) -> Result<Option<StockSnapshot>> {
        let Some(cf) = self.cf_opt(cf::STOCK_SNAPSHOTS) else {
            return Ok(None);
        };

        self.db
            .get_cf(&cf, keys::snapshot_key(product_id))
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    // =========================================================================
    // Compound Operations
    // =========================================================================

    fn purge(&self) -> Result<()> {
        self.truncate_movements()?;
        self.clear_cf(cf::EVENTS)?;
        self.clear_cf(cf::STOCK_SNAPSHOTS)?;
        self.clear_job()?;
        Ok(())
    }
}
