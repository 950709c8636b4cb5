//! Persistent store backend
//!
//! Keeps the working state in an [`InMemoryStore`] and writes the full
//! snapshot to disk after every mutation.
//!
//! # Critical Invariants
//!
//! - **Integrity**: the file carries a SHA-256 checksum of the serialized
//!   state; a mismatch on load is an error, never silently accepted
//! - **Atomicity**: a mutation is applied to a copy, persisted through a
//!   temporary file + rename, and only then made visible in memory

use super::{InMemoryStore, Store, StoreError, StoreSnapshot, WriteBatch};
use crate::core::time::Minutes;
use crate::models::catalog::{DrinkType, LoyaltyTier};
use crate::models::order::{Order, OrderId, OrderStatus};
use crate::models::worker::Worker;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// On-disk layout
#[derive(Debug, Serialize, Deserialize)]
struct PersistedState {
    /// SHA-256 (hex) of the serialized `state`
    checksum: String,
    state: StoreSnapshot,
}

/// Compute the hex SHA-256 of a snapshot's JSON form
fn compute_checksum(state: &StoreSnapshot) -> Result<String, StoreError> {
    let json = serde_json::to_string(state)?;
    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

/// Store persisted as a checksummed JSON snapshot
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    inner: InMemoryStore,
}

impl FileStore {
    /// Open the store at `path`, loading it if the file exists
    ///
    /// # Errors
    /// I/O and parse failures, or `ChecksumMismatch` if the file was altered.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let inner = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            let persisted: PersistedState = serde_json::from_str(&raw)?;
            let actual = compute_checksum(&persisted.state)?;
            if actual != persisted.checksum {
                return Err(StoreError::ChecksumMismatch {
                    expected: persisted.checksum,
                    actual,
                });
            }
            debug!(
                path = %path.display(),
                orders = persisted.state.orders.len(),
                workers = persisted.state.workers.len(),
                "loaded store snapshot"
            );
            InMemoryStore::from_snapshot(persisted.state)
        } else {
            InMemoryStore::new()
        };

        Ok(Self { path, inner })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `op` to a copy of the state, persist it, then swap it in
    fn mutate<T>(
        &mut self,
        op: impl FnOnce(&mut InMemoryStore) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut next = self.inner.clone();
        let out = op(&mut next)?;
        self.persist(&next.snapshot())?;
        self.inner = next;
        Ok(out)
    }

    fn persist(&self, state: &StoreSnapshot) -> Result<(), StoreError> {
        let persisted = PersistedState {
            checksum: compute_checksum(state)?,
            state: state.clone(),
        };
        let json = serde_json::to_string_pretty(&persisted)?;

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl Store for FileStore {
    fn create_order(
        &mut self,
        customer: String,
        drink: DrinkType,
        loyalty: LoyaltyTier,
        arrival: Minutes,
    ) -> Result<Order, StoreError> {
        self.mutate(|s| s.create_order(customer, drink, loyalty, arrival))
    }

    fn list_orders(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, StoreError> {
        self.inner.list_orders(status)
    }

    fn get_order(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        self.inner.get_order(id)
    }

    fn list_workers(&self) -> Result<Vec<Worker>, StoreError> {
        self.inner.list_workers()
    }

    fn add_worker(&mut self, name: String) -> Result<Worker, StoreError> {
        self.mutate(|s| s.add_worker(name))
    }

    fn save_order(&mut self, order: &Order) -> Result<(), StoreError> {
        self.mutate(|s| s.save_order(order))
    }

    fn save_worker(&mut self, worker: &Worker) -> Result<(), StoreError> {
        self.mutate(|s| s.save_worker(worker))
    }

    fn commit(&mut self, batch: WriteBatch) -> Result<(), StoreError> {
        if batch.is_empty() {
            return Ok(());
        }
        self.mutate(|s| s.commit(batch))
    }

    fn reset(&mut self) -> Result<(), StoreError> {
        self.mutate(|s| s.reset())
    }
}
