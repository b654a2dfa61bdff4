//! # License Persistence Contract
//!
//! [`LicenseStore`] is the seam between the HTTP handlers and whatever keeps
//! the canonical license records. Handlers only ever borrow records through
//! this trait, so a Postgres backend and the in-memory backend below are
//! interchangeable.
//!
//! Cross-request consistency (unique sequence ids, atomic read-modify-write
//! on update) is the store's responsibility, not the caller's.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::LicenseStoreError;
use crate::license::{License, LicenseFields, LicenseId};

/// Persistence operations for imagery licenses.
#[async_trait]
pub trait LicenseStore: Send + Sync + std::fmt::Debug {
    /// Persist a new license and return its assigned id.
    async fn create(&self, fields: LicenseFields) -> Result<LicenseId, LicenseStoreError>;

    /// Fetch a license by id.
    async fn get(&self, id: LicenseId) -> Result<License, LicenseStoreError>;

    /// Overwrite the present fields of an existing license and return the
    /// updated record.
    async fn update(
        &self,
        id: LicenseId,
        fields: LicenseFields,
    ) -> Result<License, LicenseStoreError>;

    /// Remove a license.
    async fn delete(&self, id: LicenseId) -> Result<(), LicenseStoreError>;

    /// All licenses in ascending id order. An empty store yields an empty vec.
    async fn list(&self) -> Result<Vec<License>, LicenseStoreError>;

    /// Check that the backend can serve requests.
    async fn ping(&self) -> Result<(), LicenseStoreError> {
        Ok(())
    }
}

#[derive(Debug)]
struct Inner {
    licenses: BTreeMap<LicenseId, License>,
    next_id: i64,
}

/// Thread-safe, cloneable in-memory license store.
///
/// Clones share the same records. The lock is `parking_lot`, never held across
/// an `.await`. Ids come from a counter starting at 1 and are never reused,
/// even after a delete.
#[derive(Debug, Clone)]
pub struct InMemoryLicenseStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryLicenseStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                licenses: BTreeMap::new(),
                next_id: 1,
            })),
        }
    }

    /// Number of stored licenses.
    pub fn len(&self) -> usize {
        self.inner.read().licenses.len()
    }

    /// Whether the store holds no licenses.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryLicenseStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LicenseStore for InMemoryLicenseStore {
    async fn create(&self, fields: LicenseFields) -> Result<LicenseId, LicenseStoreError> {
        let mut guard = self.inner.write();
        let id = LicenseId::new(guard.next_id);
        guard.next_id += 1;
        guard.licenses.insert(id, License::new(id, fields));
        Ok(id)
    }

    async fn get(&self, id: LicenseId) -> Result<License, LicenseStoreError> {
        self.inner
            .read()
            .licenses
            .get(&id)
            .cloned()
            .ok_or(LicenseStoreError::NotFound(id))
    }

    async fn update(
        &self,
        id: LicenseId,
        fields: LicenseFields,
    ) -> Result<License, LicenseStoreError> {
        let mut guard = self.inner.write();
        let license = guard
            .licenses
            .get_mut(&id)
            .ok_or(LicenseStoreError::NotFound(id))?;
        fields.apply_to(license);
        Ok(license.clone())
    }

    async fn delete(&self, id: LicenseId) -> Result<(), LicenseStoreError> {
        self.inner
            .write()
            .licenses
            .remove(&id)
            .map(|_| ())
            .ok_or(LicenseStoreError::NotFound(id))
    }

    async fn list(&self) -> Result<Vec<License>, LicenseStoreError> {
        Ok(self.inner.read().licenses.values().cloned().collect())
    }
}
