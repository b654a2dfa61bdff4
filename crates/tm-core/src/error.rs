//! # Store Errors
//!
//! Outcomes a [`LicenseStore`](crate::LicenseStore) reports besides success.
//! The API layer maps `NotFound` to 404 and everything else to a generic 500,
//! so backends must never fold a missing record into `Backend`.

use thiserror::Error;

use crate::license::LicenseId;

/// Failure reported by a license store.
#[derive(Error, Debug)]
pub enum LicenseStoreError {
    /// No license exists with this id.
    #[error("license {0} not found")]
    NotFound(LicenseId),

    /// The backend failed (connection, constraint violation, encoding).
    /// The message is for operators and must not reach API clients.
    #[error("license store backend failure: {0}")]
    Backend(String),
}

impl LicenseStoreError {
    /// Whether this error means the license does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
