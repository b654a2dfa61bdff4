#![deny(missing_docs)]

//! # tm-core - Imagery License Domain
//!
//! Foundational types for the license API. A license is a usage and
//! attribution record that imagery sources reference by id.
//!
//! The crate has no web or database dependencies. It defines:
//!
//! - [`LicenseId`], [`License`] and [`LicenseFields`] - the record and its
//!   editable text fields.
//! - [`LicenseStore`] - the persistence contract every backend implements.
//! - [`LicenseStoreError`] - the two outcomes a backend may report besides
//!   success: the license is absent, or the backend itself failed.
//! - [`InMemoryLicenseStore`] - a thread-safe store for development and tests.

pub mod error;
pub mod license;
pub mod store;

pub use error::LicenseStoreError;
pub use license::{License, LicenseFields, LicenseId};
pub use store::{InMemoryLicenseStore, LicenseStore};
