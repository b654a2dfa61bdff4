//! # License Records
//!
//! The canonical license record and the subset of its fields a caller may
//! edit. The id is assigned by the store on creation and never changes;
//! `name`, `description` and `plain_text` are mutable.

use serde::{Deserialize, Serialize};

/// Identifier of a license, assigned by the store from a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LicenseId(i64);

impl LicenseId {
    /// Wrap a raw integer id.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// The raw integer value.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for LicenseId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for LicenseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Editable license fields.
///
/// On create every field is copied into the new record. On update only the
/// fields that are `Some` overwrite the stored values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseFields {
    /// Short display name, e.g. "Public Domain".
    pub name: Option<String>,
    /// Longer description shown to project managers.
    pub description: Option<String>,
    /// The license text shown to mappers before they use the imagery.
    pub plain_text: Option<String>,
}

impl LicenseFields {
    /// Overwrite the fields of `license` that are present in `self`.
    pub fn apply_to(self, license: &mut License) {
        if let Some(name) = self.name {
            license.name = Some(name);
        }
        if let Some(description) = self.description {
            license.description = Some(description);
        }
        if let Some(plain_text) = self.plain_text {
            license.plain_text = Some(plain_text);
        }
    }
}

/// A stored imagery license.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    /// Store-assigned identifier.
    pub id: LicenseId,
    /// Short display name.
    pub name: Option<String>,
    /// Longer description.
    pub description: Option<String>,
    /// License text shown to end users.
    pub plain_text: Option<String>,
}

impl License {
    /// Build a record for a freshly assigned id.
    pub fn new(id: LicenseId, fields: LicenseFields) -> Self {
        Self {
            id,
            name: fields.name,
            description: fields.description,
            plain_text: fields.plain_text,
        }
    }
}
