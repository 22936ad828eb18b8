//! The document collection the vault reads and writes.
//!
//! [`Collection`] is the only storage boundary the vault depends on. It
//! models a key-document store with equality and case-insensitive substring
//! queries. Two implementations exist: [`MemoryCollection`] here, and a
//! SQLite-backed one in the `lockbox-store` crate.
//!
//! Writes to the secret go through [`FieldSet::Secret`], which carries a
//! [`SealedSecret`]: ciphertext and key always travel and land together.

use std::sync::{Mutex, MutexGuard};

use crate::crypto::SealedSecret;
use crate::record::{CredentialRecord, RecordId, StoredRecord};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure reported by a collection backend.
#[derive(Debug, thiserror::Error)]
pub enum CollectionError {
    /// The backend rejected or could not complete the operation.
    #[error("backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),

    /// A stored document could not be read back into a record.
    #[error("corrupt document {id}: {reason}")]
    Corrupt { id: String, reason: String },

    /// The collection's internal lock was poisoned by a panic.
    #[error("collection lock poisoned")]
    Poisoned,
}

/// Convenience alias for collection results.
pub type CollectionResult<T> = std::result::Result<T, CollectionError>;

// ---------------------------------------------------------------------------
// Queries and updates
// ---------------------------------------------------------------------------

/// A plaintext field that can be queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Domain,
    Identity,
}

impl Field {
    /// Column or document key name for this field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Domain => "domain",
            Self::Identity => "identity",
        }
    }

    fn value<'a>(&self, record: &'a CredentialRecord) -> &'a str {
        match self {
            Self::Domain => &record.domain,
            Self::Identity => &record.identity,
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which documents an operation applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Every document.
    All,
    /// The document with this id.
    Id(RecordId),
    /// Documents whose field equals the value exactly.
    Equals(Field, String),
    /// Documents whose field contains the value, ignoring case.
    Contains(Field, String),
}

impl Filter {
    /// Evaluate the filter against one stored record.
    pub fn matches(&self, stored: &StoredRecord) -> bool {
        match self {
            Self::All => true,
            Self::Id(id) => stored.id == *id,
            Self::Equals(field, value) => field.value(&stored.record) == value,
            Self::Contains(field, needle) => {
                contains_ignore_case(field.value(&stored.record), needle)
            }
        }
    }
}

/// Case-insensitive substring test, using full Unicode lowercasing.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// The single field an update overwrites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSet {
    Domain(String),
    Identity(String),
    /// Replace ciphertext and key together.
    Secret(SealedSecret),
}

impl FieldSet {
    /// Apply this change to a record in place.
    pub fn apply(self, record: &mut CredentialRecord) {
        match self {
            Self::Domain(domain) => record.domain = domain,
            Self::Identity(identity) => record.identity = identity,
            Self::Secret(secret) => record.secret = secret,
        }
    }
}

// ---------------------------------------------------------------------------
// Collection trait
// ---------------------------------------------------------------------------

/// A store of credential documents.
///
/// Enumeration order is backend-defined; both shipped backends return
/// documents in insertion order. Implementations must make every single
/// call atomic: a failed `insert_one` or `update_one` leaves no partial
/// document behind.
pub trait Collection {
    /// Return the first document matching `filter`.
    fn find_one(&self, filter: &Filter) -> CollectionResult<Option<StoredRecord>>;

    /// Return every document matching `filter`.
    fn find(&self, filter: &Filter) -> CollectionResult<Vec<StoredRecord>>;

    /// Insert a new document and return its assigned id.
    fn insert_one(&self, record: CredentialRecord) -> CollectionResult<RecordId>;

    /// Apply `set` to the first document matching `filter`. Returns the
    /// number of documents changed (0 or 1).
    fn update_one(&self, filter: &Filter, set: FieldSet) -> CollectionResult<u64>;

    /// Delete the first document matching `filter`. Returns 0 or 1.
    fn delete_one(&self, filter: &Filter) -> CollectionResult<u64>;

    /// Delete every document matching `filter`. Returns the count removed.
    fn delete_many(&self, filter: &Filter) -> CollectionResult<u64>;

    /// Count the documents matching `filter`.
    fn count(&self, filter: &Filter) -> CollectionResult<u64> {
        Ok(self.find(filter)?.len() as u64)
    }
}

impl<C: Collection + ?Sized> Collection for &C {
    fn find_one(&self, filter: &Filter) -> CollectionResult<Option<StoredRecord>> {
        (**self).find_one(filter)
    }

    fn find(&self, filter: &Filter) -> CollectionResult<Vec<StoredRecord>> {
        (**self).find(filter)
    }

    fn insert_one(&self, record: CredentialRecord) -> CollectionResult<RecordId> {
        (**self).insert_one(record)
    }

    fn update_one(&self, filter: &Filter, set: FieldSet) -> CollectionResult<u64> {
        (**self).update_one(filter, set)
    }

    fn delete_one(&self, filter: &Filter) -> CollectionResult<u64> {
        (**self).delete_one(filter)
    }

    fn delete_many(&self, filter: &Filter) -> CollectionResult<u64> {
        (**self).delete_many(filter)
    }

    fn count(&self, filter: &Filter) -> CollectionResult<u64> {
        (**self).count(filter)
    }
}

// ---------------------------------------------------------------------------
// In-memory collection
// ---------------------------------------------------------------------------

/// A collection held in process memory, in insertion order.
///
/// Used by tests and by callers that want a throwaway vault.
#[derive(Debug, Default)]
pub struct MemoryCollection {
    docs: Mutex<Vec<StoredRecord>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> CollectionResult<MutexGuard<'_, Vec<StoredRecord>>> {
        self.docs.lock().map_err(|_| CollectionError::Poisoned)
    }

    /// Replace a stored document wholesale, bypassing the vault. Lets tests
    /// simulate on-disk corruption.
    pub fn overwrite(&self, stored: StoredRecord) -> CollectionResult<bool> {
        let mut docs = self.lock()?;
        match docs.iter_mut().find(|doc| doc.id == stored.id) {
            Some(doc) => {
                *doc = stored;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl Collection for MemoryCollection {
    fn find_one(&self, filter: &Filter) -> CollectionResult<Option<StoredRecord>> {
        Ok(self.lock()?.iter().find(|doc| filter.matches(doc)).cloned())
    }

    fn find(&self, filter: &Filter) -> CollectionResult<Vec<StoredRecord>> {
        Ok(self
            .lock()?
            .iter()
            .filter(|doc| filter.matches(doc))
            .cloned()
            .collect())
    }

    fn insert_one(&self, record: CredentialRecord) -> CollectionResult<RecordId> {
        let id = RecordId::new();
        self.lock()?.push(StoredRecord { id, record });
        Ok(id)
    }

    fn update_one(&self, filter: &Filter, set: FieldSet) -> CollectionResult<u64> {
        let mut docs = self.lock()?;
        match docs.iter_mut().find(|doc| filter.matches(doc)) {
            Some(doc) => {
                set.apply(&mut doc.record);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    fn delete_one(&self, filter: &Filter) -> CollectionResult<u64> {
        let mut docs = self.lock()?;
        match docs.iter().position(|doc| filter.matches(doc)) {
            Some(index) => {
                docs.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    fn delete_many(&self, filter: &Filter) -> CollectionResult<u64> {
        let mut docs = self.lock()?;
        let before = docs.len();
        docs.retain(|doc| !filter.matches(doc));
        Ok((before - docs.len()) as u64)
    }

    fn count(&self, filter: &Filter) -> CollectionResult<u64> {
        Ok(self.lock()?.iter().filter(|doc| filter.matches(doc)).count() as u64)
    }
}
