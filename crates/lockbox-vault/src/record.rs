//! The persisted credential record.
//!
//! A [`CredentialRecord`] is what the vault hands to a
//! [`Collection`](crate::collection::Collection): a plaintext domain and
//! identity, plus the sealed secret (ciphertext and its key). Decrypted
//! secrets only ever appear in [`Entry`] values, which are never written
//! back.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::crypto::SealedSecret;
use crate::error::{Result, VaultError};

// ---------------------------------------------------------------------------
// Record identity
// ---------------------------------------------------------------------------

/// Identifier assigned by the collection when a record is inserted.
///
/// UUIDv7 values sort by creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Generate a new time-ordered identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for RecordId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::str::FromStr for RecordId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A credential as it is stored: plaintext domain and identity, encrypted
/// secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    /// Title-cased domain, e.g. `Example.Com`.
    pub domain: String,
    /// Username or email, stored as given.
    pub identity: String,
    /// Ciphertext and the per-record key that opens it.
    pub secret: SealedSecret,
}

impl CredentialRecord {
    /// Build a record, normalizing the domain and rejecting empty fields.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::EmptyField`] if `domain` or `identity` is empty
    /// after trimming.
    pub fn new(domain: &str, identity: &str, secret: SealedSecret) -> Result<Self> {
        Ok(Self {
            domain: normalize_domain(domain)?,
            identity: normalize_identity(identity)?,
            secret,
        })
    }
}

/// A record together with the id its collection assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub id: RecordId,
    pub record: CredentialRecord,
}

impl StoredRecord {
    /// Decrypt the secret into a plaintext [`Entry`].
    pub fn decrypt(&self) -> Result<Entry> {
        Ok(Entry {
            id: self.id,
            domain: self.record.domain.clone(),
            identity: self.record.identity.clone(),
            secret: self.record.secret.open()?,
        })
    }
}

/// A decrypted credential, produced per retrieval.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub id: RecordId,
    pub domain: String,
    pub identity: String,
    pub secret: String,
}

impl std::fmt::Debug for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entry")
            .field("id", &self.id)
            .field("domain", &self.domain)
            .field("identity", &self.identity)
            .field("secret", &"<redacted>")
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Field normalization
// ---------------------------------------------------------------------------

/// Trim and title-case a domain, rejecting empty input.
pub fn normalize_domain(domain: &str) -> Result<String> {
    let trimmed = domain.trim();
    if trimmed.is_empty() {
        return Err(VaultError::EmptyField { field: "domain" });
    }
    Ok(title_case(trimmed))
}

/// Trim an identity, rejecting empty input.
pub fn normalize_identity(identity: &str) -> Result<String> {
    let trimmed = identity.trim();
    if trimmed.is_empty() {
        return Err(VaultError::EmptyField { field: "identity" });
    }
    Ok(trimmed.to_string())
}

/// Uppercase the first letter of every word and lowercase the rest.
///
/// A word starts at any cased letter that does not follow another cased
/// letter, so `example.com` becomes `Example.Com`, `my-site2go` becomes
/// `My-Site2Go` and `中a` becomes `中A`.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_uppercase() || c.is_lowercase() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}
