//! Encrypted credential records for Lockbox.
//!
//! This crate stores domain/identity/password triples with each password
//! encrypted at rest under its own AES-256-GCM key. It knows nothing about
//! terminals or databases: storage sits behind the [`Collection`] trait and
//! password generation behind [`PasswordSupplier`].
//!
//! # Modules
//!
//! - [`policy`]: password strength rules.
//! - [`crypto`]: per-record key generation, AES-256-GCM encrypt/decrypt.
//! - [`record`]: the persisted record, record ids, decrypted entries.
//! - [`collection`]: the storage boundary and an in-memory implementation.
//! - [`store`]: [`VaultStore`] with add, list, search, update, delete.
//! - [`supplier`]: the password suggestion seam.
//! - [`error`]: unified error type.
//!
//! # Quick Start
//!
//! ```rust
//! use lockbox_vault::{Criterion, MemoryCollection, Selector, VaultStore};
//!
//! # fn example() -> lockbox_vault::Result<()> {
//! let vault = VaultStore::new(MemoryCollection::new());
//!
//! vault.add("example.com", "alice", "Str0ng!Pass")?;
//! vault.replace_secret(&Selector::ByDomain("example.com".into()), "N3w!Secret")?;
//!
//! let hits: Vec<_> = vault
//!     .search(&Criterion::ByDomainSubstring("exam".into()))?
//!     .collect::<Result<_, _>>()
//!     .expect("records decrypt");
//! assert_eq!(hits[0].secret, "N3w!Secret");
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod collection;
pub mod crypto;
pub mod error;
pub mod policy;
pub mod record;
pub mod store;
pub mod supplier;

// Re-export the most commonly used types at the crate root for convenience.
pub use collection::{Collection, CollectionError, Field, FieldSet, Filter, MemoryCollection};
pub use crypto::{Ciphertext, RecordKey, SealedSecret};
pub use error::{Result, VaultError};
pub use policy::PolicyViolation;
pub use record::{CredentialRecord, Entry, RecordId, StoredRecord};
pub use store::{
    Criterion, DeleteOutcome, DeleteTarget, Entries, Selector, UnreadableRecord, VaultStore,
};
pub use supplier::PasswordSupplier;
