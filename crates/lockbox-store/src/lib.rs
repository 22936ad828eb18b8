//! # lockbox-store
//!
//! SQLite persistence for Lockbox credential records.
//!
//! [`SqliteCollection`] implements the vault's
//! [`Collection`](lockbox_vault::Collection) trait on top of a single
//! `rusqlite` connection. Its lifecycle is explicit: [`SqliteCollection::open`]
//! connects, applies pragmas and runs migrations; [`SqliteCollection::close`]
//! shuts the connection down and reports any error doing so.
//!
//! ## Quick start
//!
//! ```no_run
//! use lockbox_store::SqliteCollection;
//! use lockbox_vault::VaultStore;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let vault = VaultStore::new(SqliteCollection::open("data/lockbox.db")?);
//! vault.add("example.com", "alice", "Str0ng!Pass")?;
//! vault.into_inner().close()?;
//! # Ok(())
//! # }
//! ```

pub mod collection;
pub mod error;
pub mod migration;

// ── re-exports ───────────────────────────────────────────────────────

pub use collection::SqliteCollection;
pub use error::{StoreError, StoreResult};
