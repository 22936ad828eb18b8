//! SQLite-backed credential collection.
//!
//! [`SqliteCollection`] owns one `rusqlite::Connection`. Each
//! [`Collection`] call is a single statement (or a single transaction for
//! filtered bulk deletes), so a failed write never leaves half a record
//! behind. Ciphertext and key are always bound in the same statement.
//!
//! Rows are returned in insertion order (`seq`).
//!
//! Substring filters are evaluated in Rust after loading candidate rows:
//! SQLite's built-in `lower()` only folds ASCII, and the vault promises
//! case-insensitive matching for any text.

use std::path::Path;

use chrono::Utc;
use lockbox_vault::collection::CollectionResult;
use lockbox_vault::{
    Ciphertext, Collection, CredentialRecord, Field, FieldSet, Filter, RecordId, RecordKey,
    SealedSecret, StoredRecord,
};
use rusqlite::{Connection, params};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::migration;

const SELECT_COLUMNS: &str =
    "SELECT id, domain, identity, secret_ciphertext, secret_key FROM credentials";

/// A credential collection stored in a SQLite database.
pub struct SqliteCollection {
    conn: Connection,
}

impl SqliteCollection {
    /// Open (or create) the database at `path`, apply pragmas and run
    /// pending migrations.
    ///
    /// The parent directory is created if it does not exist.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "opening credential database");

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Create an in-memory database, useful for tests.
    pub fn open_in_memory() -> StoreResult<Self> {
        debug!("opening in-memory credential database");
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(mut conn: Connection) -> StoreResult<Self> {
        Self::apply_pragmas(&conn)?;
        migration::run_all(&mut conn)?;
        info!("credential database ready");
        Ok(Self { conn })
    }

    /// Close the connection, surfacing any error SQLite reports.
    pub fn close(self) -> StoreResult<()> {
        self.conn.close().map_err(|(_, err)| StoreError::Sqlite(err))?;
        debug!("credential database closed");
        Ok(())
    }

    /// The schema version currently applied.
    pub fn schema_version(&self) -> StoreResult<u32> {
        migration::current_version(&self.conn)
    }

    // ── pragmas ──────────────────────────────────────────────────────

    fn apply_pragmas(conn: &Connection) -> StoreResult<()> {
        // WAL: readers do not block the writer.
        conn.pragma_update(None, "journal_mode", "WAL")?;

        // NORMAL sync is safe with WAL; a power loss can drop the last
        // transaction but not corrupt the file.
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "temp_store", "MEMORY")?;

        // Wait for a concurrent writer instead of failing immediately.
        conn.pragma_update(None, "busy_timeout", 5_000_i32)?;

        debug!("database pragmas applied");
        Ok(())
    }

    // ── queries ──────────────────────────────────────────────────────

    /// Load every row matching `filter`, in insertion order. `limit` caps
    /// the number of rows returned.
    fn select(&self, filter: &Filter, limit: Option<usize>) -> StoreResult<Vec<StoredRecord>> {
        let (clause, arg) = match filter {
            Filter::All | Filter::Contains(..) => (String::new(), None),
            Filter::Id(id) => (" WHERE id = ?1".to_string(), Some(id.to_string())),
            Filter::Equals(field, value) => (
                format!(" WHERE {} = ?1", column(*field)),
                Some(value.clone()),
            ),
        };
        let sql = format!("{SELECT_COLUMNS}{clause} ORDER BY seq");
        let mut stmt = self.conn.prepare(&sql)?;

        let map_row = |row: &rusqlite::Row<'_>| -> rusqlite::Result<RawRow> {
            Ok(RawRow {
                id: row.get(0)?,
                domain: row.get(1)?,
                identity: row.get(2)?,
                secret_ciphertext: row.get(3)?,
                secret_key: row.get(4)?,
            })
        };
        let rows = match &arg {
            Some(value) => stmt.query_map(params![value], map_row)?,
            None => stmt.query_map([], map_row)?,
        };

        let mut records = Vec::new();
        for row in rows {
            let record = row?.into_stored()?;
            // `Contains` is the only filter not already applied in SQL.
            if filter.matches(&record) {
                records.push(record);
                if limit.is_some_and(|max| records.len() >= max) {
                    break;
                }
            }
        }
        Ok(records)
    }

    fn first(&self, filter: &Filter) -> StoreResult<Option<StoredRecord>> {
        Ok(self.select(filter, Some(1))?.into_iter().next())
    }

    fn update_by_id(&self, id: RecordId, set: FieldSet) -> StoreResult<usize> {
        let now = Utc::now().timestamp();
        let id = id.to_string();
        let changed = match set {
            FieldSet::Domain(domain) => self.conn.execute(
                "UPDATE credentials SET domain = ?1, updated_at = ?2 WHERE id = ?3",
                params![domain, now, id],
            )?,
            FieldSet::Identity(identity) => self.conn.execute(
                "UPDATE credentials SET identity = ?1, updated_at = ?2 WHERE id = ?3",
                params![identity, now, id],
            )?,
            FieldSet::Secret(secret) => self.conn.execute(
                "UPDATE credentials SET secret_ciphertext = ?1, secret_key = ?2, updated_at = ?3
                 WHERE id = ?4",
                params![
                    secret.ciphertext.as_bytes(),
                    secret.key.as_bytes(),
                    now,
                    id
                ],
            )?,
        };
        Ok(changed)
    }

    fn delete_by_id(&self, id: RecordId) -> StoreResult<usize> {
        Ok(self
            .conn
            .execute("DELETE FROM credentials WHERE id = ?1", params![id.to_string()])?)
    }

    fn insert(&self, record: CredentialRecord) -> StoreResult<RecordId> {
        let id = RecordId::new();
        let now = Utc::now().timestamp();
        self.conn.execute(
            "INSERT INTO credentials (id, domain, identity, secret_ciphertext, secret_key, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                id.to_string(),
                record.domain,
                record.identity,
                record.secret.ciphertext.as_bytes(),
                record.secret.key.as_bytes(),
                now,
                now,
            ],
        )?;
        Ok(id)
    }

    fn delete_matching(&self, filter: &Filter) -> StoreResult<usize> {
        match filter {
            Filter::All => Ok(self.conn.execute("DELETE FROM credentials", [])?),
            Filter::Id(id) => self.delete_by_id(*id),
            Filter::Equals(field, value) => Ok(self.conn.execute(
                &format!("DELETE FROM credentials WHERE {} = ?1", column(*field)),
                params![value],
            )?),
            Filter::Contains(..) => {
                let ids: Vec<RecordId> = self.select(filter, None)?.iter().map(|r| r.id).collect();
                let tx = self.conn.unchecked_transaction()?;
                let mut removed = 0;
                for id in ids {
                    removed += tx.execute(
                        "DELETE FROM credentials WHERE id = ?1",
                        params![id.to_string()],
                    )?;
                }
                tx.commit()?;
                Ok(removed)
            }
        }
    }

    fn count_matching(&self, filter: &Filter) -> StoreResult<u64> {
        let count: i64 = match filter {
            Filter::All => {
                self.conn
                    .query_row("SELECT count(*) FROM credentials", [], |row| row.get(0))?
            }
            _ => self.select(filter, None)?.len() as i64,
        };
        Ok(count as u64)
    }
}

impl std::fmt::Debug for SqliteCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteCollection")
            .field("path", &self.conn.path())
            .finish()
    }
}

impl Collection for SqliteCollection {
    fn find_one(&self, filter: &Filter) -> CollectionResult<Option<StoredRecord>> {
        Ok(self.first(filter)?)
    }

    fn find(&self, filter: &Filter) -> CollectionResult<Vec<StoredRecord>> {
        let records = self.select(filter, None)?;
        debug!(count = records.len(), "loaded credential rows");
        Ok(records)
    }

    fn insert_one(&self, record: CredentialRecord) -> CollectionResult<RecordId> {
        let id = self.insert(record)?;
        info!(%id, "inserted credential");
        Ok(id)
    }

    fn update_one(&self, filter: &Filter, set: FieldSet) -> CollectionResult<u64> {
        let Some(target) = self.first(filter)? else {
            return Ok(0);
        };
        let changed = self.update_by_id(target.id, set)?;
        info!(id = %target.id, "updated credential");
        Ok(changed as u64)
    }

    fn delete_one(&self, filter: &Filter) -> CollectionResult<u64> {
        let Some(target) = self.first(filter)? else {
            return Ok(0);
        };
        let removed = self.delete_by_id(target.id)?;
        info!(id = %target.id, "deleted credential");
        Ok(removed as u64)
    }

    fn delete_many(&self, filter: &Filter) -> CollectionResult<u64> {
        let removed = self.delete_matching(filter)?;
        info!(removed, "deleted credentials");
        Ok(removed as u64)
    }

    fn count(&self, filter: &Filter) -> CollectionResult<u64> {
        Ok(self.count_matching(filter)?)
    }
}

// ---------------------------------------------------------------------------
// Internal row type (avoids leaking rusqlite details)
// ---------------------------------------------------------------------------

struct RawRow {
    id: String,
    domain: String,
    identity: String,
    secret_ciphertext: Vec<u8>,
    secret_key: Vec<u8>,
}

impl RawRow {
    fn into_stored(self) -> StoreResult<StoredRecord> {
        let uuid = Uuid::parse_str(&self.id).map_err(|e| StoreError::Corrupt {
            id: self.id.clone(),
            reason: format!("invalid record id: {e}"),
        })?;
        Ok(StoredRecord {
            id: RecordId::from(uuid),
            record: CredentialRecord {
                domain: self.domain,
                identity: self.identity,
                secret: SealedSecret {
                    ciphertext: Ciphertext::from_bytes(self.secret_ciphertext),
                    key: RecordKey::from_bytes(self.secret_key),
                },
            },
        })
    }
}

fn column(field: Field) -> &'static str {
    match field {
        Field::Domain => "domain",
        Field::Identity => "identity",
    }
}

// ── tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn record(domain: &str, identity: &str, secret: &str) -> CredentialRecord {
        CredentialRecord::new(domain, identity, SealedSecret::seal(secret).unwrap()).unwrap()
    }

    #[test]
    fn open_in_memory_is_migrated() {
        let coll = SqliteCollection::open_in_memory().unwrap();
        assert_eq!(coll.schema_version().unwrap(), migration::latest_version());
        assert_eq!(coll.count(&Filter::All).unwrap(), 0);
    }

    #[test]
    fn insert_and_read_back_sealed_secret() {
        let coll = SqliteCollection::open_in_memory().unwrap();
        let id = coll
            .insert_one(record("example.com", "alice", "Str0ng!Pass"))
            .unwrap();

        let stored = coll.find_one(&Filter::Id(id)).unwrap().unwrap();
        assert_eq!(stored.record.domain, "Example.Com");
        assert_eq!(stored.record.secret.open().unwrap(), "Str0ng!Pass");
    }

    #[test]
    fn find_preserves_insertion_order() {
        let coll = SqliteCollection::open_in_memory().unwrap();
        let ids: Vec<RecordId> = ["c.com", "a.com", "b.com"]
            .iter()
            .map(|d| coll.insert_one(record(d, "alice", "Str0ng!Pass")).unwrap())
            .collect();

        let found: Vec<RecordId> = coll
            .find(&Filter::All)
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(found, ids);
    }

    #[test]
    fn contains_filter_folds_unicode_case() {
        let coll = SqliteCollection::open_in_memory().unwrap();
        coll.insert_one(record("übung.de", "alice", "Str0ng!Pass"))
            .unwrap();
        coll.insert_one(record("other.org", "bob", "Str0ng!Pass"))
            .unwrap();

        let hits = coll
            .find(&Filter::Contains(Field::Domain, "ÜBUNG".into()))
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].record.domain, "Übung.De");
    }

    #[test]
    fn update_secret_writes_ciphertext_and_key_together() {
        let coll = SqliteCollection::open_in_memory().unwrap();
        let id = coll
            .insert_one(record("example.com", "alice", "Str0ng!Pass"))
            .unwrap();

        let fresh = SealedSecret::seal("N3w!Secret").unwrap();
        let changed = coll
            .update_one(&Filter::Id(id), FieldSet::Secret(fresh.clone()))
            .unwrap();
        assert_eq!(changed, 1);

        let stored = coll.find_one(&Filter::Id(id)).unwrap().unwrap();
        assert_eq!(stored.record.secret, fresh);
        assert_eq!(stored.record.secret.open().unwrap(), "N3w!Secret");
    }

    #[test]
    fn update_and_delete_without_match_touch_nothing() {
        let coll = SqliteCollection::open_in_memory().unwrap();
        coll.insert_one(record("example.com", "alice", "Str0ng!Pass"))
            .unwrap();

        let filter = Filter::Equals(Field::Domain, "Nosuch.Com".into());
        assert_eq!(
            coll.update_one(&filter, FieldSet::Identity("x".into()))
                .unwrap(),
            0
        );
        assert_eq!(coll.delete_one(&filter).unwrap(), 0);
        assert_eq!(coll.count(&Filter::All).unwrap(), 1);
    }

    #[test]
    fn delete_many_by_each_filter() {
        let coll = SqliteCollection::open_in_memory().unwrap();
        for (domain, identity) in [
            ("a.com", "alice"),
            ("b.com", "alice"),
            ("shop.com", "bob"),
            ("shopping.net", "carol"),
            ("z.org", "dave"),
        ] {
            coll.insert_one(record(domain, identity, "Str0ng!Pass"))
                .unwrap();
        }

        let removed = coll
            .delete_many(&Filter::Equals(Field::Identity, "alice".into()))
            .unwrap();
        assert_eq!(removed, 2);

        let removed = coll
            .delete_many(&Filter::Contains(Field::Domain, "SHOP".into()))
            .unwrap();
        assert_eq!(removed, 2);

        assert_eq!(coll.delete_many(&Filter::All).unwrap(), 1);
        assert_eq!(coll.count(&Filter::All).unwrap(), 0);
    }

    #[test]
    fn corrupt_id_is_reported() {
        let coll = SqliteCollection::open_in_memory().unwrap();
        coll.conn
            .execute(
                "INSERT INTO credentials (id, domain, identity, secret_ciphertext, secret_key, created_at, updated_at)
                 VALUES ('not-a-uuid', 'X.Com', 'alice', x'00', x'00', 0, 0)",
                [],
            )
            .unwrap();

        let result = coll.find(&Filter::All);
        assert!(matches!(
            result,
            Err(lockbox_vault::CollectionError::Corrupt { .. })
        ));
    }
}
