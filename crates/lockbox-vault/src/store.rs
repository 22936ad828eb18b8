//! Vault operations over a credential collection.
//!
//! [`VaultStore`] owns a [`Collection`] handle and nothing else. Every call
//! is an independent round trip against that collection: secrets are sealed
//! before anything is written, and decrypted only on the way out.
//!
//! # Locating records
//!
//! Update and delete address a single record through a [`Selector`]:
//!
//! - [`Selector::ByDomain`] compares against the stored, title-cased domain,
//!   so `example.com` finds `Example.Com`.
//! - [`Selector::ByIdentity`] compares exactly.
//! - [`Selector::ByPlaintextSecret`] decrypts every record in collection
//!   order and compares plaintexts. A record that fails to decrypt aborts
//!   the search, since skipping it could select the wrong record.
//!
//! The first match in collection order wins. Locate-then-write is two
//! collection calls; with concurrent writers the last write wins.

use crate::collection::{Collection, Field, FieldSet, Filter};
use crate::crypto::SealedSecret;
use crate::error::{Result, VaultError};
use crate::policy;
use crate::record::{
    CredentialRecord, Entry, RecordId, StoredRecord, normalize_domain, normalize_identity,
};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Which records a search returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criterion {
    /// Domain contains the text, ignoring case.
    ByDomainSubstring(String),
    /// Identity contains the text, ignoring case.
    ByIdentitySubstring(String),
    /// Every record.
    All,
}

/// Locates one record for update or delete.
#[derive(Clone, PartialEq, Eq)]
pub enum Selector {
    ByDomain(String),
    ByIdentity(String),
    ByPlaintextSecret(String),
}

impl std::fmt::Debug for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ByDomain(domain) => f.debug_tuple("ByDomain").field(domain).finish(),
            Self::ByIdentity(identity) => f.debug_tuple("ByIdentity").field(identity).finish(),
            Self::ByPlaintextSecret(_) => f
                .debug_tuple("ByPlaintextSecret")
                .field(&"<redacted>")
                .finish(),
        }
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ByDomain(domain) => write!(f, "domain '{domain}'"),
            Self::ByIdentity(identity) => write!(f, "identity '{identity}'"),
            Self::ByPlaintextSecret(_) => f.write_str("the given password"),
        }
    }
}

/// What a delete applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTarget {
    /// The first record matching the selector.
    One(Selector),
    /// Every record. Requires confirmation.
    All,
}

impl From<Selector> for DeleteTarget {
    fn from(selector: Selector) -> Self {
        Self::One(selector)
    }
}

/// Result of a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// This many records were removed.
    Deleted(u64),
    /// The operator did not confirm a bulk delete; nothing was removed.
    Cancelled,
}

/// A record that could not be decrypted while listing or searching.
#[derive(Debug, thiserror::Error)]
#[error("record {id} ({domain}, {identity}) could not be read: {source}")]
pub struct UnreadableRecord {
    pub id: RecordId,
    pub domain: String,
    pub identity: String,
    #[source]
    pub source: VaultError,
}

/// Lazily decrypted records, one item per stored record.
///
/// Each item is decrypted when it is pulled. A record that fails to
/// decrypt yields an [`UnreadableRecord`] and iteration carries on.
#[derive(Debug)]
pub struct Entries {
    docs: std::vec::IntoIter<StoredRecord>,
}

impl Entries {
    fn new(docs: Vec<StoredRecord>) -> Self {
        Self {
            docs: docs.into_iter(),
        }
    }
}

impl Iterator for Entries {
    type Item = std::result::Result<Entry, UnreadableRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let stored = self.docs.next()?;
        Some(stored.decrypt().map_err(|source| UnreadableRecord {
            id: stored.id,
            domain: stored.record.domain,
            identity: stored.record.identity,
            source,
        }))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.docs.size_hint()
    }
}

impl ExactSizeIterator for Entries {}

// ---------------------------------------------------------------------------
// VaultStore
// ---------------------------------------------------------------------------

/// Credential CRUD and search over a [`Collection`].
///
/// # Example
///
/// ```rust
/// use lockbox_vault::{DeleteOutcome, DeleteTarget, MemoryCollection, VaultStore};
///
/// # fn example() -> lockbox_vault::Result<()> {
/// let vault = VaultStore::new(MemoryCollection::new());
/// vault.add("example.com", "alice", "Str0ng!Pass")?;
///
/// for entry in vault.list_all()? {
///     let entry = entry.expect("freshly added record decrypts");
///     assert_eq!(entry.domain, "Example.Com");
///     assert_eq!(entry.secret, "Str0ng!Pass");
/// }
///
/// assert_eq!(vault.delete(&DeleteTarget::All, false)?, DeleteOutcome::Cancelled);
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
#[derive(Debug)]
pub struct VaultStore<C> {
    collection: C,
}

impl<C: Collection> VaultStore<C> {
    /// Wrap an open collection handle.
    pub fn new(collection: C) -> Self {
        Self { collection }
    }

    /// Borrow the underlying collection.
    pub fn collection(&self) -> &C {
        &self.collection
    }

    /// Give the collection handle back, e.g. to close it.
    pub fn into_inner(self) -> C {
        self.collection
    }

    // -- Create -------------------------------------------------------------

    /// Validate, encrypt under a fresh key, and insert a new credential.
    ///
    /// # Errors
    ///
    /// - [`VaultError::EmptyField`] for an empty domain or identity.
    /// - [`VaultError::PolicyViolation`] if the secret is too weak.
    /// - [`VaultError::Store`] if the insert fails.
    ///
    /// Nothing is written unless every step before the insert succeeded.
    pub fn add(&self, domain: &str, identity: &str, secret: &str) -> Result<RecordId> {
        let domain = normalize_domain(domain)?;
        let identity = normalize_identity(identity)?;
        policy::validate(secret)?;

        let record = CredentialRecord {
            domain,
            identity,
            secret: SealedSecret::seal(secret)?,
        };
        Ok(self.collection.insert_one(record)?)
    }

    // -- Read ---------------------------------------------------------------

    /// Every record, decrypted lazily, in collection order.
    pub fn list_all(&self) -> Result<Entries> {
        Ok(Entries::new(self.collection.find(&Filter::All)?))
    }

    /// Records matching `criterion`, decrypted lazily. No match is an empty
    /// iterator.
    pub fn search(&self, criterion: &Criterion) -> Result<Entries> {
        let filter = match criterion {
            Criterion::ByDomainSubstring(text) => Filter::Contains(Field::Domain, text.clone()),
            Criterion::ByIdentitySubstring(text) => Filter::Contains(Field::Identity, text.clone()),
            Criterion::All => Filter::All,
        };
        Ok(Entries::new(self.collection.find(&filter)?))
    }

    /// Number of stored records.
    pub fn count(&self) -> Result<u64> {
        Ok(self.collection.count(&Filter::All)?)
    }

    // -- Update -------------------------------------------------------------

    /// Overwrite the field named by `selector` on the first matching record.
    ///
    /// A new domain is title-cased. A new secret must pass the password
    /// policy and is sealed under a fresh key.
    ///
    /// # Errors
    ///
    /// - [`VaultError::NotFound`] if nothing matches.
    /// - [`VaultError::PolicyViolation`] / [`VaultError::EmptyField`] for an
    ///   unacceptable new value.
    /// - [`VaultError::DecryptionFailed`] if a secret selector meets a
    ///   record it cannot decrypt.
    pub fn update(&self, selector: &Selector, new_value: &str) -> Result<RecordId> {
        let set = match selector {
            Selector::ByDomain(_) => FieldSet::Domain(normalize_domain(new_value)?),
            Selector::ByIdentity(_) => FieldSet::Identity(normalize_identity(new_value)?),
            Selector::ByPlaintextSecret(_) => seal_new_secret(new_value)?,
        };
        self.write_located(selector, set)
    }

    /// Replace the secret of the record located by any selector.
    ///
    /// # Errors
    ///
    /// Same as [`VaultStore::update`].
    pub fn replace_secret(&self, selector: &Selector, new_secret: &str) -> Result<RecordId> {
        let set = seal_new_secret(new_secret)?;
        self.write_located(selector, set)
    }

    // -- Delete -------------------------------------------------------------

    /// Delete one record, or all of them when `confirmed` is true.
    ///
    /// Single-record deletes do not need confirmation.
    ///
    /// # Errors
    ///
    /// [`VaultError::NotFound`] if a single-record selector matches nothing.
    pub fn delete(&self, target: &DeleteTarget, confirmed: bool) -> Result<DeleteOutcome> {
        match target {
            DeleteTarget::All if !confirmed => Ok(DeleteOutcome::Cancelled),
            DeleteTarget::All => {
                let removed = self.collection.delete_many(&Filter::All)?;
                Ok(DeleteOutcome::Deleted(removed))
            }
            DeleteTarget::One(selector) => {
                let target = self.locate(selector)?;
                let removed = self.collection.delete_one(&Filter::Id(target.id))?;
                if removed == 0 {
                    return Err(not_found(selector));
                }
                Ok(DeleteOutcome::Deleted(removed))
            }
        }
    }

    // -- Internal helpers ---------------------------------------------------

    fn write_located(&self, selector: &Selector, set: FieldSet) -> Result<RecordId> {
        let target = self.locate(selector)?;
        let changed = self.collection.update_one(&Filter::Id(target.id), set)?;
        if changed == 0 {
            // Removed between locate and write.
            return Err(not_found(selector));
        }
        Ok(target.id)
    }

    /// Find the first record matching `selector`.
    fn locate(&self, selector: &Selector) -> Result<StoredRecord> {
        let found = match selector {
            Selector::ByDomain(domain) => self
                .collection
                .find_one(&Filter::Equals(Field::Domain, normalize_domain(domain)?))?,
            Selector::ByIdentity(identity) => self
                .collection
                .find_one(&Filter::Equals(Field::Identity, normalize_identity(identity)?))?,
            Selector::ByPlaintextSecret(secret) => {
                let mut hit = None;
                for stored in self.collection.find(&Filter::All)? {
                    if stored.record.secret.open()? == *secret {
                        hit = Some(stored);
                        break;
                    }
                }
                hit
            }
        };
        found.ok_or_else(|| not_found(selector))
    }
}

fn seal_new_secret(secret: &str) -> Result<FieldSet> {
    policy::validate(secret)?;
    Ok(FieldSet::Secret(SealedSecret::seal(secret)?))
}

fn not_found(selector: &Selector) -> VaultError {
    VaultError::NotFound {
        selector: selector.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::{CollectionError, CollectionResult, MemoryCollection};
    use crate::crypto::{Ciphertext, RecordKey};
    use crate::policy::PolicyViolation;

    fn test_vault() -> VaultStore<MemoryCollection> {
        VaultStore::new(MemoryCollection::new())
    }

    fn entries(it: Entries) -> Vec<Entry> {
        it.map(|e| e.unwrap()).collect()
    }

    #[test]
    fn add_then_list_decrypts() {
        let vault = test_vault();
        vault.add("example.com", "alice", "Str0ng!Pass").unwrap();

        let list = entries(vault.list_all().unwrap());
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].domain, "Example.Com");
        assert_eq!(list[0].identity, "alice");
        assert_eq!(list[0].secret, "Str0ng!Pass");
    }

    #[test]
    fn stored_document_holds_only_ciphertext() {
        let vault = test_vault();
        vault.add("example.com", "alice", "Str0ng!Pass").unwrap();

        let docs = vault.collection().find(&Filter::All).unwrap();
        let secret = &docs[0].record.secret;
        assert!(
            !secret
                .ciphertext
                .as_bytes()
                .windows(b"Str0ng!Pass".len())
                .any(|w| w == b"Str0ng!Pass")
        );
        assert_eq!(secret.key.as_bytes().len(), crate::crypto::KEY_LEN);
    }

    #[test]
    fn each_record_gets_its_own_key() {
        let vault = test_vault();
        vault.add("a.com", "alice", "Str0ng!Pass").unwrap();
        vault.add("b.com", "alice", "Str0ng!Pass").unwrap();

        let docs = vault.collection().find(&Filter::All).unwrap();
        assert_ne!(docs[0].record.secret.key, docs[1].record.secret.key);
        assert_ne!(docs[0].record.secret.ciphertext, docs[1].record.secret.ciphertext);
    }

    #[test]
    fn weak_password_persists_nothing() {
        let vault = test_vault();
        let result = vault.add("example.com", "alice", "weak");
        assert!(matches!(
            result,
            Err(VaultError::PolicyViolation(PolicyViolation::TooShort))
        ));
        assert_eq!(vault.count().unwrap(), 0);
    }

    #[test]
    fn empty_identity_rejected() {
        let vault = test_vault();
        let result = vault.add("example.com", " ", "Str0ng!Pass");
        assert!(matches!(result, Err(VaultError::EmptyField { field: "identity" })));
        assert_eq!(vault.count().unwrap(), 0);
    }

    #[test]
    fn search_by_domain_substring_ignores_case() {
        let vault = test_vault();
        vault.add("example.com", "alice", "Str0ng!Pass").unwrap();
        vault.add("other.org", "bob", "An0ther!Pass").unwrap();

        let hits = entries(
            vault
                .search(&Criterion::ByDomainSubstring("exam".into()))
                .unwrap(),
        );
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].domain, "Example.Com");
        assert_eq!(hits[0].secret, "Str0ng!Pass");
    }

    #[test]
    fn search_by_identity_and_all() {
        let vault = test_vault();
        vault.add("example.com", "Alice@mail.com", "Str0ng!Pass").unwrap();
        vault.add("other.org", "bob", "An0ther!Pass").unwrap();

        let hits = entries(
            vault
                .search(&Criterion::ByIdentitySubstring("ALICE".into()))
                .unwrap(),
        );
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].identity, "Alice@mail.com");

        assert_eq!(vault.search(&Criterion::All).unwrap().len(), 2);
    }

    #[test]
    fn search_without_matches_is_empty() {
        let vault = test_vault();
        vault.add("example.com", "alice", "Str0ng!Pass").unwrap();
        let mut hits = vault
            .search(&Criterion::ByDomainSubstring("nothing".into()))
            .unwrap();
        assert!(hits.next().is_none());
    }

    #[test]
    fn unreadable_record_does_not_stop_listing() {
        let coll = MemoryCollection::new();
        let vault = VaultStore::new(&coll);
        let broken_id = vault.add("broken.com", "alice", "Str0ng!Pass").unwrap();
        vault.add("fine.com", "bob", "An0ther!Pass").unwrap();

        let mut broken = coll.find_one(&Filter::Id(broken_id)).unwrap().unwrap();
        broken.record.secret.key = RecordKey::from_bytes(vec![7u8; crate::crypto::KEY_LEN]);
        assert!(coll.overwrite(broken).unwrap());

        let results: Vec<_> = vault.list_all().unwrap().collect();
        assert_eq!(results.len(), 2);
        let failure = results[0].as_ref().unwrap_err();
        assert_eq!(failure.id, broken_id);
        assert!(matches!(failure.source, VaultError::DecryptionFailed { .. }));
        assert_eq!(results[1].as_ref().unwrap().secret, "An0ther!Pass");
    }

    #[test]
    fn update_domain_by_domain() {
        let vault = test_vault();
        vault.add("example.com", "alice", "Str0ng!Pass").unwrap();

        vault
            .update(&Selector::ByDomain("example.com".into()), "renamed.com")
            .unwrap();

        let list = entries(vault.list_all().unwrap());
        assert_eq!(list[0].domain, "Renamed.Com");
        assert_eq!(list[0].identity, "alice");
        assert_eq!(list[0].secret, "Str0ng!Pass");
    }

    #[test]
    fn update_identity_by_identity() {
        let vault = test_vault();
        vault.add("example.com", "alice", "Str0ng!Pass").unwrap();

        vault
            .update(&Selector::ByIdentity("alice".into()), "alice@mail.com")
            .unwrap();

        let list = entries(vault.list_all().unwrap());
        assert_eq!(list[0].identity, "alice@mail.com");
        assert_eq!(list[0].domain, "Example.Com");
    }

    #[test]
    fn update_secret_by_plaintext_reseals_with_fresh_key() {
        let vault = test_vault();
        vault.add("example.com", "alice", "Str0ng!Pass").unwrap();
        let before = vault.collection().find(&Filter::All).unwrap()[0].clone();

        vault
            .update(&Selector::ByPlaintextSecret("Str0ng!Pass".into()), "N3w!Secret")
            .unwrap();

        let after = vault.collection().find(&Filter::All).unwrap()[0].clone();
        assert_eq!(after.id, before.id);
        assert_ne!(after.record.secret.key, before.record.secret.key);
        assert_eq!(after.decrypt().unwrap().secret, "N3w!Secret");
    }

    #[test]
    fn update_secret_rejects_weak_password_and_keeps_record() {
        let vault = test_vault();
        vault.add("example.com", "alice", "Str0ng!Pass").unwrap();

        let result = vault.update(&Selector::ByPlaintextSecret("Str0ng!Pass".into()), "weakpass");
        assert!(matches!(result, Err(VaultError::PolicyViolation(_))));
        assert_eq!(
            entries(vault.list_all().unwrap())[0].secret,
            "Str0ng!Pass"
        );
    }

    #[test]
    fn update_missing_record_is_not_found() {
        let vault = test_vault();
        vault.add("example.com", "alice", "Str0ng!Pass").unwrap();

        let result = vault.update(&Selector::ByDomain("nosuch.com".into()), "x.com");
        assert!(matches!(result, Err(VaultError::NotFound { .. })));

        let result = vault.update(&Selector::ByPlaintextSecret("Wr0ng!Pass".into()), "N3w!Secret");
        assert!(matches!(result, Err(VaultError::NotFound { .. })));
    }

    #[test]
    fn update_targets_first_match_only() {
        let vault = test_vault();
        vault.add("a.com", "shared", "Str0ng!Pass").unwrap();
        vault.add("b.com", "shared", "Str0ng!Pass").unwrap();

        vault
            .update(&Selector::ByIdentity("shared".into()), "mine")
            .unwrap();

        let list = entries(vault.list_all().unwrap());
        assert_eq!(list[0].identity, "mine");
        assert_eq!(list[1].identity, "shared");
    }

    #[test]
    fn secret_selector_fails_on_undecryptable_record() {
        let coll = MemoryCollection::new();
        let vault = VaultStore::new(&coll);
        let id = vault.add("example.com", "alice", "Str0ng!Pass").unwrap();

        let mut broken = coll.find_one(&Filter::Id(id)).unwrap().unwrap();
        broken.record.secret.ciphertext = Ciphertext::from_bytes(vec![0u8; 4]);
        coll.overwrite(broken).unwrap();

        let result = vault.delete(
            &DeleteTarget::One(Selector::ByPlaintextSecret("Str0ng!Pass".into())),
            true,
        );
        assert!(matches!(result, Err(VaultError::DecryptionFailed { .. })));
        assert_eq!(vault.count().unwrap(), 1);
    }

    #[test]
    fn replace_secret_by_domain() {
        let vault = test_vault();
        vault.add("example.com", "alice", "Str0ng!Pass").unwrap();

        vault
            .replace_secret(&Selector::ByDomain("EXAMPLE.COM".into()), "N3w!Secret")
            .unwrap();

        assert_eq!(entries(vault.list_all().unwrap())[0].secret, "N3w!Secret");
    }

    #[test]
    fn delete_missing_domain_is_not_found() {
        let vault = test_vault();
        vault.add("example.com", "alice", "Str0ng!Pass").unwrap();

        let result = vault.delete(&Selector::ByDomain("nosuch.com".into()).into(), true);
        assert!(matches!(result, Err(VaultError::NotFound { .. })));
        assert_eq!(vault.count().unwrap(), 1);
    }

    #[test]
    fn delete_single_by_each_selector() {
        let vault = test_vault();
        vault.add("a.com", "alice", "Str0ng!Pass").unwrap();
        vault.add("b.com", "bob", "An0ther!Pass").unwrap();
        vault.add("c.com", "carol", "Th1rd!Pass").unwrap();

        let targets = [
            Selector::ByDomain("a.com".into()),
            Selector::ByIdentity("bob".into()),
            Selector::ByPlaintextSecret("Th1rd!Pass".into()),
        ];
        for selector in targets {
            let outcome = vault.delete(&DeleteTarget::One(selector), false).unwrap();
            assert_eq!(outcome, DeleteOutcome::Deleted(1));
        }
        assert_eq!(vault.count().unwrap(), 0);
    }

    #[test]
    fn delete_all_requires_confirmation() {
        let vault = test_vault();
        vault.add("a.com", "alice", "Str0ng!Pass").unwrap();
        vault.add("b.com", "bob", "An0ther!Pass").unwrap();
        vault.add("c.com", "carol", "Th1rd!Pass").unwrap();

        assert_eq!(
            vault.delete(&DeleteTarget::All, false).unwrap(),
            DeleteOutcome::Cancelled
        );
        assert_eq!(vault.count().unwrap(), 3);

        assert_eq!(
            vault.delete(&DeleteTarget::All, true).unwrap(),
            DeleteOutcome::Deleted(3)
        );
        assert_eq!(vault.count().unwrap(), 0);
    }

    #[test]
    fn selector_display_hides_secret() {
        let selector = Selector::ByPlaintextSecret("Str0ng!Pass".into());
        assert!(!selector.to_string().contains("Str0ng"));
        assert!(!format!("{selector:?}").contains("Str0ng"));
    }

    // -- Backend failures ---------------------------------------------------

    /// Reads pass through; every write fails like a broken backend.
    struct ReadOnly<C>(C);

    fn backend_down() -> CollectionError {
        CollectionError::Backend(Box::new(std::io::Error::other("disk unavailable")))
    }

    impl<C: Collection> Collection for ReadOnly<C> {
        fn find_one(&self, filter: &Filter) -> CollectionResult<Option<StoredRecord>> {
            self.0.find_one(filter)
        }

        fn find(&self, filter: &Filter) -> CollectionResult<Vec<StoredRecord>> {
            self.0.find(filter)
        }

        fn insert_one(&self, _record: CredentialRecord) -> CollectionResult<RecordId> {
            Err(backend_down())
        }

        fn update_one(&self, _filter: &Filter, _set: FieldSet) -> CollectionResult<u64> {
            Err(backend_down())
        }

        fn delete_one(&self, _filter: &Filter) -> CollectionResult<u64> {
            Err(backend_down())
        }

        fn delete_many(&self, _filter: &Filter) -> CollectionResult<u64> {
            Err(backend_down())
        }
    }

    #[test]
    fn failed_insert_persists_nothing() {
        let inner = MemoryCollection::new();
        let vault = VaultStore::new(ReadOnly(&inner));

        let err = vault.add("example.com", "alice", "Str0ng!Pass").unwrap_err();
        assert!(matches!(err, VaultError::Store(CollectionError::Backend(_))));
        assert_eq!(inner.count(&Filter::All).unwrap(), 0);
    }

    #[test]
    fn failed_update_and_delete_keep_record() {
        let inner = MemoryCollection::new();
        VaultStore::new(&inner)
            .add("example.com", "alice", "Str0ng!Pass")
            .unwrap();
        let before = inner.find(&Filter::All).unwrap();

        let vault = VaultStore::new(ReadOnly(&inner));
        let by_domain = Selector::ByDomain("example.com".into());
        assert!(matches!(
            vault.update(&by_domain, "other.org"),
            Err(VaultError::Store(_))
        ));
        assert!(matches!(
            vault.replace_secret(&by_domain, "N3w!Secret"),
            Err(VaultError::Store(_))
        ));
        assert!(matches!(
            vault.delete(&DeleteTarget::One(by_domain), true),
            Err(VaultError::Store(_))
        ));
        assert!(matches!(
            vault.delete(&DeleteTarget::All, true),
            Err(VaultError::Store(_))
        ));

        assert_eq!(inner.find(&Filter::All).unwrap(), before);
        let entry = entries(vault.list_all().unwrap()).remove(0);
        assert_eq!(entry.domain, "Example.Com");
        assert_eq!(entry.secret, "Str0ng!Pass");
    }
}
