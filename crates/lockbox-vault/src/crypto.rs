//! Per-record AES-256-GCM encryption using the `ring` crate.
//!
//! Every record gets its own 256-bit key, generated from the system CSPRNG
//! when the record is created. There is no master key: a leaked key exposes
//! exactly one secret.
//!
//! # Ciphertext format
//!
//! ```text
//! [ nonce (12 bytes) | encrypted secret | GCM tag (16 bytes) ]
//! ```
//!
//! A fresh random nonce is drawn for every call to [`encrypt`], so sealing
//! the same secret twice under the same key never yields the same bytes.

use ring::aead::{
    self, Aad, BoundKey, NONCE_LEN, Nonce, NonceSequence, OpeningKey, SealingKey, UnboundKey,
};
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroizing;

use crate::error::{Result, VaultError};

/// Length of a record key in bytes.
pub const KEY_LEN: usize = 32;

/// Length of the AES-256-GCM nonce in bytes (96 bits).
pub const NONCE_LEN_BYTES: usize = NONCE_LEN;

/// Length of the GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// AES-256-GCM algorithm from `ring`.
static AEAD_ALG: &aead::Algorithm = &aead::AES_256_GCM;

// ---------------------------------------------------------------------------
// Key and ciphertext types
// ---------------------------------------------------------------------------

/// A 256-bit symmetric key owned by exactly one record.
///
/// The key bytes are wiped from memory when the value is dropped. Keys
/// loaded from storage are not length-checked until they are used; a key of
/// the wrong size fails in [`encrypt`] or [`decrypt`].
#[derive(Clone, PartialEq, Eq)]
pub struct RecordKey(Zeroizing<Vec<u8>>);

impl RecordKey {
    /// Wrap key bytes loaded from storage.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(Zeroizing::new(bytes.into()))
    }

    /// The raw key bytes, for persistence.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for RecordKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RecordKey(..)")
    }
}

/// An authenticated ciphertext: nonce, encrypted bytes and tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ciphertext(Vec<u8>);

impl Ciphertext {
    /// Wrap bytes loaded from storage. No validation happens until
    /// [`decrypt`] is called.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A ciphertext together with the only key that opens it.
///
/// This is the unit the vault persists: the two halves are never written
/// separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedSecret {
    pub ciphertext: Ciphertext,
    pub key: RecordKey,
}

impl SealedSecret {
    /// Generate a fresh key and encrypt `plaintext` under it.
    pub fn seal(plaintext: &str) -> Result<Self> {
        let key = generate_key()?;
        let ciphertext = encrypt(plaintext, &key)?;
        Ok(Self { ciphertext, key })
    }

    /// Decrypt the secret with its own key.
    pub fn open(&self) -> Result<String> {
        decrypt(&self.ciphertext, &self.key)
    }
}

// ---------------------------------------------------------------------------
// Nonce handling
// ---------------------------------------------------------------------------

/// A nonce sequence that yields exactly one nonce and then errors.
///
/// `ring` requires a [`NonceSequence`] for sealing and opening keys. Each
/// bound key here is used for a single operation.
struct SingleNonce(Option<[u8; NONCE_LEN_BYTES]>);

impl SingleNonce {
    fn new(bytes: [u8; NONCE_LEN_BYTES]) -> Self {
        Self(Some(bytes))
    }
}

impl NonceSequence for SingleNonce {
    fn advance(&mut self) -> std::result::Result<Nonce, ring::error::Unspecified> {
        self.0
            .take()
            .map(Nonce::assume_unique_for_key)
            .ok_or(ring::error::Unspecified)
    }
}

// ---------------------------------------------------------------------------
// Key generation
// ---------------------------------------------------------------------------

/// Generate a fresh record key from the system CSPRNG.
///
/// # Errors
///
/// Returns [`VaultError::EncryptionFailed`] if the CSPRNG fails.
pub fn generate_key() -> Result<RecordKey> {
    let mut bytes = Zeroizing::new(vec![0u8; KEY_LEN]);
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| VaultError::EncryptionFailed {
            reason: "failed to generate random key".into(),
        })?;
    Ok(RecordKey(bytes))
}

// ---------------------------------------------------------------------------
// Encryption
// ---------------------------------------------------------------------------

/// Encrypt `plaintext` under `key` with AES-256-GCM and a random nonce.
///
/// # Errors
///
/// Returns [`VaultError::EncryptionFailed`] if the key is not [`KEY_LEN`]
/// bytes, or if nonce generation or sealing fails.
pub fn encrypt(plaintext: &str, key: &RecordKey) -> Result<Ciphertext> {
    if key.as_bytes().len() != KEY_LEN {
        return Err(VaultError::EncryptionFailed {
            reason: format!("key must be {} bytes, got {}", KEY_LEN, key.as_bytes().len()),
        });
    }

    let mut nonce_bytes = [0u8; NONCE_LEN_BYTES];
    SystemRandom::new()
        .fill(&mut nonce_bytes)
        .map_err(|_| VaultError::EncryptionFailed {
            reason: "failed to generate random nonce".into(),
        })?;

    let unbound_key =
        UnboundKey::new(AEAD_ALG, key.as_bytes()).map_err(|_| VaultError::EncryptionFailed {
            reason: "failed to create AES-256-GCM key".into(),
        })?;
    let mut sealing_key = SealingKey::new(unbound_key, SingleNonce::new(nonce_bytes));

    // Nonce first, then the sealed payload with its tag appended in place.
    let mut out = Vec::with_capacity(NONCE_LEN_BYTES + plaintext.len() + TAG_LEN);
    out.extend_from_slice(&nonce_bytes);
    let mut in_out = plaintext.as_bytes().to_vec();
    sealing_key
        .seal_in_place_append_tag(Aad::empty(), &mut in_out)
        .map_err(|_| VaultError::EncryptionFailed {
            reason: "seal_in_place failed".into(),
        })?;
    out.extend_from_slice(&in_out);

    Ok(Ciphertext(out))
}

/// Decrypt `ciphertext` with `key` and return the plaintext secret.
///
/// # Errors
///
/// Returns [`VaultError::DecryptionFailed`] if the key has the wrong length,
/// or the ciphertext is truncated, was tampered with, belongs to a different
/// key, or does not decode to UTF-8.
pub fn decrypt(ciphertext: &Ciphertext, key: &RecordKey) -> Result<String> {
    if key.as_bytes().len() != KEY_LEN {
        return Err(VaultError::DecryptionFailed {
            reason: format!("key must be {} bytes, got {}", KEY_LEN, key.as_bytes().len()),
        });
    }

    let bytes = ciphertext.as_bytes();
    if bytes.len() < NONCE_LEN_BYTES + TAG_LEN {
        return Err(VaultError::DecryptionFailed {
            reason: format!(
                "ciphertext is {} bytes, shorter than nonce and tag",
                bytes.len()
            ),
        });
    }

    let (nonce, sealed) = bytes.split_at(NONCE_LEN_BYTES);
    let mut nonce_bytes = [0u8; NONCE_LEN_BYTES];
    nonce_bytes.copy_from_slice(nonce);

    let unbound_key =
        UnboundKey::new(AEAD_ALG, key.as_bytes()).map_err(|_| VaultError::DecryptionFailed {
            reason: "failed to create AES-256-GCM key".into(),
        })?;
    let mut opening_key = OpeningKey::new(unbound_key, SingleNonce::new(nonce_bytes));

    let mut in_out = Zeroizing::new(sealed.to_vec());
    let plaintext = opening_key
        .open_in_place(Aad::empty(), &mut in_out)
        .map_err(|_| VaultError::DecryptionFailed {
            reason: "authentication failed, wrong key or corrupted data".into(),
        })?;

    String::from_utf8(plaintext.to_vec()).map_err(|_| VaultError::DecryptionFailed {
        reason: "decrypted secret is not valid UTF-8".into(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
