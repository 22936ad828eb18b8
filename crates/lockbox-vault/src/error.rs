//! Vault error types.
//!
//! Every public operation in this crate returns [`VaultError`]. Each variant
//! names one failure kind so callers can react to it (retry with another
//! password, report a missing record, give up on a broken backend) without
//! inspecting strings.

use crate::collection::CollectionError;
use crate::policy::PolicyViolation;

/// Unified error type for the Lockbox credential vault.
#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    // -- Validation errors --------------------------------------------------
    /// The candidate secret does not meet the password policy.
    #[error("password rejected: {0}")]
    PolicyViolation(#[from] PolicyViolation),

    /// A required plaintext field was empty.
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },

    // -- Crypto errors ------------------------------------------------------
    /// Encryption failed (CSPRNG failure, ring internal error).
    #[error("encryption failed: {reason}")]
    EncryptionFailed { reason: String },

    /// Decryption failed (wrong key, tampered or truncated ciphertext).
    #[error("decryption failed: {reason}")]
    DecryptionFailed { reason: String },

    // -- Lookup errors ------------------------------------------------------
    /// No record matched the selector.
    #[error("no record matches {selector}")]
    NotFound { selector: String },

    // -- Collaborator errors -----------------------------------------------
    /// The password supplier could not produce a suggestion.
    #[error("password supplier failed: {reason}")]
    SupplierFailed { reason: String },

    // -- Underlying errors --------------------------------------------------
    /// The backing collection rejected or could not complete the operation.
    #[error("store error: {0}")]
    Store(#[from] CollectionError),
}

/// Convenience alias used throughout the vault crate.
pub type Result<T> = std::result::Result<T, VaultError>;
