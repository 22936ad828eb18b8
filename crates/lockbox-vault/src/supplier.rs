//! Source of suggested passwords.
//!
//! The vault never invents secrets itself. When the operator asks for a
//! suggestion, the session calls a [`PasswordSupplier`]; whatever it returns
//! still goes through the password policy in
//! [`VaultStore::add`](crate::store::VaultStore::add).

use crate::error::Result;

/// Produces candidate passwords on request.
pub trait PasswordSupplier {
    /// Return a new candidate password.
    fn suggest(&self) -> Result<String>;
}

impl<F> PasswordSupplier for F
where
    F: Fn() -> Result<String>,
{
    fn suggest(&self) -> Result<String> {
        self()
    }
}
