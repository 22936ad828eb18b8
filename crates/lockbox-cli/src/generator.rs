//! Random password suggestions.
//!
//! [`RandomPasswordSupplier`] draws from the system CSPRNG (via `ring`) and
//! always includes at least one uppercase letter, lowercase letter, digit
//! and special character, so its output passes the vault's password policy.

use lockbox_vault::policy::{MIN_LENGTH, SPECIAL_CHARS};
use lockbox_vault::{PasswordSupplier, Result, VaultError};
use ring::rand::{SecureRandom, SystemRandom};

const UPPER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWER: &str = "abcdefghijklmnopqrstuvwxyz";
const DIGITS: &str = "0123456789";

/// Default length of a generated password.
pub const DEFAULT_LENGTH: usize = 16;

/// Generates policy-compliant random passwords.
pub struct RandomPasswordSupplier {
    length: usize,
    rng: SystemRandom,
}

impl RandomPasswordSupplier {
    /// Create a supplier producing passwords of `length` characters.
    ///
    /// Lengths below the policy minimum are raised to it.
    pub fn new(length: usize) -> Self {
        Self {
            length: length.max(MIN_LENGTH),
            rng: SystemRandom::new(),
        }
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Uniform index in `0..n`, by rejection sampling over `u32`.
    fn index(&self, n: usize) -> Result<usize> {
        let n = n as u32;
        let zone = u32::MAX - (u32::MAX % n);
        loop {
            let mut buf = [0u8; 4];
            self.rng.fill(&mut buf).map_err(|_| VaultError::SupplierFailed {
                reason: "system random number generator failed".into(),
            })?;
            let value = u32::from_le_bytes(buf);
            if value < zone {
                return Ok((value % n) as usize);
            }
        }
    }

    fn pick(&self, alphabet: &[char]) -> Result<char> {
        Ok(alphabet[self.index(alphabet.len())?])
    }
}

impl Default for RandomPasswordSupplier {
    fn default() -> Self {
        Self::new(DEFAULT_LENGTH)
    }
}

impl PasswordSupplier for RandomPasswordSupplier {
    fn suggest(&self) -> Result<String> {
        let classes: [Vec<char>; 4] = [
            UPPER.chars().collect(),
            LOWER.chars().collect(),
            DIGITS.chars().collect(),
            SPECIAL_CHARS.chars().collect(),
        ];
        let all: Vec<char> = classes.iter().flatten().copied().collect();

        let mut chars = Vec::with_capacity(self.length);
        for class in &classes {
            chars.push(self.pick(class)?);
        }
        while chars.len() < self.length {
            chars.push(self.pick(&all)?);
        }

        // Fisher-Yates, so the guaranteed characters are not always first.
        for i in (1..chars.len()).rev() {
            let j = self.index(i + 1)?;
            chars.swap(i, j);
        }

        Ok(chars.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockbox_vault::policy;

    #[test]
    fn suggestions_pass_the_policy() {
        let supplier = RandomPasswordSupplier::default();
        for _ in 0..200 {
            let password = supplier.suggest().unwrap();
            assert_eq!(password.chars().count(), DEFAULT_LENGTH);
            assert_eq!(policy::validate(&password), Ok(()), "{password}");
        }
    }

    #[test]
    fn short_lengths_are_raised_to_minimum() {
        let supplier = RandomPasswordSupplier::new(3);
        assert_eq!(supplier.length(), MIN_LENGTH);
        let password = supplier.suggest().unwrap();
        assert_eq!(password.chars().count(), MIN_LENGTH);
        assert!(policy::validate(&password).is_ok());
    }

    #[test]
    fn suggestions_differ() {
        let supplier = RandomPasswordSupplier::new(24);
        assert_ne!(supplier.suggest().unwrap(), supplier.suggest().unwrap());
    }

    #[test]
    fn index_stays_in_range() {
        let supplier = RandomPasswordSupplier::default();
        for n in 1..50 {
            assert!(supplier.index(n).unwrap() < n);
        }
    }
}
