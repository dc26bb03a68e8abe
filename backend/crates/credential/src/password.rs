//! Clear Text Password
//!
//! Owned password bytes for handing a secret across threads or out of
//! configuration loading.
//!
//! ## Security
//! - Implements `Zeroize` and `ZeroizeOnDrop`
//! - Does not implement `Clone` to prevent accidental copies
//! - Debug output is redacted

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{CredentialError, CredentialResult};

/// Clear text password with automatic memory zeroization
///
/// ## Examples
/// ```rust
/// use credential::ClearTextPassword;
///
/// let password = ClearTextPassword::new("my_secure_password")?;
/// assert_eq!(password.len(), 18);
/// // Password is automatically zeroized when dropped
/// # Ok::<(), credential::CredentialError>(())
/// ```
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(Vec<u8>);

impl ClearTextPassword {
    /// Wrap a password, rejecting empty input
    pub fn new(raw: impl Into<Vec<u8>>) -> CredentialResult<Self> {
        let bytes = raw.into();
        if bytes.is_empty() {
            return Err(CredentialError::InvalidInput("password must not be empty"));
        }
        Ok(Self(bytes))
    }

    /// Wrap bytes the crate generated itself
    pub(crate) fn from_generated(bytes: Vec<u8>) -> Self {
        debug_assert!(!bytes.is_empty());
        Self(bytes)
    }

    /// Get the password bytes for hashing
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; empty passwords are rejected by [`ClearTextPassword::new`]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextPassword")
            .field(&"[REDACTED]")
            .finish()
    }
}
