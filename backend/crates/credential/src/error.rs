//! Credential Error Types
//!
//! Every failure of the hashing core is one of these variants. A password
//! mismatch is not an error: `verify` returns `Ok(false)` for it.

use thiserror::Error;

/// Credential result type alias
pub type CredentialResult<T> = Result<T, CredentialError>;

/// Credential hashing/verification errors
#[derive(Debug, Error)]
pub enum CredentialError {
    /// Password or explicit salt is unusable (e.g. empty)
    #[error("Invalid input: {0}")]
    InvalidInput(&'static str),

    /// Stored record could not be parsed into tag, parameters, salt and key
    #[error("Malformed credential record: {0}")]
    MalformedRecord(String),

    /// The key-derivation primitive failed or would exceed the memory ceiling
    #[error("Key derivation failed: {0}")]
    DerivationFailure(String),

    /// Hasher configuration rejected at construction
    #[error("Invalid hasher configuration: {0}")]
    InvalidConfig(String),
}

impl CredentialError {
    /// True for errors caused by stored data rather than by the caller's input
    /// or the host's resources.
    ///
    /// Callers must not report these to end users as "wrong password".
    pub fn is_integrity_problem(&self) -> bool {
        matches!(self, CredentialError::MalformedRecord(_))
    }

    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        CredentialError::MalformedRecord(message.into())
    }

    pub(crate) fn derivation(message: impl Into<String>) -> Self {
        CredentialError::DerivationFailure(message.into())
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        CredentialError::InvalidConfig(message.into())
    }

    /// Log the error with appropriate level
    pub(crate) fn log(&self) {
        match self {
            CredentialError::DerivationFailure(msg) => {
                tracing::error!(message = %msg, "Credential derivation failed");
            }
            CredentialError::MalformedRecord(msg) => {
                tracing::warn!(message = %msg, "Malformed credential record");
            }
            CredentialError::InvalidConfig(msg) => {
                tracing::error!(message = %msg, "Rejected hasher configuration");
            }
            CredentialError::InvalidInput(_) => {
                tracing::debug!(error = %self, "Credential input rejected");
            }
        }
    }
}
