//! Credential Crate - Password Hashing Core
//!
//! This crate derives, encodes and verifies password credentials for an
//! account store:
//! - scrypt key derivation (memory-hard, tunable cost)
//! - Per-credential random salts from the OS RNG
//! - Self-describing `:`-delimited records (compact atproto form also accepted)
//! - Constant-time comparison of derived keys
//! - Deterministic app-password hashing keyed by account DID
//! - Optional bounded async front-end for tokio callers
//!
//! ## Usage
//! ```rust
//! use credential::{CredentialHasher, HasherConfig};
//!
//! let hasher = CredentialHasher::new(HasherConfig::testing())?;
//! let record = hasher.hash(b"correct horse battery staple")?;
//! assert!(hasher.verify(b"correct horse battery staple", &record)?);
//! assert!(!hasher.verify(b"wrong", &record)?);
//! # Ok::<(), credential::CredentialError>(())
//! ```

pub mod app_password;
pub mod config;
pub mod crypto;
pub mod error;
pub mod hasher;
pub mod password;
pub mod pool;
pub mod record;

pub use config::{HasherConfig, RecordFormat};
pub use error::{CredentialError, CredentialResult};
pub use hasher::CredentialHasher;
pub use password::ClearTextPassword;
pub use pool::HashingPool;
pub use record::{EncodedHash, ScryptParams};
