//! Hasher Configuration
//!
//! All cost parameters live in one [`HasherConfig`], validated once by
//! [`crate::CredentialHasher::new`] and never passed per call.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CredentialError, CredentialResult};

// ============================================================================
// Constants
// ============================================================================

/// Default work factor N (2^14, Node's `crypto.scrypt` default)
pub const DEFAULT_WORK_FACTOR: u64 = 1 << 14;

/// Default block size r
pub const DEFAULT_BLOCK_SIZE: u32 = 8;

/// Default parallelism p
pub const DEFAULT_PARALLELISM: u32 = 1;

/// Default memory ceiling (32 MiB, Node's `maxmem` default)
pub const DEFAULT_MAX_MEMORY: u64 = 32 << 20;

/// Default random salt length in bytes (hex-encoded to twice this in records)
pub const DEFAULT_SALT_LEN: usize = 16;

/// Default derived key length in bytes
pub const DEFAULT_KEY_LEN: usize = 64;

/// Accepted random salt lengths in bytes
pub const SALT_LEN_RANGE: std::ops::RangeInclusive<usize> = 8..=64;

/// Accepted derived key lengths in bytes
pub const KEY_LEN_RANGE: std::ops::RangeInclusive<usize> = 16..=64;

// ============================================================================
// scrypt Parameters
// ============================================================================

/// scrypt cost parameters as carried by a record
///
/// `log_n` is the base-2 logarithm of the work factor N.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScryptParams {
    pub log_n: u8,
    pub block_size: u32,
    pub parallelism: u32,
}

impl ScryptParams {
    /// Parameters implied by compact records (N=16384, r=8, p=1)
    pub const COMPACT_DEFAULT: ScryptParams = ScryptParams {
        log_n: 14,
        block_size: DEFAULT_BLOCK_SIZE,
        parallelism: DEFAULT_PARALLELISM,
    };

    /// Work factor N, `None` when `ln` is 64 or more
    pub fn work_factor(&self) -> Option<u64> {
        1u64.checked_shl(u32::from(self.log_n))
    }

    /// Bytes scrypt allocates for these parameters: `128 * r * (N + p + 2)`
    ///
    /// `None` when N or the product does not fit in a `u64`.
    pub fn memory_required(&self) -> Option<u64> {
        let r = u64::from(self.block_size);
        let p = u64::from(self.parallelism);
        self.work_factor()?
            .checked_add(p)?
            .checked_add(2)?
            .checked_mul(r)?
            .checked_mul(128)
    }

    /// Build the primitive's parameter set for a key of `key_len` bytes
    pub(crate) fn to_scrypt(self, key_len: usize) -> Result<scrypt::Params, String> {
        if self.log_n == 0 || self.log_n >= 64 {
            return Err(format!("ln={} is out of range", self.log_n));
        }
        if self.block_size == 0 || self.parallelism == 0 {
            return Err("block size and parallelism must be at least 1".to_string());
        }
        scrypt::Params::new(self.log_n, self.block_size, self.parallelism, key_len)
            .map_err(|e| e.to_string())
    }
}

impl fmt::Display for ScryptParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ln={},r={},p={}",
            self.log_n, self.block_size, self.parallelism
        )
    }
}

// ============================================================================
// Record Format
// ============================================================================

/// Textual layout of records produced by `hash`
///
/// Both layouts are always accepted by `verify`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecordFormat {
    /// `<salt>:<key-hex>`, parameters implied (atproto account store layout)
    Compact,
    /// `scrypt:ln=..,r=..,p=..:<salt>:<key-hex>`
    #[default]
    SelfDescribing,
}

impl FromStr for RecordFormat {
    type Err = CredentialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(RecordFormat::Compact),
            "self-describing" | "self_describing" => Ok(RecordFormat::SelfDescribing),
            other => Err(CredentialError::config(format!(
                "unknown record format {other:?}"
            ))),
        }
    }
}

// ============================================================================
// Hasher Configuration
// ============================================================================

/// Credential hasher configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HasherConfig {
    /// scrypt work factor N (power of two, > 1)
    pub work_factor: u64,
    /// scrypt block size r
    pub block_size: u32,
    /// scrypt parallelism p
    pub parallelism: u32,
    /// Upper bound on bytes a single derivation may allocate
    pub max_memory: u64,
    /// Random salt length in bytes
    pub salt_len: usize,
    /// Derived key length in bytes
    pub key_len: usize,
    /// Layout of newly produced records
    pub format: RecordFormat,
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self {
            work_factor: DEFAULT_WORK_FACTOR,
            block_size: DEFAULT_BLOCK_SIZE,
            parallelism: DEFAULT_PARALLELISM,
            max_memory: DEFAULT_MAX_MEMORY,
            salt_len: DEFAULT_SALT_LEN,
            key_len: DEFAULT_KEY_LEN,
            format: RecordFormat::SelfDescribing,
        }
    }
}

impl HasherConfig {
    /// Records in the atproto account store layout (`<salt>:<key-hex>`)
    pub fn compact() -> Self {
        Self {
            format: RecordFormat::Compact,
            ..Default::default()
        }
    }

    /// Stronger interactive-login profile (N=2^15, 64 MiB ceiling)
    pub fn interactive() -> Self {
        Self {
            work_factor: 1 << 15,
            max_memory: 64 << 20,
            ..Default::default()
        }
    }

    /// Cheap parameters for tests (N=2^10)
    pub fn testing() -> Self {
        Self {
            work_factor: 1 << 10,
            ..Default::default()
        }
    }

    /// Validate every field and return the effective scrypt parameters
    pub fn validate(&self) -> CredentialResult<ScryptParams> {
        if self.work_factor < 2 || !self.work_factor.is_power_of_two() {
            return Err(CredentialError::config(format!(
                "work factor must be a power of two greater than 1 (got {})",
                self.work_factor
            )));
        }
        let params = ScryptParams {
            log_n: self.work_factor.trailing_zeros() as u8,
            block_size: self.block_size,
            parallelism: self.parallelism,
        };

        if !SALT_LEN_RANGE.contains(&self.salt_len) {
            return Err(CredentialError::config(format!(
                "salt length must be within {:?} bytes (got {})",
                SALT_LEN_RANGE, self.salt_len
            )));
        }
        if !KEY_LEN_RANGE.contains(&self.key_len) {
            return Err(CredentialError::config(format!(
                "key length must be within {:?} bytes (got {})",
                KEY_LEN_RANGE, self.key_len
            )));
        }

        params
            .to_scrypt(self.key_len)
            .map_err(CredentialError::config)?;

        match params.memory_required() {
            Some(needed) if needed <= self.max_memory => {}
            Some(needed) => {
                return Err(CredentialError::config(format!(
                    "parameters need {needed} bytes, above the {} byte ceiling",
                    self.max_memory
                )));
            }
            None => {
                return Err(CredentialError::config("memory requirement overflows u64"));
            }
        }

        // Compact records carry no parameters, so they must be the implied ones.
        if self.format == RecordFormat::Compact
            && (params != ScryptParams::COMPACT_DEFAULT || self.key_len != DEFAULT_KEY_LEN)
        {
            return Err(CredentialError::config(
                "compact records require N=16384, r=8, p=1 and a 64 byte key",
            ));
        }

        Ok(params)
    }
}
