//! Encoded Credential Records
//!
//! Two `:`-delimited layouts are understood:
//!
//! ```text
//! compact:          <salt>:<key-hex>
//! self-describing:  scrypt:ln=<log2 N>,r=<r>,p=<p>:<salt>:<key-hex>
//! ```
//!
//! The salt is stored as text and fed to scrypt as those bytes. Compact
//! records are verified with [`ScryptParams::COMPACT_DEFAULT`].

use std::fmt;

use crate::config::{KEY_LEN_RANGE, RecordFormat};
use crate::error::{CredentialError, CredentialResult};

pub use crate::config::ScryptParams;

/// Algorithm tag of self-describing records
pub const ALGORITHM_TAG: &str = "scrypt";

/// Field delimiter
pub const DELIMITER: char = ':';

// ============================================================================
// Encoded Hash (opaque, safe to store)
// ============================================================================

/// Stored credential record
///
/// Opaque to callers: wrap whatever came out of storage with
/// [`EncodedHash::new`]. Its fields are only decoded during verification.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct EncodedHash(String);

impl EncodedHash {
    /// Wrap a stored record without parsing it
    pub fn new(record: impl Into<String>) -> Self {
        Self(record.into())
    }

    /// Get the record text for storage
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Layout of this record, or `MalformedRecord` if it is not a valid record
    pub fn format(&self) -> CredentialResult<RecordFormat> {
        self.parse().map(|parsed| parsed.format)
    }

    pub(crate) fn encode(
        format: RecordFormat,
        params: ScryptParams,
        salt: &str,
        derived_key: &[u8],
    ) -> Self {
        let key_hex = hex::encode(derived_key);
        match format {
            RecordFormat::Compact => Self(format!("{salt}{DELIMITER}{key_hex}")),
            RecordFormat::SelfDescribing => Self(format!(
                "{ALGORITHM_TAG}{DELIMITER}{params}{DELIMITER}{salt}{DELIMITER}{key_hex}"
            )),
        }
    }

    pub(crate) fn parse(&self) -> CredentialResult<ParsedRecord<'_>> {
        let fields: Vec<&str> = self.0.split(DELIMITER).collect();
        let (format, params, salt, key_hex) = match fields.as_slice() {
            [salt, key_hex] => (
                RecordFormat::Compact,
                ScryptParams::COMPACT_DEFAULT,
                *salt,
                *key_hex,
            ),
            [tag, params, salt, key_hex] => {
                if *tag != ALGORITHM_TAG {
                    return Err(CredentialError::malformed(format!(
                        "unsupported algorithm tag {tag:?}"
                    )));
                }
                (
                    RecordFormat::SelfDescribing,
                    parse_params(params)?,
                    *salt,
                    *key_hex,
                )
            }
            other => {
                return Err(CredentialError::malformed(format!(
                    "expected 2 or 4 fields, got {}",
                    other.len()
                )));
            }
        };

        if salt.is_empty() {
            return Err(CredentialError::malformed("empty salt"));
        }

        let derived_key = hex::decode(key_hex)
            .map_err(|e| CredentialError::malformed(format!("derived key is not hex: {e}")))?;
        if !KEY_LEN_RANGE.contains(&derived_key.len()) {
            return Err(CredentialError::malformed(format!(
                "derived key is {} bytes, expected {:?}",
                derived_key.len(),
                KEY_LEN_RANGE
            )));
        }

        Ok(ParsedRecord {
            format,
            params,
            salt,
            derived_key,
        })
    }
}

impl fmt::Display for EncodedHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for EncodedHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EncodedHash").field(&"[HASH]").finish()
    }
}

impl From<String> for EncodedHash {
    fn from(record: String) -> Self {
        Self(record)
    }
}

impl From<&str> for EncodedHash {
    fn from(record: &str) -> Self {
        Self(record.to_string())
    }
}

impl AsRef<str> for EncodedHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// Parsed Record
// ============================================================================

/// Decoded fields of an [`EncodedHash`]
pub(crate) struct ParsedRecord<'a> {
    pub format: RecordFormat,
    pub params: ScryptParams,
    pub salt: &'a str,
    pub derived_key: Vec<u8>,
}

/// Parse `ln=<u8>,r=<u32>,p=<u32>`; each key exactly once, any order
fn parse_params(field: &str) -> CredentialResult<ScryptParams> {
    let mut log_n = None;
    let mut block_size = None;
    let mut parallelism = None;

    for pair in field.split(',') {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| CredentialError::malformed(format!("bad parameter {pair:?}")))?;
        let duplicate = match key {
            "ln" => log_n.replace(parse_number::<u8>(key, value)?).is_some(),
            "r" => block_size.replace(parse_number::<u32>(key, value)?).is_some(),
            "p" => parallelism.replace(parse_number::<u32>(key, value)?).is_some(),
            _ => {
                return Err(CredentialError::malformed(format!(
                    "unknown parameter {key:?}"
                )));
            }
        };
        if duplicate {
            return Err(CredentialError::malformed(format!(
                "duplicate parameter {key:?}"
            )));
        }
    }

    match (log_n, block_size, parallelism) {
        (Some(log_n), Some(block_size), Some(parallelism)) => Ok(ScryptParams {
            log_n,
            block_size,
            parallelism,
        }),
        _ => Err(CredentialError::malformed(
            "parameters must include ln, r and p",
        )),
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> CredentialResult<T> {
    value
        .parse()
        .map_err(|_| CredentialError::malformed(format!("parameter {key} has bad value {value:?}")))
}
