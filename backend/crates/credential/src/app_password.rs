//! App Passwords
//!
//! Secondary, revocable credentials issued per account. Unlike account
//! passwords they are hashed with a salt derived from the account DID, so the
//! same (DID, password) pair always yields the same record and the store can
//! look the record up by value.
//!
//! Lookups only hit if the hasher's format and parameters match the ones used
//! at creation time; keep them fixed for app passwords.

use zeroize::Zeroize;

use crate::crypto::{random_bytes, sha256};
use crate::error::{CredentialError, CredentialResult};
use crate::hasher::CredentialHasher;
use crate::password::ClearTextPassword;
use crate::record::EncodedHash;

/// Lowercase RFC 4648 base32 alphabet
const ALPHABET: &[u8; 32] = b"abcdefghijklmnopqrstuvwxyz234567";

const GROUP_COUNT: usize = 4;
const GROUP_LEN: usize = 4;

/// Bytes of SHA-256(did) used as the salt
const DID_SALT_LEN: usize = 16;

/// Generate a fresh app password of the form `xxxx-xxxx-xxxx-xxxx`
pub fn generate_app_password() -> ClearTextPassword {
    let mut entropy = random_bytes(GROUP_COUNT * GROUP_LEN);
    let mut out = Vec::with_capacity(GROUP_COUNT * (GROUP_LEN + 1) - 1);
    for (i, byte) in entropy.iter().enumerate() {
        if i > 0 && i % GROUP_LEN == 0 {
            out.push(b'-');
        }
        // 256 is a multiple of 32, so masking keeps the draw uniform
        out.push(ALPHABET[usize::from(byte & 0x1f)]);
    }
    entropy.zeroize();
    ClearTextPassword::from_generated(out)
}

/// Whether `candidate` has the shape produced by [`generate_app_password`]
///
/// Login flows use this to decide which credential table to consult.
pub fn is_app_password_format(candidate: &[u8]) -> bool {
    candidate.len() == GROUP_COUNT * (GROUP_LEN + 1) - 1
        && candidate.iter().enumerate().all(|(i, c)| {
            if i % (GROUP_LEN + 1) == GROUP_LEN {
                *c == b'-'
            } else {
                ALPHABET.contains(c)
            }
        })
}

/// Salt for a DID's app passwords: hex of the first 16 bytes of SHA-256(did)
pub fn app_password_salt(did: &str) -> String {
    hex::encode(&sha256(did.as_bytes())[..DID_SALT_LEN])
}

/// Deterministically hash an app password for `did`
pub fn hash_app_password(
    hasher: &CredentialHasher,
    did: &str,
    password: &[u8],
) -> CredentialResult<EncodedHash> {
    if did.is_empty() {
        return Err(CredentialError::InvalidInput("did must not be empty"));
    }
    hasher.hash_with_salt(password, &app_password_salt(did))
}

/// Verify an app password record belonging to `did`
///
/// A record salted for a different DID is a mismatch, not an error.
pub fn verify_app_password(
    hasher: &CredentialHasher,
    did: &str,
    password: &[u8],
    stored: &EncodedHash,
) -> CredentialResult<bool> {
    let parsed = stored.parse().inspect_err(CredentialError::log)?;
    if parsed.salt != app_password_salt(did) {
        tracing::debug!(did = %did, "App password record is salted for another account");
        return Ok(false);
    }
    hasher.verify(password, stored)
}
