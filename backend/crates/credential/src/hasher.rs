//! Credential Hasher
//!
//! Derives scrypt keys from passwords, encodes them as [`EncodedHash`] records
//! and verifies candidates against stored records.
//!
//! ## Security Features
//! - Memory-hard derivation prevents cheap GPU/ASIC attacks
//! - Fresh OS-RNG salt per credential
//! - Parameters embedded in self-describing records, so defaults can be raised
//!   without invalidating stored credentials
//! - Constant-time key comparison
//! - Derived keys are zeroized after use
//!
//! Calls block for the whole derivation and share no mutable state. Async
//! callers should go through [`crate::HashingPool`].

use zeroize::Zeroize;

use crate::config::{HasherConfig, ScryptParams};
use crate::crypto::{constant_time_eq, random_salt};
use crate::error::{CredentialError, CredentialResult};
use crate::record::{DELIMITER, EncodedHash};

/// Password hasher bound to one validated configuration
///
/// ## Examples
/// ```rust
/// use credential::{CredentialError, CredentialHasher, EncodedHash, HasherConfig};
///
/// let hasher = CredentialHasher::new(HasherConfig::testing())?;
/// let record = hasher.hash(b"hunter22")?;
///
/// // Later, verify against what storage returned
/// let stored = EncodedHash::new(record.as_str());
/// assert!(hasher.verify(b"hunter22", &stored)?);
///
/// // Corrupt records are errors, not mismatches
/// let err = hasher.verify(b"hunter22", &EncodedHash::new("garbage")).unwrap_err();
/// assert!(matches!(err, CredentialError::MalformedRecord(_)));
/// # Ok::<(), CredentialError>(())
/// ```
#[derive(Debug, Clone)]
pub struct CredentialHasher {
    config: HasherConfig,
    params: ScryptParams,
}

impl CredentialHasher {
    /// Validate `config` and build a hasher
    pub fn new(config: HasherConfig) -> CredentialResult<Self> {
        let params = config.validate().inspect_err(CredentialError::log)?;
        Ok(Self { config, params })
    }

    pub fn config(&self) -> &HasherConfig {
        &self.config
    }

    /// Effective scrypt parameters for new records
    pub fn params(&self) -> ScryptParams {
        self.params
    }

    /// Hash a password with a fresh random salt
    ///
    /// ## Errors
    /// - `InvalidInput` if `password` is empty
    /// - `DerivationFailure` if scrypt fails
    pub fn hash(&self, password: &[u8]) -> CredentialResult<EncodedHash> {
        let salt = random_salt(self.config.salt_len);
        self.hash_with_salt(password, &salt)
    }

    /// Hash a password with a caller-chosen salt
    ///
    /// The salt text is used as-is for the derivation and stored verbatim, so
    /// it must be non-empty and must not contain `:`. Deterministic output
    /// makes this suitable for indexed lookups (app passwords) and test
    /// vectors; account passwords should use [`CredentialHasher::hash`].
    pub fn hash_with_salt(&self, password: &[u8], salt: &str) -> CredentialResult<EncodedHash> {
        if password.is_empty() {
            return Err(CredentialError::InvalidInput("password must not be empty"));
        }
        if salt.is_empty() || salt.contains(DELIMITER) {
            return Err(CredentialError::InvalidInput(
                "salt must be non-empty and must not contain ':'",
            ));
        }

        let scrypt_params = self
            .params
            .to_scrypt(self.config.key_len)
            .map_err(CredentialError::derivation)?;
        let mut key =
            self.derive(password, salt, self.params, &scrypt_params, self.config.key_len)?;
        let record = EncodedHash::encode(self.config.format, self.params, salt, &key);
        key.zeroize();

        tracing::debug!(
            format = ?self.config.format,
            params = %self.params,
            "Credential hashed"
        );

        Ok(record)
    }

    /// Verify a password against a stored record
    ///
    /// Returns `Ok(false)` on mismatch.
    ///
    /// ## Errors
    /// - `MalformedRecord` if `stored` cannot be parsed or carries parameters
    ///   scrypt cannot accept
    /// - `DerivationFailure` if the record's parameters exceed this hasher's
    ///   memory ceiling or scrypt fails
    pub fn verify(&self, password: &[u8], stored: &EncodedHash) -> CredentialResult<bool> {
        let parsed = stored.parse().inspect_err(CredentialError::log)?;
        let key_len = parsed.derived_key.len();

        let scrypt_params = parsed.params.to_scrypt(key_len).map_err(|e| {
            let err =
                CredentialError::malformed(format!("unusable parameters {}: {e}", parsed.params));
            err.log();
            err
        })?;

        let mut candidate =
            self.derive(password, parsed.salt, parsed.params, &scrypt_params, key_len)?;
        let matches = constant_time_eq(&candidate, &parsed.derived_key);
        candidate.zeroize();

        tracing::debug!(matches, format = ?parsed.format, "Credential verified");

        Ok(matches)
    }

    /// Whether a stored record should be replaced after a successful login
    ///
    /// True when the record's format, parameters or key length differ from
    /// this hasher's configuration.
    pub fn needs_rehash(&self, stored: &EncodedHash) -> CredentialResult<bool> {
        let parsed = stored.parse()?;
        Ok(parsed.format != self.config.format
            || parsed.params != self.params
            || parsed.derived_key.len() != self.config.key_len)
    }

    fn derive(
        &self,
        password: &[u8],
        salt: &str,
        params: ScryptParams,
        scrypt_params: &scrypt::Params,
        key_len: usize,
    ) -> CredentialResult<Vec<u8>> {
        let ceiling = self.config.max_memory;
        match params.memory_required() {
            Some(needed) if needed <= ceiling => {}
            needed => {
                let err = CredentialError::derivation(format!(
                    "parameters {params} need {} bytes, above the {ceiling} byte ceiling",
                    needed.map_or_else(|| "more than u64::MAX".to_string(), |n| n.to_string())
                ));
                err.log();
                return Err(err);
            }
        }

        let mut output = vec![0u8; key_len];
        scrypt::scrypt(password, salt.as_bytes(), scrypt_params, &mut output).map_err(|e| {
            let err = CredentialError::derivation(e.to_string());
            err.log();
            err
        })?;
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RecordFormat;

    fn testing_hasher() -> CredentialHasher {
        CredentialHasher::new(HasherConfig::testing()).unwrap()
    }

    #[test]
    fn test_hasher_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + Clone>() {}
        assert_send_sync::<CredentialHasher>();
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = HasherConfig {
            work_factor: 3,
            ..Default::default()
        };
        assert!(matches!(
            CredentialHasher::new(config),
            Err(CredentialError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = testing_hasher();
        let record = hasher.hash(b"TestPassword123!").unwrap();

        assert!(record.as_str().starts_with("scrypt:ln=10,r=8,p=1:"));
        assert!(hasher.verify(b"TestPassword123!", &record).unwrap());
        assert!(!hasher.verify(b"WrongPassword123!", &record).unwrap());
        assert!(!hasher.verify(b"TestPassword123", &record).unwrap());
    }

    #[test]
    fn test_compact_round_trip() {
        let hasher = CredentialHasher::new(HasherConfig::compact()).unwrap();
        let record = hasher.hash(b"testbench01").unwrap();

        let (salt, key_hex) = record.as_str().split_once(':').unwrap();
        assert_eq!(salt.len(), 32);
        assert_eq!(key_hex.len(), 128);
        assert!(hasher.verify(b"testbench01", &record).unwrap());
        assert!(!hasher.verify(b"testbench02", &record).unwrap());
    }

    #[test]
    fn test_salts_are_unique() {
        let hasher = testing_hasher();
        let first = hasher.hash(b"same password").unwrap();
        let second = hasher.hash(b"same password").unwrap();

        assert_ne!(first, second);
        assert!(hasher.verify(b"same password", &first).unwrap());
        assert!(hasher.verify(b"same password", &second).unwrap());
    }

    #[test]
    fn test_empty_password_rejected() {
        let hasher = testing_hasher();
        assert!(matches!(
            hasher.hash(b""),
            Err(CredentialError::InvalidInput(_))
        ));
        assert!(matches!(
            hasher.hash_with_salt(b"", "salt"),
            Err(CredentialError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_bad_explicit_salt_rejected() {
        let hasher = testing_hasher();
        assert!(matches!(
            hasher.hash_with_salt(b"pw", ""),
            Err(CredentialError::InvalidInput(_))
        ));
        assert!(matches!(
            hasher.hash_with_salt(b"pw", "ab:cd"),
            Err(CredentialError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_hash_with_salt_is_deterministic() {
        let hasher = testing_hasher();
        let a = hasher.hash_with_salt(b"pw", "fixed-salt").unwrap();
        let b = hasher.hash_with_salt(b"pw", "fixed-salt").unwrap();
        assert_eq!(a, b);
        assert!(a.as_str().contains(":fixed-salt:"));
    }

    #[test]
    fn test_malformed_record_is_error_not_false() {
        let hasher = testing_hasher();
        let err = hasher
            .verify(b"anything", &EncodedHash::new("not-a-valid-record"))
            .unwrap_err();
        assert!(matches!(err, CredentialError::MalformedRecord(_)));
        assert!(err.is_integrity_problem());
    }

    #[test]
    fn test_params_scrypt_rejects_are_malformed() {
        let hasher = testing_hasher();
        let key = "00".repeat(64);

        // scrypt requires N < 2^(16 r)
        let record = EncodedHash::new(format!("scrypt:ln=20,r=1,p=1:salt:{key}"));
        assert!(matches!(
            hasher.verify(b"pw", &record),
            Err(CredentialError::MalformedRecord(_))
        ));

        let record = EncodedHash::new(format!("scrypt:ln=0,r=8,p=1:salt:{key}"));
        assert!(matches!(
            hasher.verify(b"pw", &record),
            Err(CredentialError::MalformedRecord(_))
        ));
    }

    #[test]
    fn test_params_above_ceiling_fail_derivation() {
        let hasher = testing_hasher();
        // ~1 GiB of scratch memory, far above the 32 MiB ceiling
        let record = EncodedHash::new(format!("scrypt:ln=20,r=8,p=1:salt:{}", "00".repeat(64)));
        assert!(matches!(
            hasher.verify(b"pw", &record),
            Err(CredentialError::DerivationFailure(_))
        ));
    }

    #[test]
    fn test_verifies_records_from_other_parameters() {
        let old = testing_hasher();
        let record = old.hash(b"carried over").unwrap();

        let new = CredentialHasher::new(HasherConfig {
            work_factor: 1 << 11,
            ..Default::default()
        })
        .unwrap();
        assert!(new.verify(b"carried over", &record).unwrap());
        assert!(new.needs_rehash(&record).unwrap());
        assert!(!old.needs_rehash(&record).unwrap());
    }

    #[test]
    fn test_needs_rehash_on_format_change() {
        let compact = CredentialHasher::new(HasherConfig::compact()).unwrap();
        let record = EncodedHash::new(format!("salt:{}", "00".repeat(64)));
        assert!(!compact.needs_rehash(&record).unwrap());

        let described = CredentialHasher::new(HasherConfig::default()).unwrap();
        assert!(described.needs_rehash(&record).unwrap());

        let short_key = EncodedHash::new(format!("salt:{}", "00".repeat(32)));
        assert!(compact.needs_rehash(&short_key).unwrap());

        assert!(compact.needs_rehash(&EncodedHash::new("junk")).is_err());
    }

    #[test]
    fn test_concurrent_verification() {
        let hasher = testing_hasher();
        let record = hasher.hash(b"shared").unwrap();

        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|i| {
                    let hasher = &hasher;
                    let record = &record;
                    s.spawn(move || {
                        let candidate: &[u8] = if i % 2 == 0 { b"shared" } else { b"other" };
                        hasher.verify(candidate, record).unwrap()
                    })
                })
                .collect();
            let results: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();
            assert_eq!(results, vec![true, false, true, false]);
        });
    }

    #[test]
    fn test_format_follows_config() {
        let hasher = testing_hasher();
        let record = hasher.hash(b"pw").unwrap();
        assert_eq!(record.format().unwrap(), RecordFormat::SelfDescribing);
    }
}
