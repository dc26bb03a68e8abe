//! Environment Configuration
//!
//! All environment coupling lives here; the `credential` crate never reads
//! the environment itself.

use std::str::FromStr;

use anyhow::{Context, bail};
use credential::{ClearTextPassword, EncodedHash, HasherConfig, RecordFormat};

/// Default cap on concurrent derivations
pub const DEFAULT_MAX_IN_FLIGHT: usize = 4;

/// Everything `credcheck` needs for one run
#[derive(Debug)]
pub struct CheckConfig {
    pub hasher: HasherConfig,
    pub max_in_flight: usize,
    pub password: ClearTextPassword,
    /// Record to verify against; `None` means hash a fresh one
    pub record: Option<EncodedHash>,
}

/// Load from the process environment (after `.env` has been applied)
pub fn from_env() -> anyhow::Result<CheckConfig> {
    from_lookup(|key| std::env::var(key).ok())
}

/// Load using `lookup` for variable access
pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<CheckConfig> {
    let defaults = HasherConfig::default();
    let hasher = HasherConfig {
        work_factor: parse_or(&lookup, "CREDENTIAL_WORK_FACTOR", defaults.work_factor)?,
        block_size: parse_or(&lookup, "CREDENTIAL_BLOCK_SIZE", defaults.block_size)?,
        parallelism: parse_or(&lookup, "CREDENTIAL_PARALLELISM", defaults.parallelism)?,
        max_memory: parse_or(&lookup, "CREDENTIAL_MAX_MEMORY", defaults.max_memory)?,
        format: match lookup("CREDENTIAL_FORMAT") {
            Some(raw) => RecordFormat::from_str(&raw)?,
            None => defaults.format,
        },
        ..defaults
    };
    let max_in_flight = parse_or(&lookup, "CREDENTIAL_MAX_IN_FLIGHT", DEFAULT_MAX_IN_FLIGHT)?;

    let Some(raw_password) = lookup("CREDENTIAL_PASSWORD").or_else(|| lookup("BSKY_TEST_PASSWORD"))
    else {
        bail!("CREDENTIAL_PASSWORD (or BSKY_TEST_PASSWORD) must be set");
    };
    let password = ClearTextPassword::new(raw_password).context("password from environment")?;

    let record = lookup("CREDENTIAL_RECORD")
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
        .map(EncodedHash::from);

    Ok(CheckConfig {
        hasher,
        max_in_flight,
        password,
        record,
    })
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has invalid value {raw:?}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_with_password_only() {
        let config = from_lookup(lookup_from(&[("CREDENTIAL_PASSWORD", "testlab01")])).unwrap();
        assert_eq!(config.hasher, HasherConfig::default());
        assert_eq!(config.max_in_flight, DEFAULT_MAX_IN_FLIGHT);
        assert_eq!(config.password.as_bytes(), b"testlab01");
        assert!(config.record.is_none());
    }

    #[test]
    fn test_falls_back_to_bsky_test_password() {
        let config = from_lookup(lookup_from(&[("BSKY_TEST_PASSWORD", "from-bsky")])).unwrap();
        assert_eq!(config.password.as_bytes(), b"from-bsky");

        let config = from_lookup(lookup_from(&[
            ("CREDENTIAL_PASSWORD", "primary"),
            ("BSKY_TEST_PASSWORD", "fallback"),
        ]))
        .unwrap();
        assert_eq!(config.password.as_bytes(), b"primary");
    }

    #[test]
    fn test_missing_or_empty_password() {
        let err = from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains("must be set"));

        assert!(from_lookup(lookup_from(&[("CREDENTIAL_PASSWORD", "")])).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = from_lookup(lookup_from(&[
            ("CREDENTIAL_PASSWORD", "pw"),
            ("CREDENTIAL_WORK_FACTOR", "1024"),
            ("CREDENTIAL_BLOCK_SIZE", " 4 "),
            ("CREDENTIAL_PARALLELISM", "2"),
            ("CREDENTIAL_MAX_MEMORY", "1048576"),
            ("CREDENTIAL_FORMAT", "compact"),
            ("CREDENTIAL_MAX_IN_FLIGHT", "8"),
            ("CREDENTIAL_RECORD", "  salt:abcd  "),
        ]))
        .unwrap();
        assert_eq!(config.hasher.work_factor, 1024);
        assert_eq!(config.hasher.block_size, 4);
        assert_eq!(config.hasher.parallelism, 2);
        assert_eq!(config.hasher.max_memory, 1 << 20);
        assert_eq!(config.hasher.format, RecordFormat::Compact);
        assert_eq!(config.max_in_flight, 8);
        assert_eq!(config.record.unwrap().as_str(), "salt:abcd");
    }

    #[test]
    fn test_invalid_numbers_are_reported() {
        let err = from_lookup(lookup_from(&[
            ("CREDENTIAL_PASSWORD", "pw"),
            ("CREDENTIAL_WORK_FACTOR", "lots"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("CREDENTIAL_WORK_FACTOR"));

        assert!(
            from_lookup(lookup_from(&[
                ("CREDENTIAL_PASSWORD", "pw"),
                ("CREDENTIAL_FORMAT", "bcrypt"),
            ]))
            .is_err()
        );
    }

    #[test]
    fn test_blank_record_means_hash() {
        let config = from_lookup(lookup_from(&[
            ("CREDENTIAL_PASSWORD", "pw"),
            ("CREDENTIAL_RECORD", "   "),
        ]))
        .unwrap();
        assert!(config.record.is_none());
    }
}
