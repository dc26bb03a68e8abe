//! Credential Check Entry Point
//!
//! Hashes or verifies one password with the `credential` crate.
//! Uses `anyhow` for startup errors; the library reports `CredentialError`.
//!
//! - `CREDENTIAL_RECORD` set: verify against it, print `match` / `no-match`
//!   (exit status 1 on mismatch)
//! - otherwise: hash the password, print the record, re-verify it

mod config;

use std::process::ExitCode;

use credential::{ClearTextPassword, CredentialHasher, HashingPool};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "credcheck=info,credential=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config::from_env()?;

    let hasher = CredentialHasher::new(config.hasher)?;
    tracing::info!(
        params = %hasher.params(),
        format = ?hasher.config().format,
        max_in_flight = config.max_in_flight,
        "Credential hasher ready"
    );
    let pool = HashingPool::new(hasher, config.max_in_flight)?;

    match config.record {
        Some(record) => {
            // Malformed records exit with an error, never as "no-match"
            let matches = pool.verify(config.password, record.clone()).await?;
            if matches && pool.hasher().needs_rehash(&record)? {
                tracing::info!("Stored record uses outdated parameters, rehash on next login");
            }
            println!("{}", if matches { "match" } else { "no-match" });
            Ok(if matches {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            })
        }
        None => {
            let again = ClearTextPassword::new(config.password.as_bytes().to_vec())?;
            let record = pool.hash(config.password).await?;
            println!("{record}");

            let verified = pool.verify(again, record).await?;
            tracing::info!(verified, "Fresh record re-verified");
            anyhow::ensure!(verified, "freshly hashed record failed to verify");
            Ok(ExitCode::SUCCESS)
        }
    }
}
