//! Bounded Async Hashing
//!
//! Every in-flight derivation holds on the order of the configured memory
//! ceiling, so async callers must cap how many run at once. [`HashingPool`]
//! does that with a semaphore and runs each derivation on tokio's blocking
//! thread pool.
//!
//! Dropping a returned future abandons the result only: the permit travels
//! with the blocking task and is released when the derivation completes.

use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::error::{CredentialError, CredentialResult};
use crate::hasher::CredentialHasher;
use crate::password::ClearTextPassword;
use crate::record::EncodedHash;

/// Concurrency-bounded async front-end for a [`CredentialHasher`]
#[derive(Debug, Clone)]
pub struct HashingPool {
    hasher: Arc<CredentialHasher>,
    permits: Arc<Semaphore>,
    max_in_flight: usize,
}

impl HashingPool {
    /// Create a pool allowing at most `max_in_flight` concurrent derivations
    pub fn new(hasher: CredentialHasher, max_in_flight: usize) -> CredentialResult<Self> {
        if max_in_flight == 0 || max_in_flight > Semaphore::MAX_PERMITS {
            return Err(CredentialError::config(format!(
                "max in-flight derivations must be within 1..={} (got {max_in_flight})",
                Semaphore::MAX_PERMITS
            )));
        }
        Ok(Self {
            hasher: Arc::new(hasher),
            permits: Arc::new(Semaphore::new(max_in_flight)),
            max_in_flight,
        })
    }

    pub fn hasher(&self) -> &CredentialHasher {
        &self.hasher
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }

    /// Permits not currently held by a running derivation
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    /// Hash on the blocking pool; see [`CredentialHasher::hash`]
    pub async fn hash(&self, password: ClearTextPassword) -> CredentialResult<EncodedHash> {
        self.run(move |hasher| hasher.hash(password.as_bytes())).await
    }

    /// Verify on the blocking pool; see [`CredentialHasher::verify`]
    pub async fn verify(
        &self,
        password: ClearTextPassword,
        stored: EncodedHash,
    ) -> CredentialResult<bool> {
        self.run(move |hasher| hasher.verify(password.as_bytes(), &stored)).await
    }

    async fn run<T, F>(&self, job: F) -> CredentialResult<T>
    where
        F: FnOnce(&CredentialHasher) -> CredentialResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| CredentialError::derivation("hashing pool is closed"))?;
        let hasher = Arc::clone(&self.hasher);

        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            job(&hasher)
        })
        .await
        .map_err(|e| {
            let err = CredentialError::derivation(format!("hashing worker failed: {e}"));
            err.log();
            err
        })?
    }
}
