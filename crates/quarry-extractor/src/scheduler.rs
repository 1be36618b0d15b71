//! Bounded retry scheduling for one unit of work

use crate::classifier::{Classification, ErrorClassifier};
use crate::config::ExtractorConfig;
use crate::credentials::CredentialPool;
use crate::error::ExtractorError;
use crate::pacing::Sleeper;
use quarry_domain::traits::ExtractionClient;
use quarry_domain::{Chunk, Credential, Record};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{error, info, warn};

/// Retry knobs taken from [`ExtractorConfig`]
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Attempts allowed per credential
    pub max_attempts_per_credential: u32,
    /// Escalation table for retryable failures
    pub progressive_delays: Vec<Duration>,
    /// Pause after a fatal failure when budget remains
    pub fatal_pause: Duration,
    /// Per-call limit; elapsed calls count as retryable failures
    pub call_timeout: Option<Duration>,
}

impl RetryPolicy {
    /// Build the policy from configuration
    pub fn from_config(config: &ExtractorConfig) -> Self {
        Self {
            max_attempts_per_credential: config.max_retries_per_credential,
            progressive_delays: config.progressive_delays(),
            fatal_pause: config.fatal_retry_pause(),
            call_timeout: config.call_timeout(),
        }
    }

    /// Delay after the `failures`-th consecutive retryable failure (1-based),
    /// plateauing at the table's last entry
    pub fn backoff(&self, failures: usize) -> Duration {
        if self.progressive_delays.is_empty() {
            return Duration::ZERO;
        }
        let index = usize::min(
            failures.saturating_sub(1),
            self.progressive_delays.len() - 1,
        );
        self.progressive_delays[index]
    }
}

/// Result of a single extraction call, already classified
#[derive(Debug)]
pub enum AttemptResult<E> {
    /// Records returned by the backend
    Success(Vec<Record>),
    /// Transient failure; only the message is kept
    Retryable(String),
    /// Failure not recognized as transient; kept verbatim for the caller
    Fatal(E),
}

/// One attempt as seen by the scheduler
#[derive(Debug)]
pub struct AttemptOutcome<E> {
    /// Chunk the attempt belonged to
    pub chunk_index: usize,
    /// Pool slot of the credential used (0-based)
    pub credential_index: usize,
    /// Attempt number within the unit of work (1-based)
    pub attempt_number: usize,
    /// What happened
    pub result: AttemptResult<E>,
}

impl<E> AttemptOutcome<E> {
    /// Classification of a failed attempt, `None` on success
    pub fn classification(&self) -> Option<Classification> {
        match self.result {
            AttemptResult::Success(_) => None,
            AttemptResult::Retryable(_) => Some(Classification::Retryable),
            AttemptResult::Fatal(_) => Some(Classification::Fatal),
        }
    }
}

/// Records from a successful unit of work plus what it cost
#[derive(Debug, Clone, PartialEq)]
pub struct UnitReport {
    /// Records returned by the successful call
    pub records: Vec<Record>,
    /// Extraction calls issued, including the successful one
    pub calls: usize,
    /// Credential rotations performed
    pub rotations: usize,
}

/// Runs bounded attempts against the extraction backend for one chunk
pub struct RetryScheduler<C, K, S> {
    client: C,
    classifier: K,
    sleeper: S,
    policy: RetryPolicy,
}

impl<C, K, S> RetryScheduler<C, K, S>
where
    C: ExtractionClient,
    K: ErrorClassifier,
    S: Sleeper,
{
    /// Create a scheduler
    pub fn new(client: C, classifier: K, sleeper: S, policy: RetryPolicy) -> Self {
        Self {
            client,
            classifier,
            sleeper,
            policy,
        }
    }

    /// Borrow the extraction client
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Borrow the retry policy
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub(crate) fn sleeper(&self) -> &S {
        &self.sleeper
    }

    pub(crate) fn into_parts(self) -> (C, K, S, RetryPolicy) {
        (self.client, self.classifier, self.sleeper, self.policy)
    }

    /// Total calls allowed for one unit of work
    pub fn budget(&self, pool: &CredentialPool) -> usize {
        pool.len() * self.policy.max_attempts_per_credential as usize
    }

    /// Drive `chunk` to completion or exhaustion
    ///
    /// Every failure rotates the pool when another attempt will follow.
    /// Retryable failures then wait out the progressive delay; fatal ones
    /// wait the fatal pause.
    ///
    /// # Errors
    ///
    /// - The last fatal error, verbatim, when the budget runs out on it
    /// - `ExtractorError::ExhaustedRetries` when the budget runs out on a
    ///   retryable failure
    pub async fn execute(
        &self,
        pool: &mut CredentialPool,
        chunk: &Chunk,
        instruction: &str,
    ) -> Result<UnitReport, ExtractorError> {
        let budget = self.budget(pool);
        let mut attempts = 0usize;
        let mut rotations = 0usize;
        let mut last_error = String::new();

        while attempts < budget {
            info!(
                "Chunk {} attempt {}/{} with API key #{}/{}",
                chunk.index + 1,
                attempts + 1,
                budget,
                pool.cursor() + 1,
                pool.len()
            );

            let outcome = self
                .attempt(chunk, instruction, pool.current(), pool.cursor(), attempts + 1)
                .await;
            attempts += 1;
            let more_attempts = attempts < budget;

            match outcome.result {
                AttemptResult::Success(records) => {
                    info!(
                        "Chunk {} succeeded on attempt {} with {} records",
                        chunk.index + 1,
                        attempts,
                        records.len()
                    );
                    return Ok(UnitReport {
                        records,
                        calls: attempts,
                        rotations,
                    });
                }
                AttemptResult::Retryable(message) => {
                    warn!(
                        "Chunk {} attempt {} failed (retryable): {}",
                        chunk.index + 1,
                        attempts,
                        message
                    );
                    last_error = message;

                    if more_attempts {
                        pool.rotate();
                        rotations += 1;
                        let delay = self.policy.backoff(attempts);
                        info!(
                            "Rotated to API key #{}/{}, waiting {:?} before next attempt",
                            pool.cursor() + 1,
                            pool.len(),
                            delay
                        );
                        self.sleeper.sleep(delay).await;
                    }
                }
                AttemptResult::Fatal(err) => {
                    if !more_attempts {
                        error!(
                            "Chunk {} failed with non-retryable error after {} attempts: {}",
                            chunk.index + 1,
                            attempts,
                            err
                        );
                        return Err(ExtractorError::backend(err));
                    }

                    pool.rotate();
                    rotations += 1;
                    info!(
                        "Trying API key #{}/{} after non-retryable error, waiting {:?}",
                        pool.cursor() + 1,
                        pool.len(),
                        self.policy.fatal_pause
                    );
                    last_error = err.to_string();
                    self.sleeper.sleep(self.policy.fatal_pause).await;
                }
            }
        }

        error!(
            "Chunk {} exhausted {} attempts across {} API keys",
            chunk.index + 1,
            attempts,
            pool.len()
        );
        Err(ExtractorError::ExhaustedRetries {
            credentials: pool.len(),
            attempts,
            last_error,
        })
    }

    /// Issue one call and classify its outcome
    async fn attempt(
        &self,
        chunk: &Chunk,
        instruction: &str,
        credential: &Credential,
        credential_index: usize,
        attempt_number: usize,
    ) -> AttemptOutcome<C::Error> {
        let call = self.client.extract(instruction, &chunk.payload, credential);

        let reply = match self.policy.call_timeout {
            Some(limit) => match timeout(limit, call).await {
                Ok(reply) => reply,
                Err(_) => {
                    return AttemptOutcome {
                        chunk_index: chunk.index,
                        credential_index,
                        attempt_number,
                        result: AttemptResult::Retryable(format!(
                            "Extraction call timed out after {:?}",
                            limit
                        )),
                    };
                }
            },
            None => call.await,
        };

        let result = match reply {
            Ok(records) => AttemptResult::Success(records),
            Err(err) => {
                let message = err.to_string();
                match self.classifier.classify(&message) {
                    Classification::Retryable => AttemptResult::Retryable(message),
                    Classification::Fatal => {
                        warn!("Unclassified backend failure treated as fatal: {}", message);
                        AttemptResult::Fatal(err)
                    }
                }
            }
        };

        AttemptOutcome {
            chunk_index: chunk.index,
            credential_index,
            attempt_number,
            result,
        }
    }
}
