//! Core Extractor implementation

use crate::aggregator::ResultAggregator;
use crate::chunking::{ChunkPlan, ChunkPlanner, ProcessingMode};
use crate::classifier::{ErrorClassifier, LexicalClassifier};
use crate::config::ExtractorConfig;
use crate::credentials::CredentialPool;
use crate::error::ExtractorError;
use crate::pacing::{Sleeper, TokioSleeper};
use crate::pdf::PdfSplitter;
use crate::scheduler::{RetryPolicy, RetryScheduler};
use crate::types::{ExtractionMetadata, ExtractionResult};
use quarry_domain::traits::{DocumentSplitter, ExtractionClient};
use quarry_domain::{Chunk, Job, Record};
use std::time::Instant;
use tracing::{error, info, info_span, Instrument};

/// The Extractor turns a document into records, chunk by chunk, surviving
/// quota exhaustion by rotating credentials with paced backoff
///
/// Credentials are validated here; each run then builds its own
/// [`CredentialPool`], so concurrent runs never share rotation state.
pub struct Extractor<C, D = PdfSplitter, K = LexicalClassifier, S = TokioSleeper> {
    scheduler: RetryScheduler<C, K, S>,
    planner: ChunkPlanner<D>,
    config: ExtractorConfig,
}

impl<C> Extractor<C>
where
    C: ExtractionClient,
{
    /// Create a new Extractor with the PDF splitter, lexical classifier and
    /// tokio timers
    ///
    /// # Errors
    ///
    /// Returns `ExtractorError::Config` when the configuration is invalid or
    /// holds no usable API key.
    pub fn new(client: C, config: ExtractorConfig) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;
        CredentialPool::from_keys(config.api_keys.iter().map(String::as_str))?;

        let classifier = LexicalClassifier::with_extra_terms(&config.extra_retryable_terms);
        Ok(Self {
            scheduler: RetryScheduler::new(
                client,
                classifier,
                TokioSleeper,
                RetryPolicy::from_config(&config),
            ),
            planner: ChunkPlanner::new(PdfSplitter, &config),
            config,
        })
    }
}

impl<C, D, K, S> Extractor<C, D, K, S>
where
    C: ExtractionClient,
    D: DocumentSplitter,
    K: ErrorClassifier,
    S: Sleeper,
{
    /// Replace the document splitter
    pub fn with_splitter<D2>(self, splitter: D2) -> Extractor<C, D2, K, S>
    where
        D2: DocumentSplitter,
    {
        Extractor {
            planner: ChunkPlanner::new(splitter, &self.config),
            scheduler: self.scheduler,
            config: self.config,
        }
    }

    /// Replace the error classifier
    pub fn with_classifier<K2>(self, classifier: K2) -> Extractor<C, D, K2, S>
    where
        K2: ErrorClassifier,
    {
        let (client, _, sleeper, policy) = self.scheduler.into_parts();
        Extractor {
            scheduler: RetryScheduler::new(client, classifier, sleeper, policy),
            planner: self.planner,
            config: self.config,
        }
    }

    /// Replace the sleeper used for backoff and inter-chunk pacing
    pub fn with_sleeper<S2>(self, sleeper: S2) -> Extractor<C, D, K, S2>
    where
        S2: Sleeper,
    {
        let (client, classifier, _, policy) = self.scheduler.into_parts();
        Extractor {
            scheduler: RetryScheduler::new(client, classifier, sleeper, policy),
            planner: self.planner,
            config: self.config,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Get the extraction client
    pub fn client(&self) -> &C {
        self.scheduler.client()
    }

    /// Plan the units of work for `job` without calling the backend
    pub fn plan(&self, job: &Job) -> Result<ChunkPlan, ExtractorError> {
        self.planner.plan(job)
    }

    /// Extract records from `job`
    ///
    /// Chunks run strictly in order with a pause between consecutive ones.
    /// The first chunk that cannot be completed aborts the job; records from
    /// earlier chunks are discarded.
    ///
    /// # Errors
    ///
    /// - `ExtractorError::Config` when no usable API key is configured
    /// - `ExtractorError::DocumentTooLarge` when the page limit is exceeded
    /// - `ExtractorError::ExhaustedRetries` when a chunk runs out of attempts
    /// - `ExtractorError::Backend` carrying a non-retryable backend error
    pub async fn extract(&self, job: Job) -> Result<ExtractionResult, ExtractorError> {
        let span = info_span!("extraction", job_id = %job.id);
        self.run(job).instrument(span).await
    }

    async fn run(&self, job: Job) -> Result<ExtractionResult, ExtractorError> {
        let start_time = Instant::now();
        let mut pool = CredentialPool::from_keys(self.config.api_keys.iter().map(String::as_str))?;

        info!(
            "Starting extraction of {} bytes with {} API keys",
            job.byte_len(),
            pool.len()
        );

        let plan = self.planner.plan(&job)?;
        let total = plan.chunks.len();
        if plan.mode == ProcessingMode::Chunked {
            info!("Processing document in {} chunks", total);
        }

        let mut aggregator = ResultAggregator::new();
        let mut calls = 0;
        let mut rotations = 0;

        for chunk in &plan.chunks {
            if chunk.index > 0 {
                let pause = self.config.inter_chunk_pause();
                info!("Waiting {:?} before chunk {}/{}", pause, chunk.index + 1, total);
                self.scheduler.sleeper().sleep(pause).await;
            }

            let instruction = self.chunk_instruction(&job.instruction, chunk, &plan);
            let report = match self.scheduler.execute(&mut pool, chunk, &instruction).await {
                Ok(report) => report,
                Err(e) => {
                    error!("Chunk {}/{} failed, aborting job: {}", chunk.index + 1, total, e);
                    return Err(e);
                }
            };

            info!(
                "Chunk {}/{} produced {} records",
                chunk.index + 1,
                total,
                report.records.len()
            );
            calls += report.calls;
            rotations += report.rotations;
            aggregator.append(report.records);
        }

        let processing_time_ms = start_time.elapsed().as_millis() as u64;
        info!(
            "Extraction complete: {} records from {} chunks in {} calls ({}ms)",
            aggregator.len(),
            aggregator.chunk_count(),
            calls,
            processing_time_ms
        );

        Ok(ExtractionResult {
            metadata: ExtractionMetadata {
                job_id: job.id,
                mode: plan.mode,
                page_count: plan.page_count,
                chunks: aggregator.chunk_count(),
                calls,
                rotations,
                processing_time_ms,
            },
            records: aggregator.into_records(),
        })
    }

    fn chunk_instruction(&self, instruction: &str, chunk: &Chunk, plan: &ChunkPlan) -> String {
        if plan.mode != ProcessingMode::Chunked || !self.config.annotate_chunks {
            return instruction.to_string();
        }
        match chunk.page_range {
            Some(range) => format!(
                "{} (processing chunk {} of {}, {})",
                instruction,
                chunk.index + 1,
                plan.chunks.len(),
                range
            ),
            None => instruction.to_string(),
        }
    }
}

/// Extract records from a document in one call using the default
/// collaborators
///
/// # Examples
///
/// ```no_run
/// use quarry_extractor::{extract_records, ExtractorConfig};
/// use quarry_llm::GeminiProvider;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = GeminiProvider::default_endpoint("gemini-2.5-flash")?;
/// let config = ExtractorConfig {
///     api_keys: vec!["key-1".to_string(), "key-2".to_string()],
///     ..ExtractorConfig::default()
/// };
///
/// let document = std::fs::read("reports.pdf")?;
/// let records = extract_records(client, document, "Extract every lab report", config).await?;
/// println!("{} records", records.len());
/// # Ok(())
/// # }
/// ```
pub async fn extract_records<C>(
    client: C,
    document: Vec<u8>,
    instruction: &str,
    config: ExtractorConfig,
) -> Result<Vec<Record>, ExtractorError>
where
    C: ExtractionClient,
{
    let extractor = Extractor::new(client, config)?;
    let result = extractor.extract(Job::new(document, instruction)).await?;
    Ok(result.records)
}
