//! Embedding worker processor
//!
//! One cycle: pick up insights whose embedding is absent, generate vectors,
//! write them back. An insight that fails stays NULL and is picked up again
//! on a later cycle, so delivery is at-least-once.

use backoff::ExponentialBackoff;
use careerlens_common::db::{DbPool, Repository};
use careerlens_common::embeddings::Embedder;
use careerlens_common::errors::{AppError, Result};
use careerlens_common::metrics;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Embedding processor configuration
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// Maximum insights picked up per cycle
    pub batch_size: u64,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self { batch_size: 20 }
    }
}

/// Result of one polling cycle
#[derive(Debug, Clone, Copy, Default)]
pub struct CycleOutcome {
    pub processed: usize,
    pub failed: usize,
}

/// Embedding worker processor
pub struct EmbeddingProcessor {
    repository: Repository,
    embedder: Arc<dyn Embedder>,
    config: ProcessorConfig,
}

impl EmbeddingProcessor {
    pub fn new(db_pool: DbPool, embedder: Arc<dyn Embedder>, config: ProcessorConfig) -> Self {
        Self {
            repository: Repository::new(db_pool),
            embedder,
            config,
        }
    }

    /// Run one polling cycle
    #[instrument(skip(self))]
    pub async fn run_cycle(&self) -> Result<CycleOutcome> {
        let pending = self
            .repository
            .insights_pending_embedding(self.config.batch_size)
            .await?;

        if pending.is_empty() {
            debug!("No insights pending embedding");
            return Ok(CycleOutcome::default());
        }

        info!(count = pending.len(), "Generating insight embeddings");

        let texts: Vec<String> = pending.iter().map(|i| i.embedding_input()).collect();
        let embeddings = self.embed_with_backoff(&texts).await?;

        let mut outcome = CycleOutcome::default();
        for (insight, embedding) in pending.iter().zip(embeddings.iter()) {
            match self
                .repository
                .set_insight_embedding(insight.id, embedding)
                .await
            {
                Ok(()) => outcome.processed += 1,
                Err(e) => {
                    outcome.failed += 1;
                    warn!(
                        insight_id = %insight.id,
                        error = %e,
                        "Failed to store embedding, will retry next cycle"
                    );
                }
            }
        }

        metrics::record_embeddings(outcome.processed, outcome.failed);
        Ok(outcome)
    }

    /// Call the provider with exponential backoff; transient HTTP failures
    /// are retried, anything else aborts the cycle
    async fn embed_with_backoff(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let policy = ExponentialBackoff {
            max_elapsed_time: Some(Duration::from_secs(60)),
            ..Default::default()
        };

        backoff::future::retry(policy, || async {
            self.embedder.embed_batch(texts).await.map_err(|e| match e {
                AppError::HttpClient(_) | AppError::EmbeddingUnavailable { .. } => {
                    backoff::Error::transient(e)
                }
                other => backoff::Error::permanent(other),
            })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use careerlens_common::embeddings::MockEmbedder;

    #[test]
    fn test_default_batch_size() {
        assert_eq!(ProcessorConfig::default().batch_size, 20);
    }

    #[tokio::test]
    async fn test_mock_embedder_matches_configured_dimension() {
        let embedder = MockEmbedder::new(1536);
        let texts = vec!["Question: q\nAnswer: a".to_string()];
        let embeddings = embedder.embed_batch(&texts).await.unwrap();
        assert_eq!(embeddings.len(), 1);
        assert_eq!(embeddings[0].len(), 1536);
    }
}
