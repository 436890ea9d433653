//! CareerLens Embedding Worker
//!
//! Background generation of insight embeddings:
//! 1. Polls the database for active insights without an embedding
//!    (newly created, or text-edited since the last generation)
//! 2. Generates vectors via the configured provider
//! 3. Writes them back, making the insights eligible for matching
//!
//! Failed insights keep a NULL embedding and are retried on a later cycle.

mod processor;

use crate::processor::{EmbeddingProcessor, ProcessorConfig};
use careerlens_common::{
    config::AppConfig,
    db::DbPool,
    embeddings::create_embedder,
    VERSION,
};
use std::time::Duration;
use tracing::{error, info, warn};

const MAX_FAILURES: u32 = 5;
const CIRCUIT_BREAK_DURATION: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .json()
        .init();

    info!("Starting CareerLens Embedding Worker v{}", VERSION);

    // Load configuration
    let config = AppConfig::load().map_err(|e| {
        tracing::error!(error = %e, "Failed to load configuration");
        e
    })?;

    // Initialize database connection
    let db = DbPool::new(&config.database).await?;

    // Initialize embedder
    let embedder = create_embedder(&config.embedding)?;
    info!(
        model = %embedder.model_name(),
        dimension = embedder.dimension(),
        "Embedder initialized"
    );

    let processor = EmbeddingProcessor::new(
        db,
        embedder,
        ProcessorConfig {
            batch_size: config.worker.batch_size,
        },
    );

    let poll_interval = Duration::from_secs(config.worker.poll_interval_secs);
    info!(
        poll_interval_secs = config.worker.poll_interval_secs,
        batch_size = config.worker.batch_size,
        "Embedding worker ready, starting polling"
    );

    // Circuit breaker state
    let mut consecutive_failures = 0;

    loop {
        // Circuit breaker check
        if consecutive_failures >= MAX_FAILURES {
            warn!(
                failures = consecutive_failures,
                "Circuit breaker open, pausing..."
            );
            tokio::time::sleep(CIRCUIT_BREAK_DURATION).await;
            consecutive_failures = 0;
            info!("Circuit breaker reset, resuming...");
        }

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
            result = processor.run_cycle() => {
                match result {
                    Ok(outcome) => {
                        consecutive_failures = 0;
                        if outcome.processed > 0 || outcome.failed > 0 {
                            info!(
                                processed = outcome.processed,
                                failed = outcome.failed,
                                "Embedding cycle complete"
                            );
                        }
                        tokio::time::sleep(poll_interval).await;
                    }
                    Err(e) => {
                        consecutive_failures += 1;
                        error!(
                            error = %e,
                            failures = consecutive_failures,
                            "Embedding cycle failed"
                        );
                        tokio::time::sleep(poll_interval).await;
                    }
                }
            }
        }
    }

    info!("Embedding worker shutting down");
    Ok(())
}
