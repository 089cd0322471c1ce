//! Batch coordinator - sequential, paced extraction of URL lists
//!
//! Items are processed strictly one after another in input order, with a
//! fixed pause between consecutive items. A failing item never aborts the
//! batch; every input URL yields exactly one [`BatchItem`].

use crate::config::BatchConfig;
use crate::extractor::{
    ExtractionError, ExtractionPipeline, ExtractionResult, Sleeper, NO_URL_LIST_PROVIDED,
};
use std::sync::Arc;
use std::time::Duration;

/// Outcome of one URL within a batch
#[derive(Debug, Clone, PartialEq)]
pub struct BatchItem {
    /// The URL exactly as submitted
    pub url: String,
    pub result: ExtractionResult,
}

/// Runs the pipeline over a list of URLs
pub struct BatchCoordinator {
    pipeline: Arc<ExtractionPipeline>,
    sleeper: Arc<dyn Sleeper>,
    delay: Duration,
}

impl BatchCoordinator {
    /// Creates a coordinator sharing the pipeline's sleeper
    pub fn new(pipeline: Arc<ExtractionPipeline>, config: &BatchConfig) -> Self {
        let sleeper = pipeline.sleeper();
        Self {
            pipeline,
            sleeper,
            delay: config.delay(),
        }
    }

    /// Pause observed between consecutive items
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Extracts every URL in order
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<BatchItem>)` - One item per input URL, in input order
    /// * `Err(ExtractionError::InvalidInput)` - The list was empty
    pub async fn run_batch(&self, urls: &[String]) -> Result<Vec<BatchItem>, ExtractionError> {
        if urls.is_empty() {
            return Err(ExtractionError::InvalidInput(
                NO_URL_LIST_PROVIDED.to_string(),
            ));
        }

        let total = urls.len();
        let mut items = Vec::with_capacity(total);
        let mut failed = 0;

        tracing::info!("Starting batch of {} URLs", total);

        for (index, url) in urls.iter().enumerate() {
            let result = self.pipeline.extract(url).await;

            match &result {
                Ok(_) => tracing::info!("[{}/{}] Extracted {}", index + 1, total, url),
                Err(e) => {
                    failed += 1;
                    tracing::info!("[{}/{}] Failed {}: {}", index + 1, total, url, e);
                }
            }

            items.push(BatchItem {
                url: url.clone(),
                result,
            });

            if index + 1 < total {
                self.sleeper.sleep(self.delay).await;
            }
        }

        tracing::info!(
            "Batch complete: {} succeeded, {} failed",
            total - failed,
            failed
        );

        Ok(items)
    }
}
