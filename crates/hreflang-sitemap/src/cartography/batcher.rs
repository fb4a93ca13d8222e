//! Batch pacing for polite scraping.

use crate::config::Settings;
use futures::future::join_all;
use std::future::Future;
use std::time::Duration;
use tracing::info;

/// Runs work in fixed-size batches with a pause between batches.
///
/// Every task of a batch runs concurrently; the next batch starts only after
/// the whole batch has finished and the delay has elapsed. No pause follows
/// the final batch.
#[derive(Debug, Clone)]
pub struct BatchPacer {
    batch_size: usize,
    delay: Duration,
}

impl BatchPacer {
    pub fn new(batch_size: usize, delay: Duration) -> Self {
        Self {
            batch_size: batch_size.max(1),
            delay,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.batch_size, settings.batch_delay)
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Run `task` over every item, returning outcomes in item order.
    pub async fn run<'a, T, F, Fut, R>(&self, items: &'a [T], mut task: F) -> Vec<R>
    where
        F: FnMut(&'a T) -> Fut,
        Fut: Future<Output = R>,
    {
        let total = items.len();
        let mut results = Vec::with_capacity(total);

        for (index, chunk) in items.chunks(self.batch_size).enumerate() {
            let start = index * self.batch_size;
            let end = start + chunk.len();
            info!("  batch [{}-{end}] of {total}", start + 1);

            results.extend(join_all(chunk.iter().map(&mut task)).await);

            if end < total {
                self.pause().await;
            }
        }

        results
    }

    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}
