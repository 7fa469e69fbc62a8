use futures::stream::{self, StreamExt, TryStreamExt};
use std::fmt::Display;
use std::future::Future;

/// Default upper bound on concurrently in-flight upstream requests
pub const DEFAULT_MAX_CONCURRENCY: usize = 16;

/// Runs batches of independent fetches concurrently.
///
/// At most `min(task_count, max_concurrency)` tasks are in flight at once.
/// Results come back in input order. The first failure observed fails the
/// whole batch and drops every task still in flight; there is no partial
/// result mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanOutDispatcher {
    max_concurrency: usize,
}

impl Default for FanOutDispatcher {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONCURRENCY)
    }
}

impl FanOutDispatcher {
    /// A bound of zero is treated as one.
    pub fn new(max_concurrency: usize) -> Self {
        Self {
            max_concurrency: max_concurrency.max(1),
        }
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Effective parallelism for a batch of `task_count` tasks
    pub fn concurrency_for(&self, task_count: usize) -> usize {
        task_count.clamp(1, self.max_concurrency)
    }

    /// Executes `tasks` and returns their outputs, index `i` for task `i`.
    ///
    /// Tasks are pulled from the iterator only as slots free up, so a long
    /// batch never materializes more than `max_concurrency` futures at once.
    ///
    /// # Arguments
    ///
    /// * `batch_name` - Used in log lines only
    /// * `tasks` - Futures to run; nothing is polled before this call
    ///
    /// # Errors
    ///
    /// Returns the first error any task produces. When several tasks fail
    /// concurrently, which one is returned is unspecified.
    pub async fn dispatch<T, E, Fut, I>(&self, batch_name: &str, tasks: I) -> Result<Vec<T>, E>
    where
        I: IntoIterator<Item = Fut>,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let tasks = tasks.into_iter();
        let (lower, upper) = tasks.size_hint();
        if upper == Some(0) {
            tracing::debug!("Fan-out {}: no tasks", batch_name);
            return Ok(Vec::new());
        }

        let concurrency = self.concurrency_for(upper.unwrap_or(usize::MAX));
        tracing::debug!(
            "Fan-out {}: {} tasks, up to {} concurrently",
            batch_name,
            upper.unwrap_or(lower),
            concurrency
        );

        let indexed = tasks
            .enumerate()
            .map(|(index, task)| async move { task.await.map(|output| (index, output)) });

        let mut completed: Vec<(usize, T)> = stream::iter(indexed)
            .buffer_unordered(concurrency)
            .try_collect()
            .await
            .map_err(|e| {
                tracing::warn!("Fan-out {} aborted: {}", batch_name, e);
                e
            })?;

        completed.sort_unstable_by_key(|(index, _)| *index);
        Ok(completed.into_iter().map(|(_, output)| output).collect())
    }
}
