//! Bounded-concurrency fan-out over independent Dashboard calls.
//!
//! [`fan_out`] runs one fetch per item with at most `limit` fetches in flight,
//! on the caller's task. A failing or panicking fetch is logged against the
//! item's id and name and recorded as an [`ItemFailure`]; the batch itself
//! always runs to completion.
//!
//! ```no_run
//! # use orgsplit_core::{fan_out, FanOutItem, NoProgress, Result};
//! # struct Org { id: String, name: String }
//! # impl FanOutItem for Org {
//! #     fn item_id(&self) -> &str { &self.id }
//! #     fn item_name(&self) -> &str { &self.name }
//! # }
//! # async fn example(orgs: Vec<Org>) {
//! let outcome = fan_out(orgs, 10, &NoProgress, |org| async move {
//!     Ok::<_, orgsplit_core::Error>(vec![org.name.len()])
//! })
//! .await;
//! println!("{} results, {} failures", outcome.items.len(), outcome.failures.len());
//! # }
//! ```

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::stream::{self, StreamExt};
use futures::FutureExt;
use tracing::{debug, error, warn};

use crate::error::{Error, Result};

/// Anything a batch can be fanned out over.
pub trait FanOutItem {
    /// Identifier used when reporting failures.
    fn item_id(&self) -> &str;

    /// Display name used when reporting failures.
    fn item_name(&self) -> &str;
}

/// Observer for batch progress.
pub trait ProgressReporter: Send + Sync {
    /// Called once before the first fetch is dispatched.
    fn start(&self, total: usize);

    /// Called after each item completes, successfully or not.
    fn advance(&self, completed: usize, total: usize);

    /// Called once after the last item completes.
    fn finish(&self);
}

/// Progress reporter that discards all updates.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn start(&self, _total: usize) {}

    fn advance(&self, _completed: usize, _total: usize) {}

    fn finish(&self) {}
}

/// A single item whose fetch did not produce a result.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemFailure {
    /// Identifier of the failed item
    pub id: String,
    /// Display name of the failed item
    pub name: String,
    /// What went wrong
    pub error: Error,
}

/// Aggregated result of a fan-out batch.
#[derive(Debug, Clone)]
pub struct FanOutOutcome<T> {
    /// Results of all successful fetches, in completion order
    pub items: Vec<T>,
    /// Items whose fetch failed
    pub failures: Vec<ItemFailure>,
    /// Number of items submitted
    pub total: usize,
}

impl<T> FanOutOutcome<T> {
    /// Number of items whose fetch succeeded.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.total - self.failures.len()
    }

    /// Returns true when no item failed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Fetch per-item results with bounded concurrency.
///
/// At most `limit` fetches are outstanding at any time (a limit of 0 behaves
/// as 1); the next queued item is dispatched as soon as one completes. The
/// order of [`FanOutOutcome::items`] follows completion, not submission.
pub async fn fan_out<I, T, F, Fut>(
    items: Vec<I>,
    limit: usize,
    progress: &dyn ProgressReporter,
    fetch: F,
) -> FanOutOutcome<T>
where
    I: FanOutItem,
    F: Fn(I) -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    let total = items.len();
    let limit = limit.max(1);
    debug!(total, limit, "Starting fan-out batch");
    progress.start(total);

    let mut pending = std::pin::pin!(stream::iter(items.into_iter().map(|item| {
        let id = item.item_id().to_string();
        let name = item.item_name().to_string();
        let call = AssertUnwindSafe(fetch(item)).catch_unwind();
        async move { (id, name, call.await) }
    }))
    .buffer_unordered(limit));

    let mut collected = Vec::new();
    let mut failures = Vec::new();
    let mut completed = 0;

    while let Some((id, name, outcome)) = pending.next().await {
        completed += 1;
        progress.advance(completed, total);

        let failure = match outcome {
            Ok(Ok(batch)) => {
                collected.extend(batch);
                continue;
            }
            Ok(Err(err)) => err,
            Err(panic) => Error::InternalError(panic_message(panic.as_ref())),
        };

        if failure.is_api_error() {
            warn!(
                item_id = %id,
                item_name = %name,
                code = failure.error_code(),
                error = %failure,
                "Dashboard API error, skipping item"
            );
        } else {
            error!(
                item_id = %id,
                item_name = %name,
                code = failure.error_code(),
                error = %failure,
                "Unexpected error, skipping item"
            );
        }
        failures.push(ItemFailure {
            id,
            name,
            error: failure,
        });
    }

    progress.finish();
    debug!(total, failed = failures.len(), "Fan-out batch finished");

    FanOutOutcome {
        items: collected,
        failures,
        total,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("fetch panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("fetch panicked: {message}")
    } else {
        "fetch panicked".to_string()
    }
}
