//! Bounded-concurrency batch execution.
//!
//! Runs an async operation over an ordered input sequence with an admission
//! ceiling: at most `limit` invocations are outstanding at any instant, and
//! the output is index-aligned with the input no matter which invocations
//! complete first. Items only ever wait on admission slots, never on each
//! other's results.

use std::future::Future;

use futures::stream::{self, StreamExt};
use tracing::debug;

use crate::error::EaselError;

/// Run `op` over `items` with at most `limit` invocations in flight.
///
/// Output `[i]` corresponds to `items[i]`. A failing item records its error
/// in its own slot and never cancels or fails siblings. An empty input or a
/// zero limit yields an empty output without invoking `op`.
pub async fn run_bounded<T, R, F, Fut>(
    items: Vec<T>,
    limit: usize,
    op: F,
) -> Vec<Result<R, EaselError>>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<R, EaselError>>,
{
    if items.is_empty() || limit == 0 {
        return Vec::new();
    }

    let total = items.len();
    debug!(total, limit, "running bounded batch");

    // `buffered` (not `buffer_unordered`) keeps completion order equal to
    // input order while still admitting up to `limit` futures at once.
    stream::iter(items.into_iter().map(op))
        .buffered(limit)
        .collect()
        .await
}
