//!
//! Run computations off the calling task and wait for them without stalling the event loop.
//!
//! The waiting caller is logically blocked: it does not continue until the result is
//! available. Operationally it is suspended at an `.await`, so the runtime keeps servicing
//! every other queued task while the computation runs on tokio's blocking pool.
//!
//! Work is never cancelled once started and failures are not retried.

use crate::{Error, Result};
use tokio::task::JoinHandle;

/// Waits for an already spawned task without blocking the runtime.
///
/// A task that panicked or was cancelled is reported as `Error::Task`.
pub async fn wait_for_future<T>(handle: JoinHandle<T>) -> Result<T> {
    handle.await.map_err(|e| {
        tracing::warn!(error = %e, "background task did not complete");
        Error::Task(e.to_string())
    })
}

/// Runs `task` on a worker thread and waits for its result without blocking the runtime.
///
/// # Example
///
/// ```
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> keepcore::Result<()> {
/// let sum = keepcore::async_task::run_and_wait_for_future(|| (1..=10u64).sum::<u64>()).await?;
/// assert_eq!(sum, 55);
/// # Ok(())
/// # }
/// ```
pub async fn run_and_wait_for_future<F, T>(task: F) -> Result<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    wait_for_future(tokio::task::spawn_blocking(task)).await
}
