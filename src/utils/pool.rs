//! Bounded worker pool.

use std::future::Future;
use std::sync::Arc;

use futures::stream::FuturesUnordered;
use futures::StreamExt;
use log::warn;

use crate::initialization::init_semaphore;

/// Runs `task` once per item with at most `concurrency` tasks in flight.
///
/// Returns after every task has finished. Results arrive in completion
/// order, not item order; callers sort. A panicking task is logged and
/// contributes no result.
pub async fn run_bounded<I, T, F, Fut>(items: I, concurrency: usize, task: F) -> Vec<T>
where
    I: IntoIterator,
    F: Fn(I::Item) -> Fut,
    Fut: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    let semaphore = init_semaphore(concurrency);
    let mut tasks = FuturesUnordered::new();

    for item in items {
        let permit = match Arc::clone(&semaphore).acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => {
                warn!("Semaphore closed, stopping dispatch");
                break;
            }
        };
        let fut = task(item);
        tasks.push(tokio::spawn(async move {
            let _permit = permit;
            fut.await
        }));
    }

    let mut results = Vec::with_capacity(tasks.len());
    while let Some(task_result) = tasks.next().await {
        match task_result {
            Ok(result) => results.push(result),
            Err(join_error) => warn!("Task panicked: {:?}", join_error),
        }
    }
    results
}
