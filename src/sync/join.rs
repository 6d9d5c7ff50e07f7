//! Fail-fast join over spawned tasks

use eyre::{Result, eyre};
use futures::future::try_join_all;
use std::future::Future;

/// Spawn every future as its own task and wait for all of them.
///
/// Fails as soon as one task fails. Tasks still running at that point are
/// detached rather than aborted, so their side effects still happen.
/// Results come back in issue order.
pub async fn spawn_all<I, F, T>(futures: I) -> Result<Vec<T>>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<T>> + Send + 'static,
    T: Send + 'static,
{
    let handles: Vec<_> = futures.into_iter().map(tokio::spawn).collect();

    try_join_all(handles.into_iter().map(|handle| async move {
        handle
            .await
            .map_err(|e| eyre!("Sync task did not finish: {}", e))?
    }))
    .await
}
