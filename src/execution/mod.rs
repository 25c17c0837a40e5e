//! Request execution.
//!
//! The read path ([`query`](crate::registry::ClientRegistry::query),
//! [`query_server`](crate::registry::ClientRegistry::query_server)) and the
//! write path ([`mutate`](crate::registry::ClientRegistry::mutate)), plus the
//! deterministic query-string encoding they share.

pub mod encoding;
pub mod mutation;
pub mod query;

use std::future::Future;

use crate::error::ClientError;
use crate::utils::cancel::CancelHandle;

/// Race an operation against an optional cancellation handle.
///
/// Without a handle the operation always runs to completion.
pub(crate) async fn run_cancellable<F, T>(
    operation: F,
    cancel: Option<&CancelHandle>,
) -> Result<T, ClientError>
where
    F: Future<Output = Result<T, ClientError>>,
{
    match cancel {
        Some(handle) => {
            tokio::select! {
                _ = handle.cancelled() => Err(ClientError::Cancelled),
                result = operation => result,
            }
        }
        None => operation.await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cancel_wins_over_a_pending_operation() {
        let handle = CancelHandle::new();
        let pending = std::future::pending::<Result<(), ClientError>>();
        handle.cancel();
        let result = run_cancellable(pending, Some(&handle)).await;
        assert!(matches!(result, Err(ClientError::Cancelled)));
    }

    #[tokio::test]
    async fn absent_handle_runs_to_completion() {
        let result = run_cancellable(async { Ok::<_, ClientError>(7) }, None).await;
        assert_eq!(result.expect("completes"), 7);
    }
}
