//! Readiness polling.

use std::future::Future;

use tokio::time::{Instant, sleep};
use tracing::{debug, info};

use crate::error::{LifecycleError, Result};
use crate::model::CanonicalState;
use crate::policy::WaitPolicy;

/// Query until the status equals `ready`, a failure label shows up, or the
/// policy timeout elapses.
///
/// `query` receives the latest canonical state and returns the refreshed
/// one; its errors end the wait immediately. The deadline is checked before
/// each query, so a resource that never becomes ready costs roughly
/// `timeout / interval + 1` queries.
pub async fn wait_until_ready<F, Fut>(
    policy: &WaitPolicy,
    operation: &str,
    ready: &str,
    initial: CanonicalState,
    mut query: F,
) -> Result<CanonicalState>
where
    F: FnMut(CanonicalState) -> Fut,
    Fut: Future<Output = Result<CanonicalState>>,
{
    let start = Instant::now();
    let mut state = initial;
    let mut attempt = 0u32;

    loop {
        if start.elapsed() > policy.timeout {
            return Err(LifecycleError::Timeout {
                operation: operation.to_string(),
                ready: ready.to_string(),
            });
        }

        attempt += 1;
        state = query(state).await?;
        let status = state.status.as_str();

        if status == ready {
            info!(operation, attempt, status, "Resource is ready");
            return Ok(state);
        }
        if policy.is_failure(status) {
            return Err(LifecycleError::RemoteFailure {
                operation: operation.to_string(),
                status: status.to_string(),
            });
        }

        debug!(operation, attempt, status, "Waiting for {} to come {:?}", operation, ready);
        sleep(policy.interval).await;
    }
}
