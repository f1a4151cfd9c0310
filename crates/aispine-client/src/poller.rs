//! Wait-for-completion loop over the "get execution" call.
//!
//! Polls at a fixed interval until the execution completes, fails, or the
//! overall budget runs out. The budget is measured from the start of the wait
//! and also bounds each individual fetch, so the loop never outlives it by
//! more than scheduling noise.

use std::time::Duration;

use aispine_protocol::{Execution, ExecutionStatus};
use async_trait::async_trait;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::client::Client;
use crate::error::{Result, SpineError};

/// Overall wait budget when none is given
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(300);
/// Pause between polls when none is given
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

const DEFAULT_FAILURE_MESSAGE: &str = "Execution failed";

/// How long to wait and how often to poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Overall budget, measured from the start of the wait
    pub timeout: Duration,
    /// Fixed pause between polls
    pub interval: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_WAIT_TIMEOUT,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl WaitOptions {
    /// Set the overall budget
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the pause between polls
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

/// Anything that can fetch an execution snapshot by id
#[async_trait]
pub trait ExecutionSource: Send + Sync {
    /// Fetch the current snapshot of an execution
    async fn fetch_execution(&self, execution_id: &str) -> Result<Execution>;
}

#[async_trait]
impl ExecutionSource for Client {
    async fn fetch_execution(&self, execution_id: &str) -> Result<Execution> {
        self.get_execution(execution_id).await
    }
}

#[derive(Debug)]
enum PollState {
    Polling,
    Completed(Execution),
    Failed(Execution),
    TimedOut,
}

/// Poll `source` until the execution reaches a terminal state
///
/// Returns the completed execution. A failed execution becomes
/// [`SpineError::Execution`]; running out of budget becomes
/// [`SpineError::Timeout`]. Errors from a fetch propagate unchanged.
#[instrument(skip(source, options), fields(timeout = ?options.timeout, interval = ?options.interval))]
pub async fn wait_for_execution<S>(
    source: &S,
    execution_id: &str,
    options: WaitOptions,
) -> Result<Execution>
where
    S: ExecutionSource + ?Sized,
{
    let started = Instant::now();
    let mut attempts: u32 = 0;
    let mut state = PollState::Polling;

    loop {
        state = match state {
            PollState::Polling => {
                attempts += 1;
                let remaining = options.timeout.saturating_sub(started.elapsed());
                match tokio::time::timeout(remaining, source.fetch_execution(execution_id)).await {
                    Err(_) => PollState::TimedOut,
                    Ok(fetched) => {
                        let execution = fetched?;
                        debug!(attempts, status = %execution.status, "Polled execution");
                        match execution.status {
                            ExecutionStatus::Completed => PollState::Completed(execution),
                            ExecutionStatus::Failed => PollState::Failed(execution),
                            _ => {
                                let remaining = options.timeout.saturating_sub(started.elapsed());
                                tokio::time::sleep(options.interval.min(remaining)).await;
                                if started.elapsed() >= options.timeout {
                                    PollState::TimedOut
                                } else {
                                    PollState::Polling
                                }
                            }
                        }
                    }
                }
            }
            PollState::Completed(execution) => {
                info!(attempts, "Execution completed");
                return Ok(execution);
            }
            PollState::Failed(execution) => {
                let message = execution
                    .error_message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string());
                warn!(attempts, error = %message, "Execution failed");
                return Err(SpineError::Execution {
                    message,
                    execution_id: execution_id.to_string(),
                });
            }
            PollState::TimedOut => {
                warn!(attempts, "Gave up waiting for execution");
                return Err(SpineError::Timeout {
                    execution_id: execution_id.to_string(),
                    timeout: options.timeout,
                });
            }
        };
    }
}
