//! Operation completion waiter (fixed interval)
//!
//! Bridges an asynchronous Cloudways operation into a single awaited result
//! by polling `GET /operation/{id}` at a constant interval.

use crate::client::CloudwaysClient;
use crate::error::{CloudwaysError, Result};
use crate::types::{AccessToken, Operation};
use std::time::Duration;
use tokio::time::sleep;

/// Polling budget for [`CloudwaysClient::wait_for_completion`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitConfig {
    /// Maximum number of status requests
    pub max_attempts: u32,
    /// Delay before every status request
    pub interval: Duration,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            max_attempts: 30,
            interval: Duration::from_millis(5000),
        }
    }
}

impl WaitConfig {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }
}

/// What an unsuccessful poll saw
#[derive(Debug, Clone, PartialEq)]
pub enum Observation {
    /// `operation` present with `is_completed` false
    Pending { message: Option<String> },
    /// Body had no usable `operation` object (absent, null or not an object)
    Missing,
}

/// Emitted once per unsuccessful attempt
#[derive(Debug, Clone, PartialEq)]
pub struct WaitProgress {
    pub operation_id: String,
    pub attempt: u32,
    pub max_attempts: u32,
    pub observation: Observation,
}

enum WaitState {
    Waiting { attempt: u32 },
    Completed(Operation),
    TimedOut,
}

impl CloudwaysClient {
    /// Poll an operation until it completes or the budget runs out
    pub async fn wait_for_completion(
        &self,
        token: &AccessToken,
        operation_id: &str,
        config: &WaitConfig,
    ) -> Result<Operation> {
        self.wait_for_completion_with(token, operation_id, config, |_| {})
            .await
    }

    /// Same as [`wait_for_completion`](Self::wait_for_completion), reporting each
    /// unsuccessful attempt to `on_progress`
    ///
    /// # Returns
    /// * `Ok(Operation)` - the first operation snapshot with `is_completed = true`
    /// * `Err(CloudwaysError::Timeout)` - `max_attempts` polls without completion
    /// * any other error from the status request, unretried
    pub async fn wait_for_completion_with<F>(
        &self,
        token: &AccessToken,
        operation_id: &str,
        config: &WaitConfig,
        mut on_progress: F,
    ) -> Result<Operation>
    where
        F: FnMut(&WaitProgress),
    {
        let mut state = WaitState::Waiting { attempt: 1 };

        loop {
            state = match state {
                WaitState::Waiting { attempt } if attempt > config.max_attempts => {
                    WaitState::TimedOut
                }
                WaitState::Waiting { attempt } => {
                    sleep(config.interval).await;

                    let status = self.get_operation_status(token, operation_id).await?;
                    match status.operation {
                        Some(operation) if operation.is_completed => {
                            tracing::info!(
                                "Operation {} completed on attempt {}",
                                operation_id,
                                attempt
                            );
                            WaitState::Completed(operation)
                        }
                        other => {
                            let observation = match other {
                                Some(operation) => Observation::Pending {
                                    message: operation.message,
                                },
                                None => {
                                    // An absent operation is read as "not done yet"
                                    tracing::warn!(
                                        "Status of operation {} has no operation object (attempt {}/{})",
                                        operation_id,
                                        attempt,
                                        config.max_attempts
                                    );
                                    Observation::Missing
                                }
                            };

                            tracing::debug!(
                                "Operation {} still running (attempt {}/{})",
                                operation_id,
                                attempt,
                                config.max_attempts
                            );
                            on_progress(&WaitProgress {
                                operation_id: operation_id.to_string(),
                                attempt,
                                max_attempts: config.max_attempts,
                                observation,
                            });

                            WaitState::Waiting {
                                attempt: attempt + 1,
                            }
                        }
                    }
                }
                WaitState::Completed(operation) => return Ok(operation),
                WaitState::TimedOut => {
                    return Err(CloudwaysError::Timeout {
                        operation_id: operation_id.to_string(),
                        attempts: config.max_attempts,
                    });
                }
            };
        }
    }
}
