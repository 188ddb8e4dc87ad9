//! Connector wrapper that retries failed connects

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tidepool_core::{ConnectParams, Connector, Result, TidepoolError};

use super::BackoffStrategy;

/// How many times to retry a failed connect, and how long to wait between tries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt (0 = never retry)
    max_attempts: u32,
    backoff: BackoffStrategy,
}

impl RetryConfig {
    pub fn new(max_attempts: u32, backoff: BackoffStrategy) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn backoff(&self) -> &BackoffStrategy {
        &self.backoff
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::new(3, BackoffStrategy::default())
    }
}

/// Progress of a retried connect, for monitoring
#[derive(Debug, Clone, PartialEq)]
pub enum RetryEvent {
    /// A retry is about to be made
    Attempting { attempt: u32, max_attempts: u32 },
    /// The connect went through after at least one retry
    Succeeded { attempts_taken: u32 },
    /// One attempt failed
    Failed { attempt: u32, error: String },
    /// Every attempt failed
    Exhausted { total_attempts: u32 },
}

type EventHook = Arc<dyn Fn(&RetryEvent) + Send + Sync>;

/// A [`Connector`] that retries transient connect failures with backoff.
///
/// Only `connect` is retried. Teardown and ping go straight to the inner
/// connector. Connect, I/O and timeout errors are retried; anything else
/// (bad configuration, for one) is returned right away.
pub struct RetryingConnector<C> {
    inner: C,
    config: RetryConfig,
    on_event: Option<EventHook>,
}

impl<C: Connector> RetryingConnector<C> {
    pub fn new(inner: C, config: RetryConfig) -> Self {
        Self {
            inner,
            config,
            on_event: None,
        }
    }

    /// Call `hook` for every [`RetryEvent`] in addition to logging it
    pub fn with_event_hook(mut self, hook: impl Fn(&RetryEvent) + Send + Sync + 'static) -> Self {
        self.on_event = Some(Arc::new(hook));
        self
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    fn should_retry(error: &TidepoolError) -> bool {
        matches!(
            error,
            TidepoolError::Connect(_) | TidepoolError::Io(_) | TidepoolError::Timeout(_)
        )
    }

    fn emit(&self, event: RetryEvent) {
        match &event {
            RetryEvent::Attempting {
                attempt,
                max_attempts,
            } => tracing::debug!(attempt, max_attempts, "retrying connect"),
            RetryEvent::Succeeded { attempts_taken } => {
                tracing::info!(attempts_taken, "connect succeeded after retry")
            }
            RetryEvent::Failed { attempt, error } => {
                tracing::warn!(attempt, error = %error, "connect attempt failed")
            }
            RetryEvent::Exhausted { total_attempts } => {
                tracing::error!(total_attempts, "giving up on connect")
            }
        }
        if let Some(hook) = &self.on_event {
            hook(&event);
        }
    }
}

#[async_trait]
impl<C: Connector> Connector for RetryingConnector<C> {
    type Connection = C::Connection;

    async fn connect(&self, params: &ConnectParams) -> Result<Self::Connection> {
        let max_attempts = self.config.max_attempts;
        let mut attempt = 0u32;

        loop {
            match self.inner.connect(params).await {
                Ok(conn) => {
                    if attempt > 0 {
                        self.emit(RetryEvent::Succeeded {
                            attempts_taken: attempt + 1,
                        });
                    }
                    return Ok(conn);
                }
                Err(e) if !Self::should_retry(&e) => return Err(e),
                Err(e) => {
                    self.emit(RetryEvent::Failed {
                        attempt,
                        error: e.to_string(),
                    });
                    if attempt >= max_attempts {
                        self.emit(RetryEvent::Exhausted {
                            total_attempts: attempt + 1,
                        });
                        return Err(e);
                    }
                }
            }

            tokio::time::sleep(self.config.backoff.calculate_delay(attempt)).await;
            attempt += 1;
            self.emit(RetryEvent::Attempting {
                attempt,
                max_attempts,
            });
        }
    }

    async fn teardown(&self, conn: Self::Connection) -> Result<()> {
        self.inner.teardown(conn).await
    }

    async fn ping(&self, conn: &mut Self::Connection) -> Result<()> {
        self.inner.ping(conn).await
    }
}

impl<C> fmt::Debug for RetryingConnector<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryingConnector")
            .field("config", &self.config)
            .field("has_event_hook", &self.on_event.is_some())
            .finish_non_exhaustive()
    }
}
