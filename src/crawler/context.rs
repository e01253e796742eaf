//! Deadline and cancellation shared by every step of one crawl invocation

use crate::config::CrawlerConfig;
use crate::{EsajError, Step};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Per-invocation control: an optional deadline and a cancellation token
///
/// The same context is handed to every step of a crawl. Each network
/// round-trip races both, so cancelling aborts the request in flight and the
/// remaining steps never start.
#[derive(Debug, Clone, Default)]
pub struct CrawlContext {
    deadline: Option<Instant>,
    cancel: CancellationToken,
}

impl CrawlContext {
    /// No deadline, never cancelled unless `cancel()` is called
    pub fn new() -> Self {
        Self::default()
    }

    /// Deadline `timeout` from now
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Some(Instant::now() + timeout),
            cancel: CancellationToken::new(),
        }
    }

    /// Context for one crawl under a command-wide token
    ///
    /// The deadline starts now, so each crawl of a command gets its own
    /// budget while a single cancellation still stops all of them.
    /// `deadline-secs = 0` means no deadline.
    pub fn for_crawl(config: &CrawlerConfig, token: &CancellationToken) -> Self {
        let ctx = match config.deadline_secs {
            0 => Self::new(),
            secs => Self::with_timeout(Duration::from_secs(secs)),
        };
        ctx.with_cancellation(token.clone())
    }

    /// Ties this context to an externally owned token
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Fails fast when the invocation is already over
    pub fn check(&self, step: Step) -> Result<(), EsajError> {
        if self.is_cancelled() {
            return Err(EsajError::Cancelled { step });
        }
        if matches!(self.deadline, Some(deadline) if Instant::now() >= deadline) {
            return Err(EsajError::DeadlineExceeded { step });
        }
        Ok(())
    }

    /// Runs `fut` until it completes, the deadline passes or the token fires
    pub async fn run<F, T>(&self, step: Step, fut: F) -> Result<T, EsajError>
    where
        F: Future<Output = Result<T, EsajError>>,
    {
        self.check(step)?;

        let guarded = async {
            match self.deadline {
                Some(deadline) => tokio::time::timeout_at(deadline, fut)
                    .await
                    .map_err(|_| EsajError::DeadlineExceeded { step })?,
                None => fut.await,
            }
        };

        tokio::select! {
            _ = self.cancel.cancelled() => Err(EsajError::Cancelled { step }),
            result = guarded => result,
        }
    }
}
