//! The timeout-bounded content adapter.

use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{AdapterError, AdapterResult};
use crate::prompt::ContentRequest;
use crate::provider::TextProvider;

/// Default deadline for one generative call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(8);

/// Front door to the generative provider.
///
/// One call, one answer: the adapter renders the prompt, waits at most
/// `timeout` for the provider, and validates the result. It does not retry.
#[derive(Clone)]
pub struct ContentAdapter {
    provider: Option<Arc<dyn TextProvider>>,
    timeout: Duration,
}

impl std::fmt::Debug for ContentAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentAdapter")
            .field("provider", &self.provider.as_ref().map(|p| p.name().to_string()))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for ContentAdapter {
    fn default() -> Self {
        Self::disabled()
    }
}

impl ContentAdapter {
    /// An adapter backed by `provider`.
    pub fn new(provider: Arc<dyn TextProvider>) -> Self {
        Self {
            provider: Some(provider),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// An adapter with no provider; every call fails with
    /// [`AdapterError::Unavailable`].
    pub fn disabled() -> Self {
        Self {
            provider: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the per-call deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Whether a provider is configured.
    pub fn is_enabled(&self) -> bool {
        self.provider.is_some()
    }

    /// The per-call deadline.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send `request` and return its validated response.
    pub fn request<R: ContentRequest>(&self, request: &R) -> AdapterResult<R::Response> {
        let provider = self.provider.clone().ok_or(AdapterError::Unavailable)?;
        let prompt = request.prompt();
        let started = Instant::now();
        tracing::debug!(kind = request.kind(), provider = provider.name(), "content request");

        let raw = self.call_with_deadline(provider, prompt).inspect_err(|e| {
            tracing::warn!(kind = request.kind(), error = %e, "content request failed");
        })?;

        let parsed = request.parse(&raw).inspect_err(|e| {
            tracing::warn!(kind = request.kind(), error = %e, "content response rejected");
        })?;
        tracing::debug!(
            kind = request.kind(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "content response accepted"
        );
        Ok(parsed)
    }

    /// Run the provider on a worker thread and stop waiting at the deadline.
    /// A late answer is discarded when the worker finishes.
    fn call_with_deadline(
        &self,
        provider: Arc<dyn TextProvider>,
        prompt: String,
    ) -> AdapterResult<String> {
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("content-provider".into())
            .spawn(move || {
                let _ = tx.send(provider.complete(&prompt));
            })
            .map_err(|e| AdapterError::Provider(e.to_string()))?;

        match rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => Err(AdapterError::Timeout(self.timeout)),
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                Err(AdapterError::Provider("provider thread panicked".into()))
            }
        }
    }
}
