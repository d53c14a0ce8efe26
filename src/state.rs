//! Application state management

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::bridge::LibraryScope;
use crate::config::Config;
use crate::error::{BridgeError, Result};
use crate::store::{CitekeyIndex, ItemStore};

/// Shared application state
///
/// Read-only after startup; requests share nothing else.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    store: Arc<dyn ItemStore>,
    citekeys: Option<Arc<dyn CitekeyIndex>>,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn ItemStore>,
        citekeys: Option<Arc<dyn CitekeyIndex>>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                citekeys,
            }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Store and library for one request
    pub fn scope(&self) -> LibraryScope<'_> {
        LibraryScope::new(self.inner.store.as_ref(), self.inner.config.bridge.library_id)
    }

    /// Citation-key index, when one is configured
    pub fn citekey_index(&self) -> Option<&dyn CitekeyIndex> {
        self.inner.citekeys.as_deref()
    }

    pub fn request_timeout(&self) -> Duration {
        self.inner.config.bridge.request_timeout
    }

    /// Run a bridge operation under the request timeout
    pub async fn run<T, F>(&self, operation: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let timeout = self.request_timeout();
        tokio::time::timeout(timeout, operation)
            .await
            .map_err(|_| BridgeError::Timeout(timeout))?
    }
}
