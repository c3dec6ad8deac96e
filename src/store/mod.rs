//! Whole-document persistence.
//!
//! A store hands out the full [`DataFile`] together with an opaque
//! [`Revision`] and only accepts a save that names the revision it was
//! based on. Three backends exist: the GitHub Contents API, a server-side
//! proxy in front of it, and an in-memory store for tests and dry runs.

pub mod codec;
pub mod error;
pub mod github;
pub mod memory;
pub mod proxy;

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tokio_retry::strategy::ExponentialBackoff;
use tokio_retry::RetryIf;

use crate::config::StoreConfig;
use crate::model::DataFile;

pub use error::StoreError;
pub use github::GitHubStore;
pub use memory::MemoryStore;
pub use proxy::ProxyStore;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Opaque version token. For GitHub this is the blob sha.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Revision(String);

impl Revision {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Shas are long; the first 7 characters identify them in messages
        let short: String = self.0.chars().take(7).collect();
        write!(f, "{}", short)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Loaded {
    pub document: DataFile,
    pub revision: Revision,
}

/// Where the data file lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLocation {
    pub owner: String,
    pub repo: String,
    pub branch: String,
    pub path: String,
}

impl fmt::Display for StoreLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}@{}:{}",
            self.owner, self.repo, self.branch, self.path
        )
    }
}

pub trait DocumentStore: Send + Sync {
    /// Fetch the current document and its revision.
    fn load(&self) -> impl Future<Output = Result<Loaded, StoreError>> + Send;

    /// Write `document` if the stored revision is still `previous`.
    /// Returns the new revision; a moved revision is a
    /// [`StoreError::Conflict`].
    fn save(
        &self,
        document: &DataFile,
        previous: &Revision,
        message: &str,
    ) -> impl Future<Output = Result<Revision, StoreError>> + Send;

    /// Short human-readable description for logs and status lines.
    fn describe(&self) -> String;
}

/// Store selected from configuration.
#[derive(Clone)]
pub enum Gateway {
    GitHub(GitHubStore),
    Proxy(ProxyStore),
    Memory(MemoryStore),
}

impl Gateway {
    /// Pick a backend: the proxy when `proxy_url` is set, otherwise GitHub
    /// directly, which needs a token.
    pub fn from_config(config: &StoreConfig, token: Option<String>) -> Result<Self, StoreError> {
        let location = config.location()?;

        if let Some(proxy_url) = config.proxy_url.as_deref().filter(|u| !u.trim().is_empty()) {
            return Ok(Gateway::Proxy(ProxyStore::new(proxy_url, location)?));
        }

        let token = token.filter(|t| !t.trim().is_empty()).ok_or_else(|| {
            StoreError::Config(
                "a GitHub token is required when no proxy_url is configured".to_string(),
            )
        })?;
        let api_url = config.api_url.as_deref().unwrap_or(DEFAULT_API_URL);
        Ok(Gateway::GitHub(GitHubStore::new(api_url, location, token)?))
    }

    /// Whether `from_config` will want a token. Checks the location first
    /// so a broken config is reported before anyone is asked for one.
    pub fn requires_token(config: &StoreConfig) -> Result<bool, StoreError> {
        config.location()?;
        Ok(config
            .proxy_url
            .as_deref()
            .map_or(true, |u| u.trim().is_empty()))
    }

    pub fn location(&self) -> Option<&StoreLocation> {
        match self {
            Gateway::GitHub(store) => Some(store.location()),
            Gateway::Proxy(store) => Some(store.location()),
            Gateway::Memory(_) => None,
        }
    }
}

impl DocumentStore for Gateway {
    async fn load(&self) -> Result<Loaded, StoreError> {
        match self {
            Gateway::GitHub(store) => store.load().await,
            Gateway::Proxy(store) => store.load().await,
            Gateway::Memory(store) => store.load().await,
        }
    }

    async fn save(
        &self,
        document: &DataFile,
        previous: &Revision,
        message: &str,
    ) -> Result<Revision, StoreError> {
        match self {
            Gateway::GitHub(store) => store.save(document, previous, message).await,
            Gateway::Proxy(store) => store.save(document, previous, message).await,
            Gateway::Memory(store) => store.save(document, previous, message).await,
        }
    }

    fn describe(&self) -> String {
        match self {
            Gateway::GitHub(store) => store.describe(),
            Gateway::Proxy(store) => store.describe(),
            Gateway::Memory(store) => store.describe(),
        }
    }
}

/// Load with exponential backoff on transient failures.
///
/// Saves are never retried: a save that timed out may still have landed,
/// and replaying it with the old revision would report a false conflict.
pub async fn load_with_retry<S: DocumentStore>(store: &S) -> Result<Loaded, StoreError> {
    let retry_strategy = ExponentialBackoff::from_millis(10)
        .max_delay(Duration::from_secs(2))
        .take(3);

    RetryIf::start(
        retry_strategy,
        || async {
            let result = store.load().await;
            if let Err(e) = &result {
                log::debug!("load from {} failed: {}", store.describe(), e);
            }
            result
        },
        |e: &StoreError| e.is_transient(),
    )
    .await
}
