//! Remote API document source.
//!
//! ### Protocol
//!
//! - **Endpoint**: `POST {api_base}/v2/get-documents`, body `{limit, offset, include_last_viewed_panel}`.
//! - **Authentication**: `Authorization: Bearer <token>`; the token is supplied at construction.
//! - **Identification**: `User-Agent` and `X-Client-Version` on every request.
//! - **Pagination**: pages are fetched in offset order until a short or empty page
//!   (or the declared `total` is reached).
//! - **Caching**: each page body is cached by its request shape; fresh entries skip the network.
//! - **Retries**: up to `max_attempts` per page on timeouts, network errors, 5xx and 429
//!   (honoring `Retry-After`); 401/403 and unsupported-client responses fail immediately.

pub mod request;
pub mod response;

pub use request::DocumentsRequest;
pub use response::{RawPage, decode_body};

use std::time::Duration;

use async_trait::async_trait;
use minutes_core::{
    AppConfig, CacheStore, DocumentSet, DocumentSource, Error, FetchWarnings, PageKey, SetOrder, SourceKind,
    SourceStatus,
};
use reqwest::{StatusCode, header};

/// Default base URL for the remote API.
const DEFAULT_BASE_URL: &str = "https://api.granola.ai";

/// Client identification header checked by the backend.
pub const CLIENT_VERSION_HEADER: &str = "X-Client-Version";

/// Longest server-requested delay we are willing to honor.
const MAX_RETRY_AFTER: Duration = Duration::from_secs(60);

/// Remote source configuration.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Bearer token from the credential supplier.
    pub token: String,
    /// Base URL (default: https://api.granola.ai).
    pub base_url: String,
    /// Per-attempt request timeout (default: 15s).
    pub timeout: Duration,
    pub user_agent: String,
    pub client_version: String,
    /// Documents per page (default: 100).
    pub page_size: u32,
    /// Attempts per page, first try included (default: 3).
    pub max_attempts: u32,
    /// First backoff delay; doubles on each retry (default: 1s).
    pub backoff_base: Duration,
    pub include_last_viewed_panel: bool,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(15),
            user_agent: "Granola/5.354.0".to_string(),
            client_version: "5.354.0".to_string(),
            page_size: 100,
            max_attempts: 3,
            backoff_base: Duration::from_secs(1),
            include_last_viewed_panel: true,
        }
    }
}

impl RemoteConfig {
    /// Derive the remote settings from application configuration.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, Error> {
        Ok(Self {
            token: config.require_api_token()?.to_string(),
            base_url: config.api_base.clone(),
            timeout: config.timeout(),
            user_agent: config.user_agent.clone(),
            client_version: config.client_version.clone(),
            page_size: config.page_size,
            max_attempts: config.max_attempts,
            backoff_base: config.backoff_base(),
            include_last_viewed_panel: config.include_last_viewed_panel,
        })
    }
}

/// One failed attempt, with any server-requested delay.
#[derive(Debug)]
struct AttemptError {
    error: Error,
    retry_after: Option<Duration>,
}

impl From<Error> for AttemptError {
    fn from(error: Error) -> Self {
        Self { error, retry_after: None }
    }
}

/// Paginated, cached, retrying source over the remote API.
#[derive(Debug, Clone)]
pub struct RemoteApiSource {
    http: reqwest::Client,
    endpoint: String,
    config: RemoteConfig,
    cache: CacheStore,
}

impl RemoteApiSource {
    /// Create a source; fails on a missing token or unusable base URL.
    pub fn new(config: RemoteConfig, cache: CacheStore) -> Result<Self, Error> {
        if config.token.trim().is_empty() {
            return Err(Error::Config("missing API token".into()));
        }
        if config.page_size == 0 || config.max_attempts == 0 {
            return Err(Error::Config("page_size and max_attempts must be at least 1".into()));
        }

        let base = url::Url::parse(&config.base_url)
            .map_err(|e| Error::Config(format!("invalid api base {:?}: {e}", config.base_url)))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(Error::Config(format!("invalid api base {:?}: unsupported scheme", config.base_url)));
        }
        let endpoint = format!("{}/v2/get-documents", config.base_url.trim_end_matches('/'));

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .use_rustls_tls()
            .gzip(true)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, endpoint, config, cache })
    }

    /// Create a source from application configuration, opening its cache directory.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, Error> {
        let cache = CacheStore::open(&config.cache_dir, config.cache_ttl())?;
        Self::new(RemoteConfig::from_app_config(config)?, cache)
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    fn page_key(&self, offset: u32) -> PageKey {
        PageKey { limit: self.config.page_size, offset, include_last_viewed_panel: self.config.include_last_viewed_panel }
    }

    /// Load one page: fresh cache entry unless `force`, otherwise the network.
    async fn load_page(&self, key: &PageKey, force: bool, warnings: &mut FetchWarnings) -> Result<RawPage, Error> {
        let cache_key = key.key();

        if !force && let Some(bytes) = self.cache.get(&cache_key).await {
            match RawPage::parse(&bytes) {
                Ok(page) => {
                    tracing::debug!(offset = key.offset, "cache hit for documents page");
                    warnings.pages_from_cache += 1;
                    return Ok(page);
                }
                Err(e) => tracing::warn!(offset = key.offset, error = %e, "cached page unreadable; refetching"),
            }
        }

        let body = self.fetch_page(key).await?;
        let page = RawPage::parse(&body)?;
        warnings.pages_fetched += 1;

        if let Err(e) = self.cache.put(&cache_key, &body).await {
            tracing::warn!(offset = key.offset, error = %e, "failed to cache documents page");
            warnings.cache_write_failures += 1;
        }

        Ok(page)
    }

    /// Fetch one page with bounded retries; returns the decompressed body.
    async fn fetch_page(&self, key: &PageKey) -> Result<Vec<u8>, Error> {
        let mut attempt = 1;
        loop {
            match self.attempt(key).await {
                Ok(body) => return Ok(body),
                Err(failed) if failed.error.is_transient() && attempt < self.config.max_attempts => {
                    let delay = failed.retry_after.unwrap_or_else(|| self.backoff(attempt));
                    tracing::warn!(
                        offset = key.offset,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %failed.error,
                        "documents page fetch failed; retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(failed) => {
                    tracing::debug!(offset = key.offset, attempt, error = %failed.error, "giving up on documents page");
                    return Err(failed.error);
                }
            }
        }
    }

    fn backoff(&self, attempt: u32) -> Duration {
        self.config.backoff_base.saturating_mul(1 << (attempt - 1).min(16))
    }

    async fn attempt(&self, key: &PageKey) -> Result<Vec<u8>, AttemptError> {
        tracing::debug!(offset = key.offset, limit = key.limit, "requesting documents page");

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.config.token)
            .header(header::ACCEPT, "*/*")
            .header(header::USER_AGENT, &self.config.user_agent)
            .header(CLIENT_VERSION_HEADER, &self.config.client_version)
            .json(&DocumentsRequest::from(key))
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        let retry_after = retry_after(response.headers());
        let body = response.bytes().await.map_err(classify_transport)?;

        if status.is_success() {
            return Ok(decode_body(&body)?);
        }

        let error = classify_status(status, &String::from_utf8_lossy(&body));
        Err(AttemptError { error, retry_after: if status == StatusCode::TOO_MANY_REQUESTS { retry_after } else { None } })
    }
}

fn classify_transport(err: reqwest::Error) -> AttemptError {
    let error = if err.is_timeout() { Error::Timeout(err.to_string()) } else { Error::Network(err.to_string()) };
    AttemptError { error, retry_after: None }
}

fn classify_status(status: StatusCode, body: &str) -> Error {
    let code = status.as_u16();

    if matches!(code, 400 | 403 | 426) && body.to_lowercase().contains("unsupported client") {
        return Error::UnsupportedClient(format!(
            "backend rejected client identification (status {code}); check user_agent and client_version"
        ));
    }

    match code {
        401 => Error::Auth("invalid or expired token; reauthenticate and restart".into()),
        403 => Error::Auth("access forbidden; check token permissions".into()),
        429 => Error::RateLimited("too many requests".into()),
        _ => {
            let message: String = body.trim().chars().take(200).collect();
            Error::Http { status: code, message }
        }
    }
}

/// `Retry-After` in whole seconds, capped.
fn retry_after(headers: &header::HeaderMap) -> Option<Duration> {
    headers
        .get(header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(|secs| Duration::from_secs(secs).min(MAX_RETRY_AFTER))
}

#[async_trait]
impl DocumentSource for RemoteApiSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Remote
    }

    /// Walk pages from offset 0, concatenating in offset order.
    async fn fetch_all(&self, force: bool) -> Result<DocumentSet, Error> {
        let page_size = self.config.page_size;
        let mut warnings = FetchWarnings::default();
        let mut documents = Vec::new();
        let mut offset = 0u32;

        loop {
            let key = self.page_key(offset);
            let page = self.load_page(&key, force, &mut warnings).await?;
            let count = page.docs.len();
            page.normalize_into(&mut documents, &mut warnings);

            if count < page_size as usize {
                break;
            }
            if let Some(total) = page.total
                && u64::from(offset) + count as u64 >= total
            {
                break;
            }
            offset = offset
                .checked_add(page_size)
                .ok_or_else(|| Error::Internal("page offset overflow".into()))?;
        }

        tracing::debug!(
            documents = documents.len(),
            pages_fetched = warnings.pages_fetched,
            pages_from_cache = warnings.pages_from_cache,
            "remote document set loaded"
        );

        Ok(DocumentSet::from_documents(documents, SetOrder::NewestFirst, warnings))
    }

    async fn status(&self) -> Result<SourceStatus, Error> {
        let stats = self.cache.stat().await?;
        Ok(SourceStatus {
            source: SourceKind::Remote.as_str().into(),
            path: stats.path,
            size_bytes: stats.total_size_bytes,
            entry_count: stats.entry_count,
            newest_fetched_at: stats.newest_fetched_at,
            ttl_secs: u64::try_from(self.cache.ttl().num_seconds()).ok(),
        })
    }
}
