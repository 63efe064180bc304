//! Document sources for granola-mcp.
//!
//! This crate provides the two concrete [`DocumentSource`] backends: the
//! paginated remote API (with page cache, retries and gzip sniffing) and the
//! desktop application's local cache file. [`build_source`] picks one at
//! startup from configuration.

pub mod local;
pub mod remote;

use std::sync::Arc;

use minutes_core::{AppConfig, DocumentSource, Error, SourceKind};

pub use local::LocalFileSource;
pub use remote::{RemoteApiSource, RemoteConfig};

/// Construct the configured source.
///
/// # Errors
///
/// Returns `Error::Config` when the remote source is selected without a token,
/// with an unusable base URL, or with a cache directory that cannot be created.
pub fn build_source(config: &AppConfig) -> Result<Arc<dyn DocumentSource>, Error> {
    let source: Arc<dyn DocumentSource> = match config.source {
        SourceKind::Local => Arc::new(LocalFileSource::from_app_config(config)),
        SourceKind::Remote => Arc::new(RemoteApiSource::from_app_config(config)?),
    };

    tracing::info!(source = config.source.as_str(), "document source selected");
    Ok(source)
}
