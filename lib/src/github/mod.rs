//! GitHub issue-search aggregation layer.
//!
//! Resolves a user-entered version string to a release, then searches
//! two independent scopes (the project's own repository and its wider
//! ecosystem) for issues reported after that release, through a
//! rate-limited, cached, retry-aware transport.
//!
//! ## Module Structure
//!
//! - [`types`]: Wire types, result envelopes, and the error taxonomy
//! - [`config`]: Tracked-repository and project-identity configuration
//! - [`transport`]: Rate-limited HTTP transport with quota-reset retry
//! - [`releases`]: Release cache, version resolver, version listing
//! - [`search`]: Dual-scope query building and pagination
//!
//! ## Examples
//!
//! ```rust,no_run
//! use relwatch_lib::github::{GithubClient, GithubConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GithubClient::new(GithubConfig::from_env());
//! let result = client.search_issues("0.74.0", 1, 1).await?;
//! println!(
//!     "{} main-repo issues, {} ecosystem issues",
//!     result.main_repo_issues.total_count,
//!     result.ecosystem_issues.total_count
//! );
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod releases;
pub mod search;
pub mod transport;
pub mod types;

pub use config::GithubConfig;

use releases::{ReleaseCache, find_release};
use search::{ecosystem_query, main_repo_query, search_scope};
use std::sync::Arc;
use transport::Transport;
use types::{CombinedSearchResult, Release, TrackerError, VersionEntry, search_after_date};

/// Client for the two read-only GitHub endpoints this crate consumes:
/// the release listing and the issue search.
///
/// Owns the rate-limited transport and the release cache; cheap to share
/// behind an `Arc` across callers.
pub struct GithubClient {
    config: GithubConfig,
    transport: Transport,
    releases: ReleaseCache,
}

impl GithubClient {
    /// Create a client from the given configuration.
    pub fn new(config: GithubConfig) -> Self {
        let transport = Transport::new(config.token.clone());
        Self {
            config,
            transport,
            releases: ReleaseCache::new(),
        }
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &GithubConfig {
        &self.config
    }

    /// The full release list, served from cache when fresh.
    pub async fn releases(&self) -> Result<Arc<Vec<Release>>, TrackerError> {
        self.releases
            .get_or_fetch(&self.transport, &self.config)
            .await
    }

    /// Drop the cached release list.
    pub async fn invalidate_releases(&self) {
        self.releases.invalidate().await;
    }

    /// Resolve a version string to its release, if any.
    ///
    /// A miss is `Ok(None)`; only transport and cache failures are errors.
    pub async fn find_release(&self, version: &str) -> Result<Option<Release>, TrackerError> {
        let releases = self.releases().await?;
        Ok(find_release(&releases, version).cloned())
    }

    /// Stable releases shaped for version-picker display: pre-release
    /// tags excluded, sorted by publish date descending.
    pub async fn list_versions(&self) -> Result<Vec<VersionEntry>, TrackerError> {
        let releases = self.releases().await?;
        Ok(releases::stable_versions(&releases))
    }

    /// Search both scopes for issues mentioning `version`, each at its
    /// own page, bounded to issues created after the release date when
    /// one is known.
    ///
    /// The two searches run concurrently; the transport still serializes
    /// their dispatch instants. Either scope failing fails the whole
    /// operation.
    ///
    /// ## Errors
    ///
    /// - `TrackerError::MissingVersion` - empty `version`, no network call made
    /// - any transport error from the release fetch or either search scope
    pub async fn search_issues(
        &self,
        version: &str,
        main_page: u32,
        ecosystem_page: u32,
    ) -> Result<CombinedSearchResult, TrackerError> {
        if version.trim().is_empty() {
            return Err(TrackerError::MissingVersion);
        }

        let release = self.find_release(version).await?;
        let searched_after = release
            .as_ref()
            .and_then(|release| release.published_at.as_ref())
            .map(search_after_date);

        let main_query = main_repo_query(&self.config, version, searched_after.as_deref());
        let eco_query = ecosystem_query(&self.config, version, searched_after.as_deref());

        let (main_repo_issues, ecosystem_issues) = tokio::try_join!(
            search_scope(&self.transport, &self.config, &main_query, main_page),
            search_scope(&self.transport, &self.config, &eco_query, ecosystem_page),
        )?;

        Ok(CombinedSearchResult {
            version: version.to_string(),
            release,
            main_repo_issues,
            ecosystem_issues,
            searched_after,
        })
    }
}
