//! Release list fetching, caching, and version resolution.
//!
//! The release list is fetched once per TTL window and shared between
//! concurrent callers through a single-flight slot: the first caller on a
//! cache miss creates and stores a shared future, later callers attach to
//! it, and the slot is cleared on every exit path.

use super::config::GithubConfig;
use super::transport::Transport;
use super::types::{Release, TrackerError, VersionEntry};
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use reqwest::Url;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// How long a fetched release list stays fresh.
const CACHE_TTL: Duration = Duration::from_secs(60 * 60);

/// Releases requested per fetch (GitHub caps a page at 100).
const RELEASE_PAGE_SIZE: u32 = 100;

/// Tag substrings that mark a release as a pre-release.
const PRERELEASE_MARKERS: [&str; 5] = ["rc", "alpha", "beta", "canary", "next"];

type SharedFetch = Shared<BoxFuture<'static, Result<Arc<Vec<Release>>, Arc<TrackerError>>>>;

#[derive(Default)]
struct CacheState {
    /// Cached list and the instant it was captured
    cached: Option<(Arc<Vec<Release>>, Instant)>,
    /// In-flight fetch shared by all concurrent cache-miss callers
    in_flight: Option<SharedFetch>,
}

/// Memoizes the project's release list with in-flight de-duplication.
pub(crate) struct ReleaseCache {
    state: Mutex<CacheState>,
}

impl ReleaseCache {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(CacheState::default()),
        }
    }

    /// Return the cached release list, or fetch it through the transport.
    ///
    /// Concurrent callers during a cache miss all await the same upstream
    /// fetch; exactly one transport call is dispatched per miss window.
    pub(crate) async fn get_or_fetch(
        &self,
        transport: &Transport,
        config: &GithubConfig,
    ) -> Result<Arc<Vec<Release>>, TrackerError> {
        let fetch = {
            let mut state = self.state.lock().await;

            if let Some((releases, captured_at)) = &state.cached
                && captured_at.elapsed() < CACHE_TTL
            {
                debug!("using cached release list");
                return Ok(Arc::clone(releases));
            }

            if let Some(pending) = &state.in_flight {
                debug!("joining in-flight release fetch");
                pending.clone()
            } else {
                let url = releases_url(config)?;
                let transport = transport.clone();
                let fetch: SharedFetch = async move {
                    fetch_releases(&transport, url)
                        .await
                        .map(Arc::new)
                        .map_err(Arc::new)
                }
                .boxed()
                .shared();
                state.in_flight = Some(fetch.clone());
                fetch
            }
        };

        let result = fetch.clone().await;

        // The slot must be cleared on success and failure alike, or every
        // later caller would attach to a finished future forever. Only the
        // first waiter to wake settles the slot; a later waiter may find a
        // newer fetch already stored there and must leave it flying.
        let mut state = self.state.lock().await;
        if state
            .in_flight
            .as_ref()
            .is_some_and(|pending| pending.ptr_eq(&fetch))
        {
            state.in_flight = None;
            if let Ok(releases) = &result {
                state.cached = Some((Arc::clone(releases), Instant::now()));
            }
        }
        match result {
            Ok(releases) => Ok(releases),
            Err(error) => Err(TrackerError::Shared(error)),
        }
    }

    /// Drop the cached list so the next caller fetches fresh data.
    pub(crate) async fn invalidate(&self) {
        let mut state = self.state.lock().await;
        state.cached = None;
    }
}

fn releases_url(config: &GithubConfig) -> Result<Url, TrackerError> {
    Url::parse_with_params(
        &format!(
            "{}/repos/{}/{}/releases",
            config.api_base, config.owner, config.repo
        ),
        &[("per_page", RELEASE_PAGE_SIZE.to_string())],
    )
    .map_err(|e| TrackerError::UrlParse(e.to_string()))
}

async fn fetch_releases(transport: &Transport, url: Url) -> Result<Vec<Release>, TrackerError> {
    info!(%url, "fetching release list");
    let response = transport.send(url).await?;
    Ok(response.json::<Vec<Release>>().await?)
}

/// Resolve a user-supplied version string against the release list.
///
/// Tries an exact match first (tag or name equal to `version` or
/// `v{version}`), then falls back to a substring match. The list is
/// scanned in its natural newest-first order, so the newest candidate
/// wins a partial match. A miss is a `None`, never an error.
///
/// ## Examples
///
/// ```
/// use relwatch_lib::github::releases::find_release;
/// use relwatch_lib::github::types::Release;
///
/// let releases = vec![Release {
///     tag_name: "v0.74.0".to_string(),
///     name: Some("0.74.0".to_string()),
///     published_at: None,
///     html_url: String::new(),
/// }];
///
/// assert!(find_release(&releases, "0.74.0").is_some());
/// assert!(find_release(&releases, "9.9.9").is_none());
/// ```
pub fn find_release<'a>(releases: &'a [Release], version: &str) -> Option<&'a Release> {
    let tagged = format!("v{version}");

    let exact = releases.iter().find(|release| {
        release.tag_name == version
            || release.tag_name == tagged
            || release.name.as_deref() == Some(version)
            || release.name.as_deref() == Some(tagged.as_str())
    });

    exact.or_else(|| {
        releases.iter().find(|release| {
            release.tag_name.contains(version)
                || release
                    .name
                    .as_deref()
                    .is_some_and(|name| name.contains(version))
        })
    })
}

/// Whether a tag names a pre-release build (rc, alpha, beta, canary, next).
fn is_prerelease_tag(tag: &str) -> bool {
    let tag = tag.to_lowercase();
    PRERELEASE_MARKERS.iter().any(|marker| tag.contains(marker))
}

/// Shape the release list for version-picker display.
///
/// Pre-release tags are excluded, the `v` prefix is stripped into the
/// `version` field, and entries are sorted by publish date descending
/// (undated releases sort last).
pub fn stable_versions(releases: &[Release]) -> Vec<VersionEntry> {
    let mut entries: Vec<VersionEntry> = releases
        .iter()
        .filter(|release| !is_prerelease_tag(&release.tag_name))
        .map(|release| VersionEntry {
            tag: release.tag_name.clone(),
            name: release.name.clone(),
            version: release
                .tag_name
                .strip_prefix('v')
                .unwrap_or(&release.tag_name)
                .to_string(),
            published_at: release.published_at,
        })
        .collect();
    entries.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    entries
}
