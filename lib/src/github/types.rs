//! Core types for the GitHub issue-search aggregation layer.
//!
//! This module defines the wire types consumed from the GitHub REST API
//! (releases and issue-search responses), the combined result envelope
//! returned to callers, and the error taxonomy shared across the crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Error types for tracker operations.
#[derive(Error, Debug)]
pub enum TrackerError {
    /// HTTP request failed at the transport level
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Failed to build a request URL
    #[error("Failed to parse URL: {0}")]
    UrlParse(String),

    /// GitHub returned a non-success status
    #[error("GitHub API error ({status}): {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Status text or error message body
        message: String,
    },

    /// GitHub API rate limit exceeded and the reset is too far away to wait
    #[error("GitHub API rate limit exceeded{}", reset_hint(.reset_in))]
    RateLimited {
        /// Time until the quota resets, when the API reported it
        reset_in: Option<Duration>,
    },

    /// A required `version` argument was missing or empty
    #[error("Parameter 'version' is required")]
    MissingVersion,

    /// Failure re-raised from a shared in-flight release fetch
    #[error(transparent)]
    Shared(Arc<TrackerError>),
}

fn reset_hint(reset_in: &Option<Duration>) -> String {
    match reset_in {
        Some(wait) => format!(" (resets in {}s)", wait.as_secs()),
        None => String::new(),
    }
}

/// A published release of the tracked project.
///
/// Immutable once fetched; held only inside the release cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Release {
    /// Tag name (e.g., "v0.74.0")
    pub tag_name: String,
    /// Release display name
    pub name: Option<String>,
    /// Published timestamp
    pub published_at: Option<DateTime<Utc>>,
    /// Canonical web URL
    pub html_url: String,
}

/// Author of an issue, as reported by the search API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueAuthor {
    /// GitHub login
    pub login: String,
}

/// A label attached to an issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueLabel {
    /// Label name
    pub name: String,
}

/// An issue returned by the GitHub search API. Consumed read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    /// Issue number within its repository
    pub number: u64,
    /// Issue title
    pub title: String,
    /// Issue body (markdown), absent for some issues
    pub body: Option<String>,
    /// Web URL
    pub html_url: String,
    /// Open/closed state
    pub state: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Issue author, absent for deleted accounts
    pub user: Option<IssueAuthor>,
    /// Labels attached to the issue
    #[serde(default)]
    pub labels: Vec<IssueLabel>,
    /// API URL of the owning repository
    pub repository_url: String,
}

impl Issue {
    /// Extract the `owner/repo` name from the issue's repository API URL.
    ///
    /// ## Examples
    ///
    /// ```
    /// use relwatch_lib::github::types::Issue;
    ///
    /// let name = Issue::repository_name("https://api.github.com/repos/facebook/react-native");
    /// assert_eq!(name, "facebook/react-native");
    /// ```
    pub fn repository_name(repository_url: &str) -> String {
        let mut segments = repository_url
            .split('/')
            .skip_while(|segment| *segment != "repos")
            .skip(1);
        match (segments.next(), segments.next()) {
            (Some(owner), Some(repo)) if !owner.is_empty() && !repo.is_empty() => {
                format!("{owner}/{repo}")
            }
            _ => "Unknown".to_string(),
        }
    }

    /// The `owner/repo` name of the repository this issue belongs to.
    pub fn repository(&self) -> String {
        Self::repository_name(&self.repository_url)
    }
}

/// One page of issue-search results, with the total match count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueSearchResults {
    /// Total number of matches across all pages
    pub total_count: u64,
    /// Whether GitHub truncated the search
    #[serde(default)]
    pub incomplete_results: bool,
    /// The requested page of matching issues
    pub items: Vec<Issue>,
}

/// Combined envelope for the two search scopes. Constructed fresh per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinedSearchResult {
    /// The version string the caller searched for
    pub version: String,
    /// The resolved release, when one matched the version
    pub release: Option<Release>,
    /// Issues from the project's own repository
    pub main_repo_issues: IssueSearchResults,
    /// Issues from the wider ecosystem of dependent repositories
    pub ecosystem_issues: IssueSearchResults,
    /// The `created:>` lower bound used, when a release date was known
    pub searched_after: Option<String>,
}

/// A release shaped for version-picker display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionEntry {
    /// Original tag name
    pub tag: String,
    /// Release display name
    pub name: Option<String>,
    /// Tag with any leading `v` stripped
    pub version: String,
    /// Published timestamp
    pub published_at: Option<DateTime<Utc>>,
}

/// Names under which the tracked project appears in issue text.
///
/// Drives both the search query templates and the highlighter's pattern
/// variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectIdentity {
    /// Human-readable name (e.g., "React Native")
    pub display_name: String,
    /// Package/registry name (e.g., "react-native")
    pub package_name: String,
    /// Short alias used in informal mentions (e.g., "RN")
    pub short_alias: String,
}

/// Format a release date as the `YYYY-MM-DD` lower bound for issue search.
///
/// Issues created after this calendar day are included in search results.
///
/// ## Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use relwatch_lib::github::types::search_after_date;
///
/// let published = Utc.with_ymd_and_hms(2024, 4, 22, 10, 30, 0).unwrap();
/// assert_eq!(search_after_date(&published), "2024-04-22");
/// ```
pub fn search_after_date(published_at: &DateTime<Utc>) -> String {
    published_at.format("%Y-%m-%d").to_string()
}
