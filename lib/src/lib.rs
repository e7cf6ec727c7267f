//! Relwatch Library - Post-release issue tracking for a GitHub project
//!
//! Given a published version of a tracked project, this library finds
//! issues reported after that version's release, both in the project's
//! own repository and across its wider ecosystem of dependent
//! repositories, and extracts highlighted excerpts showing why each
//! issue matched.
//!
//! ## Architecture
//!
//! - [`github`]: the aggregation core - a rate-limited transport with
//!   quota-reset retry, a single-flight release cache, the version
//!   resolver, and the dual-scope search orchestrator.
//! - [`highlight`]: pure fragment extraction around the best fuzzy
//!   match of the searched version in an issue body.
//! - [`display`]: date rendering helpers for callers.
//!
//! ## Examples
//!
//! ```rust,no_run
//! use relwatch_lib::github::{GithubClient, GithubConfig};
//! use relwatch_lib::highlight::{DEFAULT_FRAGMENT_LENGTH, highlight_fragment};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GithubClient::new(GithubConfig::from_env());
//!
//! for entry in client.list_versions().await? {
//!     println!("{}", entry.version);
//! }
//!
//! let result = client.search_issues("0.74.0", 1, 1).await?;
//! for issue in &result.main_repo_issues.items {
//!     if let Some(body) = &issue.body {
//!         let excerpt = highlight_fragment(
//!             &client.config().identity,
//!             body,
//!             &result.version,
//!             DEFAULT_FRAGMENT_LENGTH,
//!         );
//!         println!("#{}: {}", issue.number, excerpt.fragment);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod display;
pub mod github;
pub mod highlight;

pub use github::config::GithubConfig;
pub use github::types::{
    CombinedSearchResult, Issue, IssueSearchResults, Release, TrackerError, VersionEntry,
};
pub use github::GithubClient;
pub use highlight::{DEFAULT_FRAGMENT_LENGTH, HighlightedFragment, MatchSpan, highlight_fragment};
