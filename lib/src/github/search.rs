//! Dual-scope issue search: the project's own repository and its wider
//! ecosystem of dependent repositories, queried concurrently and merged
//! into one combined envelope.

use super::config::GithubConfig;
use super::transport::Transport;
use super::types::{IssueSearchResults, TrackerError};
use reqwest::Url;
use tracing::debug;

/// Issues requested per search page.
const SEARCH_PAGE_SIZE: u32 = 20;

/// Build the query for issues inside the project's own repository.
///
/// Matches the bare version, the `{package}@{version}` form, or the
/// `{Display Name} {version}` form, optionally bounded to issues created
/// after the release date.
pub(crate) fn main_repo_query(
    config: &GithubConfig,
    version: &str,
    after_date: Option<&str>,
) -> String {
    let mut query = format!(
        r#"repo:{}/{} is:issue ("{version}" OR "{}@{version}" OR "{} {version}")"#,
        config.owner, config.repo, config.identity.package_name, config.identity.display_name,
    );
    if let Some(date) = after_date {
        query.push_str(&format!(" created:>{date}"));
    }
    query
}

/// Build the query for issues outside the project's own repository.
///
/// Ecosystem mentions are informal, so this matches the lowercase
/// spaced name, the `{package}@{version}` form, or the short alias.
pub(crate) fn ecosystem_query(
    config: &GithubConfig,
    version: &str,
    after_date: Option<&str>,
) -> String {
    let mut query = format!(
        r#"is:issue -repo:{}/{} ("{} {version}" OR "{}@{version}" OR "{} {version}")"#,
        config.owner,
        config.repo,
        config.identity.display_name.to_lowercase(),
        config.identity.package_name,
        config.identity.short_alias,
    );
    if let Some(date) = after_date {
        query.push_str(&format!(" created:>{date}"));
    }
    query
}

/// Run one scope's search at the given page, newest first.
pub(crate) async fn search_scope(
    transport: &Transport,
    config: &GithubConfig,
    query: &str,
    page: u32,
) -> Result<IssueSearchResults, TrackerError> {
    let url = Url::parse_with_params(
        &format!("{}/search/issues", config.api_base),
        &[
            ("q", query),
            ("sort", "created"),
            ("order", "desc"),
            ("page", &page.max(1).to_string()),
            ("per_page", &SEARCH_PAGE_SIZE.to_string()),
        ],
    )
    .map_err(|e| TrackerError::UrlParse(e.to_string()))?;

    debug!(%query, page, "searching issues");
    let response = transport.send(url).await?;
    Ok(response.json::<IssueSearchResults>().await?)
}
