//! Client configuration: tracked repository, project identity, credentials.

use super::types::ProjectIdentity;

/// Default GitHub REST API base.
pub const GITHUB_API_BASE: &str = "https://api.github.com";

/// Configuration for a [`GithubClient`](super::GithubClient).
///
/// Identifies the tracked repository, the names under which the project
/// appears in issue text, and an optional bearer token. The API base is
/// overridable so tests can point the client at a mock server.
#[derive(Debug, Clone)]
pub struct GithubConfig {
    /// Repository owner (e.g., "facebook")
    pub owner: String,
    /// Repository name (e.g., "react-native")
    pub repo: String,
    /// Names the project goes by in issue text
    pub identity: ProjectIdentity,
    /// API base URL, without a trailing slash
    pub api_base: String,
    /// Bearer token; absence just means the lower anonymous rate limit
    pub token: Option<String>,
}

impl GithubConfig {
    /// Configuration for tracking React Native releases.
    pub fn react_native() -> Self {
        Self {
            owner: "facebook".to_string(),
            repo: "react-native".to_string(),
            identity: ProjectIdentity {
                display_name: "React Native".to_string(),
                package_name: "react-native".to_string(),
                short_alias: "RN".to_string(),
            },
            api_base: GITHUB_API_BASE.to_string(),
            token: None,
        }
    }

    /// React Native configuration with the token taken from `GITHUB_TOKEN`.
    ///
    /// Loads a `.env` file first if one is present. A missing or empty
    /// token is not an error.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let mut config = Self::react_native();
        config.token = std::env::var("GITHUB_TOKEN")
            .ok()
            .filter(|token| !token.is_empty());
        config
    }

    /// Override the API base URL (used by tests to target a mock server).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Set the bearer token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// `owner/repo` slug of the tracked repository.
    pub fn repo_slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_react_native_defaults() {
        let config = GithubConfig::react_native();
        assert_eq!(config.repo_slug(), "facebook/react-native");
        assert_eq!(config.identity.short_alias, "RN");
        assert_eq!(config.api_base, GITHUB_API_BASE);
        assert!(config.token.is_none());
    }

    #[test]
    fn test_builder_overrides() {
        let config = GithubConfig::react_native()
            .with_api_base("http://127.0.0.1:9999")
            .with_token("ghp_test");
        assert_eq!(config.api_base, "http://127.0.0.1:9999");
        assert_eq!(config.token.as_deref(), Some("ghp_test"));
    }
}
