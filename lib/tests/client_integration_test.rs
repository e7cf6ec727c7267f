//! End-to-end tests for the GitHub client against a mock API server.

use relwatch_lib::github::{GithubClient, GithubConfig};
use relwatch_lib::TrackerError;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RELEASES_BODY: &str = r#"[
    {
        "tag_name": "v0.75.0-rc.2",
        "name": "0.75.0-rc.2",
        "published_at": "2024-06-10T12:00:00Z",
        "html_url": "https://github.com/facebook/react-native/releases/tag/v0.75.0-rc.2"
    },
    {
        "tag_name": "v0.74.0",
        "name": "0.74.0",
        "published_at": "2024-04-22T10:30:00Z",
        "html_url": "https://github.com/facebook/react-native/releases/tag/v0.74.0"
    },
    {
        "tag_name": "v0.73.7",
        "name": "0.73.7",
        "published_at": "2024-04-10T09:00:00Z",
        "html_url": "https://github.com/facebook/react-native/releases/tag/v0.73.7"
    }
]"#;

const MAIN_SCOPE_BODY: &str = r#"{
    "total_count": 42,
    "incomplete_results": false,
    "items": [{
        "number": 44231,
        "title": "App crashes on startup after 0.74.0 upgrade",
        "body": "After upgrading to react-native@0.74.0 the app crashes immediately.",
        "html_url": "https://github.com/facebook/react-native/issues/44231",
        "state": "open",
        "created_at": "2024-04-25T08:00:00Z",
        "user": {"login": "octocat"},
        "labels": [{"name": "bug"}],
        "repository_url": "https://api.github.com/repos/facebook/react-native"
    }]
}"#;

const ECOSYSTEM_SCOPE_BODY: &str = r#"{
    "total_count": 7,
    "incomplete_results": false,
    "items": [{
        "number": 910,
        "title": "Broken with React Native 0.74.0",
        "body": "react native 0.74.0 does not build with this library.",
        "html_url": "https://github.com/some/library/issues/910",
        "state": "open",
        "created_at": "2024-04-26T09:00:00Z",
        "user": {"login": "someone"},
        "labels": [],
        "repository_url": "https://api.github.com/repos/some/library"
    }]
}"#;

const EMPTY_SCOPE_BODY: &str =
    r#"{"total_count": 0, "incomplete_results": false, "items": []}"#;

fn client_for(server: &MockServer) -> GithubClient {
    GithubClient::new(GithubConfig::react_native().with_api_base(server.uri()))
}

async fn mount_releases(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/repos/facebook/react-native/releases"))
        .and(query_param("per_page", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_string(RELEASES_BODY))
        .mount(server)
        .await;
}

#[tokio::test]
async fn search_uses_release_date_as_lower_bound() {
    let mock_server = MockServer::start().await;
    mount_releases(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/search/issues"))
        .and(query_param(
            "q",
            r#"repo:facebook/react-native is:issue ("0.74.0" OR "react-native@0.74.0" OR "React Native 0.74.0") created:>2024-04-22"#,
        ))
        .respond_with(ResponseTemplate::new(200).set_body_string(MAIN_SCOPE_BODY))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/search/issues"))
        .and(query_param(
            "q",
            r#"is:issue -repo:facebook/react-native ("react native 0.74.0" OR "react-native@0.74.0" OR "RN 0.74.0") created:>2024-04-22"#,
        ))
        .respond_with(ResponseTemplate::new(200).set_body_string(ECOSYSTEM_SCOPE_BODY))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client.search_issues("0.74.0", 1, 1).await.unwrap();

    assert_eq!(result.version, "0.74.0");
    assert_eq!(result.searched_after.as_deref(), Some("2024-04-22"));
    assert_eq!(result.release.unwrap().tag_name, "v0.74.0");
    assert_eq!(result.main_repo_issues.total_count, 42);
    assert_eq!(result.ecosystem_issues.total_count, 7);
    assert_eq!(result.main_repo_issues.items[0].number, 44231);
    assert_eq!(
        result.ecosystem_issues.items[0].repository(),
        "some/library"
    );
}

#[tokio::test]
async fn unknown_version_searches_without_date_filter() {
    let mock_server = MockServer::start().await;
    mount_releases(&mock_server).await;

    // Neither scope query carries a created:> bound.
    Mock::given(method("GET"))
        .and(path("/search/issues"))
        .and(query_param(
            "q",
            r#"repo:facebook/react-native is:issue ("9.9.9" OR "react-native@9.9.9" OR "React Native 9.9.9")"#,
        ))
        .respond_with(ResponseTemplate::new(200).set_body_string(EMPTY_SCOPE_BODY))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/search/issues"))
        .and(query_param(
            "q",
            r#"is:issue -repo:facebook/react-native ("react native 9.9.9" OR "react-native@9.9.9" OR "RN 9.9.9")"#,
        ))
        .respond_with(ResponseTemplate::new(200).set_body_string(EMPTY_SCOPE_BODY))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client.search_issues("9.9.9", 1, 1).await.unwrap();

    assert!(result.release.is_none());
    assert!(result.searched_after.is_none());
    assert_eq!(result.main_repo_issues.total_count, 0);
}

#[tokio::test]
async fn empty_version_is_rejected_before_any_network_call() {
    let mock_server = MockServer::start().await;
    // No mocks mounted: any request would 404 and fail the test through
    // the error below being a Status instead of MissingVersion.

    let client = client_for(&mock_server);
    let result = client.search_issues("  ", 1, 1).await;
    assert!(matches!(result.unwrap_err(), TrackerError::MissingVersion));
}

#[tokio::test]
async fn one_failing_scope_fails_the_combined_search() {
    let mock_server = MockServer::start().await;
    mount_releases(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/search/issues"))
        .respond_with(
            ResponseTemplate::new(500).set_body_string(r#"{"message": "Server Error"}"#),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client.search_issues("0.74.0", 1, 1).await;

    match result.unwrap_err() {
        TrackerError::Status { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "Server Error");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn list_versions_filters_and_sorts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/facebook/react-native/releases"))
        .respond_with(ResponseTemplate::new(200).set_body_string(RELEASES_BODY))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let versions = client.list_versions().await.unwrap();

    // The rc tag is gone and the rest are newest-first.
    assert_eq!(versions.len(), 2);
    assert_eq!(versions[0].version, "0.74.0");
    assert_eq!(versions[1].version, "0.73.7");
    assert!(versions.iter().all(|entry| !entry.tag.contains("rc")));
}

#[tokio::test]
async fn release_list_is_fetched_once_per_client() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/facebook/react-native/releases"))
        .respond_with(ResponseTemplate::new(200).set_body_string(RELEASES_BODY))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    client.list_versions().await.unwrap();
    let release = client.find_release("0.74.0").await.unwrap();
    assert_eq!(release.unwrap().tag_name, "v0.74.0");
}
