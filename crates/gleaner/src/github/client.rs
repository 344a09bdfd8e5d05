//! GitHub REST API client.
//!
//! A thin wrapper over `reqwest`: one authenticated GET per operation,
//! uniform error translation, and no retries. Rate-limit reaction and
//! per-item failure handling are the caller's job; the one deliberate
//! exception is the languages lookup, which degrades to an empty list
//! because language tags are auxiliary data.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::de::DeserializeOwned;

use super::error::GitHubError;
use super::types::{IssuePayload, IssueSearchResults, RepositoryPayload};

/// Base URL of the GitHub REST API.
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// User-Agent sent with every request; GitHub rejects requests without one.
pub const GITHUB_USER_AGENT: &str = "gleaner";

/// Media type for the REST API v3.
const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

/// Deadline for any single API call so a hung request cannot stall a run.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum page size the search API accepts.
pub const MAX_PER_PAGE: u8 = 100;

/// Operations the sync engine needs from GitHub.
///
/// `GitHubClient` is the production implementation; tests substitute a
/// scripted one.
#[async_trait]
pub trait GitHubApi: Send + Sync {
    /// Search issues, sorted by update time descending.
    async fn search_issues(
        &self,
        query: &str,
        page: u32,
        per_page: u8,
    ) -> Result<IssueSearchResults, GitHubError>;

    /// Fetch a repository by its API URL (as carried in search results).
    async fn fetch_repository(
        &self,
        repo_url: &str,
    ) -> Result<Option<RepositoryPayload>, GitHubError>;

    /// Fetch a repository by its `owner/name` path.
    async fn fetch_repository_by_full_name(
        &self,
        full_name: &str,
    ) -> Result<Option<RepositoryPayload>, GitHubError>;

    /// Fetch a single issue.
    async fn fetch_issue(
        &self,
        full_name: &str,
        number: i32,
    ) -> Result<Option<IssuePayload>, GitHubError>;

    /// Fetch the repository's language names, sorted and deduplicated.
    ///
    /// Never fails: language data is non-essential, so any error is logged
    /// and an empty list returned.
    async fn fetch_repo_languages(&self, full_name: &str) -> Vec<String>;
}

/// GitHub API client.
#[derive(Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    /// Bearer token; unauthenticated requests work but hit much lower
    /// rate limits.
    token: Option<Arc<String>>,
    base_url: Arc<String>,
}

impl GitHubClient {
    /// Create a client against the public GitHub API.
    pub fn new(token: Option<&str>) -> Result<Self, GitHubError> {
        Self::with_base_url(token, GITHUB_API_URL)
    }

    /// Create a client against a custom base URL (GitHub Enterprise, tests).
    pub fn with_base_url(token: Option<&str>, base_url: &str) -> Result<Self, GitHubError> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| GitHubError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            token: token.map(|t| Arc::new(t.to_string())),
            base_url: Arc::new(base_url.trim_end_matches('/').to_string()),
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Issue an authenticated GET and parse the JSON response.
    ///
    /// Returns `Ok(None)` for 204 No Content; any other non-success status
    /// becomes a `GitHubError::Status` carrying the response body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>, GitHubError> {
        let mut request = self
            .http
            .get(url)
            .header(ACCEPT, GITHUB_ACCEPT)
            .header(USER_AGENT, GITHUB_USER_AGENT);

        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request
            .send()
            .await
            .map_err(|e| GitHubError::Network(e.to_string()))?;

        let status = response.status();

        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GitHubError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map(Some)
            .map_err(|e| GitHubError::Decode(e.to_string()))
    }
}

#[async_trait]
impl GitHubApi for GitHubClient {
    async fn search_issues(
        &self,
        query: &str,
        page: u32,
        per_page: u8,
    ) -> Result<IssueSearchResults, GitHubError> {
        let url = self.api_url("/search/issues");
        let params = [
            ("q", query.to_string()),
            ("sort", "updated".to_string()),
            ("order", "desc".to_string()),
            ("per_page", per_page.min(MAX_PER_PAGE).to_string()),
            ("page", page.to_string()),
        ];

        self.get_json::<IssueSearchResults>(&url, &params)
            .await?
            .ok_or_else(|| {
                GitHubError::Internal("search returned an empty response".to_string())
            })
    }

    async fn fetch_repository(
        &self,
        repo_url: &str,
    ) -> Result<Option<RepositoryPayload>, GitHubError> {
        self.get_json(repo_url, &[]).await
    }

    async fn fetch_repository_by_full_name(
        &self,
        full_name: &str,
    ) -> Result<Option<RepositoryPayload>, GitHubError> {
        let url = self.api_url(&format!("/repos/{}", full_name));
        self.get_json(&url, &[]).await
    }

    async fn fetch_issue(
        &self,
        full_name: &str,
        number: i32,
    ) -> Result<Option<IssuePayload>, GitHubError> {
        let url = self.api_url(&format!("/repos/{}/issues/{}", full_name, number));
        self.get_json(&url, &[]).await
    }

    async fn fetch_repo_languages(&self, full_name: &str) -> Vec<String> {
        let url = self.api_url(&format!("/repos/{}/languages", full_name));

        // The endpoint returns a map of language name to byte count; only
        // the names are persisted. BTreeMap keys come out sorted and unique.
        match self.get_json::<BTreeMap<String, u64>>(&url, &[]).await {
            Ok(Some(languages)) => languages.into_keys().collect(),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(repo = %full_name, error = %e, "Language fetch failed");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn search_body() -> String {
        serde_json::json!({
            "total_count": 1,
            "incomplete_results": false,
            "items": [{
                "id": 99,
                "number": 7,
                "title": "Improve docs",
                "html_url": "https://github.com/octocat/hello-world/issues/7",
                "repository_url": "https://api.github.com/repos/octocat/hello-world",
                "state": "open",
                "comments": 0,
                "labels": [{"name": "good first issue", "color": "7057ff"}]
            }]
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_search_issues_parses_response() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/search/issues")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "label:\"good first issue\" state:open".into()),
                Matcher::UrlEncoded("per_page".into(), "100".into()),
                Matcher::UrlEncoded("page".into(), "1".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(search_body())
            .create_async()
            .await;

        let client = GitHubClient::with_base_url(None, &server.url()).unwrap();
        let results = client
            .search_issues("label:\"good first issue\" state:open", 1, 100)
            .await
            .expect("search should succeed");

        mock.assert_async().await;
        assert_eq!(results.total_count, 1);
        assert_eq!(results.items[0].id, 99);
    }

    #[tokio::test]
    async fn test_auth_and_user_agent_headers() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/repos/octocat/hello-world")
            .match_header("authorization", "Bearer t0k3n")
            .match_header("user-agent", GITHUB_USER_AGENT)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": 1, "full_name": "octocat/hello-world", "stargazers_count": 7}"#)
            .create_async()
            .await;

        let client = GitHubClient::with_base_url(Some("t0k3n"), &server.url()).unwrap();
        let repo = client
            .fetch_repository_by_full_name("octocat/hello-world")
            .await
            .expect("fetch should succeed")
            .expect("repository should be present");

        mock.assert_async().await;
        assert_eq!(repo.id, 1);
        assert_eq!(repo.stargazers_count, 7);
    }

    #[tokio::test]
    async fn test_error_carries_status_and_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/repos/gone/gone/issues/1")
            .with_status(404)
            .with_body("Not Found")
            .create_async()
            .await;

        let client = GitHubClient::with_base_url(None, &server.url()).unwrap();
        let err = client
            .fetch_issue("gone/gone", 1)
            .await
            .expect_err("404 should error");

        match err {
            GitHubError::Status { status, ref body } => {
                assert_eq!(status, 404);
                assert_eq!(body, "Not Found");
            }
            other => panic!("expected status error, got {other:?}"),
        }
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_no_content_returns_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/repos/octocat/empty")
            .with_status(204)
            .create_async()
            .await;

        let client = GitHubClient::with_base_url(None, &server.url()).unwrap();
        let repo = client
            .fetch_repository_by_full_name("octocat/empty")
            .await
            .expect("204 should not error");
        assert!(repo.is_none());
    }

    #[tokio::test]
    async fn test_fetch_repository_follows_absolute_url() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/repos/octocat/hello-world")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": 5, "full_name": "octocat/hello-world"}"#)
            .create_async()
            .await;

        let client = GitHubClient::with_base_url(None, &server.url()).unwrap();
        let url = format!("{}/repos/octocat/hello-world", server.url());
        let repo = client
            .fetch_repository(&url)
            .await
            .expect("fetch should succeed")
            .expect("repository should be present");
        assert_eq!(repo.id, 5);
    }

    #[tokio::test]
    async fn test_languages_sorted_and_failure_degrades_to_empty() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/repos/octocat/hello-world/languages")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"Shell": 120, "Rust": 99000, "C": 50}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/repos/octocat/broken/languages")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let client = GitHubClient::with_base_url(None, &server.url()).unwrap();

        let languages = client.fetch_repo_languages("octocat/hello-world").await;
        assert_eq!(languages, vec!["C", "Rust", "Shell"]);

        let languages = client.fetch_repo_languages("octocat/broken").await;
        assert!(languages.is_empty());
    }
}
