//! GitHub integration: open pull request listing and commit status updates.

use std::sync::OnceLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::{read_json, ClientError};
use crate::models::commit_status::{CommitStatusState, NewCommitStatus};
use crate::models::pull_request::{PullRequest, StatusContext};

/// Source host operations the relay depends on.
#[async_trait]
pub trait SourceHost: Send + Sync {
    /// Resolve the authenticated identity. Called once at startup.
    async fn init(&self) -> Result<(), ClientError>;

    /// Login resolved by [`SourceHost::init`], if it succeeded.
    fn who_am_i(&self) -> Option<String>;

    async fn list_open_pull_requests(&self, repo: &str) -> Result<Vec<PullRequest>, ClientError>;

    async fn create_commit_status(
        &self,
        repo: &str,
        status: &NewCommitStatus,
    ) -> Result<(), ClientError>;
}

const OPEN_PULL_REQUESTS_QUERY: &str = r#"
query($owner: String!, $name: String!, $cursor: String) {
  repository(owner: $owner, name: $name) {
    pullRequests(states: OPEN, first: 100, after: $cursor) {
      pageInfo { hasNextPage endCursor }
      nodes {
        url
        baseRefName
        headRefOid
        commits(last: 1) {
          nodes {
            commit {
              committedDate
              status { contexts { context state } }
            }
          }
        }
      }
    }
  }
}
"#;

pub struct GitHubClient {
    http: reqwest::Client,
    api_url: String,
    token: String,
    login: OnceLock<String>,
}

impl GitHubClient {
    pub fn new(api_url: &str, token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            login: OnceLock::new(),
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.api_url, path))
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "ci-status-relay")
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, ClientError> {
        let resp = request.send().await.map_err(ClientError::github)?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                service: "GitHub",
                status,
                body,
            });
        }
        Ok(resp)
    }

    async fn fetch_page(
        &self,
        owner: &str,
        name: &str,
        cursor: Option<&str>,
    ) -> Result<PullRequestConnection, ClientError> {
        let body = serde_json::json!({
            "query": OPEN_PULL_REQUESTS_QUERY,
            "variables": { "owner": owner, "name": name, "cursor": cursor },
        });
        let resp = self
            .send(self.request(reqwest::Method::POST, "/graphql").json(&body))
            .await?;
        let page: GraphQlResponse<OpenPullRequestsData> = read_json("GitHub", resp).await?;
        page.into_connection()
    }
}

#[async_trait]
impl SourceHost for GitHubClient {
    async fn init(&self) -> Result<(), ClientError> {
        let resp = self.send(self.request(reqwest::Method::GET, "/user")).await?;
        let user: UserJson = read_json("GitHub", resp).await?;
        let _ = self.login.set(user.login);
        Ok(())
    }

    fn who_am_i(&self) -> Option<String> {
        self.login.get().cloned()
    }

    async fn list_open_pull_requests(&self, repo: &str) -> Result<Vec<PullRequest>, ClientError> {
        let (owner, name) = repo.split_once('/').ok_or_else(|| ClientError::Decode {
            service: "GitHub",
            message: format!("repository {repo:?} is not in owner/name form"),
        })?;

        let mut pull_requests = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let page = self.fetch_page(owner, name, cursor.as_deref()).await?;
            pull_requests.extend(page.nodes.into_iter().map(PullRequest::from));
            match page.page_info.end_cursor {
                Some(next) if page.page_info.has_next_page => cursor = Some(next),
                _ => break,
            }
        }

        tracing::debug!(repo, count = pull_requests.len(), "Listed open pull requests");
        Ok(pull_requests)
    }

    async fn create_commit_status(
        &self,
        repo: &str,
        status: &NewCommitStatus,
    ) -> Result<(), ClientError> {
        let body = serde_json::json!({
            "state": status.state.as_rest_str(),
            "target_url": status.target_url,
            "description": status.description,
            "context": status.context,
        });
        let path = format!("/repos/{repo}/statuses/{}", status.commit_id);
        self.send(self.request(reqwest::Method::POST, &path).json(&body))
            .await?;
        Ok(())
    }
}

// ── Wire format ──

#[derive(Debug, Deserialize)]
struct UserJson {
    login: String,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct OpenPullRequestsData {
    repository: Option<RepositoryJson>,
}

impl GraphQlResponse<OpenPullRequestsData> {
    fn into_connection(self) -> Result<PullRequestConnection, ClientError> {
        if !self.errors.is_empty() {
            let messages: Vec<_> = self.errors.into_iter().map(|e| e.message).collect();
            return Err(ClientError::Decode {
                service: "GitHub",
                message: messages.join("; "),
            });
        }
        self.data
            .and_then(|data| data.repository)
            .map(|repo| repo.pull_requests)
            .ok_or_else(|| ClientError::Decode {
                service: "GitHub",
                message: "repository not found".to_string(),
            })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepositoryJson {
    pull_requests: PullRequestConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PullRequestConnection {
    page_info: PageInfo,
    #[serde(default)]
    nodes: Vec<PullRequestJson>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    has_next_page: bool,
    end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PullRequestJson {
    url: String,
    base_ref_name: String,
    head_ref_oid: String,
    commits: CommitConnection,
}

#[derive(Debug, Deserialize)]
struct CommitConnection {
    #[serde(default)]
    nodes: Vec<CommitNode>,
}

#[derive(Debug, Deserialize)]
struct CommitNode {
    commit: CommitJson,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommitJson {
    committed_date: DateTime<Utc>,
    status: Option<StatusJson>,
}

#[derive(Debug, Deserialize)]
struct StatusJson {
    #[serde(default)]
    contexts: Vec<ContextJson>,
}

#[derive(Debug, Deserialize)]
struct ContextJson {
    context: String,
    state: CommitStatusState,
}

impl From<PullRequestJson> for PullRequest {
    fn from(json: PullRequestJson) -> Self {
        let last_commit = json.commits.nodes.into_iter().last().map(|node| node.commit);
        let (last_commit_at, latest_commit_statuses) = match last_commit {
            Some(commit) => (
                Some(commit.committed_date),
                commit
                    .status
                    .map(|status| {
                        status
                            .contexts
                            .into_iter()
                            .map(|c| StatusContext {
                                context: c.context,
                                state: c.state,
                            })
                            .collect()
                    })
                    .unwrap_or_default(),
            ),
            None => (None, Vec::new()),
        };

        Self {
            url: json.url,
            base_branch: json.base_ref_name,
            head_commit_id: json.head_ref_oid,
            last_commit_at,
            latest_commit_statuses,
        }
    }
}
