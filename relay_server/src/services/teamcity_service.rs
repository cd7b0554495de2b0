//! TeamCity integration: build lookup over the REST API.

use async_trait::async_trait;

use crate::error::{read_json, ClientError};
use crate::models::build::{Build, BuildJson};

/// Build system operations the relay depends on.
#[async_trait]
pub trait BuildSystem: Send + Sync {
    /// Fetch a build by id. `Ok(None)` when TeamCity does not know it.
    async fn find_build(&self, build_id: &str) -> Result<Option<Build>, ClientError>;
}

pub struct TeamCityClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl TeamCityClient {
    pub fn new(base_url: &str, token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    fn build_url(&self, build_id: &str) -> String {
        format!(
            "{}/app/rest/builds/id:{}?fields=id,status,branchName,webUrl",
            self.base_url, build_id
        )
    }
}

#[async_trait]
impl BuildSystem for TeamCityClient {
    async fn find_build(&self, build_id: &str) -> Result<Option<Build>, ClientError> {
        let resp = self
            .http
            .get(self.build_url(build_id))
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(ClientError::teamcity)?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            tracing::debug!(build_id, "TeamCity build not found");
            return Ok(None);
        }
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                service: "TeamCity",
                status,
                body,
            });
        }

        let build: BuildJson = read_json("TeamCity", resp).await?;
        Ok(Some(build.into()))
    }
}
