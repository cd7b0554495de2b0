//! Relay configuration: loaded from environment variables.
//!
//! Startup is permissive: missing credentials default to an empty string and
//! only surface later as authentication failures against GitHub or TeamCity.

/// Status context this relay owns on GitHub commits.
pub const CI_STATUS_CONTEXT: &str = "CI Status";

/// Branches whose builds drive pull request statuses.
pub const TRACKED_BRANCHES: [&str; 2] = ["master", "release"];

/// Label used in status descriptions when `GATING_BUILD_LABEL` is unset.
pub const DEFAULT_GATING_BUILD_LABEL: &str = "Ready for Nightly";

/// Pull requests without commits for longer than this are left alone.
pub const STALE_AFTER_DAYS: i64 = 30;

#[derive(Clone, Debug)]
pub struct RelayConfig {
    /// GitHub token used for GraphQL queries and status writes.
    pub github_access_token: String,
    /// Shared secret for webhook HMAC validation.
    pub github_webhook_secret: String,
    /// TeamCity token used to look up builds.
    pub teamcity_access_token: String,
    /// Repository whose open pull requests are updated (`owner/name`).
    pub github_repo: String,
    /// GitHub API base URL.
    pub github_api_url: String,
    /// TeamCity server base URL.
    pub teamcity_url: String,
    /// Build type whose terminal outcomes are relayed.
    pub gating_build_type_id: String,
    /// Display name of the gating build in status descriptions.
    pub gating_build_label: String,
}

impl RelayConfig {
    pub fn from_env() -> Self {
        let github_access_token = std::env::var("GITHUB_ACCESS_TOKEN").unwrap_or_default();
        let github_webhook_secret = std::env::var("GITHUB_WEBHOOK_SECRET").unwrap_or_default();
        let teamcity_access_token = std::env::var("TEAMCITY_ACCESS_TOKEN").unwrap_or_default();
        let github_repo =
            std::env::var("GITHUB_REPO").unwrap_or_else(|_| "gradle/gradle".to_string());
        let github_api_url = std::env::var("GITHUB_API_URL")
            .unwrap_or_else(|_| "https://api.github.com".to_string());
        let teamcity_url = std::env::var("TEAMCITY_URL")
            .unwrap_or_else(|_| "https://builds.gradle.org".to_string());
        let gating_build_type_id = std::env::var("GATING_BUILD_TYPE_ID")
            .unwrap_or_else(|_| "Gradle_Check_Ready_ForNightly".to_string());
        let gating_build_label = std::env::var("GATING_BUILD_LABEL")
            .unwrap_or_else(|_| DEFAULT_GATING_BUILD_LABEL.to_string());

        if github_webhook_secret.is_empty() {
            tracing::warn!("GITHUB_WEBHOOK_SECRET not set -- every GitHub webhook will be rejected");
        }
        if github_access_token.is_empty() {
            tracing::warn!("GITHUB_ACCESS_TOKEN not set -- GitHub calls will fail authentication");
        }
        if teamcity_access_token.is_empty() {
            tracing::warn!("TEAMCITY_ACCESS_TOKEN not set -- TeamCity build lookups will fail");
        }

        Self {
            github_access_token,
            github_webhook_secret,
            teamcity_access_token,
            github_repo,
            github_api_url: github_api_url.trim_end_matches('/').to_string(),
            teamcity_url: teamcity_url.trim_end_matches('/').to_string(),
            gating_build_type_id,
            gating_build_label,
        }
    }
}
