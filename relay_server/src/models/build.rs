//! TeamCity build: the subset of `/app/rest/builds` the relay reads.

use serde::Deserialize;

/// Terminal status reported by TeamCity for a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuildStatus {
    Success,
    Failure,
    Error,
    #[serde(other)]
    Unknown,
}

impl BuildStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
            Self::Error => "ERROR",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Build {
    pub id: String,
    pub status: BuildStatus,
    pub branch_name: String,
    /// Build results page, linked from the commit status.
    pub home_url: String,
}

/// Raw REST representation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BuildJson {
    pub id: i64,
    #[serde(default = "unknown_status")]
    pub status: BuildStatus,
    pub branch_name: Option<String>,
    #[serde(default)]
    pub web_url: String,
}

fn unknown_status() -> BuildStatus {
    BuildStatus::Unknown
}

impl From<BuildJson> for Build {
    fn from(json: BuildJson) -> Self {
        Self {
            id: json.id.to_string(),
            status: json.status,
            branch_name: json.branch_name.unwrap_or_default(),
            home_url: json.web_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_rest_build() {
        let json = r#"{
            "id": 33115638,
            "buildTypeId": "Gradle_Check_Ready_ForNightly",
            "status": "FAILURE",
            "state": "finished",
            "branchName": "master",
            "webUrl": "https://builds.gradle.org/viewLog.html?buildId=33115638"
        }"#;
        let build: Build = serde_json::from_str::<BuildJson>(json).unwrap().into();
        assert_eq!(build.id, "33115638");
        assert_eq!(build.status, BuildStatus::Failure);
        assert_eq!(build.branch_name, "master");
        assert_eq!(
            build.home_url,
            "https://builds.gradle.org/viewLog.html?buildId=33115638"
        );
    }

    #[test]
    fn unrecognised_status_and_missing_branch() {
        let json = r#"{"id": 7, "status": "CANCELED", "webUrl": "u"}"#;
        let build: Build = serde_json::from_str::<BuildJson>(json).unwrap().into();
        assert_eq!(build.status, BuildStatus::Unknown);
        assert_eq!(build.branch_name, "");
    }
}
