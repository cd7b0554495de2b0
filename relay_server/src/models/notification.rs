//! TeamCity build notification and its inbound payload.

use serde::Deserialize;

/// Status word carried by a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildEventStatus {
    Success,
    Failure,
    Running,
}

impl BuildEventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
            Self::Running => "RUNNING",
        }
    }

    /// Whether the build has reached a terminal outcome.
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Success | Self::Failure)
    }
}

impl std::fmt::Display for BuildEventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inbound `/teamcity` body: `{"text": "..."}`.
#[derive(Debug, Clone, Deserialize)]
pub struct TeamCityPayload {
    pub text: String,
}

/// A parsed notification. All three derived fields are always present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildNotification {
    pub text: String,
    pub status: BuildEventStatus,
    pub build_type_id: String,
    pub build_id: String,
}
