//! TeamCity notification text parsing.
//!
//! TeamCity's chat notifier posts a single line of text such as
//!
//! ```text
//!  success - *Check (Ready for Nightly)* <https://builds.gradle.org/viewLog.html?buildTypeId=Gradle_Check_Ready_ForNightly&buildId=33115638|#1503> (triggered by ...)
//! ```
//!
//! Only the status word, the build type and the build id are of interest.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

use crate::models::notification::{BuildEventStatus, BuildNotification};

static BUILD_EVENT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i-u:(success|failure|running)) - .*buildTypeId=([A-Za-z0-9_]+)&buildId=([0-9]+)\|",
    )
    .unwrap()
});

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("notification text does not describe a build event: {0:?}")]
    UnrecognizedText(String),
}

/// Parse notification text into a [`BuildNotification`].
///
/// Either all fields are extracted or the whole parse fails.
pub fn parse(text: &str) -> Result<BuildNotification, ParseError> {
    let captures = BUILD_EVENT_REGEX
        .captures(text)
        .ok_or_else(|| ParseError::UnrecognizedText(text.to_string()))?;

    let status = match captures[1].to_ascii_lowercase().as_str() {
        "success" => BuildEventStatus::Success,
        "failure" => BuildEventStatus::Failure,
        "running" => BuildEventStatus::Running,
        _ => return Err(ParseError::UnrecognizedText(text.to_string())),
    };

    Ok(BuildNotification {
        text: text.to_string(),
        status,
        build_type_id: captures[2].to_string(),
        build_id: captures[3].to_string(),
    })
}
