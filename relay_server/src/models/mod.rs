//! Relay data models: read-only views of TeamCity and GitHub entities.

pub mod build;
pub mod commit_status;
pub mod notification;
pub mod pull_request;
