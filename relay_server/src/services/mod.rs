//! Relay services: webhook authentication, notification parsing, status
//! synchronization and the GitHub / TeamCity clients.

pub mod ci_status_sync;
pub mod freshness;
pub mod github_service;
pub mod notification_parser;
pub mod signature;
pub mod status_mapper;
pub mod teamcity_service;
