//! Event handlers subscribed through [`crate::events::registry`].

pub mod github;
pub mod teamcity;
