//! Errors raised by the GitHub and TeamCity clients.

use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection, TLS or body read failure.
    #[error("request to {service} failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// Non-success HTTP status.
    #[error("{service} responded {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    /// Response body did not have the expected shape.
    #[error("unexpected {service} response: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },
}

impl ClientError {
    pub(crate) fn github(source: reqwest::Error) -> Self {
        Self::Transport {
            service: "GitHub",
            source,
        }
    }

    pub(crate) fn teamcity(source: reqwest::Error) -> Self {
        Self::Transport {
            service: "TeamCity",
            source,
        }
    }
}

/// Read a JSON response body. A body that arrives but does not decode is a
/// [`ClientError::Decode`], not a transport failure.
pub(crate) async fn read_json<T: DeserializeOwned>(
    service: &'static str,
    resp: reqwest::Response,
) -> Result<T, ClientError> {
    let body = resp
        .bytes()
        .await
        .map_err(|source| ClientError::Transport { service, source })?;
    decode_body(service, &body)
}

pub(crate) fn decode_body<T: DeserializeOwned>(
    service: &'static str,
    body: &[u8],
) -> Result<T, ClientError> {
    serde_json::from_slice(body).map_err(|e| ClientError::Decode {
        service,
        message: e.to_string(),
    })
}
