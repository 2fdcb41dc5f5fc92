use std::time::Duration;

use thiserror::Error;

/// Errors returned by [`crate::Envoy`] requests and streams.
///
/// Nothing is retried internally; the caller decides whether to reconnect.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EnvoyError {
    /// Connection, DNS or mid-body read failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("`{url}` answered with {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    /// The digest challenge was missing, unparseable or could not be answered.
    #[error("digest authentication failed: {0}")]
    Auth(String),

    #[error("failed to decode `{payload}`: {source}")]
    Decode {
        payload: String,
        #[source]
        source: serde_json::Error,
    },

    /// The device did not answer within `request_timeout`, or sent no further
    /// meter stream bytes within `idle_timeout`.
    #[error("no data from the device within {0:?}")]
    Timeout(Duration),

    /// The meter stream sent more than the given number of bytes without a newline.
    #[error("meter stream line exceeds {0} bytes")]
    LineTooLong(usize),

    /// The device ended the meter stream body.
    #[error("meter stream closed by the device")]
    StreamClosed,
}

impl EnvoyError {
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}
