use std::time::Duration;

use crate::error::EnvoyError;

/// What the meter stream does with a `data: ` line that does not decode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DecodePolicy {
    /// Stop reading and return the decode error
    #[default]
    Abort,
    /// Log the error and keep reading
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvoyOptions {
    /// Bounds the whole `/production.json` request and the header phase of the meter stream
    pub request_timeout: Duration,
    /// Longest wait for the next chunk of the meter stream. `None` waits forever.
    pub idle_timeout: Option<Duration>,
    pub decode_policy: DecodePolicy,
}

impl Default for EnvoyOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            idle_timeout: Some(Duration::from_secs(60)),
            decode_policy: DecodePolicy::default(),
        }
    }
}

/// Handle to one Envoy gateway on the local network
pub struct Envoy {
    pub(crate) serial_number: String,
    pub(crate) installer_username: String,
    pub(crate) installer_password: String,
    pub(crate) url: String,
    pub(crate) options: EnvoyOptions,
    pub(crate) client: reqwest::Client,
}

impl Envoy {
    /// `url` is the scheme and host of the gateway, e.g. `http://192.168.1.14`.
    /// No validation happens here; a bad URL surfaces on the first request.
    pub fn new(
        serial_number: impl Into<String>,
        installer_username: impl Into<String>,
        installer_password: impl Into<String>,
        url: impl Into<String>,
    ) -> Result<Self, EnvoyError> {
        Self::with_options(
            serial_number,
            installer_username,
            installer_password,
            url,
            EnvoyOptions::default(),
        )
    }

    pub fn with_options(
        serial_number: impl Into<String>,
        installer_username: impl Into<String>,
        installer_password: impl Into<String>,
        url: impl Into<String>,
        options: EnvoyOptions,
    ) -> Result<Self, EnvoyError> {
        let client = reqwest::Client::builder()
            .connect_timeout(options.request_timeout)
            .build()?;
        Ok(Self {
            serial_number: serial_number.into(),
            installer_username: installer_username.into(),
            installer_password: installer_password.into(),
            url: url.into().trim_end_matches('/').to_string(),
            options,
            client,
        })
    }

    pub fn serial_number(&self) -> &str {
        &self.serial_number
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn options(&self) -> &EnvoyOptions {
        &self.options
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.url, path)
    }
}

impl std::fmt::Debug for Envoy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Envoy")
            .field("serial_number", &self.serial_number)
            .field("installer_username", &self.installer_username)
            .field("url", &self.url)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
