use std::env;
use std::time::Duration;

use anyhow::{bail, Context};

use crate::envoy::{DecodePolicy, Envoy, EnvoyOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Follow `/stream/meter`
    Stream,
    /// Poll `/production.json` once
    Production,
}

/// Binary configuration, read from `ENVOY_*` environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvoyConfig {
    pub url: String,
    pub serial_number: String,
    pub username: String,
    pub password: String,
    pub mode: Mode,
    pub options: EnvoyOptions,
}

impl EnvoyConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let url = lookup("ENVOY_URL")
            .filter(|url| !url.is_empty())
            .context("Required to add the Envoy address (ENVOY_URL env var)")?;

        let mode = match lookup("ENVOY_MODE")
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str()
        {
            "" | "stream" => Mode::Stream,
            "production" => Mode::Production,
            other => bail!("Unknown ENVOY_MODE `{other}`, expected `stream` or `production`"),
        };

        let defaults = EnvoyOptions::default();
        let request_timeout = parse_secs(&lookup, "ENVOY_REQUEST_TIMEOUT_SECS")?
            .unwrap_or(defaults.request_timeout);
        // 0 disables the idle timeout
        let idle_timeout = match parse_secs(&lookup, "ENVOY_IDLE_TIMEOUT_SECS")? {
            Some(Duration::ZERO) => None,
            Some(limit) => Some(limit),
            None => defaults.idle_timeout,
        };
        let decode_policy = if parse_bool_safe(lookup("ENVOY_SKIP_BAD_PAYLOADS")) {
            DecodePolicy::Skip
        } else {
            DecodePolicy::Abort
        };

        Ok(Self {
            url,
            serial_number: lookup("ENVOY_SERIAL").unwrap_or_default(),
            username: lookup("ENVOY_USERNAME").unwrap_or_else(|| "installer".to_string()),
            password: lookup("ENVOY_PASSWORD").unwrap_or_default(),
            mode,
            options: EnvoyOptions {
                request_timeout,
                idle_timeout,
                decode_policy,
            },
        })
    }

    pub fn envoy(&self) -> anyhow::Result<Envoy> {
        Envoy::with_options(
            self.serial_number.as_str(),
            self.username.as_str(),
            self.password.as_str(),
            self.url.as_str(),
            self.options.clone(),
        )
        .context("Failed to build the HTTP client")
    }
}

fn parse_secs(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> anyhow::Result<Option<Duration>> {
    match lookup(key).filter(|val| !val.is_empty()) {
        Some(val) => {
            let secs: u64 = val
                .trim()
                .parse()
                .with_context(|| format!("{key} must be a whole number of seconds, got `{val}`"))?;
            Ok(Some(Duration::from_secs(secs)))
        }
        None => Ok(None),
    }
}

/// Safely parses a boolean from an optional string, defaulting to false
fn parse_bool_safe(val: Option<String>) -> bool {
    val.unwrap_or_default()
        .to_ascii_lowercase()
        .parse()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> anyhow::Result<EnvoyConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EnvoyConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_minimal_config() {
        let config = config_from(&[("ENVOY_URL", "http://192.168.1.14")]).unwrap();

        assert_eq!(config.url, "http://192.168.1.14");
        assert_eq!(config.username, "installer");
        assert_eq!(config.password, "");
        assert_eq!(config.mode, Mode::Stream);
        assert_eq!(config.options, EnvoyOptions::default());
    }

    #[test]
    fn test_full_config() {
        let config = config_from(&[
            ("ENVOY_URL", "http://envoy.local"),
            ("ENVOY_SERIAL", "122012345678"),
            ("ENVOY_USERNAME", "owner"),
            ("ENVOY_PASSWORD", "FEb5Dafd"),
            ("ENVOY_MODE", "Production"),
            ("ENVOY_SKIP_BAD_PAYLOADS", "TRUE"),
            ("ENVOY_REQUEST_TIMEOUT_SECS", "3"),
            ("ENVOY_IDLE_TIMEOUT_SECS", "0"),
        ])
        .unwrap();

        assert_eq!(config.serial_number, "122012345678");
        assert_eq!(config.username, "owner");
        assert_eq!(config.password, "FEb5Dafd");
        assert_eq!(config.mode, Mode::Production);
        assert_eq!(config.options.decode_policy, DecodePolicy::Skip);
        assert_eq!(config.options.request_timeout, Duration::from_secs(3));
        assert_eq!(config.options.idle_timeout, None);

        let envoy = config.envoy().unwrap();
        assert_eq!(envoy.serial_number(), "122012345678");
        assert_eq!(envoy.url(), "http://envoy.local");
    }

    #[test]
    fn test_missing_url() {
        assert!(config_from(&[]).is_err());
        assert!(config_from(&[("ENVOY_URL", "")]).is_err());
    }

    #[test]
    fn test_invalid_values() {
        assert!(config_from(&[("ENVOY_URL", "http://e"), ("ENVOY_MODE", "poll")]).is_err());
        assert!(config_from(&[
            ("ENVOY_URL", "http://e"),
            ("ENVOY_IDLE_TIMEOUT_SECS", "soon")
        ])
        .is_err());
    }

    #[test]
    fn test_parse_bool_safe() {
        assert!(!parse_bool_safe(None));
        assert!(!parse_bool_safe(Some("".to_string())));
        assert!(parse_bool_safe(Some("True".to_string())));
        assert!(!parse_bool_safe(Some("FaLsE".to_string())));
        assert!(!parse_bool_safe(Some("yes".to_string())));
        assert!(!parse_bool_safe(Some("1".to_string())));
    }
}
