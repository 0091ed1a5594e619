//! Client configuration and environment resolution.

use crate::{
    apis::auth::HmacKey,
    common::{DEFAULT_TIMEOUT, PROVIDER_DOMAIN},
    error::{Error, TransportError},
};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// CoreLedger environment tiers.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Sandbox,
    Integration,
    Production,
}

impl Environment {
    /// Lowercase name of the tier, as used in host names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Sandbox => "sandbox",
            Environment::Integration => "integration",
            Environment::Production => "production",
        }
    }

    /// Default REST base URL for this tier: `https://<environment>.coreledger.io`.
    pub fn base_url(&self) -> Result<Url, Error> {
        Url::parse(&format!("https://{}.{}", self.as_str(), PROVIDER_DOMAIN))
            .map_err(|e| Error::Configuration(format!("invalid base URL: {}", e)))
    }

    /// Host of the STOMP message broker for this tier: `mq-<environment>.coreledger.io`.
    pub fn message_queue_host(&self) -> String {
        format!("mq-{}.{}", self.as_str(), PROVIDER_DOMAIN)
    }
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sandbox" => Ok(Environment::Sandbox),
            "integration" => Ok(Environment::Integration),
            "production" => Ok(Environment::Production),
            other => Err(Error::Configuration(format!(
                "unknown environment `{}`",
                other
            ))),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings a [`CoreLedgerClient`](crate::CoreLedgerClient) is built from.
///
/// A `Config` is consumed once when the client is built and is immutable afterwards.
/// Build the client completely before sharing it between tasks.
#[derive(Debug, Clone)]
pub struct Config {
    /// Identity under which the SDK acts. Required.
    pub program_identifier: String,
    /// Secret used to sign the self-identity assertion. Required.
    pub hmac_key: HmacKey,
    /// Environment tier. Unknown values are normalized to `sandbox`.
    pub environment: String,
    /// Override of the REST base URL. Derived from the environment when `None`.
    pub base_url: Option<Url>,
    /// HTTP transport. A client with a 30 seconds timeout is used when `None`.
    pub http_client: Option<reqwest::Client>,
    /// Logs method, URL and error summaries of every request when enabled.
    pub debug: bool,
}

impl Config {
    /// Creates a new configuration for the sandbox environment.
    pub fn new(program_identifier: impl Into<String>, hmac_key: impl Into<HmacKey>) -> Self {
        Self {
            program_identifier: program_identifier.into(),
            hmac_key: hmac_key.into(),
            environment: Environment::Sandbox.to_string(),
            base_url: None,
            http_client: None,
            debug: false,
        }
    }

    /// Checks the mandatory credentials and fills in every derived setting.
    ///
    /// Fails with [`Error::Configuration`](crate::Error::Configuration) if the program
    /// identifier or the HMAC key is empty. An unrecognized environment is replaced
    /// with `sandbox`.
    pub fn validate_and_normalize(mut self) -> Result<Self, Error> {
        if self.program_identifier.is_empty() {
            return Err(Error::Configuration(
                "program identifier must not be empty".to_string(),
            ));
        }
        if self.hmac_key.is_empty() {
            return Err(Error::Configuration("HMAC key must not be empty".to_string()));
        }

        let environment = self.environment.parse::<Environment>().unwrap_or_else(|_| {
            tracing::info!(
                environment = %self.environment,
                "Unknown environment, falling back to sandbox"
            );
            Environment::Sandbox
        });
        self.environment = environment.to_string();

        if self.base_url.is_none() {
            self.base_url = Some(environment.base_url()?);
        }

        if self.http_client.is_none() {
            self.http_client = Some(
                reqwest::Client::builder()
                    .timeout(DEFAULT_TIMEOUT)
                    .build()
                    .map_err(TransportError::Http)?,
            );
        }

        Ok(self)
    }

    /// Environment tier this configuration points to.
    pub fn environment_tier(&self) -> Environment {
        self.environment.parse().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use test_case::test_case;

    #[test_case("", "key" ; "empty program identifier")]
    #[test_case("program", "" ; "empty hmac key")]
    #[test_case("", "" ; "both empty")]
    fn missing_credentials_are_rejected(program_identifier: &str, hmac_key: &str) {
        let err = Config::new(program_identifier, hmac_key)
            .validate_and_normalize()
            .expect_err("Expected a configuration error");

        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn hmac_key_may_be_any_byte_string() {
        let config = Config::new("P", vec![0xff, 0x00, 0xfe])
            .validate_and_normalize()
            .unwrap();

        assert_eq!(config.hmac_key.expose_secret(), &[0xff, 0x00, 0xfe]);
    }

    #[test_case("sandbox", Environment::Sandbox)]
    #[test_case("integration", Environment::Integration)]
    #[test_case("production", Environment::Production)]
    #[test_case(" Production ", Environment::Production ; "case and whitespace")]
    #[test_case("staging", Environment::Sandbox ; "unknown")]
    #[test_case("", Environment::Sandbox ; "empty")]
    fn environment_is_normalized(raw: &str, expected: Environment) {
        let mut config = Config::new("P", "K");
        config.environment = raw.to_string();

        let config = config.validate_and_normalize().unwrap();

        assert_eq!(config.environment, expected.as_str());
        assert_eq!(config.environment_tier(), expected);
    }

    #[test]
    fn base_url_is_derived_from_environment() {
        let mut config = Config::new("P", "K");
        config.environment = "staging".to_string();

        let config = config.validate_and_normalize().unwrap();

        assert_eq!(
            config.base_url.unwrap().as_str(),
            "https://sandbox.coreledger.io/"
        );
        assert!(config.http_client.is_some());
    }

    #[test]
    fn base_url_override_is_kept() {
        let mut config = Config::new("P", "K");
        config.environment = "production".to_string();
        config.base_url = Some(Url::parse("http://localhost:8080").unwrap());

        let config = config.validate_and_normalize().unwrap();

        assert_eq!(config.base_url.unwrap().as_str(), "http://localhost:8080/");
        assert_eq!(config.environment, "production");
    }

    #[test]
    fn message_queue_host() {
        assert_eq!(
            Environment::Integration.message_queue_host(),
            "mq-integration.coreledger.io"
        );
    }
}
