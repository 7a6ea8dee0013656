//! Client configuration and credential loading.
//!
//! Partner (device) credentials identify the client application tier to the
//! service and carry the Blowfish keys for the payload encryption. They are
//! reverse engineered from the service's own clients and are deliberately
//! not shipped with this crate: they load from a small TOML file, see
//! `partner.toml.example`.
//!
//! The record/replay fixture switch is read from the environment exactly
//! once, when the [`Config`] is constructed. Everything else is plain data
//! that tests override directly.

use std::{fs, path::PathBuf, time::Duration};

use serde::Deserialize;
use url::Url;
use veil::Redact;

use crate::{
    error::{Error, Result},
    transport::Mode,
};

/// User credentials for the second handshake phase.
#[derive(Clone, Eq, PartialEq, Redact)]
pub struct Credentials {
    pub username: String,
    #[redact]
    pub password: String,
}

impl Credentials {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Partner credentials: device identification plus the payload cipher keys.
#[derive(Clone, Eq, PartialEq, Deserialize, Redact)]
pub struct Partner {
    /// Partner login name, e.g. `android`.
    pub username: String,

    #[redact]
    pub password: String,

    /// Device model the partner tier is registered for.
    pub device_model: String,

    /// Protocol version string, e.g. `5`.
    pub version: String,

    /// Blowfish key for outbound payloads.
    #[redact]
    pub encrypt_key: String,

    /// Blowfish key for inbound encrypted fields (`syncTime`).
    #[redact]
    pub decrypt_key: String,
}

impl Partner {
    /// Loads partner credentials from a TOML file.
    pub fn from_file(path: &str) -> Result<Self> {
        // Prevent out-of-memory condition: the credentials file is small.
        let attributes =
            fs::metadata(path).map_err(|e| Error::Config(format!("{path}: {e}")))?;
        if attributes.len() > 1024 {
            return Err(Error::Config(format!("{path} is too large")));
        }

        let contents =
            fs::read_to_string(path).map_err(|e| Error::Config(format!("{path}: {e}")))?;
        Self::from_toml(&contents).map_err(|e| Error::Config(format!("{path}: {e}")))
    }

    /// Parses partner credentials from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let partner: Self = toml::from_str(contents)
            .map_err(|e| Error::Config(format!("partner credentials invalid: {e}")))?;
        partner.validate()?;
        Ok(partner)
    }

    fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("username", &self.username),
            ("password", &self.password),
            ("device_model", &self.device_model),
            ("version", &self.version),
            ("encrypt_key", &self.encrypt_key),
            ("decrypt_key", &self.decrypt_key),
        ] {
            if value.is_empty() {
                return Err(Error::Config(format!("partner {field} must not be empty")));
            }
        }
        Ok(())
    }
}

/// Client configuration, consumed once at construction.
#[derive(Clone, Debug)]
pub struct Config {
    pub partner: Partner,

    /// Endpoint of the JSON API, without the `method` query parameter.
    pub api_url: Url,

    pub user_agent: String,

    /// Transport mode, read from `PANDORA_FIXTURE_MODE` at construction.
    pub mode: Mode,

    /// Fixture file for record/replay, from `PANDORA_FIXTURE_FILE`.
    pub fixture_file: PathBuf,

    /// Sustained admission rate shared by all calls of one client.
    pub requests_per_sec: f64,

    /// Burst capacity of the token bucket.
    pub burst: u32,

    /// Maximum throttled attempts before a call fails permanently.
    pub max_retries: u32,

    /// First retry delay; doubles per attempt up to [`Config::backoff_max`].
    pub backoff_min: Duration,
    pub backoff_max: Duration,

    /// Overall deadline for one call, retries included.
    pub call_timeout: Duration,
}

impl Config {
    /// Environment switch selecting the transport mode.
    pub const FIXTURE_MODE_ENV: &'static str = "PANDORA_FIXTURE_MODE";

    /// Environment override for the fixture file location.
    pub const FIXTURE_FILE_ENV: &'static str = "PANDORA_FIXTURE_FILE";

    const API_URL: &'static str = "https://tuner.pandora.com/services/json/";
    const FIXTURE_FILE: &'static str = "fixtures/api.json";

    /// Creates a configuration with the standard endpoint and limits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the partner credentials are incomplete.
    pub fn new(partner: Partner) -> Result<Self> {
        partner.validate()?;

        let app_name = env!("CARGO_PKG_NAME");
        let app_version = env!("CARGO_PKG_VERSION");
        let os_name = match std::env::consts::OS {
            "macos" => "osx",
            other => other,
        };
        let os_version = sysinfo::System::os_version().unwrap_or_else(|| String::from("0"));

        // Served like the service's own desktop client.
        let user_agent = format!("{app_name}/{app_version} (Rust; {os_name}/{os_version})");
        trace!("user agent: {user_agent}");

        let mode = Mode::from_env();
        let fixture_file = std::env::var(Self::FIXTURE_FILE_ENV)
            .map_or_else(|_| PathBuf::from(Self::FIXTURE_FILE), PathBuf::from);

        Ok(Self {
            partner,
            api_url: Url::parse(Self::API_URL).expect("default API URL is valid"),
            user_agent,
            mode,
            fixture_file,
            requests_per_sec: 2.0,
            burst: 5,
            max_retries: 3,
            backoff_min: Duration::from_millis(250),
            backoff_max: Duration::from_secs(10),
            call_timeout: Duration::from_secs(30),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARTNER_TOML: &str = r#"
        username = "android"
        password = "partner-password"
        device_model = "android-generic"
        version = "5"
        encrypt_key = "outbound-key"
        decrypt_key = "inbound-key"
    "#;

    #[test]
    fn partner_parses_from_toml() {
        let partner = Partner::from_toml(PARTNER_TOML).unwrap();
        assert_eq!(partner.username, "android");
        assert_eq!(partner.device_model, "android-generic");
    }

    #[test]
    fn partner_rejects_missing_field() {
        let e = Partner::from_toml(r#"username = "android""#).unwrap_err();
        assert!(matches!(e, Error::Config(_)));
    }

    #[test]
    fn partner_rejects_empty_key() {
        let toml = PARTNER_TOML.replace(r#""outbound-key""#, r#""""#);
        let e = Partner::from_toml(&toml).unwrap_err();
        assert!(matches!(e, Error::Config(_)));
    }

    #[test]
    fn partner_debug_redacts_secrets() {
        let partner = Partner::from_toml(PARTNER_TOML).unwrap();
        let debug = format!("{partner:?}");
        assert!(!debug.contains("partner-password"));
        assert!(!debug.contains("outbound-key"));
    }

    #[test]
    fn config_carries_defaults() {
        let config = Config::new(Partner::from_toml(PARTNER_TOML).unwrap()).unwrap();
        assert_eq!(config.api_url.as_str(), Config::API_URL);
        assert!(config.burst > 0);
        assert!(config.max_retries > 0);
    }
}
