//! Error handling for the Pandora client.
//!
//! Every fallible operation in this crate returns [`Result`], with the error
//! taxonomy fixed by the protocol layer it failed in:
//!
//! * [`Error::PartnerLogin`] / [`Error::UserLogin`] — handshake failures,
//!   fatal to session establishment and never retried internally
//! * [`Error::Encryption`] / [`Error::Decryption`] — cipher failures; these
//!   indicate a protocol mismatch (wrong key or padding), not a network
//!   problem, and are always fatal
//! * [`Error::ApiCall`] — a method call failed; carries the method name,
//!   the remote error code when one was returned, and the upstream cause
//! * [`Error::Session`] — raised by consumers when no valid session is at
//!   hand; the call pipeline itself never produces it
//! * [`Error::Config`] — missing or invalid client configuration
//! * [`Error::NotFound`] — the remote resource (or a replay fixture) is
//!   absent
//!
//! Transport-level conversions (`reqwest`, `serde_json`, `url`, header
//! building) keep their own variants so that a network failure is always
//! distinguishable from a cipher failure.

use http::header::{InvalidHeaderValue, MaxSizeReached};
use thiserror::Error;

/// Standard result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The partner (device) handshake failed.
    #[error("partner login failed: {reason}")]
    PartnerLogin {
        reason: String,
        #[source]
        source: Option<Box<Error>>,
    },

    /// The user handshake failed.
    #[error("user login failed: {reason}")]
    UserLogin {
        reason: String,
        #[source]
        source: Option<Box<Error>>,
    },

    /// Payload encryption failed. Only programmer-error inputs cause this.
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Payload decryption failed: bad hex, length not a block multiple, or
    /// invalid padding.
    #[error("decryption failed: {0}")]
    Decryption(String),

    /// An authenticated method call failed.
    #[error("{method} failed: {message}")]
    ApiCall {
        method: String,
        message: String,
        code: Option<i64>,
        #[source]
        source: Option<Box<Error>>,
    },

    /// No valid session is available. Consumers raise this when wrapping
    /// the pipeline; the pipeline itself does not.
    #[error("no valid session: {0}")]
    Session(String),

    /// Client configuration is missing or invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The remote resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    #[error("HTTP client error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP header error: {0}")]
    HttpHeader(String),

    #[error("parsing JSON failed: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("parsing URL failed: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl Error {
    /// Creates an [`Error::ApiCall`] without a remote error code.
    pub fn api_call(method: &str, message: impl Into<String>) -> Self {
        Self::ApiCall {
            method: method.to_string(),
            message: message.into(),
            code: None,
            source: None,
        }
    }

    /// Creates an [`Error::ApiCall`] carrying the remote error code.
    pub fn api_call_code(method: &str, message: impl Into<String>, code: i64) -> Self {
        Self::ApiCall {
            method: method.to_string(),
            message: message.into(),
            code: Some(code),
            source: None,
        }
    }

    /// Creates the timeout-classified [`Error::ApiCall`] used when a call
    /// exceeds its overall deadline, retries included.
    pub fn timed_out(method: &str) -> Self {
        Self::api_call(method, "deadline exceeded")
    }

    /// Creates an [`Error::ApiCall`] wrapping an upstream error.
    pub fn api_call_source(method: &str, source: Error) -> Self {
        Self::ApiCall {
            method: method.to_string(),
            message: source.to_string(),
            code: None,
            source: Some(Box::new(source)),
        }
    }

    /// Creates an [`Error::PartnerLogin`] wrapping its upstream cause.
    pub fn partner_login(source: Error) -> Self {
        Self::PartnerLogin {
            reason: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates an [`Error::UserLogin`] wrapping its upstream cause.
    pub fn user_login(source: Error) -> Self {
        Self::UserLogin {
            reason: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// The remote error code, if this error carries one.
    #[must_use]
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::ApiCall { code, .. } => *code,
            Self::PartnerLogin { source, .. } | Self::UserLogin { source, .. } => {
                source.as_ref().and_then(|e| e.code())
            }
            _ => None,
        }
    }
}

impl From<MaxSizeReached> for Error {
    fn from(e: MaxSizeReached) -> Self {
        Self::HttpHeader(e.to_string())
    }
}

impl From<InvalidHeaderValue> for Error {
    fn from(e: InvalidHeaderValue) -> Self {
        Self::HttpHeader(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_call_display_includes_method() {
        let e = Error::api_call_code("station.getPlaylist", "insufficient connectivity", 13);
        assert_eq!(
            e.to_string(),
            "station.getPlaylist failed: insufficient connectivity"
        );
        assert_eq!(e.code(), Some(13));
    }

    #[test]
    fn login_errors_surface_nested_code() {
        let cause = Error::api_call_code("auth.userLogin", "invalid credentials", 1002);
        let e = Error::user_login(cause);
        assert_eq!(e.code(), Some(1002));
        assert!(e.to_string().starts_with("user login failed"));
    }
}
