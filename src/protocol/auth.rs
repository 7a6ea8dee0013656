//! Handshake request and response types.
//!
//! The partner handshake travels unencrypted and establishes device-level
//! trust plus the clock offset; the user handshake travels encrypted with
//! the partner key and establishes the user tokens. See
//! [`crate::client::Pandora::login`] for the flow.

use serde::{Deserialize, Serialize};
use veil::Redact;

use super::Method;

/// Body of `auth.partnerLogin`: fixed device-identification credentials.
#[derive(Clone, Serialize, Redact)]
#[serde(rename_all = "camelCase")]
pub struct PartnerLoginRequest<'a> {
    pub username: &'a str,
    #[redact]
    pub password: &'a str,
    pub device_model: &'a str,
    pub version: &'a str,
}

/// Result of `auth.partnerLogin`.
#[derive(Clone, Deserialize, Redact)]
#[serde(rename_all = "camelCase")]
pub struct PartnerLogin {
    /// Server clock, encrypted with the partner decrypt key.
    #[redact]
    pub sync_time: String,

    pub partner_id: String,

    #[redact]
    pub partner_auth_token: String,
}

impl Method for PartnerLogin {
    const NAME: &'static str = "auth.partnerLogin";
    const ENCRYPTED: bool = false;
}

/// Body of `auth.userLogin`, encrypted with the partner key.
#[derive(Clone, Serialize, Redact)]
#[serde(rename_all = "camelCase")]
pub struct UserLoginRequest<'a> {
    /// Always `"user"`.
    pub login_type: &'a str,

    pub username: &'a str,

    #[redact]
    pub password: &'a str,

    #[redact]
    pub partner_auth_token: &'a str,

    /// Local clock corrected by the negotiated offset.
    pub sync_time: u64,
}

/// Result of `auth.userLogin`.
#[derive(Clone, Deserialize, Redact)]
#[serde(rename_all = "camelCase")]
pub struct UserLogin {
    pub user_id: String,

    #[redact]
    pub user_auth_token: String,
}

impl Method for UserLogin {
    const NAME: &'static str = "auth.userLogin";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_serialize_in_wire_case() {
        let body = serde_json::to_value(UserLoginRequest {
            login_type: "user",
            username: "listener@example.com",
            password: "hunter2",
            partner_auth_token: "PAT",
            sync_time: 1_724_007_200,
        })
        .unwrap();

        assert_eq!(body["loginType"], "user");
        assert_eq!(body["partnerAuthToken"], "PAT");
        assert_eq!(body["syncTime"], 1_724_007_200_u64);
    }

    #[test]
    fn partner_login_is_the_only_plain_method() {
        assert!(!PartnerLogin::ENCRYPTED);
        assert!(UserLogin::ENCRYPTED);
    }
}
