//! Wire types shared by every Pandora JSON API method.
//!
//! Each API endpoint is represented by a response type implementing
//! [`Method`], which names the remote method and says whether its request
//! body travels encrypted. Responses arrive in a common envelope:
//!
//! ```json
//! { "stat": "ok", "result": { ... } }
//! { "stat": "fail", "code": 1002, "message": "..." }
//! ```
//!
//! Failure codes are mapped into the crate error taxonomy by
//! [`classify_failure`].

pub mod auth;
pub mod bookmark;
pub mod music;
pub mod station;
pub mod track;
pub mod user;

use serde::Deserialize;

use crate::error::Error;

/// A Pandora JSON API method identifier.
///
/// Implemented by response types; the request body is a separate
/// `Serialize` struct passed alongside.
pub trait Method {
    /// Remote method name in dot notation, e.g. `station.getPlaylist`.
    const NAME: &'static str;

    /// Whether the request body is Blowfish encrypted on the wire.
    ///
    /// Everything except the partner handshake is.
    const ENCRYPTED: bool = true;
}

/// The response envelope common to all methods.
///
/// The `result` payload stays an untyped value here; the call pipeline
/// deserializes it into the method's response type after checking `stat`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(tag = "stat", rename_all = "lowercase")]
pub enum Envelope {
    Ok {
        #[serde(default)]
        result: serde_json::Value,
    },
    Fail {
        code: i64,
        message: Option<String>,
    },
}

/// Maps a `stat: "fail"` envelope into the error taxonomy.
///
/// Codes naming an absent resource become [`Error::NotFound`]; everything
/// else is an [`Error::ApiCall`] carrying the original code.
#[must_use]
pub fn classify_failure(method: &str, code: i64, message: Option<String>) -> Error {
    let message = message.unwrap_or_else(|| describe(code).to_string());
    match code {
        1006 | 1009 => Error::NotFound(format!("{method}: {message}")),
        _ => Error::api_call_code(method, message, code),
    }
}

/// Human-readable description of the documented failure codes, used when
/// the service omits a message.
fn describe(code: i64) -> &'static str {
    match code {
        0 => "internal server error",
        1 => "service in maintenance mode",
        8 => "parameter type mismatch",
        9 => "parameter missing",
        10 => "parameter value invalid",
        11 => "API version not supported",
        12 => "service not available in this country",
        13 => "insufficient connectivity (bad sync time?)",
        14 => "unknown method name",
        1000 => "service in read-only mode",
        1001 => "invalid auth token (session expired?)",
        1002 => "invalid credentials",
        1003 => "listener not authorized",
        1004 => "user not authorized",
        1005 => "maximum number of stations reached",
        1006 => "station does not exist",
        1009 => "device not found",
        1039 => "too many playlist requests",
        _ => "unexpected error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_parses_ok_with_result() {
        let envelope: Envelope =
            serde_json::from_str(r#"{"stat":"ok","result":{"stations":[]}}"#).unwrap();
        match envelope {
            Envelope::Ok { result } => assert!(result.get("stations").is_some()),
            Envelope::Fail { .. } => panic!("expected ok"),
        }
    }

    #[test]
    fn envelope_parses_ok_without_result() {
        let envelope: Envelope = serde_json::from_str(r#"{"stat":"ok"}"#).unwrap();
        assert_eq!(
            envelope,
            Envelope::Ok {
                result: serde_json::Value::Null
            }
        );
    }

    #[test]
    fn envelope_parses_fail() {
        let envelope: Envelope =
            serde_json::from_str(r#"{"stat":"fail","code":1002,"message":"bad login"}"#).unwrap();
        assert_eq!(
            envelope,
            Envelope::Fail {
                code: 1002,
                message: Some("bad login".to_string())
            }
        );
    }

    #[test]
    fn missing_station_maps_to_not_found() {
        let e = classify_failure("station.getStation", 1006, None);
        assert!(matches!(e, Error::NotFound(_)));
    }

    #[test]
    fn other_codes_keep_the_original_code() {
        let e = classify_failure("station.getPlaylist", 13, None);
        assert_eq!(e.code(), Some(13));
        assert!(e.to_string().contains("sync time"));
    }
}
