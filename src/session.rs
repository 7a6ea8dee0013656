//! Session values produced by the two-phase handshake.
//!
//! The authentication flow is a short state machine encoded in types:
//! nothing → [`PartnerSession`] (after the partner handshake) →
//! [`Session`] (after the user handshake). Both are plain immutable
//! values; nothing in the crate mutates a session after creation, so one
//! session can be cloned into any number of concurrent callers, and
//! several sessions may coexist. A failed handshake produces an error,
//! not a state to retry from — the caller decides whether to run the flow
//! again.

use veil::Redact;

use crate::util;

/// Device-level trust established by the partner handshake.
///
/// Intermediate value consumed by the user handshake.
#[derive(Clone, Eq, PartialEq, Redact)]
pub struct PartnerSession {
    pub partner_id: String,

    #[redact]
    pub partner_auth_token: String,

    /// Signed delta in seconds between the server clock and ours.
    pub sync_time_offset: i64,
}

/// Fully authenticated session.
///
/// Created only by a successful run of the handshake flow and passed by
/// reference into every pipeline call; the pipeline holds no session state
/// of its own.
#[derive(Clone, Eq, PartialEq, Redact)]
pub struct Session {
    /// Signed delta in seconds between the server clock and ours, applied
    /// to every timestamped request.
    pub sync_time_offset: i64,

    pub partner_id: String,

    #[redact]
    pub partner_auth_token: String,

    pub user_id: String,

    #[redact]
    pub user_auth_token: String,
}

impl PartnerSession {
    /// The server's idea of the current time, in epoch seconds.
    #[must_use]
    pub fn sync_time(&self) -> u64 {
        sync_time(self.sync_time_offset)
    }
}

impl Session {
    /// The server's idea of the current time, in epoch seconds.
    ///
    /// Embedding this, rather than the value decrypted at login, keeps
    /// requests valid as wall-clock time advances.
    #[must_use]
    pub fn sync_time(&self) -> u64 {
        sync_time(self.sync_time_offset)
    }
}

fn sync_time(offset: i64) -> u64 {
    let now = i64::try_from(util::now_from_epoch()).unwrap_or(i64::MAX);
    now.saturating_add(offset).try_into().unwrap_or_default()
}
