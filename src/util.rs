//! Small time helpers shared across the crate.

use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds since the Unix epoch, per the local clock.
///
/// This is the local half of every `syncTime` computation; the negotiated
/// offset turns it into the server's clock.
///
/// # Panics
///
/// Panics if the system clock reads earlier than the epoch.
#[must_use]
pub fn now_from_epoch() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock set before the Unix epoch")
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_seconds_are_current() {
        // 2024-01-01T00:00:00Z; any sane clock is past it.
        assert!(now_from_epoch() > 1_704_067_200);
    }
}
