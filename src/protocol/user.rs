//! Listener account operations.

use serde::{Deserialize, Serialize};

use super::{
    bookmark::{ArtistBookmark, SongBookmark},
    Method,
};
use crate::{client::Pandora, error::Result, session::Session};

#[derive(Clone, Serialize)]
pub struct GetBookmarks {}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Bookmarks {
    #[serde(default)]
    pub artists: Vec<ArtistBookmark>,

    #[serde(default)]
    pub songs: Vec<SongBookmark>,
}

impl Method for Bookmarks {
    const NAME: &'static str = "user.getBookmarks";
}

#[derive(Clone, Serialize)]
pub struct GetSettings {}

/// Account settings relevant to playback.
///
/// The service returns many more fields; unknown ones are ignored.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub is_explicit_content_filter_enabled: bool,

    #[serde(default)]
    pub is_explicit_content_filter_pin_protected: bool,

    #[serde(default)]
    pub username: Option<String>,
}

impl Method for Settings {
    const NAME: &'static str = "user.getSettings";
}

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepSong<'a> {
    pub track_token: &'a str,
}

/// `user.sleepSong` returns an empty result.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct SongSlept;

impl Method for SongSlept {
    const NAME: &'static str = "user.sleepSong";
}

impl Pandora {
    /// Fetches the listener's artist and song bookmarks.
    pub async fn bookmarks(&self, session: &Session) -> Result<Bookmarks> {
        self.call(session, &GetBookmarks {}).await
    }

    /// Fetches the listener's account settings.
    pub async fn settings(&self, session: &Session) -> Result<Settings> {
        self.call(session, &GetSettings {}).await
    }

    /// Suppresses a track for a month.
    pub async fn sleep_song(&self, session: &Session, track_token: &str) -> Result<SongSlept> {
        self.call(session, &SleepSong { track_token }).await
    }
}
