//! Artist and song bookmarks.
//!
//! The response types double as the entries of
//! [`user.getBookmarks`](crate::protocol::user::Bookmarks).

use serde::{Deserialize, Serialize};

use super::Method;
use crate::{client::Pandora, error::Result, session::Session};

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddArtistBookmark<'a> {
    pub track_token: &'a str,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArtistBookmark {
    pub bookmark_token: String,
    pub artist_name: String,

    #[serde(default)]
    pub music_token: Option<String>,

    #[serde(default)]
    pub art_url: Option<String>,
}

impl Method for ArtistBookmark {
    const NAME: &'static str = "bookmark.addArtistBookmark";
}

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddSongBookmark<'a> {
    pub track_token: &'a str,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SongBookmark {
    pub bookmark_token: String,
    pub song_name: String,
    pub artist_name: String,

    #[serde(default)]
    pub album_name: Option<String>,

    #[serde(default)]
    pub music_token: Option<String>,
}

impl Method for SongBookmark {
    const NAME: &'static str = "bookmark.addSongBookmark";
}

impl Pandora {
    /// Bookmarks the artist of the given track.
    pub async fn add_artist_bookmark(
        &self,
        session: &Session,
        track_token: &str,
    ) -> Result<ArtistBookmark> {
        self.call(session, &AddArtistBookmark { track_token }).await
    }

    /// Bookmarks the given track.
    pub async fn add_song_bookmark(
        &self,
        session: &Session,
        track_token: &str,
    ) -> Result<SongBookmark> {
        self.call(session, &AddSongBookmark { track_token }).await
    }
}
