//! Catalog search, used to seed new stations.

use serde::{Deserialize, Serialize};

use super::Method;
use crate::{client::Pandora, error::Result, session::Session};

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Search<'a> {
    pub search_text: &'a str,
    pub include_near_matches: bool,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    #[serde(default)]
    pub songs: Vec<SongMatch>,

    #[serde(default)]
    pub artists: Vec<ArtistMatch>,

    /// Set when the query was close to, but not exactly, a known name.
    #[serde(default)]
    pub near_matches_available: bool,
}

impl Method for SearchResults {
    const NAME: &'static str = "music.search";
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SongMatch {
    /// Seed token for `station.createStation`.
    pub music_token: String,
    pub song_name: String,
    pub artist_name: String,

    /// Relevance, higher is better.
    #[serde(default)]
    pub score: i64,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArtistMatch {
    pub music_token: String,
    pub artist_name: String,

    #[serde(default)]
    pub score: i64,
}

impl Pandora {
    /// Searches the catalog for artists and songs matching `text`.
    pub async fn search(&self, session: &Session, text: &str) -> Result<SearchResults> {
        self.call(
            session,
            &Search {
                search_text: text,
                include_near_matches: true,
            },
        )
        .await
    }
}
