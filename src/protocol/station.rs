//! Station operations: listing, inspection, playlists and feedback.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};

use super::Method;
use crate::{client::Pandora, error::Result, session::Session};

/// A radio station owned by the listener.
#[serde_as]
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    /// Numeric id, sent by the service as a decimal string.
    #[serde_as(as = "DisplayFromStr")]
    pub station_id: u64,

    pub station_token: String,
    pub station_name: String,

    #[serde(default)]
    pub is_quick_mix: bool,

    #[serde(default)]
    pub art_url: Option<String>,
}

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetStationList {
    pub include_station_art_url: bool,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StationList {
    pub stations: Vec<Station>,

    /// Changes whenever the station list changes; callers can poll it
    /// cheaply instead of refetching the list.
    #[serde(default)]
    pub checksum: Option<String>,
}

impl Method for StationList {
    const NAME: &'static str = "user.getStationList";
}

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetStation<'a> {
    pub station_token: &'a str,
    pub include_extended_attributes: bool,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct StationInfo(pub Station);

impl Method for StationInfo {
    const NAME: &'static str = "station.getStation";
}

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetPlaylist<'a> {
    pub station_token: &'a str,

    /// Comma-separated extra URL kinds to include in the audio map.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_audio_url: Option<&'a str>,
}

/// One fragment of a station playlist: a handful of tracks, occasionally
/// interleaved with ad placeholders.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub items: Vec<PlaylistItem>,
}

impl Method for Playlist {
    const NAME: &'static str = "station.getPlaylist";
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItem {
    #[serde(default)]
    pub track_token: Option<String>,

    #[serde(default)]
    pub song_name: Option<String>,

    #[serde(default)]
    pub artist_name: Option<String>,

    #[serde(default)]
    pub album_name: Option<String>,

    /// Stream URLs keyed by quality preset.
    #[serde(default)]
    pub audio_url_map: HashMap<String, AudioStream>,

    /// Present on ad placeholders instead of a track token.
    #[serde(default)]
    pub ad_token: Option<String>,
}

impl PlaylistItem {
    /// Whether this item is an ad placeholder rather than a track.
    #[must_use]
    pub fn is_ad(&self) -> bool {
        self.ad_token.is_some()
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AudioStream {
    pub audio_url: String,

    #[serde(default)]
    pub bitrate: Option<String>,

    #[serde(default)]
    pub encoding: Option<String>,
}

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddFeedback<'a> {
    pub station_token: &'a str,
    pub track_token: &'a str,
    pub is_positive: bool,
}

#[serde_as]
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    #[serde_as(as = "DisplayFromStr")]
    pub feedback_id: u64,
    pub is_positive: bool,
}

impl Method for Feedback {
    const NAME: &'static str = "station.addFeedback";
}

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStation<'a> {
    /// Token from a music search result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub music_token: Option<&'a str>,

    /// Token of a playing track to seed from instead.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_token: Option<&'a str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub music_type: Option<&'a str>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct CreatedStation(pub Station);

impl Method for CreatedStation {
    const NAME: &'static str = "station.createStation";
}

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteStation<'a> {
    pub station_token: &'a str,
}

/// `station.deleteStation` returns an empty result.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct StationDeleted;

impl Method for StationDeleted {
    const NAME: &'static str = "station.deleteStation";
}

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameStation<'a> {
    pub station_token: &'a str,
    pub station_name: &'a str,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct RenamedStation(pub Station);

impl Method for RenamedStation {
    const NAME: &'static str = "station.renameStation";
}

impl Pandora {
    /// Fetches the listener's stations.
    pub async fn station_list(&self, session: &Session) -> Result<StationList> {
        self.call(
            session,
            &GetStationList {
                include_station_art_url: true,
            },
        )
        .await
    }

    /// Fetches one station with extended attributes.
    pub async fn station(&self, session: &Session, station_token: &str) -> Result<StationInfo> {
        self.call(
            session,
            &GetStation {
                station_token,
                include_extended_attributes: true,
            },
        )
        .await
    }

    /// Fetches the next playlist fragment for a station.
    pub async fn playlist(&self, session: &Session, station_token: &str) -> Result<Playlist> {
        self.call(
            session,
            &GetPlaylist {
                station_token,
                additional_audio_url: None,
            },
        )
        .await
    }

    /// Rates a track up or down on its station.
    pub async fn add_feedback(
        &self,
        session: &Session,
        station_token: &str,
        track_token: &str,
        is_positive: bool,
    ) -> Result<Feedback> {
        self.call(
            session,
            &AddFeedback {
                station_token,
                track_token,
                is_positive,
            },
        )
        .await
    }

    /// Creates a station from a music search token.
    pub async fn create_station(
        &self,
        session: &Session,
        music_token: &str,
    ) -> Result<CreatedStation> {
        self.call(
            session,
            &CreateStation {
                music_token: Some(music_token),
                track_token: None,
                music_type: None,
            },
        )
        .await
    }

    /// Deletes a station.
    pub async fn delete_station(
        &self,
        session: &Session,
        station_token: &str,
    ) -> Result<StationDeleted> {
        self.call(session, &DeleteStation { station_token }).await
    }

    /// Renames a station.
    pub async fn rename_station(
        &self,
        session: &Session,
        station_token: &str,
        station_name: &str,
    ) -> Result<RenamedStation> {
        self.call(
            session,
            &RenameStation {
                station_token,
                station_name,
            },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn station_parses_stringly_numeric_id() {
        let station: Station = serde_json::from_str(
            r#"{
                "stationId": "3914377363925265",
                "stationToken": "tok",
                "stationName": "Quick Mix",
                "isQuickMix": true
            }"#,
        )
        .unwrap();
        assert_eq!(station.station_id, 3_914_377_363_925_265);
        assert!(station.is_quick_mix);
        assert_eq!(station.art_url, None);
    }

    #[test]
    fn playlist_distinguishes_ads_from_tracks() {
        let playlist: Playlist = serde_json::from_str(
            r#"{
                "items": [
                    {"adToken": "ad-123"},
                    {
                        "trackToken": "tr-456",
                        "songName": "Hallowed Ground",
                        "artistName": "Vio-lence",
                        "audioUrlMap": {
                            "highQuality": {
                                "audioUrl": "https://audio.example/hq",
                                "bitrate": "192",
                                "encoding": "mp3"
                            }
                        }
                    }
                ]
            }"#,
        )
        .unwrap();

        assert!(playlist.items[0].is_ad());
        assert!(!playlist.items[1].is_ad());
        assert_eq!(
            playlist.items[1].audio_url_map["highQuality"].audio_url,
            "https://audio.example/hq"
        );
    }

    #[test]
    fn empty_result_methods_deserialize_from_null() {
        let deleted: StationDeleted = serde_json::from_value(serde_json::Value::Null).unwrap();
        assert_eq!(deleted, StationDeleted);
    }
}
