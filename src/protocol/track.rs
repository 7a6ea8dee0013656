//! Track explanations ("why this track is playing").

use serde::{Deserialize, Serialize};

use super::Method;
use crate::{client::Pandora, error::Result, session::Session};

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplainTrack<'a> {
    pub track_token: &'a str,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrackExplanation {
    #[serde(default)]
    pub explanations: Vec<Explanation>,
}

impl Method for TrackExplanation {
    const NAME: &'static str = "track.explainTrack";
}

/// One musicological trait the selection was based on.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Explanation {
    pub focus_trait_name: String,

    #[serde(default)]
    pub focus_trait_id: Option<String>,
}

impl Pandora {
    /// Asks why the given track was chosen for its station.
    pub async fn explain_track(
        &self,
        session: &Session,
        track_token: &str,
    ) -> Result<TrackExplanation> {
        self.call(session, &ExplainTrack { track_token }).await
    }
}
