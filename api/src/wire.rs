/// Raw wire types — serde shapes for the site's JSON API.
/// These map to the clean domain types in client.rs.
///
/// Fields are lenient on purpose: scores arrive as strings or numbers and
/// dates as ISO strings or epoch milliseconds, so both stay as raw JSON values
/// until mapping.
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// `null` reads as the field's default, same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// `{ data, msg }` wrapper used by the match and team endpoints.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
    pub msg: Option<String>,
}

// ---------------------------------------------------------------------------
// Matches
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct RawMatch {
    #[serde(default)]
    pub firebase_match_id: Option<String>,
    #[serde(default)]
    pub match_type: Option<String>,
    #[serde(default)]
    pub match_date: Value,
    #[serde(default)]
    pub is_live: Option<bool>,
    #[serde(default)]
    pub match_status: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub team1: RawTeamRef,
    #[serde(default, deserialize_with = "null_as_default")]
    pub team2: RawTeamRef,
    #[serde(default, deserialize_with = "null_as_default")]
    pub timeline: Vec<RawTimelineEntry>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct RawTeamRef {
    #[serde(default)]
    pub team_code: Option<String>,
    #[serde(default)]
    pub team_name: Option<String>,
    #[serde(default)]
    pub team_score: Value,
    #[serde(default)]
    pub team_penalty: Value,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct RawTimelineEntry {
    #[serde(default)]
    pub firebase_timeline_id: Option<String>,
    #[serde(default)]
    pub timeline_date: Value,
    #[serde(rename = "msgHtml", default, deserialize_with = "null_as_default")]
    pub msg_html: String,
}

// ---------------------------------------------------------------------------
// Teams
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct RawTeams {
    #[serde(default)]
    pub team_code: Option<String>,
    #[serde(default)]
    pub football: Option<RawSportRoster>,
    #[serde(default)]
    pub cricket: Option<RawSportRoster>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct RawSportRoster {
    #[serde(default)]
    pub team_name: Option<String>,
    #[serde(default)]
    pub team_logo: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub players: Vec<RawPlayer>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct RawPlayer {
    #[serde(default)]
    pub player_name: Option<String>,
    #[serde(default)]
    pub player_description: Option<String>,
    #[serde(default)]
    pub player_image: Option<String>,
}

// ---------------------------------------------------------------------------
// Home page: notices and featured post
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RawNotice {
    #[serde(default, deserialize_with = "null_as_default")]
    pub notice_title: String,
    #[serde(default)]
    pub notice_link: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct RawPost {
    #[serde(rename = "_id", default)]
    pub id: Value,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
}
