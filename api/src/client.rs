use crate::wire::{
    Envelope, RawMatch, RawNotice, RawPlayer, RawPost, RawSportRoster, RawTeamRef, RawTeams,
    RawTimelineEntry,
};
use crate::{
    HomeFeed, Match, MatchType, Notice, Player, Post, SportRoster, TeamDetail, TeamRef,
    TimelineEntry, TrustedHtml,
};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use log::{debug, warn};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000";
/// Upper bound for a single request, body included.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the site's public JSON API.
#[derive(Debug, Clone)]
pub struct LiveApi {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl Default for LiveApi {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[derive(Debug)]
pub enum ApiError {
    InvalidUrl(String),
    /// Transport failure, timeouts included.
    Network(reqwest::Error, String),
    /// Non-success status. `message` is the server's `msg`, when it sent one.
    Api {
        status: StatusCode,
        url: String,
        message: Option<String>,
    },
    Parsing(reqwest::Error, String),
    /// Success status but no `data` in the envelope.
    MissingData(String),
    /// `data` was present but unusable (e.g. a match without a date).
    Malformed(String, String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidUrl(base) => write!(f, "Invalid API base URL: {base}"),
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Api { status, url, message } => match message {
                Some(msg) => write!(f, "API error {status} for {url}: {msg}"),
                None => write!(f, "API error {status} for {url}"),
            },
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::MissingData(url) => write!(f, "Response from {url} has no data"),
            ApiError::Malformed(reason, url) => write!(f, "Malformed data from {url}: {reason}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Api { status, .. } if *status == StatusCode::NOT_FOUND)
    }

    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Api { message: Some(msg), .. } if !msg.trim().is_empty() => Some(msg),
            _ => None,
        }
    }

    /// Bad payloads, as opposed to transport or status failures.
    pub fn is_invalid_payload(&self) -> bool {
        matches!(
            self,
            ApiError::Parsing(..) | ApiError::MissingData(_) | ApiError::Malformed(..)
        )
    }
}

impl LiveApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .user_agent(concat!("hitlive/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_default(),
            base_url: base_url.into(),
            timeout: REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /api/v1/live/match/{id}`
    pub async fn fetch_match(&self, match_id: &str) -> ApiResult<Match> {
        let url = self.endpoint(&["live", "match", match_id])?;
        let url_str = url.to_string();
        let raw: RawMatch = self.get_data(url).await?;
        map_match(raw).map_err(|reason| ApiError::Malformed(reason, url_str))
    }

    /// `GET /api/v1/live/match?limit=N&page=P`. Entries that cannot be mapped
    /// are skipped rather than failing the whole page.
    pub async fn fetch_matches(&self, limit: u32, page: u32) -> ApiResult<Vec<Match>> {
        let mut url = self.endpoint(&["live", "match"])?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("page", &page.to_string());
        let raw: Vec<Value> = self.get_data(url).await?;
        let matches = raw
            .into_iter()
            .filter_map(|entry| {
                serde_json::from_value::<RawMatch>(entry)
                    .map_err(|e| e.to_string())
                    .and_then(map_match)
                    .inspect_err(|reason| warn!("skipping match in list: {reason}"))
                    .ok()
            })
            .collect();
        Ok(matches)
    }

    /// `GET /api/v1/team/{code}`. The returned detail is keyed by `code`.
    pub async fn fetch_team(&self, code: &str) -> ApiResult<TeamDetail> {
        let url = self.endpoint(&["team", code])?;
        let raw: RawTeams = self.get_data(url).await?;
        Ok(map_team(code, raw))
    }

    /// `GET /api/v1/posts/featured` (bare object, no envelope).
    pub async fn fetch_featured_post(&self) -> ApiResult<Post> {
        let url = self.endpoint(&["posts", "featured"])?;
        let raw: RawPost = self.get_json(url).await?;
        Ok(map_post(raw))
    }

    /// `GET /api/v1/notice` (bare array, oldest first).
    pub async fn fetch_notices(&self) -> ApiResult<Vec<Notice>> {
        let url = self.endpoint(&["notice"])?;
        let raw: Vec<RawNotice> = self.get_json(url).await?;
        Ok(raw.into_iter().map(map_notice).collect())
    }

    /// The newest notice is the last element of the array.
    pub async fn fetch_latest_notice(&self) -> ApiResult<Option<Notice>> {
        let mut notices = self.fetch_notices().await?;
        Ok(notices.pop())
    }

    /// Featured post, latest notice and the first live match, loaded
    /// concurrently. Each part degrades to `None` on its own failure.
    pub async fn fetch_home(&self) -> HomeFeed {
        let (post, notice, matches) = futures_util::join!(
            self.fetch_featured_post(),
            self.fetch_latest_notice(),
            self.fetch_matches(1, 1),
        );

        HomeFeed {
            post: post
                .inspect_err(|e| debug!("featured post unavailable: {e}"))
                .ok(),
            notice: notice
                .inspect_err(|e| debug!("notice unavailable: {e}"))
                .ok()
                .flatten(),
            live_match: matches
                .inspect_err(|e| debug!("live match unavailable: {e}"))
                .ok()
                .and_then(|list| list.into_iter().find(|m| m.is_live)),
        }
    }

    fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(["api", "v1"])
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> ApiResult<T> {
        let url_str = url.to_string();
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url_str.clone()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<Envelope<Value>>()
                .await
                .ok()
                .and_then(|envelope| envelope.msg);
            return Err(ApiError::Api { status, url: url_str, message });
        }

        response.json::<T>().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Network(e, url_str)
            } else {
                ApiError::Parsing(e, url_str)
            }
        })
    }

    async fn get_data<T: DeserializeOwned>(&self, url: Url) -> ApiResult<T> {
        let url_str = url.to_string();
        let envelope: Envelope<T> = self.get_json(url).await?;
        envelope.data.ok_or(ApiError::MissingData(url_str))
    }
}

// ---------------------------------------------------------------------------
// Mapping: wire types → clean domain types
// ---------------------------------------------------------------------------

fn map_match(raw: RawMatch) -> Result<Match, String> {
    let id = raw.firebase_match_id.unwrap_or_default();
    let date = parse_timestamp(&raw.match_date)
        .ok_or_else(|| format!("match '{id}' has no usable match_date"))?;
    let timeline = raw
        .timeline
        .into_iter()
        .filter_map(|entry| map_timeline_entry(&id, entry))
        .collect();

    Ok(Match {
        match_type: MatchType::parse(raw.match_type.as_deref().unwrap_or_default()),
        date,
        is_live: raw.is_live.unwrap_or(false),
        status: raw.match_status,
        team1: map_team_ref(raw.team1),
        team2: map_team_ref(raw.team2),
        timeline,
        id,
    })
}

fn map_team_ref(raw: RawTeamRef) -> TeamRef {
    TeamRef {
        code: raw.team_code.unwrap_or_default(),
        name: raw.team_name,
        score: display_value(&raw.team_score).unwrap_or_default(),
        penalty: display_value(&raw.team_penalty),
    }
}

fn map_timeline_entry(match_id: &str, raw: RawTimelineEntry) -> Option<TimelineEntry> {
    let id = raw.firebase_timeline_id.unwrap_or_default();
    let Some(at) = parse_timestamp(&raw.timeline_date) else {
        warn!("dropping timeline entry '{id}' of match '{match_id}': bad timeline_date");
        return None;
    };
    Some(TimelineEntry { id, at, html: TrustedHtml::new(raw.msg_html) })
}

fn map_team(code: &str, raw: RawTeams) -> TeamDetail {
    if let Some(returned) = raw.team_code.as_deref()
        && returned != code
    {
        debug!("team endpoint for '{code}' returned code '{returned}'");
    }
    TeamDetail {
        code: code.to_owned(),
        football: raw.football.map(map_sport_roster),
        cricket: raw.cricket.map(map_sport_roster),
    }
}

fn map_sport_roster(raw: RawSportRoster) -> SportRoster {
    SportRoster {
        team_name: raw.team_name.unwrap_or_default(),
        logo: raw.team_logo.filter(|l| !l.trim().is_empty()),
        players: raw.players.into_iter().map(map_player).collect(),
    }
}

fn map_player(raw: RawPlayer) -> Player {
    Player {
        name: raw.player_name.unwrap_or_default(),
        description: raw.player_description.filter(|d| !d.is_empty()),
        image: raw.player_image.filter(|i| !i.trim().is_empty()),
    }
}

fn map_notice(raw: RawNotice) -> Notice {
    Notice {
        title: raw.notice_title,
        link: raw.notice_link.filter(|l| !l.trim().is_empty()),
    }
}

fn map_post(raw: RawPost) -> Post {
    let id = match &raw.id {
        Value::String(s) => s.clone(),
        Value::Object(obj) => obj
            .get("$oid")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned(),
        Value::Null => String::new(),
        other => other.to_string(),
    };
    Post {
        id,
        title: raw.title.unwrap_or_default(),
        description: raw.description,
        author: raw.author,
    }
}

/// Score-like values: strings and numbers become display text. Empty strings,
/// zero and anything else count as "not set".
fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}

/// RFC 3339, naive date-times (viewer's local time), bare dates (UTC
/// midnight), or epoch milliseconds.
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => DateTime::from_timestamp_millis(n.as_i64()?),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
                if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
                    return Local
                        .from_local_datetime(&naive)
                        .earliest()
                        .map(|dt| dt.with_timezone(&Utc));
                }
            }
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        }
        _ => None,
    }
}
