pub mod client;
pub mod filters;
pub mod images;
pub mod labels;
pub mod roster;
pub mod timeline;
pub mod wire;

use chrono::{DateTime, Local, Utc};

pub use timeline::TrustedHtml;

// ---------------------------------------------------------------------------
// Domain types — clean model, independent of the API wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MatchType {
    #[default]
    Football,
    Cricket,
    /// Any sport the client has no dedicated section for.
    Other,
}

impl MatchType {
    /// Sports that get their own section, in display order.
    pub const SECTIONS: [MatchType; 2] = [MatchType::Football, MatchType::Cricket];

    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "football" => MatchType::Football,
            "cricket" => MatchType::Cricket,
            _ => MatchType::Other,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MatchType::Football => "Football",
            MatchType::Cricket => "Cricket",
            MatchType::Other => "Other",
        }
    }

    /// Roster key used for the team panels: cricket matches read the cricket
    /// roster, everything else reads football.
    pub fn roster_sport(&self) -> MatchType {
        match self {
            MatchType::Cricket => MatchType::Cricket,
            _ => MatchType::Football,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub id: String,
    pub match_type: MatchType,
    pub date: DateTime<Utc>,
    pub is_live: bool,
    pub status: Option<String>,
    pub team1: TeamRef,
    pub team2: TeamRef,
    /// Arrival order; use `timeline::reconcile` for display order.
    pub timeline: Vec<TimelineEntry>,
}

impl Match {
    pub fn status_label(&self) -> &str {
        match self.status.as_deref() {
            Some(status) if !status.trim().is_empty() => status,
            _ if self.is_live => "Live",
            _ => "Completed",
        }
    }

    /// "May 1 · 03:30 PM" in the viewer's local time.
    pub fn date_label(&self) -> String {
        format_local(self.date)
    }

    /// Non-empty team codes of both sides, in side order.
    pub fn team_codes(&self) -> Vec<String> {
        [&self.team1, &self.team2]
            .into_iter()
            .map(|t| t.code.trim())
            .filter(|c| !c.is_empty())
            .map(str::to_owned)
            .collect()
    }
}

pub fn format_local(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%b %-d · %I:%M %p").to_string()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamRef {
    pub code: String,
    pub name: Option<String>,
    pub score: String,
    pub penalty: Option<String>,
}

impl TeamRef {
    pub fn label(&self) -> String {
        labels::resolve(&self.code, self.name.as_deref())
    }

    pub fn score_label(&self) -> &str {
        if self.score.trim().is_empty() { "0" } else { &self.score }
    }
}

/// Per-team roster payload, keyed by team code in the roster cache.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamDetail {
    pub code: String,
    pub football: Option<SportRoster>,
    pub cricket: Option<SportRoster>,
}

impl TeamDetail {
    pub fn roster(&self, sport: MatchType) -> Option<&SportRoster> {
        match sport.roster_sport() {
            MatchType::Cricket => self.cricket.as_ref(),
            _ => self.football.as_ref(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SportRoster {
    pub team_name: String,
    pub logo: Option<String>,
    pub players: Vec<Player>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Player {
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineEntry {
    pub id: String,
    pub at: DateTime<Utc>,
    pub html: TrustedHtml,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Notice {
    pub title: String,
    pub link: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub author: Option<String>,
}

/// Everything the home screen hero needs, loaded in one round.
#[derive(Debug, Clone, Default)]
pub struct HomeFeed {
    pub post: Option<Post>,
    pub notice: Option<Notice>,
    pub live_match: Option<Match>,
}

impl HomeFeed {
    /// The hero renders nothing when there is neither a live match nor a post.
    pub fn is_empty(&self) -> bool {
        self.post.is_none() && self.live_match.is_none()
    }
}
