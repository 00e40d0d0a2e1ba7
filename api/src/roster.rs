//! Role detection for the team panels.
//!
//! Roles are not structured data: they are inferred from the free-text player
//! description.
use crate::{Player, SportRoster};
use regex::Regex;
use std::sync::LazyLock;

/// Non-captain players listed on a team card.
pub const FEATURED_LIMIT: usize = 4;

static CAPTAIN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)captain").unwrap());
static VICE_CAPTAIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)vice[\s-]*captain|vc\b").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Captain,
    ViceCaptain,
    Member,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::Captain => "Captain",
            Role::ViceCaptain => "Vice Captain",
            Role::Member => "",
        }
    }
}

impl Player {
    pub fn role(&self) -> Role {
        let desc = self.description.as_deref().unwrap_or_default();
        if VICE_CAPTAIN.is_match(desc) {
            Role::ViceCaptain
        } else if CAPTAIN.is_match(desc) {
            Role::Captain
        } else {
            Role::Member
        }
    }
}

#[derive(Debug)]
pub struct RosterSummary<'a> {
    pub captain: Option<&'a Player>,
    pub vice_captain: Option<&'a Player>,
    pub featured: Vec<&'a Player>,
}

/// First captain, first vice captain, then up to `FEATURED_LIMIT` other
/// players that have a name or a description.
pub fn summarize(roster: &SportRoster) -> RosterSummary<'_> {
    let captain = roster.players.iter().find(|p| p.role() == Role::Captain);
    let vice_captain = roster.players.iter().find(|p| p.role() == Role::ViceCaptain);
    let is_leader = |p: &Player| {
        captain.is_some_and(|c| std::ptr::eq(c, p)) || vice_captain.is_some_and(|v| std::ptr::eq(v, p))
    };

    let featured = roster
        .players
        .iter()
        .filter(|p| !is_leader(*p))
        .filter(|p| !p.name.is_empty() || p.description.as_deref().is_some_and(|d| !d.is_empty()))
        .take(FEATURED_LIMIT)
        .collect();

    RosterSummary { captain, vice_captain, featured }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(name: &str, desc: Option<&str>) -> Player {
        Player { name: name.into(), description: desc.map(str::to_owned), image: None }
    }

    #[test]
    fn detects_roles_from_description() {
        assert_eq!(player("a", Some("Team CAPTAIN")).role(), Role::Captain);
        assert_eq!(player("b", Some("vice-captain")).role(), Role::ViceCaptain);
        assert_eq!(player("b", Some("Vice Captain")).role(), Role::ViceCaptain);
        assert_eq!(player("c", Some("vicecaptain, keeper")).role(), Role::ViceCaptain);
        assert_eq!(player("d", Some("Batsman (VC)")).role(), Role::ViceCaptain);
        assert_eq!(player("e", Some("striker")).role(), Role::Member);
        assert_eq!(player("f", None).role(), Role::Member);
    }

    #[test]
    fn vice_captain_listed_first_is_not_taken_as_captain() {
        let roster = SportRoster {
            team_name: "CSE".into(),
            logo: None,
            players: vec![player("Vic", Some("vice captain")), player("Cap", Some("captain"))],
        };
        let summary = summarize(&roster);
        assert_eq!(summary.captain.map(|p| p.name.as_str()), Some("Cap"));
        assert_eq!(summary.vice_captain.map(|p| p.name.as_str()), Some("Vic"));
        assert!(summary.featured.is_empty());
    }

    #[test]
    fn featured_excludes_leaders_and_blank_entries_and_is_capped() {
        let mut players = vec![player("Cap", Some("Captain")), player("", None)];
        players.extend((1..=6).map(|i| player(&format!("P{i}"), None)));
        let roster = SportRoster { team_name: "IT".into(), logo: None, players };
        let summary = summarize(&roster);
        let names: Vec<&str> = summary.featured.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["P1", "P2", "P3", "P4"]);
        assert!(summary.vice_captain.is_none());
    }
}
