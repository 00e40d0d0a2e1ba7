use hitlive_api::roster::{self, Role};
use hitlive_api::{MatchType, Player, SportRoster, TeamDetail, TeamRef, images};
use tui::buffer::Buffer;
use tui::layout::Rect;
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, Paragraph, Widget, Wrap};

/// Roster panel for one side of a match.
pub struct TeamCard<'a> {
    pub team: &'a TeamRef,
    pub roster: &'a SportRoster,
    pub block: Block<'a>,
}

impl<'a> TeamCard<'a> {
    /// `None` when the roster cache has no entry for the team (not fetched
    /// yet, or the fetch failed) or the team has no roster for this sport.
    pub fn for_team(
        team: &'a TeamRef,
        sport: MatchType,
        detail: Option<&'a TeamDetail>,
        block: Block<'a>,
    ) -> Option<Self> {
        let roster = detail?.roster(sport)?;
        Some(Self { team, roster, block })
    }
}

pub fn card_lines(team: &TeamRef, roster: &SportRoster) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        team.label(),
        Style::default().add_modifier(Modifier::BOLD),
    ))];

    if !roster.team_name.is_empty() && roster.team_name != team.label() {
        lines.push(Line::styled(roster.team_name.clone(), Style::default().fg(Color::Gray)));
    }
    push_image(&mut lines, "logo", roster.logo.as_deref());
    lines.push(Line::raw(""));

    let summary = roster::summarize(roster);
    for leader in [summary.captain, summary.vice_captain].into_iter().flatten() {
        push_player(&mut lines, leader);
    }
    for player in summary.featured {
        push_player(&mut lines, player);
    }
    lines
}

fn push_player(lines: &mut Vec<Line<'static>>, player: &Player) {
    let role = player.role();
    let mut spans = vec![Span::raw(player.name.clone())];
    if role != Role::Member {
        spans.push(Span::styled(
            format!(" ({})", role.label()),
            Style::default().fg(Color::Yellow),
        ));
    }
    lines.push(Line::from(spans));
    if let Some(desc) = player.description.as_deref().filter(|d| !d.trim().is_empty()) {
        lines.push(Line::styled(format!("  {desc}"), Style::default().fg(Color::Gray)));
    }
    push_image(lines, "  photo", player.image.as_deref());
}

/// Images are link lines; a reference that normalizes to nothing hides the line.
fn push_image(lines: &mut Vec<Line<'static>>, label: &str, reference: Option<&str>) {
    if let Some(url) = images::normalize(reference) {
        lines.push(Line::styled(format!("{label}: {url}"), Style::default().fg(Color::Blue)));
    }
}

impl Widget for TeamCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(card_lines(self.team, self.roster))
            .block(self.block)
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(lines: &[Line]) -> Vec<String> {
        lines.iter().map(|l| l.to_string()).collect()
    }

    fn cse() -> TeamRef {
        TeamRef { code: "CSE".into(), ..TeamRef::default() }
    }

    fn detail(logo: Option<&str>, players: Vec<Player>) -> TeamDetail {
        TeamDetail {
            code: "CSE".into(),
            football: Some(SportRoster {
                team_name: "Code Strikers".into(),
                logo: logo.map(str::to_owned),
                players,
            }),
            cricket: None,
        }
    }

    fn player(name: &str, desc: &str, image: Option<&str>) -> Player {
        Player {
            name: name.into(),
            description: Some(desc.into()),
            image: image.map(str::to_owned),
        }
    }

    #[test]
    fn no_card_without_a_cached_roster_for_the_sport() {
        let team = cse();
        assert!(TeamCard::for_team(&team, MatchType::Football, None, Block::default()).is_none());

        let football_only = detail(None, vec![]);
        assert!(TeamCard::for_team(&team, MatchType::Cricket, Some(&football_only), Block::default()).is_none());
        assert!(TeamCard::for_team(&team, MatchType::Football, Some(&football_only), Block::default()).is_some());
    }

    #[test]
    fn drive_links_are_rewritten_and_missing_images_hidden() {
        let d = detail(
            Some("https://drive.google.com/file/d/LOGO1/view"),
            vec![
                player("Asha", "Captain", Some("https://drive.google.com/open?id=PIC9")),
                player("Ravi", "Striker", Some("")),
            ],
        );
        let lines = text(&card_lines(&cse(), d.football.as_ref().unwrap()));
        assert!(lines.contains(&"logo: https://drive.google.com/uc?export=view&id=LOGO1".to_string()));
        assert!(lines.contains(&"  photo: https://drive.google.com/uc?export=view&id=PIC9".to_string()));
        assert_eq!(lines.iter().filter(|l| l.contains("photo")).count(), 1);
    }

    #[test]
    fn captain_is_listed_before_other_players() {
        let d = detail(
            None,
            vec![
                player("Ravi", "Striker", None),
                player("Asha", "Team captain", None),
                player("Meera", "Vice-captain", None),
            ],
        );
        let lines = text(&card_lines(&cse(), d.football.as_ref().unwrap()));
        let names: Vec<&String> = lines
            .iter()
            .filter(|l| !l.starts_with(' ') && !l.is_empty())
            .skip(2)
            .collect();
        assert_eq!(names, vec!["Asha (Captain)", "Meera (Vice Captain)", "Ravi"]);
    }
}
