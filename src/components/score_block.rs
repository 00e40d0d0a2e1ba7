use hitlive_api::{Match, TeamRef};
use tui::buffer::Buffer;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Paragraph, Widget};

/// Header of the detail screen: both sides, scores and the match status.
pub struct ScoreBlock<'a> {
    pub item: &'a Match,
}

/// "3", or "1 (4)" when a penalty score was recorded.
pub fn score_text(team: &TeamRef) -> String {
    match team.penalty.as_deref() {
        Some(penalty) => format!("{} ({penalty})", team.score_label()),
        None => team.score_label().to_string(),
    }
}

pub fn status_style(item: &Match) -> Style {
    if item.is_live {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

impl Widget for ScoreBlock<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let [names, scores, status] =
            Layout::vertical([Constraint::Length(1), Constraint::Length(1), Constraint::Length(1)])
                .areas(area);
        let [left_name, mid_name, right_name] = thirds(names);
        let [left_score, mid_score, right_score] = thirds(scores);

        let bold = Style::default().add_modifier(Modifier::BOLD);
        Paragraph::new(self.item.team1.label())
            .style(bold)
            .alignment(Alignment::Center)
            .render(left_name, buf);
        Paragraph::new("vs")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .render(mid_name, buf);
        Paragraph::new(self.item.team2.label())
            .style(bold)
            .alignment(Alignment::Center)
            .render(right_name, buf);

        Paragraph::new(score_text(&self.item.team1))
            .style(bold.fg(Color::Yellow))
            .alignment(Alignment::Center)
            .render(left_score, buf);
        Paragraph::new(self.item.match_type.label())
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center)
            .render(mid_score, buf);
        Paragraph::new(score_text(&self.item.team2))
            .style(bold.fg(Color::Yellow))
            .alignment(Alignment::Center)
            .render(right_score, buf);

        let status_line = Line::from(vec![
            Span::styled(self.item.status_label().to_string(), status_style(self.item)),
            Span::raw("  ·  "),
            Span::styled(self.item.date_label(), Style::default().fg(Color::Gray)),
        ]);
        Paragraph::new(status_line)
            .alignment(Alignment::Center)
            .render(status, buf);
    }
}

fn thirds(area: Rect) -> [Rect; 3] {
    Layout::horizontal([
        Constraint::Percentage(40),
        Constraint::Percentage(20),
        Constraint::Percentage(40),
    ])
    .areas(area)
}
