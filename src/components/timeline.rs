use hitlive_api::timeline::reconcile;
use hitlive_api::{TimelineEntry, format_local};
use tui::buffer::Buffer;
use tui::layout::Rect;
use tui::style::{Color, Style};
use tui::text::{Line, Span};
use tui::widgets::{Paragraph, Widget, Wrap};

pub const EMPTY_TIMELINE: &str = "No updates yet.";

/// Live commentary, newest first.
pub struct TimelineView<'a> {
    pub entries: &'a [TimelineEntry],
    pub scroll_offset: u16,
}

/// One block per entry: a timestamp line, the entry's text, a blank spacer.
pub fn timeline_lines(entries: &[TimelineEntry]) -> Vec<Line<'static>> {
    if entries.is_empty() {
        return vec![Line::styled(EMPTY_TIMELINE, Style::default().fg(Color::DarkGray))];
    }

    let mut lines = Vec::new();
    for entry in reconcile(entries) {
        lines.push(Line::from(Span::styled(
            format_local(entry.at),
            Style::default().fg(Color::Cyan),
        )));
        lines.extend(entry.html.to_plain_text().lines().map(|l| Line::raw(l.to_string())));
        lines.push(Line::raw(""));
    }
    lines
}

impl Widget for TimelineView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(timeline_lines(self.entries))
            .wrap(Wrap { trim: false })
            .scroll((self.scroll_offset, 0))
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use hitlive_api::TrustedHtml;

    fn entry(id: &str, minute: u32, html: &str) -> TimelineEntry {
        TimelineEntry {
            id: id.into(),
            at: Utc.with_ymd_and_hms(2024, 3, 2, 10, minute, 0).unwrap(),
            html: TrustedHtml::new(html),
        }
    }

    fn text(lines: &[Line]) -> Vec<String> {
        lines.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn newest_entry_is_rendered_first_as_plain_text() {
        let entries = vec![
            entry("a", 1, "<p>Kick-off</p>"),
            entry("b", 30, "<b>GOAL</b> &amp; celebrations"),
        ];
        let rendered = text(&timeline_lines(&entries));
        assert_eq!(rendered[1], "GOAL & celebrations");
        assert_eq!(rendered[4], "Kick-off");
    }

    #[test]
    fn empty_timeline_has_a_placeholder() {
        assert_eq!(text(&timeline_lines(&[])), vec![EMPTY_TIMELINE.to_string()]);
    }
}
