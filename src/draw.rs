use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, List, ListItem, ListState, Paragraph, Tabs, Wrap};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::{App, MenuItem};
use crate::components::score_block::{ScoreBlock, score_text, status_style};
use crate::components::team_card::TeamCard;
use crate::components::timeline::TimelineView;
use crate::state::app_state::{ListRow, MatchListState};
use crate::state::network::{ERROR_CHAR, LoadingState, SPINNER_CHARS};
use crate::state::sync::SyncSnapshot;
use crate::ui::layout::LayoutAreas;
use hitlive_api::{HomeFeed, Match};

static TABS: &[&str; 3] = &["Home", "Matches", "Match"];

const HELP_TEXT: &str = "q        quit
1 2 3    Home / Matches / Match
Esc      back to the match list (or close help)
j k      move selection or scroll the timeline
Enter    open the selected match
t        cycle sport filter (All, Football, Cricket)
y        cycle year filter for past matches
r        refresh now
f        toggle full screen
\"        toggle the log pane";

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    let result = terminal.draw(|f| {
        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

        if !app.settings.full_screen {
            draw_tabs(f, layout.tab_bar, app);
        }

        match app.state.active_tab {
            MenuItem::Home => draw_home(f, layout.main, app),
            MenuItem::Matches => draw_matches(f, layout.main, app),
            MenuItem::MatchDetail => draw_match_detail(f, layout.main, app),
            MenuItem::Help => draw_placeholder(f, layout.main, HELP_TEXT),
        }

        if let Some(logs) = layout.logs {
            draw_logs(f, logs);
        }

        draw_loading_spinner(f, f.area(), app, loading);
    });
    if let Err(e) = result {
        log::error!("draw failed: {e}");
    }
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let tab_index = match app.state.active_tab {
        MenuItem::Home => 0,
        MenuItem::Matches => 1,
        MenuItem::MatchDetail => 2,
        MenuItem::Help => match app.state.previous_tab {
            MenuItem::Matches => 1,
            MenuItem::MatchDetail => 2,
            _ => 0,
        },
    };

    let titles: Vec<Line> = TABS.iter().map(|t| Line::from(*t)).collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(tab_index)
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let help = Paragraph::new("Help: ? ")
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

// ---------------------------------------------------------------------------
// Home
// ---------------------------------------------------------------------------

fn draw_home(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Home ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(feed) = app.state.home.feed.as_ref() else {
        draw_message(f, inner, "Loading...");
        return;
    };

    let [notice_area, hero_area] =
        Layout::vertical([Constraint::Length(2), Constraint::Fill(1)]).areas(inner);
    if let Some(notice) = feed.notice.as_ref() {
        let mut spans = vec![
            Span::styled("Notice: ", Style::default().fg(Color::Yellow)),
            Span::raw(notice.title.clone()),
        ];
        if let Some(link) = notice.link.as_deref().filter(|l| !l.is_empty()) {
            spans.push(Span::styled(format!("  {link}"), Style::default().fg(Color::Blue)));
        }
        f.render_widget(Paragraph::new(Line::from(spans)), notice_area);
    }

    draw_hero(f, hero_area, feed);
}

/// The first live match wins over the featured post. With neither, nothing.
fn draw_hero(f: &mut Frame, area: Rect, feed: &HomeFeed) {
    if let Some(live) = feed.live_match.as_ref() {
        let block = default_border(Color::Red).title(" Live now ");
        let inner = block.inner(area);
        f.render_widget(block, area);
        let [score, hint] =
            Layout::vertical([Constraint::Length(3), Constraint::Length(2)]).areas(inner);
        f.render_widget(ScoreBlock { item: live }, score);
        f.render_widget(
            Paragraph::new("Enter: follow this match")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            hint,
        );
        return;
    }

    let Some(post) = feed.post.as_ref() else {
        return;
    };
    let mut lines = vec![Line::from(Span::styled(
        post.title.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    if let Some(author) = post.author.as_deref().filter(|a| !a.is_empty()) {
        lines.push(Line::styled(format!("by {author}"), Style::default().fg(Color::Gray)));
    }
    lines.push(Line::raw(""));
    if let Some(description) = post.description.as_deref() {
        lines.extend(description.lines().map(|l| Line::raw(l.to_string())));
    }
    f.render_widget(
        Paragraph::new(lines)
            .block(default_border(Color::DarkGray).title(" Featured "))
            .wrap(Wrap { trim: true }),
        area,
    );
}

// ---------------------------------------------------------------------------
// Match list
// ---------------------------------------------------------------------------

fn draw_matches(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Matches ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(sync) = app.list_sync.as_ref() else {
        draw_message(f, inner, "Match list is not running.");
        return;
    };
    let snapshot = sync.snapshot().clone();

    let [header, key_legend, content] =
        Layout::vertical([Constraint::Length(1), Constraint::Length(1), Constraint::Fill(1)]).areas(inner);

    let filters = &app.state.match_list;
    let mut header_spans = vec![Span::raw(format!(
        "Sport: {}  |  Year: {}",
        filters.sport.label(),
        filters.year.label()
    ))];
    if snapshot.is_refreshing() {
        header_spans.push(Span::styled("  refreshing...", Style::default().fg(Color::Yellow)));
    }
    f.render_widget(Paragraph::new(Line::from(header_spans)), header);
    f.render_widget(
        Paragraph::new("Keys: j/k=move  Enter=open  t=sport  y=year  r=refresh  ?=help")
            .style(Style::default().fg(Color::DarkGray)),
        key_legend,
    );

    if let Some(err) = snapshot.blocking_error() {
        draw_message(f, content, err);
        return;
    }
    let Some(matches) = snapshot.data.as_deref() else {
        draw_message(f, content, "Loading matches...");
        return;
    };

    draw_match_rows(f, content, filters, matches);
}

fn draw_match_rows(f: &mut Frame, area: Rect, filters: &MatchListState, matches: &[Match]) {
    let rows = filters.rows(matches);
    if rows.is_empty() {
        draw_message(f, area, "No matches for these filters.");
        return;
    }

    let heading = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let sub_heading = Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC);

    let mut items = Vec::with_capacity(rows.len() + 6);
    let mut selected_item = None;
    let mut previous: Option<&ListRow> = None;
    for (idx, row) in rows.iter().enumerate() {
        if previous.is_none_or(|p| p.section != row.section) {
            items.push(ListItem::new(Line::styled(row.section.title(), heading)));
        }
        if previous.is_none_or(|p| p.section != row.section || p.sport != row.sport) {
            items.push(ListItem::new(Line::styled(format!("  {}", row.sport.label()), sub_heading)));
        }
        if idx == filters.selected {
            selected_item = Some(items.len());
        }
        items.push(ListItem::new(match_row_line(row.item)));
        previous = Some(row);
    }

    let list = List::new(items)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default().with_selected(selected_item);
    f.render_stateful_widget(list, area, &mut state);
}

fn match_row_line(item: &Match) -> Line<'static> {
    Line::from(vec![
        Span::raw(format!(
            "{}  {} - {}  {}",
            item.team1.label(),
            score_text(&item.team1),
            score_text(&item.team2),
            item.team2.label()
        )),
        Span::raw("   "),
        Span::styled(item.status_label().to_string(), status_style(item)),
        Span::styled(format!("  {}", item.date_label()), Style::default().fg(Color::DarkGray)),
    ])
}

// ---------------------------------------------------------------------------
// Match detail
// ---------------------------------------------------------------------------

fn draw_match_detail(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Match ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(sync) = app.detail_sync.as_ref() else {
        draw_message(f, inner, "Select a match in Matches and press Enter");
        return;
    };
    let snapshot = sync.snapshot().clone();

    if let Some(err) = snapshot.blocking_error() {
        draw_detail_error(f, inner, err);
        return;
    }
    let Some(item) = snapshot.data.as_ref() else {
        draw_message(f, inner, "Loading match...");
        return;
    };

    let [score_area, status_area, body] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Fill(1),
    ])
    .areas(inner);
    f.render_widget(ScoreBlock { item }, score_area);

    if snapshot.is_refreshing() {
        let status = Span::styled("refreshing...", Style::default().fg(Color::Yellow));
        f.render_widget(Paragraph::new(Line::from(status)).alignment(Alignment::Center), status_area);
    }

    let team1 = app.roster.get(&item.team1.code);
    let team2 = app.roster.get(&item.team2.code);
    let card1 = TeamCard::for_team(&item.team1, item.match_type, team1.as_deref(), default_border(Color::DarkGray));
    let card2 = TeamCard::for_team(&item.team2, item.match_type, team2.as_deref(), default_border(Color::DarkGray));
    let timeline = TimelineView {
        entries: &item.timeline,
        scroll_offset: app.state.match_detail.scroll_offset,
    };
    let timeline_block = default_border(Color::Gray).title(" Timeline (j/k) ");

    if body.width >= 100 {
        let [left, center, right] = Layout::horizontal([
            Constraint::Percentage(28),
            Constraint::Percentage(44),
            Constraint::Percentage(28),
        ])
        .areas(body);
        render_card(f, card1, left);
        render_card(f, card2, right);
        let timeline_inner = timeline_block.inner(center);
        f.render_widget(timeline_block, center);
        f.render_widget(timeline, timeline_inner);
    } else {
        let [top, bottom] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(12)]).areas(body);
        let [left, right] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(bottom);
        let timeline_inner = timeline_block.inner(top);
        f.render_widget(timeline_block, top);
        f.render_widget(timeline, timeline_inner);
        render_card(f, card1, left);
        render_card(f, card2, right);
    }
}

/// A team without a cached roster leaves its slot empty.
fn render_card(f: &mut Frame, card: Option<TeamCard>, area: Rect) {
    if let Some(card) = card {
        f.render_widget(card, area);
    }
}

/// The error with a way back.
fn draw_detail_error(f: &mut Frame, area: Rect, err: &str) {
    let lines = vec![
        Line::styled(err.to_string(), Style::default().fg(Color::Red)),
        Line::raw(""),
        Line::styled("Esc: back to matches", Style::default().fg(Color::DarkGray)),
    ];
    f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}

// ---------------------------------------------------------------------------
// Shared pieces
// ---------------------------------------------------------------------------

fn draw_message(f: &mut Frame, area: Rect, msg: &str) {
    f.render_widget(
        Paragraph::new(msg)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center),
        area,
    );
}

fn draw_placeholder(f: &mut Frame, area: Rect, msg: &str) {
    let block = default_border(Color::DarkGray).title(" Help ");
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(Paragraph::new(msg).style(Style::default().fg(Color::Gray)), inner);
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let logs = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Cyan))
        .style_debug(Style::default().fg(Color::Gray));
    f.render_widget(logs, area);
}

/// The worker's spinner for one-shot loads, else a spinner driven by the
/// render tick while the active screen's synchronizer is fetching in the
/// foreground.
fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App, loading: LoadingState) {
    let spinner_char = if loading.is_loading || loading.spinner_char == ERROR_CHAR {
        loading.spinner_char
    } else if active_sync_busy(app) {
        SPINNER_CHARS[(app.state.animation.tick as usize) % SPINNER_CHARS.len()]
    } else {
        return;
    };
    let style = match spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = if app.settings.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(11), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}

fn active_sync_busy(app: &App) -> bool {
    match app.state.active_tab {
        MenuItem::Matches => app
            .list_sync
            .as_ref()
            .is_some_and(|s| is_busy(&s.snapshot())),
        MenuItem::MatchDetail => app
            .detail_sync
            .as_ref()
            .is_some_and(|s| is_busy(&s.snapshot())),
        _ => false,
    }
}

fn is_busy<T>(snapshot: &SyncSnapshot<T>) -> bool {
    snapshot.is_loading() || snapshot.is_refreshing()
}
