use crate::app::MenuItem;
use hitlive_api::filters::{self, MatchSections, SportFilter, YearFilter};
use hitlive_api::{HomeFeed, Match, MatchType};

/// Sport headings inside a section, in display order. `Other` only ever has
/// rows when the sport filter is `All`.
const GROUP_ORDER: [MatchType; 3] = [MatchType::Football, MatchType::Cricket, MatchType::Other];

// ---------------------------------------------------------------------------
// Spinner animation state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct AnimationState {
    /// Monotonic tick counter, advanced on every render tick.
    pub tick: u64,
}

impl AnimationState {
    pub fn advance(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }
}

// ---------------------------------------------------------------------------
// Home
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct HomeState {
    pub feed: Option<HomeFeed>,
    pub loaded: bool,
}

// ---------------------------------------------------------------------------
// Match list
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListSection {
    Live,
    Past,
}

impl ListSection {
    pub fn title(&self) -> &'static str {
        match self {
            ListSection::Live => "Live",
            ListSection::Past => "Past Matches",
        }
    }
}

/// One selectable row of the list screen.
#[derive(Debug, Clone, Copy)]
pub struct ListRow<'a> {
    pub section: ListSection,
    pub sport: MatchType,
    pub item: &'a Match,
}

/// Live rows first, then past rows; each section grouped by sport.
pub fn display_rows<'a>(sections: &MatchSections<'a>) -> Vec<ListRow<'a>> {
    let mut rows = Vec::with_capacity(sections.live.len() + sections.past.len());
    for (section, list) in [(ListSection::Live, &sections.live), (ListSection::Past, &sections.past)] {
        for sport in GROUP_ORDER {
            rows.extend(
                MatchSections::of_type(list, sport)
                    .into_iter()
                    .map(|item| ListRow { section, sport, item }),
            );
        }
    }
    rows
}

#[derive(Debug, Default)]
pub struct MatchListState {
    pub sport: SportFilter,
    pub year: YearFilter,
    /// Index into `rows()`.
    pub selected: usize,
}

impl MatchListState {
    pub fn rows<'a>(&self, matches: &'a [Match]) -> Vec<ListRow<'a>> {
        display_rows(&filters::partition(matches, self.sport, self.year))
    }

    pub fn cycle_sport(&mut self) {
        self.sport = self.sport.next();
        self.selected = 0;
    }

    pub fn cycle_year(&mut self, matches: &[Match]) {
        self.year = self.year.next(&filters::year_options(matches));
        self.selected = 0;
    }

    /// Keep the filters valid after the collection changed: a selected year
    /// that is no longer offered falls back to `All`.
    pub fn on_matches_changed(&mut self, matches: &[Match]) {
        if let YearFilter::Year(y) = self.year
            && !filters::year_options(matches).contains(&y)
        {
            self.year = YearFilter::All;
        }
        let len = self.rows(matches).len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    pub fn select_next(&mut self, row_count: usize) {
        if self.selected + 1 < row_count {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn selected_id(&self, matches: &[Match]) -> Option<String> {
        self.rows(matches).get(self.selected).map(|row| row.item.id.clone())
    }
}

// ---------------------------------------------------------------------------
// Match detail
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MatchDetailState {
    pub match_id: Option<String>,
    /// Timeline scroll offset in rows.
    pub scroll_offset: u16,
}

#[derive(Debug, Default)]
pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_logs: bool,
    pub home: HomeState,
    pub match_list: MatchListState,
    pub match_detail: MatchDetailState,
    pub animation: AnimationState,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }
}
