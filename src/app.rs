use crate::state::app_settings::AppSettings;
use crate::state::app_state::AppState;
use crate::state::roster::RosterCache;
use crate::state::synchronizer::{self, LoadedHook, SyncHandle, SyncOptions};
use hitlive_api::client::LiveApi;
use hitlive_api::{HomeFeed, Match};
use log::debug;
use std::sync::Arc;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum MenuItem {
    #[default]
    Home,
    Matches,
    MatchDetail,
    Help,
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
    pub roster: RosterCache,
    api: LiveApi,
    /// Running only while the Matches screen is active.
    pub list_sync: Option<SyncHandle<Vec<Match>>>,
    /// Running only while the MatchDetail screen is active.
    pub detail_sync: Option<SyncHandle<Match>>,
}

impl App {
    pub fn new(settings: AppSettings) -> Self {
        let api = LiveApi::new(settings.api_base.clone());

        let app = Self {
            state: AppState::new(),
            roster: RosterCache::new(api.clone()),
            api,
            settings,
            list_sync: None,
            detail_sync: None,
        };

        if let Some(level) = app.settings.log_level {
            log::set_max_level(level);
            tui_logger::set_default_level(level);
        }

        app
    }

    pub fn api(&self) -> &LiveApi {
        &self.api
    }

    // -----------------------------------------------------------------------
    // Network response handlers, called from main_ui_loop
    // -----------------------------------------------------------------------

    pub fn on_home_loaded(&mut self, feed: HomeFeed) {
        self.state.home.feed = Some(feed);
        self.state.home.loaded = true;
    }

    /// Called every render tick.
    pub fn on_render_tick(&mut self) {
        self.state.animation.advance();
        if let Some(sync) = &self.list_sync {
            let snapshot = sync.snapshot();
            if let Some(matches) = snapshot.data.as_deref() {
                self.state.match_list.on_matches_changed(matches);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Tab management. Each screen owns its synchronizer: entering a screen
    // starts it, leaving stops it. Help is an overlay and leaves it running.
    // -----------------------------------------------------------------------

    pub fn update_tab(&mut self, next: MenuItem) {
        if self.state.active_tab == next {
            return;
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;

        if next == MenuItem::Help {
            return;
        }
        self.stop_syncs_except(next);
        self.start_sync_for(next);
    }

    pub fn exit_help(&mut self) {
        if self.state.active_tab == MenuItem::Help {
            self.state.active_tab = self.state.previous_tab;
            self.stop_syncs_except(self.state.active_tab);
            self.start_sync_for(self.state.active_tab);
        }
    }

    /// Esc: close help, or leave a match for the match list.
    pub fn back(&mut self) {
        match self.state.active_tab {
            MenuItem::Help => self.exit_help(),
            MenuItem::MatchDetail => self.update_tab(MenuItem::Matches),
            _ => {}
        }
    }

    /// Switch to the detail screen for `match_id`, replacing any match that
    /// is already open.
    pub fn open_match(&mut self, match_id: impl Into<String>) {
        let match_id = match_id.into();
        if self.state.match_detail.match_id.as_deref() != Some(match_id.as_str()) {
            self.stop_detail_sync();
            self.state.match_detail.scroll_offset = 0;
        }
        self.state.match_detail.match_id = Some(match_id);
        if self.state.active_tab == MenuItem::MatchDetail {
            self.start_sync_for(MenuItem::MatchDetail);
        } else {
            self.update_tab(MenuItem::MatchDetail);
        }
    }

    /// Enter on the list screen.
    pub fn open_selected_match(&mut self) {
        let Some(id) = self.list_sync.as_ref().and_then(|sync| {
            let snapshot = sync.snapshot();
            self.state.match_list.selected_id(snapshot.data.as_deref()?)
        }) else {
            return;
        };
        self.open_match(id);
    }

    /// Enter on the home screen follows the hero's live match, if any.
    pub fn open_home_match(&mut self) {
        let live_id = self
            .state
            .home
            .feed
            .as_ref()
            .and_then(|feed| feed.live_match.as_ref())
            .map(|m| m.id.clone());
        if let Some(id) = live_id {
            self.open_match(id);
        }
    }

    /// User refresh. Returns `true` when the home feed needs a reload, which
    /// goes through the network worker rather than a synchronizer.
    pub fn refresh(&mut self) -> bool {
        match self.state.active_tab {
            MenuItem::Home => true,
            MenuItem::Matches => {
                if let Some(sync) = &self.list_sync {
                    sync.refresh_now();
                }
                false
            }
            MenuItem::MatchDetail => {
                if let Some(sync) = &self.detail_sync {
                    sync.refresh_now();
                }
                false
            }
            MenuItem::Help => false,
        }
    }

    pub fn needs_home_load(&self) -> bool {
        self.state.active_tab == MenuItem::Home && !self.state.home.loaded
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }

    // -----------------------------------------------------------------------
    // Match list navigation
    // -----------------------------------------------------------------------

    pub fn list_row_count(&self) -> usize {
        self.list_sync
            .as_ref()
            .and_then(|sync| {
                let snapshot = sync.snapshot();
                snapshot.data.as_deref().map(|m| self.state.match_list.rows(m).len())
            })
            .unwrap_or(0)
    }

    pub fn list_select_next(&mut self) {
        let count = self.list_row_count();
        self.state.match_list.select_next(count);
    }

    pub fn list_select_prev(&mut self) {
        self.state.match_list.select_prev();
    }

    pub fn list_cycle_sport(&mut self) {
        self.state.match_list.cycle_sport();
    }

    pub fn list_cycle_year(&mut self) {
        if let Some(sync) = &self.list_sync {
            let snapshot = sync.snapshot();
            let matches = snapshot.data.as_deref().unwrap_or_default();
            self.state.match_list.cycle_year(matches);
        }
    }

    pub fn detail_scroll_down(&mut self) {
        self.state.match_detail.scroll_offset = self.state.match_detail.scroll_offset.saturating_add(1);
    }

    pub fn detail_scroll_up(&mut self) {
        self.state.match_detail.scroll_offset = self.state.match_detail.scroll_offset.saturating_sub(1);
    }

    pub fn shutdown(&mut self) {
        self.stop_list_sync();
        self.stop_detail_sync();
    }

    // -----------------------------------------------------------------------
    // Synchronizer lifecycle
    // -----------------------------------------------------------------------

    fn start_sync_for(&mut self, screen: MenuItem) {
        match screen {
            MenuItem::Matches if self.list_sync.is_none() => {
                let api = self.api.clone();
                let limit = self.settings.list_limit;
                self.list_sync = Some(synchronizer::spawn(
                    SyncOptions::match_list(self.settings.list_poll),
                    move || {
                        let api = api.clone();
                        async move { api.fetch_matches(limit, 1).await }
                    },
                    None,
                ));
            }
            MenuItem::MatchDetail if self.detail_sync.is_none() => {
                let Some(match_id) = self.state.match_detail.match_id.clone() else {
                    debug!("detail screen opened without a match");
                    return;
                };
                let api = self.api.clone();
                let options = SyncOptions::match_detail(&match_id, self.settings.detail_poll);
                self.detail_sync = Some(synchronizer::spawn(
                    options,
                    move || {
                        let api = api.clone();
                        let match_id = match_id.clone();
                        async move { api.fetch_match(&match_id).await }
                    },
                    Some(roster_prefetch(self.roster.clone())),
                ));
            }
            _ => {}
        }
    }

    fn stop_syncs_except(&mut self, screen: MenuItem) {
        if screen != MenuItem::Matches {
            self.stop_list_sync();
        }
        if screen != MenuItem::MatchDetail {
            self.stop_detail_sync();
        }
    }

    fn stop_list_sync(&mut self) {
        if let Some(mut sync) = self.list_sync.take() {
            sync.stop();
        }
    }

    fn stop_detail_sync(&mut self) {
        if let Some(mut sync) = self.detail_sync.take() {
            sync.stop();
        }
    }
}

/// After a foreground detail load, warm the roster cache for both sides.
fn roster_prefetch(roster: RosterCache) -> LoadedHook<Match> {
    Arc::new(move |loaded: &Match| {
        let roster = roster.clone();
        let codes = loaded.team_codes();
        tokio::spawn(async move { roster.ensure(codes).await });
    })
}
