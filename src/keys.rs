use crate::app::{App, MenuItem};
use crate::state::messages::NetworkRequest;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) {
    let mut guard = app.lock().await;
    let mut load_home = false;

    match (guard.state.active_tab, key_event.code, key_event.modifiers) {
        // Quit
        (_, Char('q'), _) | (_, Char('c'), KeyModifiers::CONTROL) => {
            guard.shutdown();
            crate::cleanup_terminal();
            std::process::exit(0);
        }

        // Tab switching
        (_, Char('1'), _) => {
            guard.update_tab(MenuItem::Home);
            load_home = guard.needs_home_load();
        }
        (_, Char('2'), _) => guard.update_tab(MenuItem::Matches),
        (_, Char('3'), _) => guard.update_tab(MenuItem::MatchDetail),
        (_, Char('?'), _) => guard.update_tab(MenuItem::Help),
        (_, KeyCode::Esc, _) => guard.back(),

        // Home
        (MenuItem::Home, KeyCode::Enter, _) => guard.open_home_match(),

        // Match list
        (MenuItem::Matches, Char('j') | KeyCode::Down, _) => guard.list_select_next(),
        (MenuItem::Matches, Char('k') | KeyCode::Up, _) => guard.list_select_prev(),
        (MenuItem::Matches, Char('t'), _) => guard.list_cycle_sport(),
        (MenuItem::Matches, Char('y'), _) => guard.list_cycle_year(),
        (MenuItem::Matches, KeyCode::Enter, _) => guard.open_selected_match(),

        // Match detail
        (MenuItem::MatchDetail, Char('j') | KeyCode::Down, _) => guard.detail_scroll_down(),
        (MenuItem::MatchDetail, Char('k') | KeyCode::Up, _) => guard.detail_scroll_up(),

        // Global
        (_, Char('r'), _) => load_home = guard.refresh(),
        (_, Char('f'), _) => guard.toggle_full_screen(),
        (_, Char('"'), _) => guard.toggle_show_logs(),

        _ => {}
    }

    if load_home {
        drop(guard);
        let _ = network_requests.send(NetworkRequest::LoadHome).await;
    }
}
