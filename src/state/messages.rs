use crate::state::network::LoadingState;
use crossterm::event::KeyEvent;
use hitlive_api::HomeFeed;

/// One-shot loads. Polled views (match list, match detail) run their own
/// synchronizers instead of going through the network worker.
#[derive(Debug, Clone)]
pub enum NetworkRequest {
    LoadHome,
}

#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged { loading_state: LoadingState },
    HomeLoaded { feed: HomeFeed },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
    /// Drives spinners and picks up synchronizer state changes.
    RenderTick,
}
