//! Fetch lifecycle for one polled view (a match list or a single match).
//!
//! Pure state: the async driver in `synchronizer.rs` decides *when* to fetch,
//! this machine decides whether a fetch may start and what its result does to
//! the displayed state.
//!
//! ```text
//! idle ──initial──▶ loading ──▶ ready | error
//! ready ──silent──▶ ready            (failure suppressed)
//! ready | error ──manual──▶ refreshing ──▶ ready | error
//! any ──stop──▶ stopped              (terminal)
//! ```

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// First load; shows the full loader while there is no data.
    Initial,
    /// Scheduled background tick. Never shows indicators or errors.
    Silent,
    /// User-requested refresh; shows the refreshing indicator.
    Manual,
}

impl FetchMode {
    pub fn is_foreground(&self) -> bool {
        !matches!(self, FetchMode::Silent)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SyncPhase {
    #[default]
    Idle,
    Loading,
    Ready,
    Refreshing,
    Error,
    Stopped,
}

/// What the view renders from.
#[derive(Debug, Clone)]
pub struct SyncSnapshot<T> {
    pub phase: SyncPhase,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> Default for SyncSnapshot<T> {
    fn default() -> Self {
        Self { phase: SyncPhase::Idle, data: None, error: None }
    }
}

impl<T> SyncSnapshot<T> {
    /// Full-page loader: only before the first result.
    pub fn is_loading(&self) -> bool {
        matches!(self.phase, SyncPhase::Idle | SyncPhase::Loading)
    }

    pub fn is_refreshing(&self) -> bool {
        self.phase == SyncPhase::Refreshing
    }

    /// A foreground failure takes over the whole view, stale data included,
    /// until the next retry starts.
    pub fn blocking_error(&self) -> Option<&str> {
        match self.phase {
            SyncPhase::Error => self.error.as_deref(),
            _ => None,
        }
    }

    /// The refresh control is disabled while a foreground fetch is running.
    pub fn can_refresh(&self) -> bool {
        matches!(self.phase, SyncPhase::Ready | SyncPhase::Error)
    }
}

/// Issued by `begin`, handed back to `complete` with the fetch result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub generation: u64,
    pub mode: FetchMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The snapshot changed.
    Applied,
    /// Silent failure: nothing changed.
    Suppressed,
    /// Superseded or arrived after `stop`: nothing changed.
    Discarded,
}

#[derive(Debug)]
pub struct SyncMachine<T> {
    snapshot: SyncSnapshot<T>,
    generation: u64,
    in_flight: Option<Ticket>,
}

impl<T> Default for SyncMachine<T> {
    fn default() -> Self {
        Self { snapshot: SyncSnapshot::default(), generation: 0, in_flight: None }
    }
}

impl<T> SyncMachine<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> &SyncSnapshot<T> {
        &self.snapshot
    }

    pub fn phase(&self) -> SyncPhase {
        self.snapshot.phase
    }

    /// Ask to start a fetch. `None` means the request is refused:
    /// - anything after `stop`;
    /// - `Initial` once the machine has left `Idle`;
    /// - `Manual` while another foreground fetch is running;
    /// - `Silent` while any fetch is running, or before the first result.
    ///
    /// A granted `Manual` supersedes an in-flight silent tick.
    pub fn begin(&mut self, mode: FetchMode) -> Option<Ticket> {
        let phase = self.snapshot.phase;
        let allowed = match mode {
            FetchMode::Initial => phase == SyncPhase::Idle,
            FetchMode::Manual => self.snapshot.can_refresh(),
            FetchMode::Silent => self.in_flight.is_none() && self.snapshot.can_refresh(),
        };
        if !allowed {
            return None;
        }

        match mode {
            FetchMode::Initial => self.snapshot.phase = SyncPhase::Loading,
            FetchMode::Manual => self.snapshot.phase = SyncPhase::Refreshing,
            FetchMode::Silent => {}
        }

        self.generation += 1;
        let ticket = Ticket { generation: self.generation, mode };
        self.in_flight = Some(ticket);
        Some(ticket)
    }

    /// Apply a fetch result. Successful results replace the data wholesale.
    pub fn complete(&mut self, ticket: Ticket, result: Result<T, String>) -> Outcome {
        if self.snapshot.phase == SyncPhase::Stopped || ticket.generation != self.generation {
            return Outcome::Discarded;
        }
        self.in_flight = None;

        match result {
            Ok(data) => {
                self.snapshot.data = Some(data);
                self.snapshot.error = None;
                self.snapshot.phase = SyncPhase::Ready;
                Outcome::Applied
            }
            Err(_) if !ticket.mode.is_foreground() => Outcome::Suppressed,
            Err(message) => {
                self.snapshot.error = Some(message);
                self.snapshot.phase = SyncPhase::Error;
                Outcome::Applied
            }
        }
    }

    /// Returns `false` if the machine was already stopped.
    pub fn stop(&mut self) -> bool {
        if self.snapshot.phase == SyncPhase::Stopped {
            return false;
        }
        self.snapshot.phase = SyncPhase::Stopped;
        self.in_flight = None;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready_with(data: &str) -> SyncMachine<String> {
        let mut m = SyncMachine::new();
        let t = m.begin(FetchMode::Initial).unwrap();
        assert_eq!(m.complete(t, Ok(data.to_string())), Outcome::Applied);
        m
    }

    fn state_of(m: &SyncMachine<String>) -> (SyncPhase, Option<String>, Option<String>) {
        let s = m.snapshot();
        (s.phase, s.data.clone(), s.error.clone())
    }

    #[test]
    fn initial_load_goes_through_loading_to_ready() {
        let mut m: SyncMachine<String> = SyncMachine::new();
        assert!(m.snapshot().is_loading());
        let t = m.begin(FetchMode::Initial).unwrap();
        assert_eq!(m.phase(), SyncPhase::Loading);
        assert!(m.snapshot().is_loading());
        m.complete(t, Ok("v1".into()));
        assert_eq!(state_of(&m), (SyncPhase::Ready, Some("v1".into()), None));
        assert!(m.begin(FetchMode::Initial).is_none(), "initial load only happens once");
    }

    #[test]
    fn initial_failure_surfaces_error() {
        let mut m: SyncMachine<String> = SyncMachine::new();
        let t = m.begin(FetchMode::Initial).unwrap();
        assert_eq!(m.complete(t, Err("Match not found.".into())), Outcome::Applied);
        assert_eq!(state_of(&m), (SyncPhase::Error, None, Some("Match not found.".into())));
        assert!(!m.snapshot().is_loading(), "never stuck on the loader after a failure");
    }

    #[test]
    fn silent_failure_leaves_state_untouched() {
        let mut m = ready_with("good");
        let before = state_of(&m);
        let t = m.begin(FetchMode::Silent).unwrap();
        assert_eq!(m.phase(), SyncPhase::Ready, "silent ticks show no indicator");
        assert_eq!(m.complete(t, Err("boom".into())), Outcome::Suppressed);
        assert_eq!(state_of(&m), before);
    }

    #[test]
    fn silent_failure_in_error_state_keeps_the_error() {
        let mut m: SyncMachine<String> = SyncMachine::new();
        let t = m.begin(FetchMode::Initial).unwrap();
        m.complete(t, Err("first".into()));
        let before = state_of(&m);
        let t = m.begin(FetchMode::Silent).unwrap();
        m.complete(t, Err("second".into()));
        assert_eq!(state_of(&m), before);
    }

    #[test]
    fn silent_success_replaces_data_and_clears_error() {
        let mut m: SyncMachine<String> = SyncMachine::new();
        let t = m.begin(FetchMode::Initial).unwrap();
        m.complete(t, Err("down".into()));
        let t = m.begin(FetchMode::Silent).unwrap();
        m.complete(t, Ok("back".into()));
        assert_eq!(state_of(&m), (SyncPhase::Ready, Some("back".into()), None));
    }

    #[test]
    fn failed_manual_refresh_blocks_the_view_until_retried() {
        let mut m = ready_with("stale");
        let t = m.begin(FetchMode::Manual).unwrap();
        m.complete(t, Err("Failed to load match".into()));
        assert_eq!(m.snapshot().data.as_deref(), Some("stale"));
        assert_eq!(m.snapshot().blocking_error(), Some("Failed to load match"));

        m.begin(FetchMode::Manual).unwrap();
        assert_eq!(m.snapshot().blocking_error(), None, "retry shows the refreshing view again");
        assert_eq!(ready_with("fresh").snapshot().blocking_error(), None);
    }

    #[test]
    fn silent_ticks_are_serialized() {
        let mut m = ready_with("v1");
        let first = m.begin(FetchMode::Silent).unwrap();
        assert!(m.begin(FetchMode::Silent).is_none(), "no new tick while one is in flight");
        m.complete(first, Ok("v2".into()));
        assert!(m.begin(FetchMode::Silent).is_some());
    }

    #[test]
    fn silent_ticks_wait_for_first_result() {
        let mut m: SyncMachine<String> = SyncMachine::new();
        assert!(m.begin(FetchMode::Silent).is_none());
        m.begin(FetchMode::Initial).unwrap();
        assert!(m.begin(FetchMode::Silent).is_none());
    }

    #[test]
    fn manual_refresh_is_guarded_against_overlap() {
        let mut m = ready_with("v1");
        let t = m.begin(FetchMode::Manual).unwrap();
        assert_eq!(m.phase(), SyncPhase::Refreshing);
        assert!(!m.snapshot().can_refresh());
        assert!(m.begin(FetchMode::Manual).is_none());
        assert!(m.begin(FetchMode::Silent).is_none());
        m.complete(t, Ok("v2".into()));
        assert_eq!(state_of(&m), (SyncPhase::Ready, Some("v2".into()), None));
    }

    #[test]
    fn manual_failure_keeps_last_data_but_reports_error() {
        let mut m = ready_with("v1");
        let t = m.begin(FetchMode::Manual).unwrap();
        m.complete(t, Err("Failed to load match".into()));
        assert_eq!(
            state_of(&m),
            (SyncPhase::Error, Some("v1".into()), Some("Failed to load match".into()))
        );
        assert!(m.snapshot().can_refresh(), "user can retry from the error state");
    }

    #[test]
    fn manual_refresh_supersedes_in_flight_silent_tick() {
        let mut m = ready_with("v1");
        let silent = m.begin(FetchMode::Silent).unwrap();
        let manual = m.begin(FetchMode::Manual).unwrap();
        assert!(manual.generation > silent.generation);

        // The slow silent response lands after the manual one started.
        assert_eq!(m.complete(silent, Ok("stale".into())), Outcome::Discarded);
        assert_eq!(m.phase(), SyncPhase::Refreshing, "indicator is not clobbered");
        assert_eq!(m.snapshot().data.as_deref(), Some("v1"));

        assert_eq!(m.complete(manual, Ok("fresh".into())), Outcome::Applied);
        assert_eq!(m.snapshot().data.as_deref(), Some("fresh"));
    }

    #[test]
    fn stop_is_terminal_and_idempotent() {
        let mut m = ready_with("v1");
        let t = m.begin(FetchMode::Silent).unwrap();
        assert!(m.stop());
        assert!(!m.stop());
        assert_eq!(m.complete(t, Ok("late".into())), Outcome::Discarded);
        assert_eq!(m.snapshot().data.as_deref(), Some("v1"));
        for mode in [FetchMode::Initial, FetchMode::Silent, FetchMode::Manual] {
            assert!(m.begin(mode).is_none());
        }
        assert_eq!(m.phase(), SyncPhase::Stopped);
    }
}
