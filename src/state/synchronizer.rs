use crate::state::refresher::PeriodicRefresher;
use crate::state::sync::{FetchMode, Outcome, SyncMachine, SyncPhase, SyncSnapshot, Ticket};
use hitlive_api::client::{ApiError, ApiResult};
use log::{debug, error, warn};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};

/// Shown when the server gave no message of its own.
pub const MATCH_FAILURE: &str = "Failed to load match";
pub const MATCH_NOT_FOUND: &str = "Match not found.";
pub const LIST_FAILURE: &str = "Failed to load matches";

/// Runs after a successful foreground fetch (never after silent ticks).
pub type LoadedHook<T> = Arc<dyn Fn(&T) + Send + Sync>;

#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Used in log lines, e.g. "match m-42".
    pub label: String,
    pub interval: Duration,
    pub failure_message: &'static str,
    /// Replaces `failure_message` on a 404 without a server message.
    pub not_found_message: Option<&'static str>,
}

impl SyncOptions {
    pub fn match_detail(match_id: &str, interval: Duration) -> Self {
        Self {
            label: format!("match {match_id}"),
            interval,
            failure_message: MATCH_FAILURE,
            not_found_message: Some(MATCH_NOT_FOUND),
        }
    }

    pub fn match_list(interval: Duration) -> Self {
        Self {
            label: "match list".to_owned(),
            interval,
            failure_message: LIST_FAILURE,
            not_found_message: None,
        }
    }

    /// Foreground error text: the server's own message, else the not-found
    /// or generic fallback.
    pub fn describe(&self, err: &ApiError) -> String {
        if let Some(msg) = err.server_message() {
            return msg.to_owned();
        }
        match self.not_found_message {
            Some(not_found) if err.is_not_found() => not_found.to_owned(),
            _ => self.failure_message.to_owned(),
        }
    }
}

#[derive(Debug)]
enum SyncCommand {
    RefreshNow,
}

/// Owner's side of a running synchronizer. Dropping the handle stops it.
pub struct SyncHandle<T> {
    label: String,
    commands: mpsc::Sender<SyncCommand>,
    state: watch::Receiver<SyncSnapshot<T>>,
    state_tx: watch::Sender<SyncSnapshot<T>>,
    task: JoinHandle<()>,
}

/// Start polling: one foreground fetch now, then silent fetches every
/// `options.interval` until the handle is stopped or dropped.
pub fn spawn<T, F, Fut>(options: SyncOptions, fetch: F, on_loaded: Option<LoadedHook<T>>) -> SyncHandle<T>
where
    T: Clone + Send + Sync + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ApiResult<T>> + Send + 'static,
{
    let (state_tx, state) = watch::channel(SyncSnapshot::default());
    let (commands, command_rx) = mpsc::channel(8);

    let label = options.label.clone();
    debug!("sync start: {label} every {:?}", options.interval);
    let driver = SyncDriver {
        options,
        fetch,
        on_loaded,
        machine: SyncMachine::new(),
        state_tx: state_tx.clone(),
        commands: command_rx,
    };
    let task = tokio::spawn(driver.run());

    SyncHandle { label, commands, state, state_tx, task }
}

impl<T> SyncHandle<T> {
    /// Borrow the latest snapshot. Keep the guard short-lived.
    pub fn snapshot(&self) -> watch::Ref<'_, SyncSnapshot<T>> {
        self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SyncSnapshot<T>> {
        self.state.clone()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Request a foreground refresh. Returns `false` when the refresh control
    /// is disabled (a foreground fetch is already running, or stopped).
    pub fn refresh_now(&self) -> bool {
        if !self.state.borrow().can_refresh() {
            return false;
        }
        self.commands.try_send(SyncCommand::RefreshNow).is_ok()
    }

    pub fn is_stopped(&self) -> bool {
        self.state.borrow().phase == SyncPhase::Stopped
    }

    /// Cancel the timer and any in-flight fetch. Idempotent.
    pub fn stop(&mut self) {
        let newly_stopped = self.state_tx.send_if_modified(|s| {
            if s.phase == SyncPhase::Stopped {
                return false;
            }
            s.phase = SyncPhase::Stopped;
            true
        });
        self.task.abort();
        if newly_stopped {
            debug!("sync stop: {}", self.label);
        }
    }
}

impl<T> Drop for SyncHandle<T> {
    fn drop(&mut self) {
        self.stop();
    }
}

struct SyncDriver<T, F> {
    options: SyncOptions,
    fetch: F,
    on_loaded: Option<LoadedHook<T>>,
    machine: SyncMachine<T>,
    state_tx: watch::Sender<SyncSnapshot<T>>,
    commands: mpsc::Receiver<SyncCommand>,
}

impl<T, F, Fut> SyncDriver<T, F>
where
    T: Clone + Send + Sync + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ApiResult<T>> + Send + 'static,
{
    async fn run(mut self) {
        // Dropping the set (on abort) cancels whatever is still in flight.
        let mut in_flight: JoinSet<(Ticket, ApiResult<T>)> = JoinSet::new();
        let mut refresher = PeriodicRefresher::new(self.options.interval);

        self.launch(FetchMode::Initial, &mut in_flight);

        loop {
            tokio::select! {
                _ = refresher.tick() => self.launch(FetchMode::Silent, &mut in_flight),

                Some(command) = self.commands.recv() => match command {
                    SyncCommand::RefreshNow => self.launch(FetchMode::Manual, &mut in_flight),
                },

                Some(joined) = in_flight.join_next() => match joined {
                    Ok((ticket, result)) => self.apply(ticket, result),
                    Err(e) if e.is_cancelled() => {}
                    Err(e) => error!("sync fetch task for {} failed: {e}", self.options.label),
                },
            }
        }
    }

    fn launch(&mut self, mode: FetchMode, in_flight: &mut JoinSet<(Ticket, ApiResult<T>)>) {
        let Some(ticket) = self.machine.begin(mode) else {
            debug!("sync {}: {mode:?} fetch skipped", self.options.label);
            return;
        };
        self.publish();
        let fut = (self.fetch)();
        in_flight.spawn(async move { (ticket, fut.await) });
    }

    fn apply(&mut self, ticket: Ticket, result: ApiResult<T>) {
        let loaded = result.as_ref().ok().cloned();
        let result = result.map_err(|e| {
            if ticket.mode.is_foreground() {
                error!("sync {}: {e}", self.options.label);
            } else if e.is_invalid_payload() {
                warn!("sync {}: silent refresh got a bad payload: {e}", self.options.label);
            } else {
                debug!("sync {}: silent refresh failed: {e}", self.options.label);
            }
            self.options.describe(&e)
        });

        match self.machine.complete(ticket, result) {
            Outcome::Applied => {
                self.publish();
                if ticket.mode.is_foreground()
                    && let (Some(data), Some(hook)) = (loaded.as_ref(), self.on_loaded.as_ref())
                {
                    hook(data);
                }
            }
            Outcome::Suppressed => {}
            Outcome::Discarded => debug!("sync {}: dropped superseded response", self.options.label),
        }
    }

    fn publish(&self) {
        let next = self.machine.snapshot().clone();
        self.state_tx.send_if_modified(|current| {
            if current.phase == SyncPhase::Stopped {
                return false;
            }
            *current = next;
            true
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hitlive_api::Match;
    use hitlive_api::client::LiveApi;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn match_body(id: &str, score: u32) -> String {
        serde_json::json!({
            "data": {
                "firebase_match_id": id,
                "match_type": "football",
                "match_date": "2024-03-02T10:30:00Z",
                "is_live": true,
                "team1": { "team_code": "CSE", "team_score": score },
                "team2": { "team_code": "ME", "team_score": 0 }
            }
        })
        .to_string()
    }

    fn detail_sync(
        api: &LiveApi,
        id: &str,
        interval: Duration,
        hook: Option<LoadedHook<Match>>,
    ) -> SyncHandle<Match> {
        let api = api.clone();
        let id = id.to_owned();
        spawn(
            SyncOptions::match_detail(&id, interval),
            move || {
                let api = api.clone();
                let id = id.clone();
                async move { api.fetch_match(&id).await }
            },
            hook,
        )
    }

    async fn wait_until<T: Clone>(
        handle: &SyncHandle<T>,
        pred: impl Fn(&SyncSnapshot<T>) -> bool,
    ) -> SyncSnapshot<T> {
        let mut rx = handle.subscribe();
        tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| pred(s)))
            .await
            .expect("timed out waiting for state")
            .expect("sync channel closed")
            .clone()
    }

    #[tokio::test]
    async fn initial_load_reaches_ready_and_runs_hook_once() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v1/live/match/m1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(match_body("m1", 2))
            .create_async()
            .await;

        let api = LiveApi::new(server.url());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let hook: LoadedHook<Match> = Arc::new(move |m: &Match| {
            sink.lock().unwrap().extend(m.team_codes());
        });

        let mut handle = detail_sync(&api, "m1", Duration::from_secs(60), Some(hook));
        let snap = wait_until(&handle, |s| s.phase == SyncPhase::Ready).await;
        assert_eq!(snap.data.unwrap().team1.score, "2");
        assert_eq!(*seen.lock().unwrap(), vec!["CSE".to_string(), "ME".to_string()]);
        handle.stop();
    }

    #[tokio::test]
    async fn missing_match_renders_not_found_instead_of_loading_forever() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v1/live/match/ghost")
            .with_status(404)
            .create_async()
            .await;

        let api = LiveApi::new(server.url());
        let handle = detail_sync(&api, "ghost", Duration::from_secs(60), None);
        let snap = wait_until(&handle, |s| !s.is_loading()).await;
        assert_eq!(snap.phase, SyncPhase::Error);
        assert_eq!(snap.error.as_deref(), Some(MATCH_NOT_FOUND));
        assert!(snap.data.is_none());
    }

    #[tokio::test]
    async fn server_message_is_preferred_for_foreground_errors() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v1/live/match/x")
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"msg":"Invalid match id"}"#)
            .create_async()
            .await;

        let handle = detail_sync(&LiveApi::new(server.url()), "x", Duration::from_secs(60), None);
        let snap = wait_until(&handle, |s| s.phase == SyncPhase::Error).await;
        assert_eq!(snap.error.as_deref(), Some("Invalid match id"));
    }

    #[tokio::test]
    async fn silent_failures_keep_last_good_data() {
        let mut server = mockito::Server::new_async().await;
        let ok = server
            .mock("GET", "/api/v1/live/match/m1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(match_body("m1", 1))
            .expect(1)
            .create_async()
            .await;

        let api = LiveApi::new(server.url());
        let hook_calls = Arc::new(AtomicUsize::new(0));
        let counter = hook_calls.clone();
        let hook: LoadedHook<Match> = Arc::new(move |_: &Match| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let handle = detail_sync(&api, "m1", Duration::from_millis(50), Some(hook));
        let good = wait_until(&handle, |s| s.phase == SyncPhase::Ready).await;
        ok.assert_async().await;

        // Every later tick fails.
        ok.remove_async().await;
        let failing = server
            .mock("GET", "/api/v1/live/match/m1")
            .with_status(500)
            .expect_at_least(2)
            .create_async()
            .await;
        tokio::time::sleep(Duration::from_millis(300)).await;
        failing.assert_async().await;

        let after = handle.snapshot().clone();
        assert_eq!(after.phase, SyncPhase::Ready);
        assert_eq!(after.data, good.data);
        assert_eq!(after.error, None);
        assert_eq!(hook_calls.load(Ordering::SeqCst), 1, "silent ticks never prefetch rosters");
    }

    #[tokio::test]
    async fn silent_tick_that_times_out_leaves_state_unchanged() {
        let mut server = mockito::Server::new_async().await;
        let ok = server
            .mock("GET", "/api/v1/live/match/m1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(match_body("m1", 4))
            .expect(1)
            .create_async()
            .await;

        let api = LiveApi::new(server.url()).with_timeout(Duration::from_millis(100));
        let handle = detail_sync(&api, "m1", Duration::from_millis(50), None);
        let good = wait_until(&handle, |s| s.phase == SyncPhase::Ready).await;
        ok.assert_async().await;

        ok.remove_async().await;
        let slow = server
            .mock("GET", "/api/v1/live/match/m1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_chunked_body(|w| {
                use std::io::Write;
                std::thread::sleep(Duration::from_millis(300));
                w.write_all(match_body("m1", 7).as_bytes())
            })
            .expect_at_least(1)
            .create_async()
            .await;
        tokio::time::sleep(Duration::from_millis(250)).await;
        slow.assert_async().await;

        let after = handle.snapshot().clone();
        assert_eq!(after.phase, SyncPhase::Ready);
        assert_eq!(after.data, good.data);
        assert_eq!(after.error, None);
    }

    #[tokio::test]
    async fn refresh_now_runs_a_foreground_fetch() {
        let mut server = mockito::Server::new_async().await;
        let first = server
            .mock("GET", "/api/v1/live/match/m1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(match_body("m1", 1))
            .create_async()
            .await;

        let api = LiveApi::new(server.url());
        let handle = detail_sync(&api, "m1", Duration::from_secs(60), None);
        wait_until(&handle, |s| s.phase == SyncPhase::Ready).await;

        first.remove_async().await;
        server
            .mock("GET", "/api/v1/live/match/m1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(match_body("m1", 3))
            .create_async()
            .await;

        assert!(handle.refresh_now());
        let snap = wait_until(&handle, |s| {
            s.phase == SyncPhase::Ready && s.data.as_ref().is_some_and(|m| m.team1.score == "3")
        })
        .await;
        assert!(snap.error.is_none());
    }

    #[tokio::test]
    async fn stop_is_idempotent_and_blocks_refresh() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v1/live/match/m1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(match_body("m1", 1))
            .create_async()
            .await;

        let mut handle = detail_sync(&LiveApi::new(server.url()), "m1", Duration::from_millis(20), None);
        wait_until(&handle, |s| s.phase == SyncPhase::Ready).await;
        handle.stop();
        handle.stop();
        assert!(handle.is_stopped());
        assert!(!handle.refresh_now());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(handle.snapshot().phase, SyncPhase::Stopped);
        assert!(handle.snapshot().data.is_some(), "last data is still readable");
    }

    #[tokio::test]
    async fn stop_before_first_response_discards_it() {
        let mut server = mockito::Server::new_async().await;
        let slow = server
            .mock("GET", "/api/v1/live/match/slow")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_chunked_body(|w| {
                use std::io::Write;
                std::thread::sleep(Duration::from_millis(200));
                w.write_all(match_body("slow", 9).as_bytes())
            })
            .create_async()
            .await;

        let mut handle = detail_sync(&LiveApi::new(server.url()), "slow", Duration::from_secs(60), None);
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.stop();
        tokio::time::sleep(Duration::from_millis(400)).await;

        let snap = handle.snapshot().clone();
        assert_eq!(snap.phase, SyncPhase::Stopped);
        assert!(snap.data.is_none());
        drop(slow);
    }

    #[test]
    fn fallback_messages_depend_on_the_view() {
        let missing = ApiError::MissingData("u".into());
        let interval = Duration::from_secs(1);
        assert_eq!(SyncOptions::match_detail("m", interval).describe(&missing), MATCH_FAILURE);
        assert_eq!(SyncOptions::match_list(interval).describe(&missing), LIST_FAILURE);
    }
}
