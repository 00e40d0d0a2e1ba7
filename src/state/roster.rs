use futures_util::future::{BoxFuture, FutureExt, Shared, join_all};
use hitlive_api::TeamDetail;
use hitlive_api::client::LiveApi;
use log::debug;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type TeamFetch = Shared<BoxFuture<'static, Option<Arc<TeamDetail>>>>;

#[derive(Default)]
struct Inner {
    teams: HashMap<String, Arc<TeamDetail>>,
    in_flight: HashMap<String, TeamFetch>,
    /// Bumped once per merged batch.
    revision: u64,
}

/// Session-wide team detail cache, shared by every screen.
///
/// Entries are only ever added. A code is fetched at most once at a time:
/// callers asking for a code that is already being fetched await the same
/// request. Failed codes stay absent and are retried on the next `ensure`.
#[derive(Clone)]
pub struct RosterCache {
    api: LiveApi,
    inner: Arc<Mutex<Inner>>,
}

impl RosterCache {
    pub fn new(api: LiveApi) -> Self {
        Self { api, inner: Arc::new(Mutex::new(Inner::default())) }
    }

    pub fn get(&self, code: &str) -> Option<Arc<TeamDetail>> {
        self.lock().teams.get(code).cloned()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.lock().teams.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.lock().teams.len()
    }

    pub fn revision(&self) -> u64 {
        self.lock().revision
    }

    /// Fetch every code that is neither cached nor in flight, concurrently,
    /// then merge all successes in a single update once the batch settles.
    pub async fn ensure<I, S>(&self, codes: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let pending: Vec<(String, TeamFetch)> = {
            let mut inner = self.lock();
            let mut seen = HashSet::new();
            let mut pending = Vec::new();
            for code in codes {
                let code = code.as_ref().trim();
                if code.is_empty() || !seen.insert(code.to_owned()) || inner.teams.contains_key(code) {
                    continue;
                }
                let fetch = match inner.in_flight.get(code) {
                    Some(existing) => existing.clone(),
                    None => {
                        let fetch = fetch_team(self.api.clone(), code.to_owned()).boxed().shared();
                        inner.in_flight.insert(code.to_owned(), fetch.clone());
                        fetch
                    }
                };
                pending.push((code.to_owned(), fetch));
            }
            pending
        };

        if pending.is_empty() {
            return;
        }

        let results = join_all(pending.iter().map(|(_, fetch)| fetch.clone())).await;

        let mut inner = self.lock();
        let mut merged = 0;
        for ((code, fetch), result) in pending.into_iter().zip(results) {
            // A later ensure may already have started a new request for this code.
            if inner.in_flight.get(&code).is_some_and(|current| current.ptr_eq(&fetch)) {
                inner.in_flight.remove(&code);
            }
            if let Some(detail) = result
                && !inner.teams.contains_key(&code)
            {
                inner.teams.insert(code, detail);
                merged += 1;
            }
        }
        if merged > 0 {
            inner.revision += 1;
            debug!("roster cache merged {merged} team(s)");
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn fetch_team(api: LiveApi, code: String) -> Option<Arc<TeamDetail>> {
    match api.fetch_team(&code).await {
        Ok(detail) => Some(Arc::new(detail)),
        Err(e) => {
            debug!("roster for '{code}' unavailable: {e}");
            None
        }
    }
}
