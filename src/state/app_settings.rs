use hitlive_api::client::DEFAULT_BASE_URL;
use log::LevelFilter;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_DETAIL_POLL: Duration = Duration::from_secs(20);
const DEFAULT_LIST_POLL: Duration = Duration::from_secs(30);
const DEFAULT_LIST_LIMIT: u32 = 200;
const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Error;

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub full_screen: bool,
    pub log_level: Option<LevelFilter>,
    pub api_base: String,
    pub detail_poll: Duration,
    pub list_poll: Duration,
    pub list_limit: u32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            full_screen: false,
            log_level: None,
            api_base: DEFAULT_BASE_URL.to_string(),
            detail_poll: DEFAULT_DETAIL_POLL,
            list_poll: DEFAULT_LIST_POLL,
            list_limit: DEFAULT_LIST_LIMIT,
        }
    }
}

impl AppSettings {
    /// `HITLIVE_LOG` when set, otherwise errors only.
    pub fn effective_log_level(&self) -> LevelFilter {
        self.log_level.unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn load() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Unset, empty or unparsable values fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let secs = |key: &str, fallback: Duration| {
            read(key)
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|s| *s > 0)
                .map(Duration::from_secs)
                .unwrap_or(fallback)
        };

        Self {
            full_screen: false,
            log_level: read("HITLIVE_LOG").and_then(|v| LevelFilter::from_str(&v).ok()),
            api_base: read("HITLIVE_API_BASE")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base),
            detail_poll: secs("HITLIVE_DETAIL_POLL_SECS", defaults.detail_poll),
            list_poll: secs("HITLIVE_LIST_POLL_SECS", defaults.list_poll),
            list_limit: read("HITLIVE_LIST_LIMIT")
                .and_then(|v| v.parse::<u32>().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.list_limit),
        }
    }
}
