use std::time::Duration;

/// Desktop Chrome; several sources serve stripped markup to unknown agents.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Settings for fetching pages and running the ingestion pipeline.
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Pause between consecutive article fetches within one batch.
    pub request_delay: Duration,
    /// Per-request timeout; a fetch past it counts as failed.
    pub request_timeout: Duration,
    pub max_redirects: usize,
    pub user_agent: String,
    /// Batch size when the caller does not give one.
    pub default_limit: usize,
    /// Drop repeated URLs from a single listing, keeping the first.
    pub dedupe_listings: bool,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            request_delay: Duration::from_millis(2000),
            request_timeout: Duration::from_secs(15),
            max_redirects: 5,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            default_limit: 5,
            dedupe_listings: true,
        }
    }
}

impl ScraperConfig {
    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
