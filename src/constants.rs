pub mod upstream {
    use std::time::Duration;

    pub const DEFAULT_BASE_URL: &str = "https://api.notion.com";

    pub const API_VERSION: &str = "2022-06-28";

    pub const USER_AGENT: &str = "Navi/1.0";

    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

    pub const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_millis(1000);

    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    pub const DEFAULT_MAX_CONCURRENT_LOOKUPS: usize = 8;
}

pub mod catalog {

    pub const FALLBACK_THRESHOLD: usize = 10;

    pub const RELATED_LIMIT: usize = 6;

    pub const CANDIDATE_MULTIPLIER: usize = 3;

    pub const DEFAULT_RANKING_LIMIT: usize = 10;

    pub const DEFAULT_PAGE_LIMIT: usize = 24;
}
