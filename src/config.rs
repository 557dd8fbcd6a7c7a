use anyhow::{anyhow, Context, Result};

pub const DEFAULT_BASE_URL: &str = "https://hn.algolia.com/api/v1";
pub const DEFAULT_QUERY: &str = "redux";
pub const DEFAULT_HITS_PER_PAGE: u32 = 100;
// Algolia refuses larger pages
pub const MAX_HITS_PER_PAGE: u32 = 1000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_USER_AGENT: &str = concat!("hn_search/", env!("CARGO_PKG_VERSION"));

// Settings loaded from the environment (and `.env`, if present).
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub base_url: String,
    pub hits_per_page: u32,
    pub default_query: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            hits_per_page: DEFAULT_HITS_PER_PAGE,
            default_query: DEFAULT_QUERY.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let config = Self::from_lookup(|key| std::env::var(key).ok())?;
        config.log();
        Ok(config)
    }

    // Split out so tests don't have to touch the process environment
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let hits_per_page = match lookup("HN_SEARCH_HITS_PER_PAGE") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .with_context(|| format!("invalid HN_SEARCH_HITS_PER_PAGE: {}", raw))?,
            None => defaults.hits_per_page,
        };
        if hits_per_page == 0 || hits_per_page > MAX_HITS_PER_PAGE {
            return Err(anyhow!(
                "HN_SEARCH_HITS_PER_PAGE must be between 1 and {}, got {}",
                MAX_HITS_PER_PAGE,
                hits_per_page
            ));
        }

        let timeout_secs = match lookup("HN_SEARCH_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("invalid HN_SEARCH_TIMEOUT_SECS: {}", raw))?,
            None => defaults.timeout_secs,
        };
        if timeout_secs == 0 {
            return Err(anyhow!("HN_SEARCH_TIMEOUT_SECS must be greater than 0"));
        }

        let default_query = lookup("HN_SEARCH_DEFAULT_QUERY")
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty())
            .unwrap_or(defaults.default_query);

        Ok(Self {
            base_url: lookup("HN_SEARCH_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            hits_per_page,
            default_query,
            timeout_secs,
            user_agent: lookup("HN_SEARCH_USER_AGENT").unwrap_or(defaults.user_agent),
        })
    }

    fn log(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  HN_SEARCH_BASE_URL: {}", self.base_url);
        tracing::info!("  HN_SEARCH_HITS_PER_PAGE: {}", self.hits_per_page);
        tracing::info!("  HN_SEARCH_DEFAULT_QUERY: {}", self.default_query);
        tracing::info!("  HN_SEARCH_TIMEOUT_SECS: {}", self.timeout_secs);
    }
}
