use serde::{Deserialize, Serialize};
use url::Url;

/// Largest `per_page` the REST API honors.
pub const MAX_PER_PAGE: u32 = 100;

/// Upstream API settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    /// REST API root.
    /// TOML: `upstream.api_url`. Default: `https://api.github.com/`.
    #[serde(default = "default_api_url")]
    pub api_url: Url,

    /// Optional personal access token, sent as a bearer token.
    /// TOML: `upstream.token`.
    #[serde(default)]
    pub token: Option<String>,

    /// TOML: `upstream.user_agent`. Default: `gitscout/<version>`.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Minimum spacing between any two upstream calls, shared by all workers.
    /// TOML: `upstream.request_interval_ms`. Default: `3000`.
    #[serde(default = "default_request_interval_ms")]
    pub request_interval_ms: u64,

    /// First cooldown after a rate-limited or malformed response.
    /// TOML: `upstream.cooldown_min_secs`. Default: `60`.
    #[serde(default = "default_cooldown_min_secs")]
    pub cooldown_min_secs: u64,

    /// Cooldown ceiling; reached after `cooldown_steps` consecutive rejections.
    /// TOML: `upstream.cooldown_max_secs`. Default: `600`.
    #[serde(default = "default_cooldown_max_secs")]
    pub cooldown_max_secs: u64,

    /// TOML: `upstream.cooldown_steps`. Default: `6`.
    #[serde(default = "default_cooldown_steps")]
    pub cooldown_steps: usize,

    /// Max retry attempts for transport failures (connect, timeout, 5xx).
    /// TOML: `upstream.retry_max_times`. Default: `2`.
    #[serde(default = "default_retry_max_times")]
    pub retry_max_times: usize,

    /// Search page size, at most [`MAX_PER_PAGE`].
    /// TOML: `upstream.page_size`. Default: `100`.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Search API hard cap on reachable results per query.
    /// TOML: `upstream.max_results`. Default: `1000`.
    #[serde(default = "default_max_results")]
    pub max_results: u64,

    /// At most [`MAX_PER_PAGE`].
    /// TOML: `upstream.events_per_page`. Default: `100`.
    #[serde(default = "default_events_per_page")]
    pub events_per_page: u32,

    /// TOML: `upstream.connect_timeout_secs`. Default: `10`.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// TOML: `upstream.timeout_secs`. Default: `30`.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            token: None,
            user_agent: default_user_agent(),
            request_interval_ms: default_request_interval_ms(),
            cooldown_min_secs: default_cooldown_min_secs(),
            cooldown_max_secs: default_cooldown_max_secs(),
            cooldown_steps: default_cooldown_steps(),
            retry_max_times: default_retry_max_times(),
            page_size: default_page_size(),
            max_results: default_max_results(),
            events_per_page: default_events_per_page(),
            connect_timeout_secs: default_connect_timeout_secs(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_api_url() -> Url {
    Url::parse("https://api.github.com/").expect("valid default api url")
}

fn default_user_agent() -> String {
    format!("gitscout/{}", env!("CARGO_PKG_VERSION"))
}

fn default_request_interval_ms() -> u64 {
    3000
}

fn default_cooldown_min_secs() -> u64 {
    60
}

fn default_cooldown_max_secs() -> u64 {
    600
}

fn default_cooldown_steps() -> usize {
    6
}

fn default_retry_max_times() -> usize {
    2
}

fn default_page_size() -> u32 {
    100
}

fn default_max_results() -> u64 {
    1000
}

fn default_events_per_page() -> u32 {
    100
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_timeout_secs() -> u64 {
    30
}
