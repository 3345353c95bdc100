use serde::{Deserialize, Serialize};

/// Basic (core) configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BasicConfig {
    /// Log level for tracing subscriber initialization (e.g., "error", "warn", "info", "debug", "trace").
    /// TOML: `basic.loglevel`. Default: `info`.
    #[serde(default = "default_loglevel")]
    pub loglevel: String,

    /// Refuse to start without a `[proxy]` table.
    /// TOML: `basic.require_proxy`. Default: `true`.
    #[serde(default = "default_require_proxy")]
    pub require_proxy: bool,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            loglevel: default_loglevel(),
            require_proxy: default_require_proxy(),
        }
    }
}

fn default_loglevel() -> String {
    "info".to_string()
}

fn default_require_proxy() -> bool {
    true
}
