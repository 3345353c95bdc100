mod basic;
mod output;
mod proxy;
mod run;
mod upstream;

pub use basic::BasicConfig;
pub use output::OutputConfig;
pub use proxy::ProxyConfig;
pub use run::{Direction, RunConfig, WindowSize};
pub use upstream::{MAX_PER_PAGE, UpstreamConfig};

use figment::{
    Figment,
    providers::{Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ScoutError;

/// Application configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Core settings (see `basic` table in config.toml).
    #[serde(default)]
    pub basic: BasicConfig,

    /// Upstream API, pacing and backoff (see `upstream` table).
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Outbound proxy credentials (see `proxy` table).
    #[serde(default)]
    pub proxy: Option<ProxyConfig>,

    /// Partition selection (see `run` table).
    #[serde(default)]
    pub run: RunConfig,

    /// Output layout (see `output` table).
    #[serde(default)]
    pub output: OutputConfig,
}

pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Environment variable overriding [`DEFAULT_CONFIG_FILE`].
pub const CONFIG_PATH_ENV: &str = "GITSCOUT_CONFIG";

impl Config {
    /// Builds a Figment that merges defaults and a config TOML file.
    pub fn figment(path: &Path) -> Figment {
        let figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if path.is_file() {
            figment.merge(Toml::file(path))
        } else {
            figment
        }
    }

    /// Loads configuration from `path` (with defaults) and validates it.
    ///
    /// A missing file, an unparsable table, a missing or malformed `[proxy]` (unless
    /// `basic.require_proxy = false`) or a reversed date range are all startup errors.
    pub fn load(path: &Path) -> Result<Self, ScoutError> {
        if !path.is_file() {
            return Err(ScoutError::config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        let cfg: Self = Self::figment(path).extract()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ScoutError> {
        match &self.proxy {
            Some(proxy) => {
                proxy.endpoint()?;
            }
            None if self.basic.require_proxy => {
                return Err(ScoutError::config(
                    "[proxy] table must be set (or basic.require_proxy = false)",
                ));
            }
            None => {}
        }
        for (key, value) in [
            ("upstream.page_size", self.upstream.page_size),
            ("upstream.events_per_page", self.upstream.events_per_page),
        ] {
            if !(1..=MAX_PER_PAGE).contains(&value) {
                return Err(ScoutError::config(format!(
                    "{key} must be between 1 and {MAX_PER_PAGE}, got {value}"
                )));
            }
        }
        self.run.validate_dates()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("temp config");
        file.write_all(body.as_bytes()).expect("write config");
        file
    }

    #[test]
    fn loads_tables_over_defaults() {
        let file = write_config(
            r#"
            [proxy]
            username = "scout"
            password = "secret"
            host = "proxy.internal"
            port = 3128

            [run]
            region = "Texas"
            city = "Austin, TX"
            start_date = "2020-01-01"
            end_date = "2020-03-31"
            window = "day"
            "#,
        );
        let cfg = Config::load(file.path()).expect("config loads");
        assert_eq!(cfg.run.selected_region(), Some("Texas"));
        assert_eq!(cfg.run.window, WindowSize::Day);
        assert_eq!(cfg.upstream.page_size, 100);
        assert_eq!(cfg.upstream.request_interval_ms, 3000);
        assert_eq!(cfg.proxy.as_ref().map(|p| p.port), Some(3128));
    }

    #[test]
    fn missing_proxy_is_fatal_by_default() {
        let file = write_config("[run]\nregion = \"Ohio\"\n");
        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, ScoutError::Config(_)));
    }

    #[test]
    fn proxy_can_be_waived() {
        let file = write_config("[basic]\nrequire_proxy = false\n");
        let cfg = Config::load(file.path()).expect("config loads");
        assert!(cfg.proxy.is_none());
    }

    #[test]
    fn malformed_proxy_is_fatal() {
        let file = write_config(
            "[proxy]\nusername = \"u\"\npassword = \"p\"\nhost = \"h\"\nport = \"not-a-port\"\n",
        );
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn page_sizes_above_the_api_cap_are_rejected() {
        let file = write_config("[basic]\nrequire_proxy = false\n[upstream]\npage_size = 101\n");
        assert!(matches!(
            Config::load(file.path()).unwrap_err(),
            ScoutError::Config(_)
        ));

        let file = write_config("[basic]\nrequire_proxy = false\n[upstream]\npage_size = 100\n");
        assert!(Config::load(file.path()).is_ok());

        let file =
            write_config("[basic]\nrequire_proxy = false\n[upstream]\nevents_per_page = 0\n");
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn missing_file_is_fatal() {
        let err = Config::load(Path::new("/definitely/not/here/config.toml")).unwrap_err();
        assert!(matches!(err, ScoutError::Config(_)));
    }
}
