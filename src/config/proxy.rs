use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use url::Url;

use crate::error::ScoutError;

/// Outbound proxy credentials.
/// TOML: `[proxy]`. Every field except `scheme` is required when the table is present.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProxyConfig {
    pub username: String,

    pub password: String,

    pub host: String,

    /// Accepts `8080` or `"8080"`.
    #[serde(deserialize_with = "deserialize_port_lax")]
    pub port: u16,

    /// TOML: `proxy.scheme`. Default: `http`.
    #[serde(default = "default_scheme")]
    pub scheme: String,
}

impl ProxyConfig {
    /// Proxy endpoint without credentials; those go through `reqwest::Proxy::basic_auth`.
    pub fn endpoint(&self) -> Result<Url, ScoutError> {
        if self.host.trim().is_empty() {
            return Err(ScoutError::config("proxy.host must be set and non-empty"));
        }
        if self.username.trim().is_empty() {
            return Err(ScoutError::config("proxy.username must be set and non-empty"));
        }
        let url = Url::parse(&format!("{}://{}:{}", self.scheme, self.host.trim(), self.port))?;
        Ok(url)
    }
}

fn default_scheme() -> String {
    "http".to_string()
}

fn deserialize_port_lax<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;

    let port = match v {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    port.and_then(|p| u16::try_from(p).ok())
        .filter(|p| *p != 0)
        .ok_or_else(|| serde::de::Error::custom("expected a port number (1-65535) for proxy.port"))
}
