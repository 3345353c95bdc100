use chrono::Utc;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use super::UpstreamReply;
use super::policy::retry_hint;
use crate::config::{ProxyConfig, UpstreamConfig};
use crate::error::ScoutError;
use crate::types::Partition;
use crate::utils::logging::preview;

const GITHUB_JSON: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "x-github-api-version";
const API_VERSION: &str = "2022-11-28";

/// Raw GitHub REST calls, one HTTP attempt each. Pacing, retries and shape checks belong to
/// [`super::Throttle`].
#[derive(Debug, Clone)]
pub struct GithubApi {
    client: reqwest::Client,
    base: Url,
    page_size: u32,
    events_per_page: u32,
}

impl GithubApi {
    pub fn new(cfg: &UpstreamConfig, proxy: Option<&ProxyConfig>) -> Result<Self, ScoutError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_JSON));
        headers.insert(
            HeaderName::from_static(API_VERSION_HEADER),
            HeaderValue::from_static(API_VERSION),
        );
        if let Some(token) = cfg.token.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| ScoutError::config(format!("upstream.token is not a valid header: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let mut builder = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .default_headers(headers);
        if let Some(proxy_cfg) = proxy {
            let proxy = reqwest::Proxy::all(proxy_cfg.endpoint()?.as_str())?
                .basic_auth(&proxy_cfg.username, &proxy_cfg.password);
            builder = builder.proxy(proxy);
        }
        let client = builder.build()?;

        // `Url::join` drops the last segment unless the base ends with '/'.
        let mut base = cfg.api_url.clone();
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }

        info!(
            api_url = %base,
            proxy = %proxy.map(|p| format!("{}:{}", p.host, p.port)).unwrap_or_else(|| "<none>".to_string()),
            authenticated = cfg.token.is_some(),
            page_size = cfg.page_size,
            "Upstream client configured"
        );

        Ok(Self {
            client,
            base,
            page_size: cfg.page_size,
            events_per_page: cfg.events_per_page,
        })
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// `GET search/users` for one page of a partition.
    pub async fn search_users(
        &self,
        partition: &Partition,
        page: u32,
    ) -> Result<UpstreamReply, ScoutError> {
        let url = self.endpoint(&["search", "users"])?;
        let query = [
            ("q", partition.search_query()),
            ("per_page", self.page_size.to_string()),
            ("page", page.to_string()),
        ];
        debug!(%url, q = %query[0].1, page, "Searching users");
        self.get_json(url, &query).await
    }

    /// `GET users/{handle}`.
    pub async fn user(&self, handle: &str) -> Result<UpstreamReply, ScoutError> {
        let url = self.endpoint(&["users", handle])?;
        self.get_json(url, &[]).await
    }

    /// `GET users/{handle}/social_accounts`.
    pub async fn social_accounts(&self, handle: &str) -> Result<UpstreamReply, ScoutError> {
        let url = self.endpoint(&["users", handle, "social_accounts"])?;
        self.get_json(url, &[]).await
    }

    /// `GET users/{handle}/events/public`.
    pub async fn public_events(&self, handle: &str) -> Result<UpstreamReply, ScoutError> {
        let url = self.endpoint(&["users", handle, "events", "public"])?;
        let query = [("per_page", self.events_per_page.to_string())];
        self.get_json(url, &query).await
    }

    /// GETs `url` and decodes the body as JSON. A 5xx comes back as
    /// [`ScoutError::UpstreamStatus`]; any other status is left for the throttle to judge.
    async fn get_json(&self, url: Url, query: &[(&str, String)]) -> Result<UpstreamReply, ScoutError> {
        let resp = self.client.get(url).query(query).send().await?;
        let status = resp.status();
        let hint = retry_hint(resp.headers(), Utc::now());
        let bytes = resp.bytes().await?;

        if status.is_server_error() {
            return Err(ScoutError::UpstreamStatus {
                status,
                body: preview(&String::from_utf8_lossy(&bytes)),
            });
        }

        let body: Value = serde_json::from_slice(&bytes)?;
        Ok(UpstreamReply {
            status,
            retry_hint: hint,
            body,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ScoutError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ScoutError::config(format!("upstream.api_url cannot be a base: {}", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}
