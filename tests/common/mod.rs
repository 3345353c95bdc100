#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::NaiveDate;
use gitscout::config::{BasicConfig, Config, OutputConfig, RunConfig, UpstreamConfig, WindowSize};
use serde_json::{Value, json};
use std::{
    collections::{HashMap, HashSet},
    path::Path as FsPath,
    sync::{Arc, Mutex},
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use url::Url;

/// In-memory stand-in for the four GitHub endpoints the crawler uses.
#[derive(Clone, Default)]
pub struct MockGithub {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    hits: Vec<String>,
    total_count: Option<u64>,
    reject_searches: usize,
    broken_profiles: HashSet<String>,
    socials: HashMap<String, Value>,
    events: HashMap<String, Value>,
    cancel_on_profile: Option<(String, CancellationToken)>,
    requests: Vec<String>,
}

impl MockGithub {
    pub fn with_hits(hits: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let mock = Self::default();
        mock.state().hits = hits.into_iter().map(Into::into).collect();
        mock
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.inner.lock().expect("mock state lock")
    }

    /// Overrides the reported `total_count` (defaults to the number of hits).
    pub fn report_total(&self, total: u64) {
        self.state().total_count = Some(total);
    }

    /// Answers the next `n` searches with a rate-limit body.
    pub fn reject_next_searches(&self, n: usize) {
        self.state().reject_searches = n;
    }

    /// Makes the profile call for `login` return a non-JSON body.
    pub fn break_profile(&self, login: &str) {
        self.state().broken_profiles.insert(login.to_string());
    }

    pub fn repair_profile(&self, login: &str) {
        self.state().broken_profiles.remove(login);
    }

    /// Cancels `token` while serving the profile of `login`; the reply itself still goes out.
    pub fn cancel_on_profile(&self, login: &str, token: CancellationToken) {
        self.state().cancel_on_profile = Some((login.to_string(), token));
    }

    pub fn set_socials(&self, login: &str, socials: Value) {
        self.state().socials.insert(login.to_string(), socials);
    }

    pub fn set_events(&self, login: &str, events: Value) {
        self.state().events.insert(login.to_string(), events);
    }

    pub fn requests(&self) -> Vec<String> {
        self.state().requests.clone()
    }

    pub fn search_pages(&self) -> Vec<u32> {
        self.requests()
            .iter()
            .filter_map(|r| r.strip_prefix("search page="))
            .filter_map(|p| p.parse().ok())
            .collect()
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/search/users", get(search_users))
            .route("/users/{login}", get(user))
            .route("/users/{login}/social_accounts", get(social_accounts))
            .route("/users/{login}/events/public", get(public_events))
            .with_state(self.clone())
    }

    pub async fn serve(&self) -> Url {
        spawn_test_server(self.router()).await
    }
}

async fn search_users(
    State(mock): State<MockGithub>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let page: usize = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let per_page: usize = params
        .get("per_page")
        .and_then(|p| p.parse().ok())
        .unwrap_or(30);

    let mut state = mock.state();
    if state.reject_searches > 0 {
        state.reject_searches -= 1;
        state.requests.push(format!("search rejected page={page}"));
        return (
            StatusCode::FORBIDDEN,
            [("retry-after", "0")],
            Json(json!({"message": "API rate limit exceeded"})),
        )
            .into_response();
    }
    state.requests.push(format!("search page={page}"));

    let start = ((page - 1) * per_page).min(state.hits.len());
    let end = (page * per_page).min(state.hits.len());
    let items: Vec<Value> = state.hits[start..end]
        .iter()
        .enumerate()
        .map(|(i, login)| {
            json!({
                "login": login,
                "id": start + i + 1,
                "html_url": format!("https://github.com/{login}"),
                "type": "User",
                "score": 1.0
            })
        })
        .collect();
    let total = state.total_count.unwrap_or(state.hits.len() as u64);

    Json(json!({
        "total_count": total,
        "incomplete_results": false,
        "items": items
    }))
    .into_response()
}

async fn user(State(mock): State<MockGithub>, Path(login): Path<String>) -> Response {
    let mut state = mock.state();
    state.requests.push(format!("user {login}"));
    if let Some((target, token)) = &state.cancel_on_profile {
        if *target == login {
            token.cancel();
        }
    }
    if state.broken_profiles.contains(&login) {
        return (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/html")],
            "<html>upstream hiccup</html>",
        )
            .into_response();
    }
    Json(json!({
        "login": login,
        "id": 1000 + login.len(),
        "name": format!("{login} name"),
        "company": null,
        "blog": "",
        "location": "Austin, TX",
        "email": "profile@example.com",
        "bio": "hello",
        "followers": 3,
        "following": 4,
        "public_repos": 5,
        "created_at": "2020-01-15T10:00:00Z",
        "updated_at": "2024-05-01T08:30:00Z"
    }))
    .into_response()
}

async fn social_accounts(State(mock): State<MockGithub>, Path(login): Path<String>) -> Response {
    let mut state = mock.state();
    state.requests.push(format!("social {login}"));
    Json(state.socials.get(&login).cloned().unwrap_or_else(|| json!([]))).into_response()
}

async fn public_events(State(mock): State<MockGithub>, Path(login): Path<String>) -> Response {
    let mut state = mock.state();
    state.requests.push(format!("events {login}"));
    Json(state.events.get(&login).cloned().unwrap_or_else(|| json!([]))).into_response()
}

pub async fn spawn_test_server(app: Router) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    let base = Url::parse(&format!("http://{}/", addr)).expect("valid base url");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server run");
    });

    base
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// Fast pacing, no proxy, output under `data_dir`, one Austin partition for January 2020.
pub fn test_config(api_url: Url, data_dir: &FsPath) -> Config {
    std::fs::create_dir_all(data_dir.join("states")).expect("states dir");
    std::fs::write(
        data_dir.join("states/Texas.csv"),
        "city_state_short\n\"Austin, TX\"\n",
    )
    .expect("city table");

    Config {
        basic: BasicConfig {
            require_proxy: false,
            ..BasicConfig::default()
        },
        upstream: UpstreamConfig {
            api_url,
            request_interval_ms: 1,
            cooldown_min_secs: 0,
            cooldown_max_secs: 0,
            retry_max_times: 0,
            ..UpstreamConfig::default()
        },
        proxy: None,
        run: RunConfig {
            region: Some("Texas".to_string()),
            city: Some("Austin, TX".to_string()),
            start_date: date(2020, 1, 1),
            end_date: date(2020, 1, 31),
            window: WindowSize::Month,
            ..RunConfig::default()
        },
        output: OutputConfig {
            data_dir: data_dir.to_path_buf(),
            ..OutputConfig::default()
        },
    }
}

/// Rows of a CSV file keyed by header name.
pub fn read_csv(path: &FsPath) -> Vec<HashMap<String, String>> {
    let mut reader = csv::Reader::from_path(path).expect("open csv");
    let headers = reader.headers().expect("headers").clone();
    reader
        .records()
        .map(|r| {
            let record = r.expect("record");
            headers
                .iter()
                .map(str::to_string)
                .zip(record.iter().map(str::to_string))
                .collect()
        })
        .collect()
}
