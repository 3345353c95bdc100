use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde_json::Value;
use std::time::Duration;

use super::UpstreamReply;
use crate::utils::logging::preview;

const RATELIMIT_REMAINING: &str = "x-ratelimit-remaining";
const RATELIMIT_RESET: &str = "x-ratelimit-reset";

/// Shape a caller requires of an upstream body before accepting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
    /// A JSON object carrying this key.
    Field(&'static str),
    /// A JSON array.
    List,
}

impl Expect {
    pub fn matches(self, body: &Value) -> bool {
        match self {
            Expect::Field(key) => body.get(key).is_some(),
            Expect::List => body.is_array(),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ActionForReply {
    Accept,
    /// Rate limited or malformed; wait (for the hinted duration when known) and retry.
    CoolDown(Option<Duration>),
    /// Retrying cannot help.
    Fail,
}

pub fn classify_reply(reply: &UpstreamReply, expect: Expect) -> ActionForReply {
    match reply.status {
        StatusCode::UNAUTHORIZED
        | StatusCode::NOT_FOUND
        | StatusCode::GONE
        | StatusCode::UNPROCESSABLE_ENTITY => ActionForReply::Fail,
        status if status.is_success() && expect.matches(&reply.body) => ActionForReply::Accept,
        _ => ActionForReply::CoolDown(reply.retry_hint),
    }
}

/// Wait the upstream asks for: `Retry-After` seconds, or the distance to
/// `x-ratelimit-reset` once `x-ratelimit-remaining` hits zero.
pub fn retry_hint(headers: &HeaderMap, now: DateTime<Utc>) -> Option<Duration> {
    let header_u64 = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
    };

    if let Some(secs) = header_u64(RETRY_AFTER.as_str()) {
        return Some(Duration::from_secs(secs));
    }

    if header_u64(RATELIMIT_REMAINING) == Some(0) {
        let reset = header_u64(RATELIMIT_RESET)?;
        let now_secs = u64::try_from(now.timestamp()).unwrap_or_default();
        // One extra second so the window has actually rolled over.
        return Some(Duration::from_secs(reset.saturating_sub(now_secs) + 1));
    }

    None
}

pub fn body_preview(body: &Value) -> String {
    preview(&body.to_string())
}
