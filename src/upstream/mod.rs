mod api;
mod policy;
mod throttle;

pub use api::GithubApi;
pub use policy::{ActionForReply, Expect, classify_reply, retry_hint};
pub use throttle::{Throttle, ThrottleSettings};

use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;

/// A decoded upstream response, before its shape has been judged.
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub status: StatusCode,
    /// Wait requested by the upstream's rate-limit headers, if any.
    pub retry_hint: Option<Duration>,
    pub body: Value,
}
