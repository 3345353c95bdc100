use serde::{Deserialize, Serialize};

/// Entry of `GET /users/{login}/events/public`.
///
/// Only push-style payloads carry `commits`; every other event type
/// deserializes with an empty list.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct PublicEvent {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,

    #[serde(default)]
    pub payload: Option<EventPayload>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct EventPayload {
    #[serde(default)]
    pub commits: Vec<EventCommit>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EventCommit {
    #[serde(default)]
    pub author: Option<CommitAuthor>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CommitAuthor {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl PublicEvent {
    /// Author email of the first commit in the payload, if any.
    pub fn first_commit_email(&self) -> Option<&str> {
        self.payload
            .as_ref()?
            .commits
            .first()?
            .author
            .as_ref()?
            .email
            .as_deref()
    }
}
