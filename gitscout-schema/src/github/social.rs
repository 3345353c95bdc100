use serde::{Deserialize, Serialize};

/// Entry of `GET /users/{login}/social_accounts`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct SocialAccount {
    pub provider: String,
    pub url: String,
}
