use gitscout_schema::SearchUser;
use serde::{Deserialize, Serialize};

/// Minimal record discovered by a search page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentitySummary {
    #[serde(rename = "username")]
    pub handle: String,
    #[serde(rename = "User ID")]
    pub numeric_id: u64,
    #[serde(rename = "Profile URL")]
    pub profile_url: String,
}

impl IdentitySummary {
    pub const HEADER: [&'static str; 3] = ["username", "User ID", "Profile URL"];
}

impl From<SearchUser> for IdentitySummary {
    fn from(user: SearchUser) -> Self {
        Self {
            handle: user.login,
            numeric_id: user.id,
            profile_url: user.html_url,
        }
    }
}
