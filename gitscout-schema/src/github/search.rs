use serde::{Deserialize, Serialize};

/// Body of `GET /search/users`.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct SearchUsersResponse {
    #[serde(default)]
    pub total_count: u64,

    #[serde(default)]
    pub incomplete_results: bool,

    pub items: Vec<SearchUser>,
}

/// One hit of a user search. Only the fields the crawler persists are kept.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchUser {
    pub login: String,
    pub id: u64,
    pub html_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn search_response_ignores_unknown_item_fields() {
        let body = json!({
            "total_count": 2,
            "incomplete_results": false,
            "items": [
                {"login": "octocat", "id": 1, "html_url": "https://github.com/octocat", "type": "User", "score": 1.0},
                {"login": "hubot", "id": 2, "html_url": "https://github.com/hubot"}
            ]
        });
        let parsed: SearchUsersResponse = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.total_count, 2);
        assert_eq!(parsed.items[1].login, "hubot");
    }
}
