use chrono::{DateTime, SecondsFormat, Utc};
use gitscout_schema::{PublicEvent, SocialAccount, UserProfile};
use std::collections::{BTreeMap, BTreeSet};

/// Provider name that accumulates instead of overwriting.
pub const GENERIC_PROVIDER: &str = "generic";

/// Named providers that get their own output column, in column order.
pub const NAMED_PROVIDERS: [&str; 10] = [
    "facebook",
    "instagram",
    "linkedin",
    "npm",
    "reddit",
    "twitch",
    "youtube",
    "mastodon",
    "hometown",
    "twitter",
];

const LIST_SEPARATOR: &str = ", ";

/// Fully assembled per-identity output record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichedProfile {
    pub handle: String,
    pub numeric_id: u64,
    pub display_name: Option<String>,
    pub company: Option<String>,
    pub blog: Option<String>,
    pub location: Option<String>,
    pub derived_emails: BTreeSet<String>,
    pub bio: Option<String>,
    pub social_links: BTreeMap<String, String>,
    pub generic_links: Vec<String>,
    pub followers: Option<u64>,
    pub following: Option<u64>,
    pub public_repos: Option<u64>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl EnrichedProfile {
    /// Seeds a record from the profile call. The profile's own email is kept only until
    /// [`EnrichedProfile::apply_public_events`] replaces it.
    pub fn from_profile(profile: UserProfile) -> Self {
        Self {
            handle: profile.login,
            numeric_id: profile.id,
            display_name: profile.name,
            company: profile.company,
            blog: profile.blog,
            location: profile.location,
            derived_emails: profile.email.into_iter().collect(),
            bio: profile.bio,
            social_links: BTreeMap::new(),
            generic_links: Vec::new(),
            followers: profile.followers,
            following: profile.following,
            public_repos: profile.public_repos,
            created_at: profile.created_at,
            updated_at: profile.updated_at,
        }
    }

    pub fn apply_social_accounts(&mut self, accounts: &[SocialAccount]) {
        for account in accounts {
            if account.provider == GENERIC_PROVIDER {
                self.generic_links.push(account.url.clone());
            } else {
                self.social_links
                    .insert(account.provider.clone(), account.url.clone());
            }
        }
    }

    /// Replaces the email set with first-commit author emails seen in public activity.
    pub fn apply_public_events(&mut self, events: &[PublicEvent]) {
        self.derived_emails = events
            .iter()
            .filter_map(PublicEvent::first_commit_email)
            .map(str::trim)
            .filter(|email| !email.is_empty())
            .map(str::to_string)
            .collect();
    }

    pub fn email_field(&self) -> String {
        join(self.derived_emails.iter().map(String::as_str))
    }

    pub fn generic_field(&self) -> String {
        join(self.generic_links.iter().map(String::as_str))
    }

    /// Providers that have no column of their own.
    pub fn unmapped_providers(&self) -> impl Iterator<Item = &str> {
        self.social_links
            .keys()
            .map(String::as_str)
            .filter(|p| !NAMED_PROVIDERS.contains(p))
    }

    /// Column names matching [`EnrichedProfile::to_record`].
    pub fn header(include_counts: bool) -> Vec<&'static str> {
        let mut header = vec![
            "username", "User ID", "name", "company", "blog", "location", "email", "bio",
        ];
        if include_counts {
            header.extend(["followers", "following", "public_repos"]);
        }
        header.extend(NAMED_PROVIDERS);
        header.extend([GENERIC_PROVIDER, "created_at", "updated_at"]);
        header
    }

    pub fn to_record(&self, include_counts: bool) -> Vec<String> {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        let count = |v: Option<u64>| v.map(|n| n.to_string()).unwrap_or_default();
        let stamp = |v: Option<DateTime<Utc>>| {
            v.map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
                .unwrap_or_default()
        };

        let mut record = vec![
            self.handle.clone(),
            self.numeric_id.to_string(),
            text(&self.display_name),
            text(&self.company),
            text(&self.blog),
            text(&self.location),
            self.email_field(),
            text(&self.bio),
        ];
        if include_counts {
            record.extend([
                count(self.followers),
                count(self.following),
                count(self.public_repos),
            ]);
        }
        record.extend(
            NAMED_PROVIDERS
                .iter()
                .map(|p| self.social_links.get(*p).cloned().unwrap_or_default()),
        );
        record.extend([
            self.generic_field(),
            stamp(self.created_at),
            stamp(self.updated_at),
        ]);
        record
    }
}

fn join<'a>(values: impl Iterator<Item = &'a str>) -> String {
    values.collect::<Vec<_>>().join(LIST_SEPARATOR)
}
