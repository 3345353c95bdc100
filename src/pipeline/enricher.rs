use gitscout_schema::{PublicEvent, SocialAccount, UserProfile};
use std::sync::Arc;
use tracing::debug;

use crate::error::ScoutError;
use crate::types::EnrichedProfile;
use crate::upstream::{Expect, GithubApi, Throttle};

/// Builds an [`EnrichedProfile`] from three sequential calls: profile, social accounts and
/// public activity. Nothing is returned unless all three succeed.
pub struct EntityEnricher {
    api: Arc<GithubApi>,
    throttle: Arc<Throttle>,
}

impl EntityEnricher {
    pub fn new(api: Arc<GithubApi>, throttle: Arc<Throttle>) -> Self {
        Self { api, throttle }
    }

    pub async fn enrich(&self, handle: &str) -> Result<EnrichedProfile, ScoutError> {
        let body = self
            .throttle
            .execute(handle, Expect::Field("login"), || self.api.user(handle))
            .await?;
        let profile: UserProfile = serde_json::from_value(body)?;
        let mut record = EnrichedProfile::from_profile(profile);

        let body = self
            .throttle
            .execute(handle, Expect::List, || self.api.social_accounts(handle))
            .await?;
        let accounts: Vec<SocialAccount> = serde_json::from_value(body)?;
        record.apply_social_accounts(&accounts);

        let body = self
            .throttle
            .execute(handle, Expect::List, || self.api.public_events(handle))
            .await?;
        let events: Vec<PublicEvent> = serde_json::from_value(body)?;
        record.apply_public_events(&events);

        let unmapped: Vec<&str> = record.unmapped_providers().collect();
        if !unmapped.is_empty() {
            debug!(handle, ?unmapped, "Social providers without an output column");
        }
        debug!(
            handle,
            social = accounts.len(),
            events = events.len(),
            emails = record.derived_emails.len(),
            "Identity enriched"
        );
        Ok(record)
    }
}
