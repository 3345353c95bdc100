mod identity;
mod partition;
mod profile;

pub use identity::IdentitySummary;
pub use partition::{DATE_FORMAT, Partition, PartitionKey};
pub use profile::{EnrichedProfile, GENERIC_PROVIDER, NAMED_PROVIDERS};
