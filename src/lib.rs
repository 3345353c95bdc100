pub mod config;
pub mod error;
pub mod pipeline;
pub mod store;
pub mod types;
pub mod upstream;

mod utils;

pub use config::Config;
pub use error::ScoutError;
pub use pipeline::{RunSummary, Scout};
pub use types::{EnrichedProfile, IdentitySummary, Partition};
