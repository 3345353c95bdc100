mod enricher;
mod paginator;
mod planner;
mod scout;

pub use enricher::EntityEnricher;
pub use paginator::{SearchPage, SearchPaginator, has_next_page};
pub use planner::{PartitionPlanner, split_windows};
pub use scout::{RunSummary, Scout};
