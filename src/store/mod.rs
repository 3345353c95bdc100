mod catalog;
mod csv_file;
mod ledger;
mod partition;
mod results;

pub use catalog::{REGIONS, RegionCatalog};
pub use ledger::{Ledger, LedgerEntry};
pub use partition::PartitionStore;
pub use results::ResultStore;
