use std::path::PathBuf;

use super::csv_file::{append_rows, read_column};
use crate::error::ScoutError;
use crate::types::{IdentitySummary, Partition};

/// Search summaries, one append-only CSV per partition.
#[derive(Debug, Clone)]
pub struct PartitionStore {
    root: PathBuf,
}

impl PartitionStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, partition: &Partition) -> PathBuf {
        self.root.join(partition.relative_path())
    }

    /// Appends one page of summaries.
    pub async fn append(
        &self,
        partition: &Partition,
        records: &[IdentitySummary],
    ) -> Result<usize, ScoutError> {
        append_rows(&self.path_for(partition), &IdentitySummary::HEADER, records).await
    }

    /// Creates a header-only file if none exists yet.
    pub async fn touch(&self, partition: &Partition) -> Result<(), ScoutError> {
        let empty: &[IdentitySummary] = &[];
        append_rows(&self.path_for(partition), &IdentitySummary::HEADER, empty).await?;
        Ok(())
    }

    /// Every stored handle, in discovery order. Fails if the partition was never searched.
    pub async fn list_identities(&self, partition: &Partition) -> Result<Vec<String>, ScoutError> {
        read_column(&self.path_for(partition), IdentitySummary::HEADER[0]).await
    }
}
