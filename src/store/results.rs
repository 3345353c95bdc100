use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::PathBuf;

use super::csv_file::{append_rows, read_column};
use crate::error::ScoutError;
use crate::types::{EnrichedProfile, Partition};

/// Enriched rows, one append-only CSV per partition.
///
/// There is no existence check on append: enriching a handle twice writes it twice.
#[derive(Debug, Clone)]
pub struct ResultStore {
    root: PathBuf,
    include_counts: bool,
}

impl ResultStore {
    pub fn new(root: impl Into<PathBuf>, include_counts: bool) -> Self {
        Self {
            root: root.into(),
            include_counts,
        }
    }

    pub fn path_for(&self, partition: &Partition) -> PathBuf {
        self.root.join(partition.relative_path())
    }

    pub async fn append(
        &self,
        partition: &Partition,
        profile: &EnrichedProfile,
    ) -> Result<(), ScoutError> {
        let header = EnrichedProfile::header(self.include_counts);
        let row = profile.to_record(self.include_counts);
        append_rows(&self.path_for(partition), &header, &[row]).await?;
        Ok(())
    }

    /// Handles already written for `partition`; empty if nothing was written yet.
    pub async fn known_handles(&self, partition: &Partition) -> Result<HashSet<String>, ScoutError> {
        match read_column(&self.path_for(partition), "username").await {
            Ok(handles) => Ok(handles.into_iter().collect()),
            Err(ScoutError::IoError(e)) if e.kind() == ErrorKind::NotFound => Ok(HashSet::new()),
            Err(e) => Err(e),
        }
    }
}
