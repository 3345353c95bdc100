use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use tokio::sync::Mutex;

use super::csv_file::{append_rows, read_rows};
use crate::error::ScoutError;
use crate::types::{Partition, PartitionKey};

/// One manifest row: a partition phase that ran to completion and how many rows it produced.
///
/// `count` is what this run stored, not the upstream's `total_count`. The two differ when a
/// search matches more than the API exposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub state: String,
    #[serde(default)]
    pub city: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub count: u64,
}

impl LedgerEntry {
    pub const HEADER: [&'static str; 5] = ["state", "city", "start_date", "end_date", "count"];

    pub fn key(&self) -> PartitionKey {
        PartitionKey {
            region: self.state.clone(),
            city: self.city.clone(),
            window_start: self.start_date,
            window_end: self.end_date,
        }
    }
}

/// Append-only manifest shared by every worker; appends are serialized.
#[derive(Debug)]
pub struct Ledger {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl Ledger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub async fn record(&self, partition: &Partition, count: u64) -> Result<(), ScoutError> {
        let key = partition.key();
        let entry = LedgerEntry {
            state: key.region,
            city: key.city,
            start_date: key.window_start,
            end_date: key.window_end,
            count,
        };
        let _guard = self.write_lock.lock().await;
        append_rows(&self.path, &LedgerEntry::HEADER, &[entry]).await?;
        Ok(())
    }

    /// Readable rows in file order. A torn or malformed row is skipped, so the partition it
    /// named simply runs again.
    pub async fn entries(&self) -> Result<Vec<LedgerEntry>, ScoutError> {
        read_rows(&self.path).await
    }

    /// Partitions with at least one row, i.e. attempted to completion, zero results included.
    pub async fn completed(&self) -> Result<HashSet<PartitionKey>, ScoutError> {
        Ok(self.entries().await?.iter().map(LedgerEntry::key).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, d).unwrap()
    }

    #[tokio::test]
    async fn records_are_read_back_as_completed_keys() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Ledger::new(dir.path().join("account_count.csv"));
        assert!(ledger.completed().await.unwrap().is_empty());

        let city = Partition::new("Texas", Some("Austin, TX".to_string()), date(1), date(31));
        let wide = Partition::new("Texas", None, date(1), date(31));
        ledger.record(&city, 0).await.unwrap();
        ledger.record(&wide, 12).await.unwrap();

        let entries = ledger.entries().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].count, 0);
        assert_eq!(entries[1].city, "");

        let done = ledger.completed().await.unwrap();
        assert!(done.contains(&city.key()));
        assert!(done.contains(&wide.key()));
        assert!(!done.contains(&Partition::new("Texas", None, date(2), date(31)).key()));

        let text = std::fs::read_to_string(dir.path().join("account_count.csv")).unwrap();
        assert!(text.starts_with("state,city,start_date,end_date,count\n"));
        assert!(text.contains("Texas,\"Austin, TX\",2020-01-01,2020-01-31,0\n"));
    }

    #[tokio::test]
    async fn torn_last_row_is_skipped_and_appends_still_land() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("account_count.csv");
        std::fs::write(
            &path,
            "state,city,start_date,end_date,count\n\
             Texas,\"Austin, TX\",2020-01-01,2020-01-31,150\n\
             Texas,\"Dallas, TX\",2020-0",
        )
        .unwrap();
        let ledger = Ledger::new(&path);

        let entries = ledger.entries().await.expect("torn rows are not fatal");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].city, "Austin, TX");
        assert_eq!(entries[0].count, 150);

        let dallas = Partition::new("Texas", Some("Dallas, TX".to_string()), date(1), date(31));
        ledger.record(&dallas, 7).await.unwrap();

        let done = ledger.completed().await.unwrap();
        assert_eq!(done.len(), 2);
        assert!(done.contains(&dallas.key()));
    }
}
