use chrono::NaiveDate;
use std::fmt;
use std::path::PathBuf;

/// One unit of crawl work: a region (optionally narrowed to a city) and an inclusive date window.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Partition {
    pub region: String,
    pub city: Option<String>,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
}

/// Ledger identity of a partition. The city is empty for region-wide partitions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PartitionKey {
    pub region: String,
    pub city: String,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
}

pub const DATE_FORMAT: &str = "%Y-%m-%d";

impl Partition {
    pub fn new(
        region: impl Into<String>,
        city: Option<String>,
        window_start: NaiveDate,
        window_end: NaiveDate,
    ) -> Self {
        Self {
            region: region.into(),
            city,
            window_start,
            window_end,
        }
    }

    /// Free-text location filter sent to the search API.
    pub fn location(&self) -> &str {
        self.city.as_deref().unwrap_or(&self.region)
    }

    /// `created:` qualifier range, inclusive on both ends.
    pub fn created_range(&self) -> String {
        format!(
            "{}..{}",
            self.window_start.format(DATE_FORMAT),
            self.window_end.format(DATE_FORMAT)
        )
    }

    pub fn search_query(&self) -> String {
        format!(
            "created:{} location:\"{}\" type:user",
            self.created_range(),
            self.location()
        )
    }

    /// `<region>/<city>/<start>-<end>.csv` below a store root.
    pub fn relative_path(&self) -> PathBuf {
        let mut path = PathBuf::from(path_segment(&self.region));
        if let Some(city) = &self.city {
            path.push(path_segment(city));
        }
        path.push(format!(
            "{}-{}.csv",
            self.window_start.format(DATE_FORMAT),
            self.window_end.format(DATE_FORMAT)
        ));
        path
    }

    pub fn key(&self) -> PartitionKey {
        PartitionKey {
            region: self.region.clone(),
            city: self.city.clone().unwrap_or_default(),
            window_start: self.window_start,
            window_end: self.window_end,
        }
    }
}

/// Makes a location name safe as one directory name: separators and control characters become
/// `_`, and names that are only dots (or empty) are replaced.
fn path_segment(raw: &str) -> String {
    let cleaned: String = raw
        .trim()
        .chars()
        .map(|c| {
            if matches!(c, '/' | '\\') || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    if cleaned.chars().all(|c| c == '.') {
        "_".repeat(cleaned.len().max(1))
    } else {
        cleaned
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.city {
            Some(city) => write!(f, "{}/{} [{}]", self.region, city, self.created_range()),
            None => write!(f, "{} [{}]", self.region, self.created_range()),
        }
    }
}
