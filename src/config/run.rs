use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ScoutError;

/// Which partitions a run walks. Replaces interactive parameter prompts.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunConfig {
    /// One region name, or unset / `"all"` for every known region.
    /// TOML: `run.region`.
    #[serde(default)]
    pub region: Option<String>,

    /// One city of `region`, or unset / `"all"` for every city in its table.
    /// Ignored unless `region` names a single region.
    /// TOML: `run.city`.
    #[serde(default)]
    pub city: Option<String>,

    /// Search the region name itself instead of each city.
    /// TOML: `run.region_wide`. Default: `false`.
    #[serde(default)]
    pub region_wide: bool,

    /// Inclusive, quoted `YYYY-MM-DD`.
    /// TOML: `run.start_date`. Default: `"2014-01-01"`.
    #[serde(default = "default_start_date")]
    pub start_date: NaiveDate,

    /// Inclusive, quoted `YYYY-MM-DD`.
    /// TOML: `run.end_date`. Default: `"2023-12-31"`.
    #[serde(default = "default_end_date")]
    pub end_date: NaiveDate,

    /// TOML: `run.window` (`whole`, `month`, `day`). Default: `month`.
    #[serde(default)]
    pub window: WindowSize,

    /// TOML: `run.direction` (`forward`, `backward`). Default: `forward`.
    #[serde(default)]
    pub direction: Direction,

    /// Partitions processed concurrently. Upstream calls still share one rate limit.
    /// TOML: `run.workers`. Default: `1`.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Skip partitions already present in the ledgers.
    /// TOML: `run.skip_completed`. Default: `true`.
    #[serde(default = "default_skip_completed")]
    pub skip_completed: bool,

    /// Skip handles already present in a partition's result file.
    /// TOML: `run.skip_known_handles`. Default: `false`.
    #[serde(default)]
    pub skip_known_handles: bool,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WindowSize {
    Whole,
    #[default]
    Month,
    Day,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

impl RunConfig {
    /// Selected region, with `"all"` folded into `None`.
    pub fn selected_region(&self) -> Option<&str> {
        selection(self.region.as_deref())
    }

    /// Selected city, only meaningful with a selected region.
    pub fn selected_city(&self) -> Option<&str> {
        self.selected_region()?;
        selection(self.city.as_deref())
    }

    pub fn validate_dates(&self) -> Result<(), ScoutError> {
        if self.start_date > self.end_date {
            return Err(ScoutError::config(format!(
                "run.end_date ({}) must not be earlier than run.start_date ({})",
                self.end_date, self.start_date
            )));
        }
        Ok(())
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            region: None,
            city: None,
            region_wide: false,
            start_date: default_start_date(),
            end_date: default_end_date(),
            window: WindowSize::default(),
            direction: Direction::default(),
            workers: default_workers(),
            skip_completed: default_skip_completed(),
            skip_known_handles: false,
        }
    }
}

fn selection(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2014, 1, 1).unwrap_or_default()
}

fn default_end_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 12, 31).unwrap_or_default()
}

fn default_workers() -> usize {
    1
}

fn default_skip_completed() -> bool {
    true
}
