use chrono::{Datelike, Months, NaiveDate};
use std::sync::Arc;
use tracing::{error, info};

use crate::config::{Direction, RunConfig, WindowSize};
use crate::error::ScoutError;
use crate::store::{REGIONS, RegionCatalog};
use crate::types::Partition;

/// Enumerates partitions region -> city -> window, lazily.
pub struct PartitionPlanner {
    catalog: RegionCatalog,
    run: RunConfig,
}

impl PartitionPlanner {
    pub fn new(catalog: RegionCatalog, run: RunConfig) -> Self {
        Self { catalog, run }
    }

    /// Startup checks on the run selection. Any failure here is fatal.
    pub fn validate(&self) -> Result<(), ScoutError> {
        self.run.validate_dates()?;

        let Some(region) = self.run.selected_region() else {
            return Ok(());
        };
        if !RegionCatalog::is_known_region(region) {
            return Err(ScoutError::config(format!("run.region `{region}` is not a known region")));
        }
        if self.run.region_wide {
            return Ok(());
        }
        if let Some(city) = self.run.selected_city() {
            if !self.catalog.contains_city(region, city)? {
                return Err(ScoutError::config(format!(
                    "run.city `{city}` is not listed in {}",
                    self.catalog.path_for(region).display()
                )));
            }
        }
        Ok(())
    }

    pub fn regions(&self) -> Vec<String> {
        match self.run.selected_region() {
            Some(region) => vec![region.to_string()],
            None => REGIONS.iter().map(|r| (*r).to_string()).collect(),
        }
    }

    pub fn windows(&self) -> Vec<(NaiveDate, NaiveDate)> {
        split_windows(
            self.run.start_date,
            self.run.end_date,
            self.run.window,
            self.run.direction,
        )
    }

    /// Location filters for one region. An unreadable city table skips the region.
    fn locations(&self, region: &str) -> Vec<Option<String>> {
        if self.run.region_wide {
            return vec![None];
        }
        if let Some(city) = self.run.selected_city() {
            return vec![Some(city.to_string())];
        }
        match self.catalog.cities(region) {
            Ok(cities) => {
                info!(region, cities = cities.len(), "Loaded city table");
                cities.into_iter().map(Some).collect()
            }
            Err(e) => {
                error!(
                    region,
                    path = %self.catalog.path_for(region).display(),
                    error = %e,
                    "Failed to read city table; skipping region"
                );
                Vec::new()
            }
        }
    }

    pub fn partitions(&self) -> impl Iterator<Item = Partition> + '_ {
        let windows: Arc<[(NaiveDate, NaiveDate)]> = self.windows().into();
        self.regions().into_iter().flat_map(move |region| {
            let windows = Arc::clone(&windows);
            self.locations(&region).into_iter().flat_map(move |city| {
                let region = region.clone();
                let windows = Arc::clone(&windows);
                (0..windows.len()).map(move |i| {
                    let (start, end) = windows[i];
                    Partition::new(region.clone(), city.clone(), start, end)
                })
            })
        })
    }
}

/// Splits the inclusive range `[start, end]` into non-overlapping windows, clipped to the range.
pub fn split_windows(
    start: NaiveDate,
    end: NaiveDate,
    size: WindowSize,
    direction: Direction,
) -> Vec<(NaiveDate, NaiveDate)> {
    let mut windows = Vec::new();
    let mut cursor = start;

    while cursor <= end {
        let window_end = match size {
            WindowSize::Whole => end,
            WindowSize::Month => month_end(cursor).min(end),
            WindowSize::Day => cursor,
        };
        windows.push((cursor, window_end));
        let Some(next) = window_end.succ_opt() else {
            break;
        };
        cursor = next;
    }

    if direction == Direction::Backward {
        windows.reverse();
    }
    windows
}

fn month_end(date: NaiveDate) -> NaiveDate {
    date.with_day(1)
        .and_then(|first| first.checked_add_months(Months::new(1)))
        .and_then(|next_first| next_first.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_windows_are_clipped_to_the_range() {
        let windows = split_windows(
            date(2020, 1, 15),
            date(2020, 3, 10),
            WindowSize::Month,
            Direction::Forward,
        );
        assert_eq!(
            windows,
            vec![
                (date(2020, 1, 15), date(2020, 1, 31)),
                (date(2020, 2, 1), date(2020, 2, 29)),
                (date(2020, 3, 1), date(2020, 3, 10)),
            ]
        );
    }

    #[test]
    fn backward_walk_reverses_windows() {
        let windows = split_windows(
            date(2021, 11, 1),
            date(2022, 1, 31),
            WindowSize::Month,
            Direction::Backward,
        );
        assert_eq!(windows.first(), Some(&(date(2022, 1, 1), date(2022, 1, 31))));
        assert_eq!(windows.last(), Some(&(date(2021, 11, 1), date(2021, 11, 30))));
    }

    #[test]
    fn whole_and_day_windows() {
        let whole = split_windows(
            date(2014, 1, 1),
            date(2023, 12, 31),
            WindowSize::Whole,
            Direction::Forward,
        );
        assert_eq!(whole, vec![(date(2014, 1, 1), date(2023, 12, 31))]);

        let days = split_windows(
            date(2020, 2, 28),
            date(2020, 3, 1),
            WindowSize::Day,
            Direction::Forward,
        );
        assert_eq!(days.len(), 3);
        assert!(days.iter().all(|(s, e)| s == e));
    }

    fn catalog_with_texas() -> (tempfile::TempDir, RegionCatalog) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("Texas.csv"),
            "city_state_short\n\"Austin, TX\"\n\"Dallas, TX\"\n",
        )
        .unwrap();
        let catalog = RegionCatalog::new(dir.path());
        (dir, catalog)
    }

    #[test]
    fn partitions_follow_region_city_window_order() {
        let (_dir, catalog) = catalog_with_texas();
        let planner = PartitionPlanner::new(
            catalog,
            RunConfig {
                region: Some("Texas".to_string()),
                start_date: date(2020, 1, 1),
                end_date: date(2020, 2, 29),
                ..RunConfig::default()
            },
        );
        assert!(planner.validate().is_ok());

        let got: Vec<String> = planner.partitions().map(|p| p.to_string()).collect();
        assert_eq!(
            got,
            vec![
                "Texas/Austin, TX [2020-01-01..2020-01-31]",
                "Texas/Austin, TX [2020-02-01..2020-02-29]",
                "Texas/Dallas, TX [2020-01-01..2020-01-31]",
                "Texas/Dallas, TX [2020-02-01..2020-02-29]",
            ]
        );
    }

    #[test]
    fn missing_tables_skip_regions() {
        let (_dir, catalog) = catalog_with_texas();
        let planner = PartitionPlanner::new(
            catalog,
            RunConfig {
                window: WindowSize::Whole,
                ..RunConfig::default()
            },
        );
        let regions: Vec<String> = planner.partitions().map(|p| p.region).collect();
        assert_eq!(regions, vec!["Texas", "Texas"]);
    }

    #[test]
    fn region_wide_partitions_have_no_city() {
        let dir = tempfile::tempdir().unwrap();
        let planner = PartitionPlanner::new(
            RegionCatalog::new(dir.path()),
            RunConfig {
                region: Some("Ohio".to_string()),
                region_wide: true,
                window: WindowSize::Whole,
                ..RunConfig::default()
            },
        );
        let parts: Vec<Partition> = planner.partitions().collect();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].city, None);
        assert_eq!(parts[0].location(), "Ohio");
    }

    #[test]
    fn unknown_selections_fail_validation() {
        let (_dir, catalog) = catalog_with_texas();
        let bad_region = PartitionPlanner::new(
            catalog.clone(),
            RunConfig {
                region: Some("Ontario".to_string()),
                ..RunConfig::default()
            },
        );
        assert!(bad_region.validate().is_err());

        let bad_city = PartitionPlanner::new(
            catalog,
            RunConfig {
                region: Some("Texas".to_string()),
                city: Some("Houston, TX".to_string()),
                ..RunConfig::default()
            },
        );
        assert!(bad_city.validate().is_err());
    }
}
