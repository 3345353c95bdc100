use serde::Deserialize;
use std::collections::HashSet;
use std::path::PathBuf;

use crate::error::ScoutError;

/// Regions a run may walk, in walk order.
pub const REGIONS: [&str; 50] = [
    "Alabama",
    "Alaska",
    "Arizona",
    "Arkansas",
    "California",
    "Colorado",
    "Connecticut",
    "Delaware",
    "Florida",
    "Georgia",
    "Hawaii",
    "Idaho",
    "Illinois",
    "Indiana",
    "Iowa",
    "Kansas",
    "Kentucky",
    "Louisiana",
    "Maine",
    "Maryland",
    "Massachusetts",
    "Michigan",
    "Minnesota",
    "Mississippi",
    "Missouri",
    "Montana",
    "Nebraska",
    "Nevada",
    "New Hampshire",
    "New Jersey",
    "New Mexico",
    "New York",
    "North Carolina",
    "North Dakota",
    "Ohio",
    "Oklahoma",
    "Oregon",
    "Pennsylvania",
    "Rhode Island",
    "South Carolina",
    "South Dakota",
    "Tennessee",
    "Texas",
    "Utah",
    "Vermont",
    "Virginia",
    "Washington",
    "West Virginia",
    "Wisconsin",
    "Wyoming",
];

const CITY_COLUMN: &str = "city_state_short";

#[derive(Debug, Deserialize)]
struct CityRow {
    #[serde(rename = "city_state_short", default)]
    city: Option<String>,
}

/// Reference tables listing the cities of each region: `<dir>/<Region>.csv`.
#[derive(Debug, Clone)]
pub struct RegionCatalog {
    dir: PathBuf,
}

impl RegionCatalog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn is_known_region(region: &str) -> bool {
        REGIONS.contains(&region)
    }

    pub fn path_for(&self, region: &str) -> PathBuf {
        self.dir.join(format!("{region}.csv"))
    }

    /// Distinct, trimmed, non-blank cities in table order.
    ///
    /// Tables are small and read once per region, so this reads synchronously.
    pub fn cities(&self, region: &str) -> Result<Vec<String>, ScoutError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(self.path_for(region))?;
        if !reader.headers()?.iter().any(|h| h.trim() == CITY_COLUMN) {
            return Err(ScoutError::config(format!(
                "{} has no `{CITY_COLUMN}` column",
                self.path_for(region).display()
            )));
        }

        let mut seen = HashSet::new();
        let mut cities = Vec::new();
        for row in reader.deserialize::<CityRow>() {
            let Some(city) = row?.city else { continue };
            let city = city.trim();
            if !city.is_empty() && seen.insert(city.to_string()) {
                cities.push(city.to_string());
            }
        }
        Ok(cities)
    }

    pub fn contains_city(&self, region: &str, city: &str) -> Result<bool, ScoutError> {
        Ok(self.cities(region)?.iter().any(|c| c == city.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_distinct_cities_in_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("Texas.csv"),
            "city,city_state_short,population\nAustin,\"Austin, TX\",1\nDallas,\"  Dallas, TX \",2\nNowhere,,0\nAustin,\"Austin, TX\",1\n",
        )
        .unwrap();
        let catalog = RegionCatalog::new(dir.path());

        assert_eq!(
            catalog.cities("Texas").unwrap(),
            vec!["Austin, TX", "Dallas, TX"]
        );
        assert!(catalog.contains_city("Texas", "Austin, TX").unwrap());
        assert!(!catalog.contains_city("Texas", "Houston, TX").unwrap());
    }

    #[test]
    fn missing_table_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = RegionCatalog::new(dir.path());
        assert!(catalog.cities("Ohio").is_err());
        assert!(RegionCatalog::is_known_region("Ohio"));
        assert!(!RegionCatalog::is_known_region("Ontario"));
    }
}
