// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::{Date, Duration};

use crate::ids::LocationId;
use crate::model::{LocationEntry, MeasurementRecord};

/// Read-only source of per-location measurement history. The built-in
/// [`StaticCatalog`] stands in until a live provider implements this.
pub trait LocationSource {
    fn lookup(&self, id: &LocationId) -> Option<LocationEntry>;
    /// Known ids in display order.
    fn locations(&self) -> Vec<LocationId>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct StaticCatalog {
    entries: Vec<LocationEntry>,
}

impl StaticCatalog {
    pub fn new(entries: Vec<LocationEntry>) -> Self {
        Self { entries }
    }

    /// Sample readings for the three demo cities, dated the two days before
    /// `today` and `today` itself.
    pub fn builtin(today: Date) -> Self {
        let day = |offset: i64| today.saturating_sub(Duration::days(offset));
        Self::new(vec![
            LocationEntry {
                id: LocationId::from("new-york"),
                name: "New York".to_owned(),
                current_aqi: 45,
                records: vec![
                    reading(day(2), [25.0, 12.0, 18.0, 9.0, 0.0], [0.3, 55.0, 0.054, 40.0, 25.0, 17.0]),
                    reading(day(1), [24.0, 14.0, 20.0, 10.0, 0.0], [0.6, 58.0, 0.028, 45.0, 28.0, 30.0]),
                    reading(day(0), [23.0, 16.0, 22.0, 12.0, 0.0], [0.4, 17.0, 0.086, 42.0, 26.0, 42.0]),
                ],
            },
            LocationEntry {
                id: LocationId::from("london"),
                name: "London".to_owned(),
                current_aqi: 38,
                records: vec![
                    reading(day(2), [16.0, 10.0, 15.0, 7.0, 1.0], [0.4, 114.0, 0.28, 35.0, 22.0, 2.0]),
                    reading(day(1), [15.0, 12.0, 17.0, 8.0, 0.5], [0.3, 116.0, 0.3, 38.0, 24.0, 2.0]),
                    reading(day(0), [14.0, 14.0, 19.0, 9.0, 0.0], [0.5, 115.0, 0.29, 37.0, 23.0, 2.0]),
                ],
            },
            LocationEntry {
                id: LocationId::from("paris"),
                name: "Paris".to_owned(),
                current_aqi: 50,
                records: vec![
                    reading(day(2), [26.0, 10.0, 15.0, 7.0, 1.0], [0.4, 14.0, 0.08, 35.0, 22.0, 112.0]),
                    reading(day(1), [25.0, 12.0, 17.0, 8.0, 0.5], [0.3, 16.0, 0.07, 38.0, 24.0, 123.0]),
                    reading(day(0), [24.0, 14.0, 19.0, 9.0, 0.0], [0.5, 15.0, 0.05, 37.0, 23.0, 142.0]),
                ],
            },
        ])
    }
}

impl LocationSource for StaticCatalog {
    fn lookup(&self, id: &LocationId) -> Option<LocationEntry> {
        self.entries.iter().find(|entry| &entry.id == id).cloned()
    }

    fn locations(&self) -> Vec<LocationId> {
        self.entries.iter().map(|entry| entry.id.clone()).collect()
    }
}

/// `weather` is dew point, wind speed, max, min, precipitation; `pollution`
/// is co, no2, o3, pm10, pm25, so2.
fn reading(date: Date, weather: [f64; 5], pollution: [f64; 6]) -> MeasurementRecord {
    let [dew_point, wind_speed, max_temp, min_temp, precipitation] = weather;
    let [co, no2, o3, pm10, pm25, so2] = pollution;
    MeasurementRecord {
        date,
        dew_point,
        wind_speed,
        max_temp,
        min_temp,
        precipitation,
        co,
        no2,
        o3,
        pm10,
        pm25,
        so2,
    }
}

#[cfg(test)]
mod tests {
    use super::{LocationSource, StaticCatalog};
    use crate::ids::LocationId;
    use time::macros::date;

    #[test]
    fn paris_has_three_days_ending_today() {
        let today = date!(2024 - 05 - 01);
        let catalog = StaticCatalog::builtin(today);
        let entry = catalog
            .lookup(&LocationId::from("paris"))
            .expect("paris is built in");

        let so2 = entry
            .records
            .iter()
            .map(|record| record.so2)
            .collect::<Vec<_>>();
        assert_eq!(so2, vec![112.0, 123.0, 142.0]);

        let dates = entry
            .records
            .iter()
            .map(|record| record.date)
            .collect::<Vec<_>>();
        assert_eq!(
            dates,
            vec![date!(2024 - 04 - 29), date!(2024 - 04 - 30), today]
        );
        assert_eq!(entry.current_aqi, 50);
    }

    #[test]
    fn unknown_location_is_a_miss() {
        let catalog = StaticCatalog::builtin(date!(2024 - 05 - 01));
        assert!(catalog.lookup(&LocationId::from("atlantis")).is_none());
    }

    #[test]
    fn locations_keep_display_order() {
        let catalog = StaticCatalog::builtin(date!(2024 - 05 - 01));
        let ids = catalog
            .locations()
            .into_iter()
            .map(|id| id.as_str().to_owned())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["new-york", "london", "paris"]);
    }
}
