// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! EPA air quality index math: per-pollutant breakpoint interpolation and
//! the category bands used to color forecasts.

use crate::model::{MeasurementField, MeasurementRow};

const CONCENTRATION_CEILING: f64 = 9999.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Breakpoint {
    aqi_low: f64,
    aqi_high: f64,
    conc_low: f64,
    conc_high: f64,
}

const fn bp(aqi_low: f64, aqi_high: f64, conc_low: f64, conc_high: f64) -> Breakpoint {
    Breakpoint {
        aqi_low,
        aqi_high,
        conc_low,
        conc_high,
    }
}

const PM25: [Breakpoint; 6] = [
    bp(0.0, 50.0, 0.0, 9.0),
    bp(51.0, 100.0, 9.1, 35.4),
    bp(101.0, 150.0, 35.5, 55.4),
    bp(151.0, 200.0, 55.5, 125.4),
    bp(201.0, 300.0, 125.5, 225.4),
    bp(301.0, 9999.0, 225.5, 9999.0),
];

const PM10: [Breakpoint; 6] = [
    bp(0.0, 50.0, 0.0, 54.0),
    bp(51.0, 100.0, 55.0, 154.0),
    bp(101.0, 150.0, 155.0, 254.0),
    bp(151.0, 200.0, 255.0, 354.0),
    bp(201.0, 300.0, 355.0, 424.0),
    bp(301.0, 9999.0, 425.0, 9999.0),
];

const CO: [Breakpoint; 6] = [
    bp(0.0, 50.0, 0.0, 4.4),
    bp(51.0, 100.0, 4.5, 9.4),
    bp(101.0, 150.0, 9.5, 12.4),
    bp(151.0, 200.0, 12.5, 15.4),
    bp(201.0, 300.0, 15.5, 30.4),
    bp(301.0, 9999.0, 30.5, 9999.0),
];

const SO2: [Breakpoint; 6] = [
    bp(0.0, 50.0, 0.0, 35.0),
    bp(51.0, 100.0, 36.0, 75.0),
    bp(101.0, 150.0, 76.0, 185.0),
    bp(151.0, 200.0, 186.0, 304.0),
    bp(201.0, 300.0, 305.0, 604.0),
    bp(301.0, 9999.0, 605.0, 9999.0),
];

const NO2: [Breakpoint; 6] = [
    bp(0.0, 50.0, 0.0, 53.0),
    bp(51.0, 100.0, 54.0, 100.0),
    bp(101.0, 150.0, 101.0, 360.0),
    bp(151.0, 200.0, 361.0, 649.0),
    bp(201.0, 300.0, 650.0, 1249.0),
    bp(301.0, 9999.0, 1250.0, 9999.0),
];

const O3: [Breakpoint; 6] = [
    bp(0.0, 50.0, 0.0, 0.054),
    bp(51.0, 100.0, 0.055, 0.070),
    bp(101.0, 150.0, 0.071, 0.085),
    bp(151.0, 200.0, 0.086, 0.105),
    bp(201.0, 300.0, 0.106, 0.200),
    bp(301.0, 9999.0, 0.201, 9999.0),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pollutant {
    Pm25,
    Pm10,
    Co,
    So2,
    No2,
    O3,
}

impl Pollutant {
    pub const ALL: [Self; 6] = [
        Self::Pm25,
        Self::Pm10,
        Self::Co,
        Self::So2,
        Self::No2,
        Self::O3,
    ];

    pub const fn field(self) -> MeasurementField {
        match self {
            Self::Pm25 => MeasurementField::Pm25,
            Self::Pm10 => MeasurementField::Pm10,
            Self::Co => MeasurementField::Co,
            Self::So2 => MeasurementField::So2,
            Self::No2 => MeasurementField::No2,
            Self::O3 => MeasurementField::O3,
        }
    }

    const fn breakpoints(self) -> &'static [Breakpoint; 6] {
        match self {
            Self::Pm25 => &PM25,
            Self::Pm10 => &PM10,
            Self::Co => &CO,
            Self::So2 => &SO2,
            Self::No2 => &NO2,
            Self::O3 => &O3,
        }
    }

    /// Decimal places the concentration is rounded to before lookup.
    const fn precision(self) -> i32 {
        match self {
            Self::Pm25 | Self::Co => 1,
            Self::Pm10 | Self::So2 | Self::No2 => 0,
            Self::O3 => 3,
        }
    }

    /// Sub-index for a single concentration, or `None` when it falls in a
    /// gap between bands.
    pub fn sub_index(self, concentration: f64) -> Option<i64> {
        if !concentration.is_finite() {
            return None;
        }
        let clamped = concentration.clamp(0.0, CONCENTRATION_CEILING);
        let rounded = round_to(clamped, self.precision());
        self.breakpoints()
            .iter()
            .find(|band| band.conc_low <= rounded && rounded <= band.conc_high)
            .map(|band| {
                let slope = (band.aqi_high - band.aqi_low) / (band.conc_high - band.conc_low);
                (slope * (rounded - band.conc_low) + band.aqi_low).round_ties_even() as i64
            })
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round_ties_even() / scale
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pollutants {
    pub pm25: Option<f64>,
    pub pm10: Option<f64>,
    pub co: Option<f64>,
    pub so2: Option<f64>,
    pub no2: Option<f64>,
    pub o3: Option<f64>,
}

impl Pollutants {
    /// Reads the concentration cells of an editable row. Cells that are not
    /// numbers count as missing.
    pub fn from_row(row: &MeasurementRow) -> Self {
        let read = |pollutant: Pollutant| row.get(pollutant.field()).trim().parse::<f64>().ok();
        Self {
            pm25: read(Pollutant::Pm25),
            pm10: read(Pollutant::Pm10),
            co: read(Pollutant::Co),
            so2: read(Pollutant::So2),
            no2: read(Pollutant::No2),
            o3: read(Pollutant::O3),
        }
    }

    pub const fn get(&self, pollutant: Pollutant) -> Option<f64> {
        match pollutant {
            Pollutant::Pm25 => self.pm25,
            Pollutant::Pm10 => self.pm10,
            Pollutant::Co => self.co,
            Pollutant::So2 => self.so2,
            Pollutant::No2 => self.no2,
            Pollutant::O3 => self.o3,
        }
    }
}

/// Overall AQI: the worst pollutant sub-index.
pub fn calculate_aqi(pollutants: &Pollutants) -> Option<i64> {
    Pollutant::ALL
        .iter()
        .filter_map(|pollutant| {
            pollutants
                .get(*pollutant)
                .and_then(|value| pollutant.sub_index(value))
        })
        .max()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AqiCategory {
    Good,
    Moderate,
    UnhealthyForSensitiveGroups,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl AqiCategory {
    pub const fn from_aqi(aqi: i64) -> Option<Self> {
        match aqi {
            0..=50 => Some(Self::Good),
            51..=100 => Some(Self::Moderate),
            101..=150 => Some(Self::UnhealthyForSensitiveGroups),
            151..=200 => Some(Self::Unhealthy),
            201..=300 => Some(Self::VeryUnhealthy),
            301.. => Some(Self::Hazardous),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Moderate => "Moderate",
            Self::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            Self::Unhealthy => "Unhealthy",
            Self::VeryUnhealthy => "Very Unhealthy",
            Self::Hazardous => "Hazardous",
        }
    }

    pub const fn color(self) -> &'static str {
        match self {
            Self::Good => "Green",
            Self::Moderate => "Yellow",
            Self::UnhealthyForSensitiveGroups => "Orange",
            Self::Unhealthy => "Red",
            Self::VeryUnhealthy => "Purple",
            Self::Hazardous => "Maroon",
        }
    }

    pub const fn is_healthy(self) -> bool {
        matches!(self, Self::Good | Self::Moderate)
    }

    /// Text color that stays readable on [`Self::color`].
    pub const fn font_color(self) -> &'static str {
        match self {
            Self::Moderate => "black",
            _ => "white",
        }
    }

    pub const fn health_note(self) -> &'static str {
        match self {
            Self::Good => "Air quality is satisfactory.",
            Self::Moderate => "Acceptable; unusually sensitive people should limit exertion.",
            Self::UnhealthyForSensitiveGroups => {
                "Sensitive groups should reduce prolonged outdoor exertion."
            }
            Self::Unhealthy => "Everyone should reduce prolonged outdoor exertion.",
            Self::VeryUnhealthy => "Avoid prolonged outdoor exertion.",
            Self::Hazardous => "Remain indoors and keep activity levels low.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AqiCategory, Pollutant, Pollutants, calculate_aqi};
    use crate::model::MeasurementRow;

    #[test]
    fn band_edges_map_to_band_edges() {
        assert_eq!(Pollutant::Pm25.sub_index(0.0), Some(0));
        assert_eq!(Pollutant::Pm25.sub_index(9.0), Some(50));
        assert_eq!(Pollutant::Pm25.sub_index(35.4), Some(100));
        assert_eq!(Pollutant::So2.sub_index(76.0), Some(101));
    }

    #[test]
    fn concentrations_are_rounded_before_lookup() {
        // 12.04 rounds to 12.0 -> 51 + 49/26.3 * 2.9
        assert_eq!(Pollutant::Pm25.sub_index(12.04), Some(56));
        // 54.4 rounds to 54, the top of the first pm10 band.
        assert_eq!(Pollutant::Pm10.sub_index(54.4), Some(50));
    }

    #[test]
    fn concentrations_are_clamped() {
        assert_eq!(Pollutant::No2.sub_index(-5.0), Some(0));
        assert_eq!(Pollutant::No2.sub_index(1.0e9), Some(9999));
        assert_eq!(Pollutant::No2.sub_index(f64::NAN), None);
    }

    #[test]
    fn overall_aqi_is_worst_sub_index() {
        let row = MeasurementRow {
            co: "0.5".to_owned(),
            no2: "15".to_owned(),
            o3: "0.05".to_owned(),
            pm10: "37".to_owned(),
            pm25: "23".to_owned(),
            so2: "142".to_owned(),
            ..MeasurementRow::default()
        };
        assert_eq!(calculate_aqi(&Pollutants::from_row(&row)), Some(131));
    }

    #[test]
    fn unparseable_cells_are_skipped() {
        let row = MeasurementRow {
            pm25: "lots".to_owned(),
            pm10: " 42 ".to_owned(),
            ..MeasurementRow::default()
        };
        let pollutants = Pollutants::from_row(&row);
        assert_eq!(pollutants.pm25, None);
        assert_eq!(calculate_aqi(&pollutants), Some(39));
        assert_eq!(calculate_aqi(&Pollutants::default()), None);
    }

    #[test]
    fn categories_follow_epa_bands() {
        assert_eq!(AqiCategory::from_aqi(0), Some(AqiCategory::Good));
        assert_eq!(AqiCategory::from_aqi(50), Some(AqiCategory::Good));
        assert_eq!(AqiCategory::from_aqi(51), Some(AqiCategory::Moderate));
        assert_eq!(
            AqiCategory::from_aqi(131),
            Some(AqiCategory::UnhealthyForSensitiveGroups)
        );
        assert_eq!(AqiCategory::from_aqi(301), Some(AqiCategory::Hazardous));
        assert_eq!(AqiCategory::from_aqi(-1), None);
    }

    #[test]
    fn font_color_contrasts_with_band_color() {
        assert_eq!(AqiCategory::Moderate.font_color(), "black");
        assert_eq!(AqiCategory::Good.font_color(), "white");
        assert!(AqiCategory::Moderate.is_healthy());
        assert!(!AqiCategory::Unhealthy.is_healthy());
    }
}
