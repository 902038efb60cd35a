// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::fmt;
use time::Date;

use crate::ids::LocationId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeasurementField {
    Date,
    DewPoint,
    WindSpeed,
    MaxTemp,
    MinTemp,
    Precipitation,
    Co,
    No2,
    O3,
    Pm10,
    Pm25,
    So2,
}

impl MeasurementField {
    pub const ALL: [Self; 12] = [
        Self::Date,
        Self::DewPoint,
        Self::WindSpeed,
        Self::MaxTemp,
        Self::MinTemp,
        Self::Precipitation,
        Self::Co,
        Self::No2,
        Self::O3,
        Self::Pm10,
        Self::Pm25,
        Self::So2,
    ];

    /// JSON key used by the prediction service.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::DewPoint => "dewp",
            Self::WindSpeed => "wdsp",
            Self::MaxTemp => "max",
            Self::MinTemp => "min",
            Self::Precipitation => "prcp",
            Self::Co => "co",
            Self::No2 => "no2",
            Self::O3 => "o3",
            Self::Pm10 => "pm10",
            Self::Pm25 => "pm25",
            Self::So2 => "so2",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Date => "Date",
            Self::DewPoint => "Dew Point",
            Self::WindSpeed => "Wind Speed",
            Self::MaxTemp => "Max Temp",
            Self::MinTemp => "Min Temp",
            Self::Precipitation => "Precipitation",
            Self::Co => "CO",
            Self::No2 => "NO2",
            Self::O3 => "O3",
            Self::Pm10 => "PM10",
            Self::Pm25 => "PM2.5",
            Self::So2 => "SO2",
        }
    }
}

impl fmt::Display for MeasurementField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One day of readings for one location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasurementRecord {
    pub date: Date,
    pub dew_point: f64,
    pub wind_speed: f64,
    pub max_temp: f64,
    pub min_temp: f64,
    pub precipitation: f64,
    pub co: f64,
    pub no2: f64,
    pub o3: f64,
    pub pm10: f64,
    pub pm25: f64,
    pub so2: f64,
}

impl MeasurementRecord {
    pub fn text(&self, field: MeasurementField) -> String {
        match field {
            MeasurementField::Date => self.date.to_string(),
            MeasurementField::DewPoint => self.dew_point.to_string(),
            MeasurementField::WindSpeed => self.wind_speed.to_string(),
            MeasurementField::MaxTemp => self.max_temp.to_string(),
            MeasurementField::MinTemp => self.min_temp.to_string(),
            MeasurementField::Precipitation => self.precipitation.to_string(),
            MeasurementField::Co => self.co.to_string(),
            MeasurementField::No2 => self.no2.to_string(),
            MeasurementField::O3 => self.o3.to_string(),
            MeasurementField::Pm10 => self.pm10.to_string(),
            MeasurementField::Pm25 => self.pm25.to_string(),
            MeasurementField::So2 => self.so2.to_string(),
        }
    }

    pub fn to_row(&self) -> MeasurementRow {
        let mut row = MeasurementRow::default();
        for field in MeasurementField::ALL {
            *row.field_mut(field) = self.text(field);
        }
        row
    }
}

/// Editable text form of a [`MeasurementRecord`]. Serializes with the
/// service's keys and every value as a JSON string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurementRow {
    pub date: String,
    pub dewp: String,
    pub wdsp: String,
    pub max: String,
    pub min: String,
    pub prcp: String,
    pub co: String,
    pub no2: String,
    pub o3: String,
    pub pm10: String,
    pub pm25: String,
    pub so2: String,
}

impl MeasurementRow {
    pub fn get(&self, field: MeasurementField) -> &str {
        match field {
            MeasurementField::Date => &self.date,
            MeasurementField::DewPoint => &self.dewp,
            MeasurementField::WindSpeed => &self.wdsp,
            MeasurementField::MaxTemp => &self.max,
            MeasurementField::MinTemp => &self.min,
            MeasurementField::Precipitation => &self.prcp,
            MeasurementField::Co => &self.co,
            MeasurementField::No2 => &self.no2,
            MeasurementField::O3 => &self.o3,
            MeasurementField::Pm10 => &self.pm10,
            MeasurementField::Pm25 => &self.pm25,
            MeasurementField::So2 => &self.so2,
        }
    }

    pub fn field_mut(&mut self, field: MeasurementField) -> &mut String {
        match field {
            MeasurementField::Date => &mut self.date,
            MeasurementField::DewPoint => &mut self.dewp,
            MeasurementField::WindSpeed => &mut self.wdsp,
            MeasurementField::MaxTemp => &mut self.max,
            MeasurementField::MinTemp => &mut self.min,
            MeasurementField::Precipitation => &mut self.prcp,
            MeasurementField::Co => &mut self.co,
            MeasurementField::No2 => &mut self.no2,
            MeasurementField::O3 => &mut self.o3,
            MeasurementField::Pm10 => &mut self.pm10,
            MeasurementField::Pm25 => &mut self.pm25,
            MeasurementField::So2 => &mut self.so2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocationEntry {
    pub id: LocationId,
    pub name: String,
    pub current_aqi: i64,
    /// Oldest first, ending with today.
    pub records: Vec<MeasurementRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRequest {
    pub city: String,
    pub weather_data: Vec<MeasurementRow>,
}

/// The service sends the AQI either as a bare number or as a label such as
/// `"42 (Good)"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AqiValue {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for AqiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResponse {
    pub date: Option<String>,
    pub aqi: Option<AqiValue>,
    pub font_color: Option<String>,
    pub healthy_color: Option<String>,
    pub image_url: Option<String>,
}
