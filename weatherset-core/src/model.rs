use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Numeric weather condition id as reported by the data provider.
pub type WeatherCode = u32;

/// A single weather observation as seen by the analysis functions.
pub trait WeatherRecord {
    fn weather_code(&self) -> WeatherCode;

    /// Free-text description of the conditions, e.g. "light rain".
    fn detailed_status(&self) -> &str;

    /// UNIX timestamp (seconds) the observation refers to.
    fn reference_time(&self) -> i64;
}

impl<T: WeatherRecord + ?Sized> WeatherRecord for &T {
    fn weather_code(&self) -> WeatherCode {
        (**self).weather_code()
    }

    fn detailed_status(&self) -> &str {
        (**self).detailed_status()
    }

    fn reference_time(&self) -> i64 {
        (**self).reference_time()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub reference_time: i64,
    pub weather_code: WeatherCode,
    /// Short status, e.g. "Rain".
    #[serde(default)]
    pub status: String,
    pub detailed_status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_c: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity_pct: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_speed_mps: Option<f64>,
}

impl Observation {
    pub fn new(
        reference_time: i64,
        weather_code: WeatherCode,
        detailed_status: impl Into<String>,
    ) -> Self {
        Self {
            reference_time,
            weather_code,
            status: String::new(),
            detailed_status: detailed_status.into(),
            temperature_c: None,
            humidity_pct: None,
            wind_speed_mps: None,
        }
    }

    /// `reference_time` as a UTC datetime, if it is representable.
    pub fn reference_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.reference_time, 0)
    }
}

impl WeatherRecord for Observation {
    fn weather_code(&self) -> WeatherCode {
        self.weather_code
    }

    fn detailed_status(&self) -> &str {
        &self.detailed_status
    }

    fn reference_time(&self) -> i64 {
        self.reference_time
    }
}

/// Read a JSON array of observations from disk.
pub fn read_observations(path: &Path) -> Result<Vec<Observation>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read observations file: {}", path.display()))?;

    let observations: Vec<Observation> = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse observations JSON: {}", path.display()))?;

    tracing::debug!(count = observations.len(), path = %path.display(), "loaded observations");

    Ok(observations)
}
