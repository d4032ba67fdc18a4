use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::model::WeatherCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no status label registered for weather code {code}")]
pub struct LookupError {
    pub code: WeatherCode,
}

/// Maps weather codes to canonical lowercase status labels.
pub trait StatusCodeRegistry {
    fn label_for(&self, code: WeatherCode) -> Result<&str, LookupError>;
}

/// Inclusive range of weather codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeRange {
    pub start: WeatherCode,
    pub end: WeatherCode,
}

impl CodeRange {
    pub const fn new(start: WeatherCode, end: WeatherCode) -> Self {
        Self { start, end }
    }

    pub const fn single(code: WeatherCode) -> Self {
        Self { start: code, end: code }
    }

    pub fn contains(&self, code: WeatherCode) -> bool {
        self.start <= code && code <= self.end
    }
}

impl std::fmt::Display for CodeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

impl std::str::FromStr for CodeRange {
    type Err = anyhow::Error;

    /// Parses `"800"` or `"500-531"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (start, end) = match s.split_once('-') {
            Some((a, b)) => (a.trim(), b.trim()),
            None => (s, s),
        };

        let start: WeatherCode = start
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid weather code '{start}' in range '{s}'"))?;
        let end: WeatherCode = end
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid weather code '{end}' in range '{s}'"))?;

        if start > end {
            return Err(anyhow::anyhow!("Range '{s}' has start greater than end"));
        }

        Ok(Self { start, end })
    }
}

/// Registry backed by per-label lists of code ranges.
///
/// Lookup visits labels in sorted order, so when ranges of two labels
/// overlap the alphabetically first label wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeatherCodeRegistry {
    statuses: BTreeMap<String, Vec<CodeRange>>,
}

impl WeatherCodeRegistry {
    pub fn new(statuses: BTreeMap<String, Vec<CodeRange>>) -> Self {
        Self { statuses }
    }

    /// Table for OpenWeatherMap condition codes.
    pub fn openweather() -> Self {
        const TABLE: &[(&str, &[CodeRange])] = &[
            ("rain", &[CodeRange::new(500, 531), CodeRange::new(300, 321)]),
            ("sun", &[CodeRange::single(800)]),
            ("clouds", &[CodeRange::new(801, 804)]),
            ("fog", &[CodeRange::single(741)]),
            ("haze", &[CodeRange::single(721)]),
            ("mist", &[CodeRange::single(701)]),
            ("snow", &[CodeRange::new(600, 622)]),
            ("tornado", &[CodeRange::single(781), CodeRange::single(900)]),
            ("storm", &[CodeRange::single(901), CodeRange::new(960, 961)]),
            ("hurricane", &[CodeRange::single(902), CodeRange::single(962)]),
        ];

        let statuses = TABLE
            .iter()
            .map(|(label, ranges)| (label.to_string(), ranges.to_vec()))
            .collect();

        Self { statuses }
    }

    /// Add a range to `label`, creating the label if needed.
    pub fn with_range(mut self, label: &str, range: CodeRange) -> Self {
        self.statuses.entry(label.to_string()).or_default().push(range);
        self
    }

    /// Overlay `other` on top of `self`: labels present in `other` replace
    /// the same labels here, the rest are kept.
    pub fn merge(mut self, other: WeatherCodeRegistry) -> Self {
        self.statuses.extend(other.statuses);
        self
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.statuses.keys().map(String::as_str)
    }

    pub fn codes_for(&self, label: &str) -> Option<&[CodeRange]> {
        self.statuses.get(label).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }
}

impl StatusCodeRegistry for WeatherCodeRegistry {
    fn label_for(&self, code: WeatherCode) -> Result<&str, LookupError> {
        self.statuses
            .iter()
            .find(|(_, ranges)| ranges.iter().any(|r| r.contains(code)))
            .map(|(label, _)| label.as_str())
            .ok_or(LookupError { code })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openweather_table_resolves_known_codes() {
        let registry = WeatherCodeRegistry::openweather();

        assert_eq!(registry.label_for(500), Ok("rain"));
        assert_eq!(registry.label_for(310), Ok("rain"));
        assert_eq!(registry.label_for(800), Ok("sun"));
        assert_eq!(registry.label_for(804), Ok("clouds"));
        assert_eq!(registry.label_for(962), Ok("hurricane"));
    }

    #[test]
    fn unknown_code_is_lookup_error() {
        let registry = WeatherCodeRegistry::openweather();
        let err = registry.label_for(42).unwrap_err();

        assert_eq!(err, LookupError { code: 42 });
        assert!(err.to_string().contains("weather code 42"));
    }

    #[test]
    fn merge_replaces_same_label() {
        let custom = WeatherCodeRegistry::default().with_range("rain", CodeRange::single(7));
        let registry = WeatherCodeRegistry::openweather().merge(custom);

        assert_eq!(registry.label_for(7), Ok("rain"));
        assert!(registry.label_for(500).is_err());
        assert_eq!(registry.label_for(800), Ok("sun"));
    }

    #[test]
    fn labels_and_codes_are_readable() {
        let registry = WeatherCodeRegistry::openweather();

        assert_eq!(registry.labels().count(), 10);
        assert_eq!(
            registry.codes_for("tornado"),
            Some(&[CodeRange::single(781), CodeRange::single(900)][..])
        );
        assert_eq!(registry.codes_for("drizzle"), None);
        assert!(!registry.is_empty());
        assert!(WeatherCodeRegistry::default().is_empty());
    }

    #[test]
    fn overlapping_ranges_pick_first_label_in_order() {
        let registry = WeatherCodeRegistry::default()
            .with_range("storm", CodeRange::new(10, 20))
            .with_range("drizzle", CodeRange::new(15, 25));

        assert_eq!(registry.label_for(16), Ok("drizzle"));
        assert_eq!(registry.label_for(12), Ok("storm"));
    }

    #[test]
    fn code_range_parses_single_and_span() {
        assert_eq!("800".parse::<CodeRange>().unwrap(), CodeRange::single(800));
        assert_eq!(" 500 - 531 ".parse::<CodeRange>().unwrap(), CodeRange::new(500, 531));
        assert_eq!(CodeRange::new(500, 531).to_string(), "500-531");
        assert_eq!(CodeRange::single(800).to_string(), "800");
    }

    #[test]
    fn code_range_rejects_bad_input() {
        let err = "abc".parse::<CodeRange>().unwrap_err();
        assert!(err.to_string().contains("Invalid weather code"));

        let err = "20-10".parse::<CodeRange>().unwrap_err();
        assert!(err.to_string().contains("start greater than end"));
    }
}
