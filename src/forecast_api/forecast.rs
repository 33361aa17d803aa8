// forecast_api - HTTP API for human-readable weather forecasts
//
// Copyright 2024 Nick Pillitteri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//

use crate::client::ForecastError;
use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::fmt;
use std::str::FromStr;

pub const MIN_DAYS: i64 = 1;
pub const MAX_DAYS: i64 = 10;

const MISSING_VALUE: &str = "N/A";

/// Temperature unit a forecast should be rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Unit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Celsius => "C",
            Self::Fahrenheit => "F",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = ForecastError;

    /// Parse a unit, case-sensitive: only "C" and "F" are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "C" => Ok(Self::Celsius),
            "F" => Ok(Self::Fahrenheit),
            _ => Err(ForecastError::InvalidUnit),
        }
    }
}

/// Weather quantity a caller is asking about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Temperature,
    Rain,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Rain => "rain",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated request for a forecast sentence.
///
/// Construction via `ForecastQuery::new` is the only way to build one, so any
/// value of this type has a known unit and a horizon within `MIN_DAYS..=MAX_DAYS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastQuery {
    city: String,
    days: i64,
    metric: Metric,
    unit: Unit,
}

impl ForecastQuery {
    /// Validate raw request parameters. The unit is checked before the
    /// number of days, and the unit is checked even for metrics that ignore it.
    pub fn new<S: Into<String>>(city: S, days: i64, metric: Metric, unit: &str) -> Result<Self, ForecastError> {
        let unit = unit.parse::<Unit>()?;
        if !(MIN_DAYS..=MAX_DAYS).contains(&days) {
            return Err(ForecastError::InvalidDays);
        }

        Ok(Self {
            city: city.into(),
            days,
            metric,
            unit,
        })
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn days(&self) -> i64 {
        self.days
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    /// Position of the requested day in the provider's forecast, where 0 is today.
    pub fn day_index(&self) -> usize {
        // days is at least MIN_DAYS so this can't underflow
        (self.days - 1) as usize
    }

    /// Render the sentence for this query from the selected forecast day.
    pub fn format(&self, day: &ForecastDay) -> ForecastResult {
        let message = match self.metric {
            Metric::Temperature => temperature_message(&day.day, &self.city, self.days, self.unit),
            Metric::Rain => rain_message(&day.day, &self.city, self.days),
        };

        ForecastResult { message }
    }
}

/// The only body returned to callers on success.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ForecastResult {
    pub message: String,
}

/// One element of the provider's `forecast.forecastday` array.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ForecastDay {
    #[serde(alias = "date", default)]
    pub date: Option<String>,
    #[serde(alias = "day")]
    pub day: DaySummary,
}

/// Aggregate values for a single forecast day.
///
/// Temperatures are kept as JSON numbers so they render exactly as the provider
/// sent them (e.g. `18.0` rather than `18`).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct DaySummary {
    #[serde(alias = "avgtemp_c", default)]
    pub avgtemp_c: Option<Number>,
    #[serde(alias = "avgtemp_f", default)]
    pub avgtemp_f: Option<Number>,
    #[serde(alias = "mintemp_c", default)]
    pub mintemp_c: Option<Number>,
    #[serde(alias = "mintemp_f", default)]
    pub mintemp_f: Option<Number>,
    #[serde(alias = "maxtemp_c", default)]
    pub maxtemp_c: Option<Number>,
    #[serde(alias = "maxtemp_f", default)]
    pub maxtemp_f: Option<Number>,
    #[serde(alias = "totalprecip_mm", default)]
    pub totalprecip_mm: Option<f64>,
}

impl DaySummary {
    fn average(&self, unit: Unit) -> Option<&Number> {
        match unit {
            Unit::Celsius => self.avgtemp_c.as_ref(),
            Unit::Fahrenheit => self.avgtemp_f.as_ref(),
        }
    }

    fn minimum(&self, unit: Unit) -> Option<&Number> {
        match unit {
            Unit::Celsius => self.mintemp_c.as_ref(),
            Unit::Fahrenheit => self.mintemp_f.as_ref(),
        }
    }

    fn maximum(&self, unit: Unit) -> Option<&Number> {
        match unit {
            Unit::Celsius => self.maxtemp_c.as_ref(),
            Unit::Fahrenheit => self.maxtemp_f.as_ref(),
        }
    }
}

fn or_missing(value: Option<&Number>) -> String {
    value.map(|n| n.to_string()).unwrap_or_else(|| MISSING_VALUE.to_owned())
}

fn temperature_message(day: &DaySummary, city: &str, days: i64, unit: Unit) -> String {
    format!(
        "The average temperature in {city} in {days} days will be {avg}°{unit}. \
         The minimum temperature will be {min}°{unit} and the maximum {max}°{unit}.",
        avg = or_missing(day.average(unit)),
        min = or_missing(day.minimum(unit)),
        max = or_missing(day.maximum(unit)),
    )
}

fn rain_message(day: &DaySummary, city: &str, days: i64) -> String {
    let rain_mm = day.totalprecip_mm.unwrap_or(0.0);
    if rain_mm > 0.0 {
        format!("It is expected to rain in {city} in {days} days.")
    } else {
        format!("It is not expected to rain in {city} in {days} days.")
    }
}

#[cfg(test)]
mod tests {
    use super::{DaySummary, ForecastDay, ForecastQuery, Metric, Unit};
    use crate::client::ForecastError;

    fn day(json: serde_json::Value) -> ForecastDay {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_unit_case_sensitive() {
        assert_eq!(Unit::Celsius, "C".parse().unwrap());
        assert_eq!(Unit::Fahrenheit, "F".parse().unwrap());
        assert!(matches!("c".parse::<Unit>(), Err(ForecastError::InvalidUnit)));
        assert!(matches!("K".parse::<Unit>(), Err(ForecastError::InvalidUnit)));
        assert!(matches!("".parse::<Unit>(), Err(ForecastError::InvalidUnit)));
    }

    #[test]
    fn test_query_days_bounds() {
        assert!(ForecastQuery::new("Lisbon", 1, Metric::Rain, "C").is_ok());
        assert!(ForecastQuery::new("Lisbon", 10, Metric::Rain, "C").is_ok());
        assert!(matches!(
            ForecastQuery::new("Lisbon", 0, Metric::Rain, "C"),
            Err(ForecastError::InvalidDays)
        ));
        assert!(matches!(
            ForecastQuery::new("Lisbon", 11, Metric::Temperature, "C"),
            Err(ForecastError::InvalidDays)
        ));
        assert!(matches!(
            ForecastQuery::new("Lisbon", -3, Metric::Temperature, "F"),
            Err(ForecastError::InvalidDays)
        ));
    }

    #[test]
    fn test_query_unit_checked_before_days() {
        assert!(matches!(
            ForecastQuery::new("Lisbon", 42, Metric::Temperature, "X"),
            Err(ForecastError::InvalidUnit)
        ));
    }

    #[test]
    fn test_query_day_index() {
        let q = ForecastQuery::new("Porto", 1, Metric::Rain, "C").unwrap();
        assert_eq!(0, q.day_index());

        let q = ForecastQuery::new("Porto", 3, Metric::Rain, "C").unwrap();
        assert_eq!(2, q.day_index());
    }

    #[test]
    fn test_format_temperature_celsius() {
        let q = ForecastQuery::new("Lisbon", 3, Metric::Temperature, "C").unwrap();
        let d = day(serde_json::json!({
            "date": "2024-05-03",
            "day": {
                "avgtemp_c": 18.4, "avgtemp_f": 65.1,
                "mintemp_c": 14.0, "mintemp_f": 57.2,
                "maxtemp_c": 23.9, "maxtemp_f": 75.0,
                "totalprecip_mm": 0.0
            }
        }));

        assert_eq!(
            "The average temperature in Lisbon in 3 days will be 18.4°C. \
             The minimum temperature will be 14.0°C and the maximum 23.9°C.",
            q.format(&d).message
        );
    }

    #[test]
    fn test_format_temperature_fahrenheit() {
        let q = ForecastQuery::new("Porto", 2, Metric::Temperature, "F").unwrap();
        let d = day(serde_json::json!({
            "day": {
                "avgtemp_c": 18.4, "avgtemp_f": 65.1,
                "mintemp_c": 14.0, "mintemp_f": 57.2,
                "maxtemp_c": 23.9, "maxtemp_f": 75.0
            }
        }));

        assert_eq!(
            "The average temperature in Porto in 2 days will be 65.1°F. \
             The minimum temperature will be 57.2°F and the maximum 75.0°F.",
            q.format(&d).message
        );
    }

    #[test]
    fn test_format_temperature_missing_fields() {
        let q = ForecastQuery::new("Faro", 1, Metric::Temperature, "C").unwrap();
        let d = day(serde_json::json!({ "day": { "maxtemp_c": 30 } }));

        assert_eq!(
            "The average temperature in Faro in 1 days will be N/A°C. \
             The minimum temperature will be N/A°C and the maximum 30°C.",
            q.format(&d).message
        );
    }

    #[test]
    fn test_format_rain() {
        let q = ForecastQuery::new("Braga", 4, Metric::Rain, "C").unwrap();

        let wet = ForecastDay {
            date: None,
            day: DaySummary {
                totalprecip_mm: Some(2.5),
                ..Default::default()
            },
        };
        assert_eq!("It is expected to rain in Braga in 4 days.", q.format(&wet).message);

        let dry = ForecastDay {
            date: None,
            day: DaySummary {
                totalprecip_mm: Some(0.0),
                ..Default::default()
            },
        };
        assert_eq!("It is not expected to rain in Braga in 4 days.", q.format(&dry).message);

        let unknown = ForecastDay {
            date: None,
            day: DaySummary::default(),
        };
        assert_eq!("It is not expected to rain in Braga in 4 days.", q.format(&unknown).message);
    }

    #[test]
    fn test_format_rain_ignores_unit() {
        let d = day(serde_json::json!({ "day": { "totalprecip_mm": 1.2 } }));
        let c = ForecastQuery::new("Coimbra", 2, Metric::Rain, "C").unwrap();
        let f = ForecastQuery::new("Coimbra", 2, Metric::Rain, "F").unwrap();

        assert_eq!(c.format(&d), f.format(&d));
    }
}
