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
use crate::forecast::{ForecastResult, Metric};
use prometheus_client::encoding::{EncodeLabelSet, EncodeLabelValue};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::histogram::{exponential_buckets, Histogram};
use prometheus_client::registry::Registry;
use std::time::Duration;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, EncodeLabelValue)]
#[allow(non_camel_case_types)]
enum MetricLabel {
    temperature,
    rain,
}

impl From<Metric> for MetricLabel {
    fn from(m: Metric) -> Self {
        match m {
            Metric::Temperature => Self::temperature,
            Metric::Rain => Self::rain,
        }
    }
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, EncodeLabelValue)]
#[allow(non_camel_case_types)]
enum OutcomeLabel {
    success,
    client_error,
    not_found,
    upstream_error,
}

impl From<&ForecastError> for OutcomeLabel {
    fn from(e: &ForecastError) -> Self {
        match e {
            ForecastError::InvalidUnit | ForecastError::InvalidDays | ForecastError::InvalidQuery(_) => {
                Self::client_error
            }
            ForecastError::Provider(_) | ForecastError::Unavailable(_) => Self::not_found,
            ForecastError::Timeout(_) | ForecastError::Upstream(_) => Self::upstream_error,
        }
    }
}

impl From<&Result<ForecastResult, ForecastError>> for OutcomeLabel {
    fn from(res: &Result<ForecastResult, ForecastError>) -> Self {
        match res {
            Ok(_) => Self::success,
            Err(e) => e.into(),
        }
    }
}

#[derive(Debug, Clone, Hash, PartialEq, Eq, EncodeLabelSet)]
struct RequestLabels {
    metric: MetricLabel,
    outcome: OutcomeLabel,
}

/// Holder for metrics about forecast requests.
///
/// All metrics are created and registered upon call to `ForecastMetrics::new()`. Clones
/// share the same underlying values.
#[derive(Debug, Clone)]
pub struct ForecastMetrics {
    requests: Family<RequestLabels, Counter>,
    upstream_duration: Histogram,
}

impl ForecastMetrics {
    /// Create a new `ForecastMetrics` and register each metric with the provided `Registry`.
    pub fn new(reg: &mut Registry) -> Self {
        let requests = Family::<RequestLabels, Counter>::default();
        let upstream_duration = Histogram::new(exponential_buckets(0.05, 2.0, 8));

        reg.register(
            "forecast_requests",
            "Forecast requests by metric and outcome",
            requests.clone(),
        );
        reg.register(
            "forecast_upstream_duration_seconds",
            "Time spent waiting for the weather provider",
            upstream_duration.clone(),
        );

        Self {
            requests,
            upstream_duration,
        }
    }

    /// Count a finished forecast request by what it asked for and how it ended.
    pub fn request(&self, metric: Metric, res: &Result<ForecastResult, ForecastError>) {
        self.requests
            .get_or_create(&RequestLabels {
                metric: metric.into(),
                outcome: res.into(),
            })
            .inc();
    }

    /// Count a forecast request for `metric` that ended with `e`.
    pub fn failure(&self, metric: Metric, e: &ForecastError) {
        self.requests
            .get_or_create(&RequestLabels {
                metric: metric.into(),
                outcome: e.into(),
            })
            .inc();
    }

    pub fn upstream_duration(&self, elapsed: Duration) {
        self.upstream_duration.observe(elapsed.as_secs_f64());
    }
}
