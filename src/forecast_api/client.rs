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

use crate::forecast::{ForecastDay, ForecastQuery, ForecastResult, Metric};
use crate::metrics::ForecastMetrics;
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::error;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::Instrument;

#[derive(Debug)]
pub enum ForecastError {
    InvalidUnit,
    InvalidDays,
    InvalidQuery(String),
    Provider(String),
    Unavailable(i64),
    Timeout(reqwest::Error),
    Upstream(reqwest::Error),
}

impl ForecastError {
    /// HTTP status a caller should see for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidUnit | Self::InvalidDays | Self::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            Self::Provider(_) | Self::Unavailable(_) => StatusCode::NOT_FOUND,
            Self::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn from_transport(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout(e)
        } else {
            Self::Upstream(e)
        }
    }
}

impl fmt::Display for ForecastError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUnit => write!(f, "Invalid unit parameter. Choose 'C' or 'F'."),
            Self::InvalidDays => write!(f, "The 'days' parameter must be between 1 and 10."),
            Self::InvalidQuery(s) => write!(f, "{}", s),
            Self::Provider(s) => write!(f, "{}", s),
            Self::Unavailable(days) => write!(f, "Forecast data for {} days ahead is not available.", days),
            Self::Timeout(_) => write!(f, "Timed out waiting for the weather provider."),
            Self::Upstream(_) => write!(f, "Unable to fetch forecast from the weather provider."),
        }
    }
}

impl error::Error for ForecastError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Timeout(e) => Some(e),
            Self::Upstream(e) => Some(e),
            _ => None,
        }
    }
}

/// Settings for talking to the forecast provider, fixed at startup.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    api_key: String,
    base_url: Url,
    timeout: Duration,
}

impl ClientConfig {
    pub fn new<S: Into<String>>(api_key: S, base_url: &str, timeout: Duration) -> Result<Self, url::ParseError> {
        Ok(ClientConfig {
            api_key: api_key.into(),
            base_url: Url::parse(base_url)?,
            timeout,
        })
    }
}

/// Fetches forecasts from a weatherapi.com compatible API and turns them into sentences.
///
/// A new HTTP client is built for every fetch and dropped when the fetch returns, so no
/// connections are held between requests.
#[derive(Debug, Clone)]
pub struct ForecastClient {
    config: ClientConfig,
    metrics: ForecastMetrics,
}

impl ForecastClient {
    const USER_AGENT: &'static str = concat!("forecast_api/", env!("CARGO_PKG_VERSION"));
    const JSON_RESPONSE: &'static str = "application/json";

    pub fn new(config: ClientConfig, metrics: ForecastMetrics) -> Self {
        ForecastClient { config, metrics }
    }

    /// Validate the parameters, fetch the forecast for `city`, and describe the
    /// requested day according to `metric`.
    pub async fn fetch(&self, city: &str, days: i64, metric: Metric, unit: &str) -> Result<ForecastResult, ForecastError> {
        let query = match ForecastQuery::new(city, days, metric, unit) {
            Ok(query) => query,
            Err(e) => return Err(self.rejected(metric, e)),
        };

        let res = self.forecast(&query).await;
        self.metrics.request(metric, &res);
        res
    }

    /// Log and count a request for `metric` that failed before reaching the provider.
    pub fn rejected(&self, metric: Metric, e: ForecastError) -> ForecastError {
        tracing::warn!(message = "invalid forecast request", metric = %metric, error = %e);
        self.metrics.failure(metric, &e);
        e
    }

    async fn forecast(&self, query: &ForecastQuery) -> Result<ForecastResult, ForecastError> {
        let envelope = self
            .envelope(query)
            .instrument(tracing::debug_span!(
                "forecast_fetch",
                city = %query.city(),
                days = query.days(),
                metric = %query.metric(),
                unit = %query.unit(),
            ))
            .await?;

        let day = envelope.select(query)?;
        Ok(query.format(&day))
    }

    async fn envelope(&self, query: &ForecastQuery) -> Result<ForecastEnvelope, ForecastError> {
        let client = Client::builder()
            .timeout(self.config.timeout)
            .user_agent(Self::USER_AGENT)
            .build()
            .map_err(|e| {
                tracing::error!(message = "unable to initialize HTTP client", error = %e);
                ForecastError::Upstream(e)
            })?;

        let days = query.days().to_string();
        let url = self.config.base_url.clone();
        tracing::debug!(message = "making forecast request", url = %url, city = %query.city(), days = %days);

        let start = Instant::now();
        let res = self.request(&client, url, query.city(), &days).await;
        self.metrics.upstream_duration(start.elapsed());

        res.map_err(|e| {
            tracing::error!(message = "failed to fetch forecast", city = %query.city(), error = %e);
            ForecastError::from_transport(e)
        })
    }

    async fn request(&self, client: &Client, url: Url, city: &str, days: &str) -> Result<ForecastEnvelope, reqwest::Error> {
        // The provider reports errors (unknown city, bad key) with a non-2xx status
        // and an `error` object in the body, so the body is decoded regardless of status.
        let res = client
            .get(url)
            .header(ACCEPT, Self::JSON_RESPONSE)
            .query(&[
                ("key", self.config.api_key.as_str()),
                ("q", city),
                ("days", days),
                ("aqi", "no"),
                ("alerts", "no"),
            ])
            .send()
            .await?;

        tracing::debug!(message = "received forecast response", status = %res.status());
        res.json::<ForecastEnvelope>().await
    }
}

/// Top level response from the provider, either an error or forecast data.
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct ForecastEnvelope {
    #[serde(alias = "error", default)]
    pub error: Option<ProviderError>,
    #[serde(alias = "forecast", default)]
    pub forecast: Option<serde_json::Value>,
}

impl ForecastEnvelope {
    /// Pick the day `query` asks about, failing if the provider reported an error
    /// or didn't return enough days.
    pub fn select(self, query: &ForecastQuery) -> Result<ForecastDay, ForecastError> {
        if let Some(err) = self.error {
            tracing::error!(message = "weather API error", code = ?err.code, error = %err.message);
            return Err(ForecastError::Provider(err.message));
        }

        let forecast = self.forecast.ok_or_else(|| {
            tracing::error!(message = "forecast data parsing error", error = "missing forecast");
            ForecastError::Unavailable(query.days())
        })?;

        let mut forecast: Forecast = serde_json::from_value(forecast).map_err(|e| {
            tracing::error!(message = "forecast data parsing error", error = %e);
            ForecastError::Unavailable(query.days())
        })?;

        let available = forecast.forecastday.len();
        let index = query.day_index();
        if index >= available {
            tracing::error!(
                message = "forecast data parsing error",
                error = "day out of range",
                index = index,
                available = available,
            );
            return Err(ForecastError::Unavailable(query.days()));
        }

        // Only the selected day is decoded, other days may be malformed
        serde_json::from_value(forecast.forecastday.swap_remove(index)).map_err(|e| {
            tracing::error!(message = "forecast data parsing error", index = index, error = %e);
            ForecastError::Unavailable(query.days())
        })
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ProviderError {
    #[serde(alias = "code", default)]
    pub code: Option<i64>,
    #[serde(alias = "message", default)]
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct Forecast {
    #[serde(alias = "forecastday")]
    pub forecastday: Vec<serde_json::Value>,
}
