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

use crate::client::{ForecastClient, ForecastError};
use crate::forecast::{ForecastResult, Metric, Unit};
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Json, Router};
use prometheus_client::encoding::text::encode;
use prometheus_client::registry::Registry;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

const DEFAULT_CITY: &str = "Lisbon";
const DEFAULT_DAYS: i64 = 3;
const TEXT_FORMAT: &str = "application/openmetrics-text; version=1.0.0; charset=utf-8";

const DOCS: &str = r#"<!DOCTYPE html>
<html>
<head><title>Weather Forecast API</title></head>
<body>
<h1>Weather Forecast API</h1>
<p>API for fetching weather forecasts.</p>
<h2>GET /temperature</h2>
<p>Returns the predicted temperature for a specific city.</p>
<ul>
<li><code>city</code>: name of the city, default <code>Lisbon</code></li>
<li><code>days</code>: days ahead, 1 to 10, default <code>3</code></li>
<li><code>unit</code>: <code>C</code> or <code>F</code>, default <code>C</code></li>
</ul>
<h2>GET /rain</h2>
<p>Indicates whether it will rain in a specific city.</p>
<ul>
<li><code>city</code>: name of the city, default <code>Lisbon</code></li>
<li><code>days</code>: days ahead, 1 to 10, default <code>3</code></li>
</ul>
</body>
</html>
"#;

/// State shared by all request handlers.
#[derive(Debug)]
pub struct RequestContext {
    client: ForecastClient,
    registry: Registry,
}

impl RequestContext {
    pub fn new(client: ForecastClient, registry: Registry) -> Self {
        Self { client, registry }
    }
}

#[derive(Debug, Deserialize)]
pub struct TemperatureParams {
    city: Option<String>,
    days: Option<i64>,
    unit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RainParams {
    city: Option<String>,
    days: Option<i64>,
}

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub detail: String,
}

impl IntoResponse for ForecastError {
    fn into_response(self) -> Response {
        (self.status(), Json(ErrorDetail { detail: self.to_string() })).into_response()
    }
}

/// Build the router for all forecast endpoints, the docs page, and metrics.
pub fn router(context: Arc<RequestContext>) -> Router {
    Router::new()
        .route("/", get(docs_redirect))
        .route("/docs", get(docs))
        .route("/temperature", get(temperature))
        .route("/rain", get(rain))
        .route("/metrics", get(text_metrics))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(context)
}

async fn docs_redirect() -> Redirect {
    Redirect::temporary("/docs")
}

async fn docs() -> Html<&'static str> {
    Html(DOCS)
}

async fn temperature(
    State(context): State<Arc<RequestContext>>,
    params: Result<Query<TemperatureParams>, QueryRejection>,
) -> Result<Json<ForecastResult>, ForecastError> {
    let Query(params) = params.map_err(|e| {
        context
            .client
            .rejected(Metric::Temperature, ForecastError::InvalidQuery(e.body_text()))
    })?;
    let city = params.city.as_deref().unwrap_or(DEFAULT_CITY);
    let days = params.days.unwrap_or(DEFAULT_DAYS);
    let unit = params.unit.as_deref().unwrap_or(Unit::default().as_str());

    context
        .client
        .fetch(city, days, Metric::Temperature, unit)
        .await
        .map(Json)
}

async fn rain(
    State(context): State<Arc<RequestContext>>,
    params: Result<Query<RainParams>, QueryRejection>,
) -> Result<Json<ForecastResult>, ForecastError> {
    let Query(params) = params.map_err(|e| {
        context
            .client
            .rejected(Metric::Rain, ForecastError::InvalidQuery(e.body_text()))
    })?;
    let city = params.city.as_deref().unwrap_or(DEFAULT_CITY);
    let days = params.days.unwrap_or(DEFAULT_DAYS);

    context
        .client
        .fetch(city, days, Metric::Rain, Unit::default().as_str())
        .await
        .map(Json)
}

async fn text_metrics(State(context): State<Arc<RequestContext>>) -> Response {
    let mut buf = String::new();

    match encode(&mut buf, &context.registry) {
        Ok(_) => {
            tracing::debug!(message = "encoded prometheus metrics to text format", num_bytes = buf.len());
            (StatusCode::OK, [(CONTENT_TYPE, TEXT_FORMAT)], buf).into_response()
        }
        Err(e) => {
            tracing::error!(message = "error encoding metrics", error = %e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn not_found() -> (StatusCode, Json<ErrorDetail>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorDetail {
            detail: "Not Found".to_owned(),
        }),
    )
}
