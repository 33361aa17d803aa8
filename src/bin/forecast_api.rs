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

use clap::Parser;
use forecast_api::client::{ClientConfig, ForecastClient};
use forecast_api::http::RequestContext;
use forecast_api::metrics::ForecastMetrics;
use prometheus_client::registry::Registry;
use std::error::Error;
use std::io;
use std::net::SocketAddr;
use std::process;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal::unix::{self, SignalKind};
use tracing::Level;

const DEFAULT_LOG_LEVEL: Level = Level::INFO;
const DEFAULT_BIND_ADDR: ([u8; 4], u16) = ([0, 0, 0, 0], 8000);
const DEFAULT_TIMEOUT_MILLIS: u64 = 5000;
const DEFAULT_API_URL: &str = "http://api.weatherapi.com/v1/forecast.json";

#[derive(Debug, Parser)]
#[clap(name = "forecast_api", version = clap::crate_version!())]
struct ForecastApiApplication {
    /// API key for weatherapi.com
    #[clap(long, env = "WEATHER_API_KEY", hide_env_values = true)]
    api_key: String,

    /// URL of the weatherapi.com forecast endpoint
    #[clap(long, env = "WEATHER_API_URL", default_value_t = DEFAULT_API_URL.into())]
    api_url: String,

    /// Timeout for fetching forecasts from the weather API, in milliseconds.
    #[clap(long, env = "WEATHER_API_TIMEOUT_MILLIS", default_value_t = DEFAULT_TIMEOUT_MILLIS)]
    timeout_millis: u64,

    /// Logging verbosity. Allowed values are 'trace', 'debug', 'info', 'warn', and 'error'
    /// (case insensitive)
    #[clap(long, env = "FORECAST_API_LOG_LEVEL", default_value_t = DEFAULT_LOG_LEVEL)]
    log_level: Level,

    /// Address to bind to.
    #[clap(long, env = "FORECAST_API_BIND", default_value_t = DEFAULT_BIND_ADDR.into())]
    bind: SocketAddr,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let opts = ForecastApiApplication::parse();
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(opts.log_level)
            .finish(),
    )
    .expect("failed to set tracing subscriber");

    let timeout = Duration::from_millis(opts.timeout_millis);
    let config = ClientConfig::new(opts.api_key, &opts.api_url, timeout).unwrap_or_else(|e| {
        tracing::error!(message = "invalid weather API URL", api_url = %opts.api_url, error = %e);
        process::exit(1)
    });

    let mut registry = Registry::default();
    let metrics = ForecastMetrics::new(&mut registry);
    let client = ForecastClient::new(config, metrics);
    let context = Arc::new(RequestContext::new(client, registry));
    let app = forecast_api::http::router(context);

    let server = axum::Server::try_bind(&opts.bind).unwrap_or_else(|e| {
        tracing::error!(message = "error binding to address", address = %opts.bind, error = %e);
        process::exit(1)
    });

    tracing::info!(message = "server started", address = %opts.bind, api_url = %opts.api_url);

    server
        .serve(app.into_make_service())
        .with_graceful_shutdown(async {
            // Wait for either SIGTERM or SIGINT to shutdown
            tokio::select! {
                _ = sigterm() => {}
                _ = sigint() => {}
            }
        })
        .await?;

    tracing::info!("server shutdown");
    Ok(())
}

/// Return after the first SIGTERM signal received by this process
async fn sigterm() -> io::Result<()> {
    unix::signal(SignalKind::terminate())?.recv().await;
    Ok(())
}

/// Return after the first SIGINT signal received by this process
async fn sigint() -> io::Result<()> {
    unix::signal(SignalKind::interrupt())?.recv().await;
    Ok(())
}
