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

//! HTTP API for human-readable weather forecasts
//!
//! ## Features
//!
//! `forecast_api` fetches forecasts for a city from the [weatherapi.com] forecast API and
//! describes a single day of the forecast in a sentence. The following endpoints are exposed.
//!
//! * `GET /temperature?city=$CITY&days=$DAYS&unit=$UNIT` - Average, minimum, and maximum
//!   temperature `$DAYS` days from now. `$UNIT` is `C` or `F`.
//! * `GET /rain?city=$CITY&days=$DAYS` - Whether any rain is expected `$DAYS` days from now.
//! * `GET /docs` - Description of the endpoints above. `GET /` redirects here.
//! * `GET /metrics` - Prometheus metrics about requests made to this API.
//!
//! `city` defaults to `Lisbon` and `days` defaults to `3` and must be between `1` and `10`.
//! Successful responses look like `{"message": "..."}` and errors look like `{"detail": "..."}`.
//!
//! | Status | Meaning                                                   |
//! |--------|-----------------------------------------------------------|
//! | 400    | Invalid `unit` or `days`                                  |
//! | 404    | Unknown city or the day requested isn't in the forecast   |
//! | 502    | The weather provider couldn't be reached or returned junk |
//! | 504    | The weather provider didn't respond before the timeout    |
//!
//! [weatherapi.com]: https://www.weatherapi.com/docs/
//!
//! ## Build
//!
//! `forecast_api` is a Rust program and must be built from source using a [Rust toolchain](https://rustup.rs/).
//!
//! ```text
//! cargo build --release
//! ```
//!
//! ## Usage
//!
//! An API key for weatherapi.com is required. It can be passed as a flag or an environment variable.
//!
//! ```text
//! WEATHER_API_KEY=abc123 ./forecast_api --bind 127.0.0.1:8000
//! curl -sS 'http://localhost:8000/temperature?city=Porto&unit=F'
//! ```
//!

pub mod client;
pub mod forecast;
pub mod http;
pub mod metrics;
