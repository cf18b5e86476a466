#![forbid(unsafe_code)]

//! Daily weather briefing for Post Aid.
//!
//! The briefing shows morning and afternoon conditions for the delivery area.
//! [`KmaClient`] fetches the official short-term forecast;
//! [`fetch_with_fallback`] wraps any [`ForecastSource`] with a deadline and
//! substitutes a [`seasonal_forecast`] when the source fails, so callers always
//! get a [`Forecast`].
//!
//! # Example
//! ```
//! use std::sync::Arc;
//! use postaid_runtime::CancelToken;
//! use postaid_weather::{
//!     BriefingOptions, Forecast, ForecastSource, WeatherError, WeatherResult, fetch_with_fallback,
//! };
//! use time::OffsetDateTime;
//!
//! struct Offline;
//!
//! impl ForecastSource for Offline {
//!     fn name(&self) -> &str {
//!         "offline"
//!     }
//!     fn fetch(&self, _: OffsetDateTime, _: &CancelToken) -> WeatherResult<Forecast> {
//!         Err(WeatherError::Status(503))
//!     }
//! }
//!
//! let forecast = fetch_with_fallback(
//!     Arc::new(Offline),
//!     OffsetDateTime::now_utc(),
//!     &BriefingOptions::default(),
//! );
//! assert!(forecast.is_fallback());
//! ```

pub mod briefing;
pub mod error;
pub mod fallback;
pub mod forecast;
pub mod kma;

pub use briefing::{BriefingOptions, ForecastSource, fetch_with_deadline, fetch_with_fallback};
pub use error::{WeatherError, WeatherResult};
pub use fallback::seasonal_forecast;
pub use forecast::{DEFAULT_ADVICE, Forecast, HalfDay, KST, Origin, SkyStatus, derive_advice, display_date};
pub use kma::{KmaClient, KmaConfig};
