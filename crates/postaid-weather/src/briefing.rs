#![forbid(unsafe_code)]

//! Fetch-with-fallback for the daily briefing.
//!
//! The source runs on a worker thread. The caller waits up to the configured
//! deadline; on error or timeout it raises the worker's [`CancelToken`] and
//! answers with [`seasonal_forecast`] instead. A result that arrives after the
//! deadline is dropped with the channel.
//!
//! # Failure Modes
//!
//! | Failure | Behavior |
//! |---------|----------|
//! | Source error | warn, fallback |
//! | Deadline passed | cancel worker, warn, fallback |
//! | Worker panicked or could not start | warn, fallback |

use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use postaid_runtime::CancelToken;
use time::OffsetDateTime;

use crate::error::{WeatherError, WeatherResult};
use crate::fallback::seasonal_forecast;
use crate::forecast::Forecast;

/// Something that can produce a forecast for a given instant.
pub trait ForecastSource: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Fetch the forecast covering `at`. Implementations should check
    /// `cancel` between slow steps and return [`WeatherError::Cancelled`].
    fn fetch(&self, at: OffsetDateTime, cancel: &CancelToken) -> WeatherResult<Forecast>;
}

/// Deadline and labels for [`fetch_with_fallback`].
#[derive(Debug, Clone)]
pub struct BriefingOptions {
    pub timeout: Duration,
    /// Location label used by the fallback.
    pub location: String,
}

impl Default for BriefingOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            location: "광산구 월계동".to_owned(),
        }
    }
}

/// Fetch from `source`, degrading to the seasonal fallback. Never fails.
pub fn fetch_with_fallback(
    source: Arc<dyn ForecastSource>,
    at: OffsetDateTime,
    options: &BriefingOptions,
) -> Forecast {
    let span = tracing::debug_span!("postaid.weather.briefing", source = source.name());
    let _guard = span.enter();

    match fetch_with_deadline(source, at, options.timeout) {
        Ok(forecast) => {
            tracing::debug!(origin = ?forecast.origin, "forecast received");
            forecast.with_derived_advice()
        }
        Err(e) => {
            tracing::warn!(error = %e, "forecast unavailable, using seasonal fallback");
            seasonal_forecast(at, &options.location)
        }
    }
}

/// Run `source` on a worker thread and wait at most `timeout` for it.
pub fn fetch_with_deadline(
    source: Arc<dyn ForecastSource>,
    at: OffsetDateTime,
    timeout: Duration,
) -> WeatherResult<Forecast> {
    let (tx, rx) = mpsc::sync_channel(1);
    let cancel = CancelToken::new();
    let worker_cancel = cancel.clone();

    thread::Builder::new()
        .name("postaid-weather".to_owned())
        .spawn(move || {
            let result = source.fetch(at, &worker_cancel);
            let _ = tx.send(result);
        })
        .map_err(|e| WeatherError::Worker(e.to_string()))?;

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => {
            cancel.cancel();
            Err(WeatherError::Timeout)
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            Err(WeatherError::Worker("exited without a result".to_owned()))
        }
    }
}
