#![forbid(unsafe_code)]

//! Weather fetch errors.

use std::fmt;

/// Why a forecast could not be produced by a source.
#[derive(Debug)]
pub enum WeatherError {
    /// Transport failure (connect, TLS, timeout inside the client).
    Http(reqwest::Error),
    /// Non-success HTTP status.
    Status(u16),
    /// The service answered with an error result code.
    Api { code: String, message: String },
    /// The body was not the expected JSON shape.
    Decode(String),
    /// The forecast did not cover a required slot (e.g. `PM TMP`).
    MissingSlot(String),
    /// The caller gave up before the source finished.
    Cancelled,
    /// No result within the caller's deadline.
    Timeout,
    /// The worker thread could not start or died without a result.
    Worker(String),
}

impl fmt::Display for WeatherError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeatherError::Http(e) => write!(f, "forecast request failed: {e}"),
            WeatherError::Status(code) => write!(f, "forecast service responded with HTTP {code}"),
            WeatherError::Api { code, message } => {
                write!(f, "forecast service error {code}: {message}")
            }
            WeatherError::Decode(msg) => write!(f, "forecast decode failed: {msg}"),
            WeatherError::MissingSlot(slot) => write!(f, "forecast has no value for {slot}"),
            WeatherError::Cancelled => write!(f, "forecast fetch cancelled"),
            WeatherError::Timeout => write!(f, "forecast fetch timed out"),
            WeatherError::Worker(msg) => write!(f, "weather worker failed: {msg}"),
        }
    }
}

impl std::error::Error for WeatherError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WeatherError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for WeatherError {
    fn from(e: reqwest::Error) -> Self {
        WeatherError::Http(e)
    }
}

impl From<serde_json::Error> for WeatherError {
    fn from(e: serde_json::Error) -> Self {
        WeatherError::Decode(e.to_string())
    }
}

/// Result type for weather operations.
pub type WeatherResult<T> = Result<T, WeatherError>;
