#![forbid(unsafe_code)]

//! Address resolution for the route's seed list.
//!
//! [`resolve_seeds`] fires one lookup per seed on its own thread and merges
//! the answers into slots indexed by seed position, so the resulting order
//! follows the seed list no matter which lookup finishes first. A seed that
//! is not found, errors, or whose worker dies is dropped with a warning.

use std::fmt;
use std::thread;
use std::time::Duration;

use postaid_core::LatLng;
use serde::Deserialize;

use crate::waypoint::{Seed, Waypoint};

/// Kakao local search, address endpoint.
pub const KAKAO_ADDRESS_URL: &str = "https://dapi.kakao.com/v2/local/search/address.json";

#[derive(Debug)]
pub enum GeocodeError {
    Http(reqwest::Error),
    /// Non-success HTTP status.
    Status(u16),
    Decode(String),
    /// The lookup thread panicked.
    WorkerPanicked,
}

impl fmt::Display for GeocodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeocodeError::Http(e) => write!(f, "geocoding request failed: {e}"),
            GeocodeError::Status(code) => write!(f, "geocoding service returned HTTP {code}"),
            GeocodeError::Decode(msg) => write!(f, "malformed geocoding response: {msg}"),
            GeocodeError::WorkerPanicked => write!(f, "geocode worker panicked"),
        }
    }
}

impl std::error::Error for GeocodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GeocodeError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for GeocodeError {
    fn from(err: reqwest::Error) -> Self {
        GeocodeError::Http(err)
    }
}

impl From<serde_json::Error> for GeocodeError {
    fn from(err: serde_json::Error) -> Self {
        GeocodeError::Decode(err.to_string())
    }
}

pub type GeocodeResult<T> = Result<T, GeocodeError>;

/// Resolves a postal address to a position.
pub trait Geocoder: Send + Sync {
    /// `Ok(None)` when the service has no match for `address`.
    fn resolve(&self, address: &str) -> GeocodeResult<Option<LatLng>>;
}

/// Resolve every seed concurrently. Order follows `seeds`; misses are dropped.
pub fn resolve_seeds(geocoder: &dyn Geocoder, seeds: &[Seed]) -> Vec<Waypoint> {
    let span = tracing::debug_span!("postaid.route.geocode", seeds = seeds.len());
    let _guard = span.enter();

    let mut slots: Vec<Option<Waypoint>> = vec![None; seeds.len()];
    thread::scope(|scope| {
        let workers: Vec<_> = seeds
            .iter()
            .enumerate()
            .map(|(index, seed)| {
                thread::Builder::new()
                    .name(format!("postaid-geocode-{index}"))
                    .spawn_scoped(scope, move || geocoder.resolve(&seed.address))
            })
            .collect();

        // logging stays on this thread so it lands in the caller's span
        for ((slot, seed), spawned) in slots.iter_mut().zip(seeds).zip(workers) {
            let outcome = match spawned {
                Ok(handle) => handle
                    .join()
                    .unwrap_or(Err(GeocodeError::WorkerPanicked)),
                Err(e) => {
                    tracing::debug!(error = %e, "geocode worker spawn failed, resolving inline");
                    geocoder.resolve(&seed.address)
                }
            };
            *slot = accept(seed, outcome);
        }
    });

    let resolved: Vec<Waypoint> = slots.into_iter().flatten().collect();
    tracing::debug!(resolved = resolved.len(), "seed addresses resolved");
    resolved
}

fn accept(seed: &Seed, outcome: GeocodeResult<Option<LatLng>>) -> Option<Waypoint> {
    match outcome {
        Ok(Some(position)) => Some(Waypoint::new(seed.name.clone(), position)),
        Ok(None) => {
            tracing::warn!(address = %seed.address, "address not found, dropping waypoint");
            None
        }
        Err(e) => {
            tracing::warn!(address = %seed.address, error = %e, "geocoding failed, dropping waypoint");
            None
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Kakao
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct KakaoConfig {
    /// REST API key, sent as `Authorization: KakaoAK <key>`.
    pub rest_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl KakaoConfig {
    #[must_use]
    pub fn new(rest_key: impl Into<String>) -> Self {
        Self {
            rest_key: rest_key.into(),
            base_url: KAKAO_ADDRESS_URL.to_owned(),
            timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AddressResponse {
    #[serde(default)]
    documents: Vec<AddressDocument>,
}

/// Coordinates arrive as decimal strings.
#[derive(Debug, Deserialize)]
struct AddressDocument {
    x: String,
    y: String,
}

/// First match in a Kakao address search response body.
pub fn parse_address_response(body: &str) -> GeocodeResult<Option<LatLng>> {
    let response: AddressResponse = serde_json::from_str(body)?;
    let Some(doc) = response.documents.first() else {
        return Ok(None);
    };
    let coord = |s: &str, axis: &str| {
        s.trim()
            .parse::<f64>()
            .map_err(|e| GeocodeError::Decode(format!("{axis} {s:?}: {e}")))
    };
    let position = LatLng::new(coord(&doc.y, "y")?, coord(&doc.x, "x")?);
    if !position.is_valid() {
        return Err(GeocodeError::Decode(format!("position out of range: {position}")));
    }
    Ok(Some(position))
}

/// Geocoder backed by the Kakao local search REST API.
#[derive(Debug, Clone)]
pub struct KakaoGeocoder {
    config: KakaoConfig,
    http: reqwest::blocking::Client,
}

impl KakaoGeocoder {
    pub fn new(config: KakaoConfig) -> GeocodeResult<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { config, http })
    }
}

impl Geocoder for KakaoGeocoder {
    fn resolve(&self, address: &str) -> GeocodeResult<Option<LatLng>> {
        let response = self
            .http
            .get(&self.config.base_url)
            .query(&[("query", address)])
            .header(
                reqwest::header::AUTHORIZATION,
                format!("KakaoAK {}", self.config.rest_key),
            )
            .send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Status(status.as_u16()));
        }
        parse_address_response(&response.text()?)
    }
}
