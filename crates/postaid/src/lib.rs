#![forbid(unsafe_code)]

//! Post Aid public facade crate.
//!
//! Re-exports the types a front end needs from the internal crates and offers
//! a prelude plus a single [`Error`] covering every fallible collaborator.

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use postaid_core::{
    Bounds, BuildingLabel, CanonicalOrder, DraftError, LatLng, OVERFLOW_LABEL, Resident,
    ResidentDraft, ResidentId, building_key,
};

// --- Search re-exports -----------------------------------------------------

pub use postaid_search::{
    DatabaseSummary, Grouping, ListView, SearchScope, SearchState, Section, filter, group,
    visible_building_order,
};
pub use postaid_text::{Query, match_ranges, normalize};

// --- Runtime re-exports ----------------------------------------------------

#[cfg(feature = "file-store")]
pub use postaid_runtime::FileStore;
pub use postaid_runtime::{
    CancelToken, Cmd, MemoryStore, MessageSender, Model, Program, ProgramConfig, RecordStore,
    StoreError, SubscriptionId,
};

// --- Collaborator re-exports -----------------------------------------------

pub use postaid_route::{
    GeocodeError, Geocoder, KakaoConfig, KakaoGeocoder, MapSurface, Mode, RecordingSurface,
    RouteEditor, Seed, Waypoint,
};
pub use postaid_weather::{
    BriefingOptions, Forecast, ForecastSource, KmaClient, KmaConfig, WeatherError,
    fetch_with_fallback,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for Post Aid front ends.
#[derive(Debug)]
pub enum Error {
    /// A resident form was incomplete.
    Draft(DraftError),
    Store(StoreError),
    Weather(WeatherError),
    Geocode(GeocodeError),
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Weather(err) => write!(f, "{err}"),
            Self::Geocode(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Draft(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Weather(err) => Some(err),
            Self::Geocode(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<DraftError> for Error {
    fn from(err: DraftError) -> Self {
        Self::Draft(err)
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl From<WeatherError> for Error {
    fn from(err: WeatherError) -> Self {
        Self::Weather(err)
    }
}

impl From<GeocodeError> for Error {
    fn from(err: GeocodeError) -> Self {
        Self::Geocode(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

/// Standard result type for Post Aid APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        CanonicalOrder, Cmd, Error, Forecast, LatLng, Model, Program, ProgramConfig, RecordStore,
        Resident, ResidentDraft, ResidentId, Result, RouteEditor, SearchScope, SearchState,
        Waypoint,
    };

    pub use crate::{core, route, runtime, search, text, weather};
}

pub use postaid_core as core;
pub use postaid_route as route;
pub use postaid_runtime as runtime;
pub use postaid_search as search;
pub use postaid_text as text;
pub use postaid_weather as weather;
