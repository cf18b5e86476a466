#![forbid(unsafe_code)]

//! Locally synthesized forecast used when the service is unavailable.
//!
//! Values are monthly climate normals for the Gwangju area, rounded: a
//! plausible placeholder so the briefing never shows a hard failure.

use time::{Month, OffsetDateTime};

use crate::forecast::{Forecast, HalfDay, KST, Origin, SkyStatus, display_date};

/// One month's placeholder conditions.
#[derive(Debug, Clone, Copy)]
struct Normal {
    am: (SkyStatus, i32, u8),
    pm: (SkyStatus, i32, u8),
}

const fn normal(am: (SkyStatus, i32, u8), pm: (SkyStatus, i32, u8)) -> Normal {
    Normal { am, pm }
}

use SkyStatus::{Clear, Cloudy, Rainy};

/// Indexed by month, January first.
const NORMALS: [Normal; 12] = [
    normal((Clear, -3, 10), (Cloudy, 5, 20)),
    normal((Clear, -1, 10), (Cloudy, 8, 20)),
    normal((Clear, 4, 0), (Cloudy, 14, 20)),
    normal((Clear, 9, 10), (Clear, 20, 20)),
    normal((Clear, 14, 10), (Cloudy, 25, 20)),
    normal((Cloudy, 19, 30), (Cloudy, 28, 40)),
    normal((Rainy, 23, 60), (Rainy, 30, 70)),
    normal((Cloudy, 23, 40), (Clear, 31, 40)),
    normal((Clear, 18, 20), (Cloudy, 27, 30)),
    normal((Clear, 11, 0), (Clear, 22, 10)),
    normal((Clear, 5, 10), (Cloudy, 15, 20)),
    normal((Cloudy, -1, 20), (Cloudy, 8, 20)),
];

fn month_index(month: Month) -> usize {
    usize::from(u8::from(month)) - 1
}

/// Placeholder forecast for the KST date of `at`.
#[must_use]
pub fn seasonal_forecast(at: OffsetDateTime, location: &str) -> Forecast {
    let n = NORMALS[month_index(at.to_offset(KST).month())];
    let half = |(status, temp, rain): (SkyStatus, i32, u8)| HalfDay::new(status, temp, rain);
    Forecast {
        date: display_date(at),
        location: location.to_owned(),
        last_updated: None,
        advice: None,
        am: half(n.am),
        pm: half(n.pm),
        origin: Origin::Fallback,
    }
    .with_derived_advice()
}
