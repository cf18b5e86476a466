//! Property tests: the briefing always has something sensible to show.

use std::sync::Arc;
use std::time::Duration;

use postaid_runtime::CancelToken;
use postaid_weather::{
    BriefingOptions, Forecast, ForecastSource, HalfDay, Origin, SkyStatus, WeatherError,
    WeatherResult, derive_advice, display_date, fetch_with_fallback, seasonal_forecast,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use time::OffsetDateTime;

fn any_instant() -> impl Strategy<Value = OffsetDateTime> {
    // 2000-01-01 .. 2100-01-01
    (946_684_800i64..4_102_444_800i64)
        .prop_map(|secs| OffsetDateTime::from_unix_timestamp(secs).unwrap_or(OffsetDateTime::UNIX_EPOCH))
}

fn any_status() -> impl Strategy<Value = SkyStatus> {
    prop_oneof![
        Just(SkyStatus::Clear),
        Just(SkyStatus::Cloudy),
        Just(SkyStatus::Rainy),
        Just(SkyStatus::Snowy),
    ]
}

fn any_half() -> impl Strategy<Value = HalfDay> {
    (any_status(), -30i32..45, any::<u8>()).prop_map(|(s, t, r)| HalfDay::new(s, t, r))
}

fn is_display_date(s: &str) -> bool {
    let parts: Vec<&str> = s.split(". ").collect();
    parts.len() == 3
        && parts[0].len() == 4
        && parts[1].len() == 2
        && parts[2].len() == 3
        && parts[2].ends_with('.')
}

struct Unavailable;

impl ForecastSource for Unavailable {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn fetch(&self, _: OffsetDateTime, _: &CancelToken) -> WeatherResult<Forecast> {
        Err(WeatherError::Api {
            code: "03".into(),
            message: "NO_DATA".into(),
        })
    }
}

proptest! {
    #[test]
    fn fallback_is_complete_for_any_instant(at in any_instant()) {
        let f = seasonal_forecast(at, "광산구 월계동");
        prop_assert_eq!(f.origin, Origin::Fallback);
        prop_assert!(is_display_date(&f.date), "bad date {}", f.date);
        prop_assert_eq!(&f.date, &display_date(at));
        prop_assert!(!f.advice_text().trim().is_empty());
        prop_assert!(f.am.rain_prob <= 100 && f.pm.rain_prob <= 100);
    }

    #[test]
    fn advice_is_never_empty(am in any_half(), pm in any_half()) {
        prop_assert!(!derive_advice(&am, &pm).is_empty());
    }

    #[test]
    fn wet_halves_always_mention_weather(am in any_half(), pm in any_half()) {
        let advice = derive_advice(&am, &pm);
        if am.status == SkyStatus::Snowy || pm.status == SkyStatus::Snowy {
            prop_assert!(advice.contains("눈"));
        } else if am.status.is_precipitation() || pm.status.is_precipitation() {
            prop_assert!(advice.contains("비"));
        }
    }
}

#[test]
fn failing_service_yields_fallback_for_the_same_day() {
    let at = OffsetDateTime::now_utc();
    let options = BriefingOptions {
        timeout: Duration::from_secs(2),
        location: "광산구 월계동".into(),
    };
    let forecast = fetch_with_fallback(Arc::new(Unavailable), at, &options);
    assert_eq!(forecast, seasonal_forecast(at, "광산구 월계동"));
}
