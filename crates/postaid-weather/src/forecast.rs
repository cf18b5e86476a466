#![forbid(unsafe_code)]

//! Forecast values shown in the daily briefing.

use std::fmt;

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime, UtcOffset};

/// Korea Standard Time.
pub const KST: UtcOffset = match UtcOffset::from_hms(9, 0, 0) {
    Ok(offset) => offset,
    Err(_) => UtcOffset::UTC,
};

/// Shown when neither the source nor the advice rules have anything to say.
pub const DEFAULT_ADVICE: &str = "안전운행 하시고 오늘도 화이팅하세요!";

/// Sky condition for one half of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkyStatus {
    Clear,
    Cloudy,
    Rainy,
    Snowy,
}

impl SkyStatus {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::Cloudy => "cloudy",
            Self::Rainy => "rainy",
            Self::Snowy => "snowy",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Clear => "맑음",
            Self::Cloudy => "흐림",
            Self::Rainy => "비",
            Self::Snowy => "눈",
        }
    }

    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Clear => "☀️",
            Self::Cloudy => "☁️",
            Self::Rainy => "☔",
            Self::Snowy => "❄️",
        }
    }

    /// Wet conditions (rain or snow).
    #[must_use]
    pub const fn is_precipitation(self) -> bool {
        matches!(self, Self::Rainy | Self::Snowy)
    }
}

impl fmt::Display for SkyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Morning or afternoon conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HalfDay {
    pub status: SkyStatus,
    /// Degrees Celsius.
    pub temp: i32,
    /// Probability of precipitation, 0..=100.
    pub rain_prob: u8,
}

impl HalfDay {
    #[must_use]
    pub fn new(status: SkyStatus, temp: i32, rain_prob: u8) -> Self {
        Self {
            status,
            temp,
            rain_prob: rain_prob.min(100),
        }
    }

    /// `"14°C"`.
    #[must_use]
    pub fn temp_label(&self) -> String {
        format!("{}°C", self.temp)
    }

    /// `"20%"`.
    #[must_use]
    pub fn rain_label(&self) -> String {
        format!("{}%", self.rain_prob)
    }
}

/// Where a forecast came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// The remote forecast service.
    Service,
    /// Synthesized locally after the service failed or timed out.
    Fallback,
}

/// A day's briefing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Forecast {
    /// Display date, `"YYYY. MM. DD."`.
    pub date: String,
    pub location: String,
    /// When the source published the forecast, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advice: Option<String>,
    pub am: HalfDay,
    pub pm: HalfDay,
    pub origin: Origin,
}

impl Forecast {
    /// The advice line to show: the stored one, else [`DEFAULT_ADVICE`].
    #[must_use]
    pub fn advice_text(&self) -> &str {
        self.advice.as_deref().unwrap_or(DEFAULT_ADVICE)
    }

    /// Fill `advice` from [`derive_advice`] when the source left it empty.
    #[must_use]
    pub fn with_derived_advice(mut self) -> Self {
        let missing = self.advice.as_deref().is_none_or(|a| a.trim().is_empty());
        if missing {
            self.advice = Some(derive_advice(&self.am, &self.pm).to_owned());
        }
        self
    }

    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.origin == Origin::Fallback
    }
}

/// A carrier-oriented advice line for the day's conditions.
///
/// Rules are checked in order; the first that applies wins.
#[must_use]
pub fn derive_advice(am: &HalfDay, pm: &HalfDay) -> &'static str {
    let halves = [am, pm];
    if halves.iter().any(|h| h.status == SkyStatus::Snowy) {
        return "눈 소식이 있습니다. 이륜차 운행 시 결빙 구간에 각별히 유의하세요!";
    }
    if halves.iter().any(|h| h.status == SkyStatus::Rainy) {
        return "비 소식이 있습니다. 우편물 방수에 신경 쓰시고 빗길 안전운행 하세요!";
    }
    if halves.iter().any(|h| h.rain_prob >= 60) {
        return "강수 확률이 높습니다. 우의와 방수 커버를 챙기세요!";
    }
    if halves.iter().any(|h| h.temp >= 30) {
        return "무더운 날씨입니다. 충분한 수분 섭취와 휴식을 챙기세요!";
    }
    if halves.iter().any(|h| h.temp <= 0) {
        return "영하의 추위입니다. 방한 장비를 꼭 챙기세요!";
    }
    DEFAULT_ADVICE
}

/// The briefing's display date for an instant, in KST.
#[must_use]
pub fn display_date(at: OffsetDateTime) -> String {
    format_date(at.to_offset(KST).date())
}

pub(crate) fn format_date(date: Date) -> String {
    format!(
        "{}. {:02}. {:02}.",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}
