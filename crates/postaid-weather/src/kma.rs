#![forbid(unsafe_code)]

//! Korea Meteorological Administration short-term forecast client.
//!
//! Uses the `getVilageFcst` operation of the public data portal's
//! `VilageFcstInfoService_2.0`. Forecasts are published eight times a day; the
//! briefing always asks for the 02:00 issue of the current KST day, which
//! covers both delivery slots. Before 02:10 KST that issue is not out yet and
//! the previous day's 23:00 issue is used instead.
//!
//! | Category | Meaning | Used for |
//! |----------|---------|----------|
//! | `PTY` | precipitation type | rain / snow status |
//! | `SKY` | sky cover (1 clear, 3 mostly cloudy, 4 overcast) | status when dry |
//! | `TMP` | temperature, °C | `temp` |
//! | `POP` | probability of precipitation, % | `rain_prob` |

use std::collections::HashMap;
use std::time::Duration;

use postaid_runtime::CancelToken;
use serde::Deserialize;
use time::macros::time;
use time::{Date, OffsetDateTime};

use crate::briefing::ForecastSource;
use crate::error::{WeatherError, WeatherResult};
use crate::forecast::{Forecast, HalfDay, KST, Origin, SkyStatus, format_date};

pub const DEFAULT_BASE_URL: &str =
    "https://apis.data.go.kr/1360000/VilageFcstInfoService_2.0/getVilageFcst";

/// Forecast slot for the morning round.
pub const AM_SLOT: &str = "0900";
/// Forecast slot for the afternoon round.
pub const PM_SLOT: &str = "1500";

/// Connection settings for [`KmaClient`].
#[derive(Debug, Clone)]
pub struct KmaConfig {
    /// Decoded service key from the data portal.
    pub service_key: String,
    /// Forecast grid column.
    pub nx: u16,
    /// Forecast grid row.
    pub ny: u16,
    /// Location label for the briefing.
    pub location: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl KmaConfig {
    /// Settings for the Wolgye-dong grid cell (nx 57, ny 74).
    #[must_use]
    pub fn new(service_key: impl Into<String>) -> Self {
        Self {
            service_key: service_key.into(),
            nx: 57,
            ny: 74,
            location: "광산구 월계동".to_owned(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: Duration::from_secs(8),
        }
    }
}

/// Issue date and time (`YYYYMMDD`, `HHMM`) to request for an instant.
#[must_use]
pub fn base_time(at: OffsetDateTime) -> (String, String) {
    let local = at.to_offset(KST);
    if local.time() >= time!(2:10) {
        (compact_date(local.date()), "0200".to_owned())
    } else {
        let day = local.date().previous_day().unwrap_or(local.date());
        (compact_date(day), "2300".to_owned())
    }
}

fn compact_date(date: Date) -> String {
    format!(
        "{:04}{:02}{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Response decoding
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct Envelope {
    response: Response,
}

#[derive(Debug, Deserialize)]
struct Response {
    header: Header,
    body: Option<Body>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Header {
    result_code: String,
    result_msg: String,
}

#[derive(Debug, Deserialize)]
struct Body {
    items: Items,
}

#[derive(Debug, Deserialize)]
struct Items {
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Item {
    base_date: String,
    base_time: String,
    category: String,
    fcst_date: String,
    fcst_time: String,
    fcst_value: String,
}

/// Decode a `getVilageFcst` JSON body into the briefing for `day` (KST).
pub fn parse_forecast(body: &str, day: Date, location: &str) -> WeatherResult<Forecast> {
    let envelope: Envelope = serde_json::from_str(body)?;
    let header = envelope.response.header;
    if header.result_code != "00" {
        return Err(WeatherError::Api {
            code: header.result_code,
            message: header.result_msg,
        });
    }
    let items = envelope
        .response
        .body
        .map(|b| b.items.item)
        .ok_or_else(|| WeatherError::Decode("response has no body".to_owned()))?;

    let wanted_date = compact_date(day);
    let mut values: Slots<'_> = HashMap::new();
    let mut issued: Option<(&str, &str)> = None;
    for item in &items {
        if issued.is_none() {
            issued = Some((item.base_date.as_str(), item.base_time.as_str()));
        }
        if item.fcst_date == wanted_date {
            values.insert(
                (item.fcst_time.as_str(), item.category.as_str()),
                item.fcst_value.as_str(),
            );
        }
    }

    let am = half_day(&values, AM_SLOT, "AM")?;
    let pm = half_day(&values, PM_SLOT, "PM")?;
    Ok(Forecast {
        date: format_date(day),
        location: location.to_owned(),
        last_updated: issued.map(|(d, t)| format_issue(d, t)),
        advice: None,
        am,
        pm,
        origin: Origin::Service,
    })
}

/// `(fcstTime, category)` to `fcstValue` for one forecast day.
type Slots<'a> = HashMap<(&'a str, &'a str), &'a str>;

fn lookup<'a>(
    values: &Slots<'a>,
    slot: &'a str,
    category: &'a str,
    label: &str,
) -> WeatherResult<&'a str> {
    values
        .get(&(slot, category))
        .copied()
        .ok_or_else(|| WeatherError::MissingSlot(format!("{label} {category}")))
}

fn half_day(values: &Slots<'_>, slot: &'static str, label: &str) -> WeatherResult<HalfDay> {
    let status = status_from(
        lookup(values, slot, "PTY", label)?,
        lookup(values, slot, "SKY", label)?,
    )?;
    let temp = parse_number(lookup(values, slot, "TMP", label)?, "TMP")?.round() as i32;
    let rain = parse_number(lookup(values, slot, "POP", label)?, "POP")?
        .clamp(0.0, 100.0)
        .round() as u8;
    Ok(HalfDay::new(status, temp, rain))
}

fn parse_number(raw: &str, category: &str) -> WeatherResult<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| WeatherError::Decode(format!("{category} value '{raw}' is not a number")))
}

/// Map precipitation type and sky cover codes to a status.
fn status_from(pty: &str, sky: &str) -> WeatherResult<SkyStatus> {
    match pty.trim() {
        "1" | "2" | "4" => return Ok(SkyStatus::Rainy),
        "3" => return Ok(SkyStatus::Snowy),
        "0" => {}
        other => return Err(WeatherError::Decode(format!("unknown PTY code '{other}'"))),
    }
    match sky.trim() {
        "1" => Ok(SkyStatus::Clear),
        "3" | "4" => Ok(SkyStatus::Cloudy),
        other => Err(WeatherError::Decode(format!("unknown SKY code '{other}'"))),
    }
}

/// `"20250305"`, `"0200"` to `"2025-03-05 02:00"`.
fn format_issue(date: &str, time: &str) -> String {
    if date.len() == 8 && time.len() == 4 && date.is_ascii() && time.is_ascii() {
        format!(
            "{}-{}-{} {}:{}",
            &date[..4],
            &date[4..6],
            &date[6..],
            &time[..2],
            &time[2..]
        )
    } else {
        format!("{date} {time}")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Client
// ─────────────────────────────────────────────────────────────────────────────

/// Blocking HTTP client for the KMA forecast.
#[derive(Debug, Clone)]
pub struct KmaClient {
    config: KmaConfig,
    http: reqwest::blocking::Client,
}

impl KmaClient {
    pub fn new(config: KmaConfig) -> WeatherResult<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { config, http })
    }

    #[must_use]
    pub fn config(&self) -> &KmaConfig {
        &self.config
    }

    fn request_url(&self, at: OffsetDateTime) -> WeatherResult<reqwest::Url> {
        let (base_date, base_time) = base_time(at);
        let nx = self.config.nx.to_string();
        let ny = self.config.ny.to_string();
        reqwest::Url::parse_with_params(
            &self.config.base_url,
            [
                ("serviceKey", self.config.service_key.as_str()),
                ("pageNo", "1"),
                ("numOfRows", "1000"),
                ("dataType", "JSON"),
                ("base_date", base_date.as_str()),
                ("base_time", base_time.as_str()),
                ("nx", nx.as_str()),
                ("ny", ny.as_str()),
            ],
        )
        .map_err(|e| WeatherError::Decode(format!("bad forecast url: {e}")))
    }
}

impl ForecastSource for KmaClient {
    fn name(&self) -> &str {
        "kma"
    }

    fn fetch(&self, at: OffsetDateTime, cancel: &CancelToken) -> WeatherResult<Forecast> {
        let url = self.request_url(at)?;
        if cancel.is_cancelled() {
            return Err(WeatherError::Cancelled);
        }
        tracing::debug!(nx = self.config.nx, ny = self.config.ny, "requesting KMA forecast");
        let response = self.http.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(WeatherError::Status(status.as_u16()));
        }
        let body = response.text()?;
        if cancel.is_cancelled() {
            return Err(WeatherError::Cancelled);
        }
        parse_forecast(&body, at.to_offset(KST).date(), &self.config.location)
    }
}
