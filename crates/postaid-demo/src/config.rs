#![forbid(unsafe_code)]

//! Runtime configuration for the terminal program.
//!
//! Layers, later wins:
//!
//! 1. [`Config::default`]: the Wolgye-dong delivery area.
//! 2. A JSON file (`--config=PATH` or `POSTAID_CONFIG`). Missing keys keep
//!    their defaults; unknown keys are rejected.
//! 3. `POSTAID_*` environment variables.
//! 4. Command-line flags, applied by the caller.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use postaid::route::KakaoConfig;
use postaid::weather::KmaConfig;
use postaid::{BriefingOptions, CanonicalOrder, LatLng, OVERFLOW_LABEL, Resident, Seed};
use serde::{Deserialize, Serialize};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "POSTAID_CONFIG";

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: serde_json::Error },
    /// An environment variable held an unusable value.
    Env { key: &'static str, value: String },
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "cannot read config {}: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "invalid config {}: {source}", path.display())
            }
            Self::Env { key, value } => write!(f, "invalid value for {key}: {value:?}"),
            Self::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// A resident used to seed an empty store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedResident {
    pub building: String,
    pub unit: String,
    pub tenant: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Canonical building order, display order.
    pub buildings: Vec<String>,
    pub overflow_label: String,
    /// Records written to a new store.
    pub residents: Vec<SeedResident>,
    /// JSON file backing the store; in-memory when absent.
    pub store_path: Option<PathBuf>,
    pub route_seeds: Vec<Seed>,
    pub map_center: LatLng,
    pub location: String,
    pub kma_service_key: Option<String>,
    pub kma_nx: u16,
    pub kma_ny: u16,
    pub kakao_rest_key: Option<String>,
    pub weather_timeout_ms: u64,
    pub geocode_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        let seeds = ["169", "173", "175", "183"];
        Self {
            buildings: seeds.iter().map(|n| format!("월계로 {n}")).collect(),
            overflow_label: OVERFLOW_LABEL.to_owned(),
            residents: Vec::new(),
            store_path: None,
            route_seeds: seeds
                .iter()
                .map(|n| Seed::new(*n, format!("광주 광산구 월계로 {n}")))
                .collect(),
            map_center: LatLng::new(35.2140, 126.8360),
            location: "광산구 월계동".to_owned(),
            kma_service_key: None,
            kma_nx: 57,
            kma_ny: 74,
            kakao_rest_key: None,
            weather_timeout_ms: 10_000,
            geocode_timeout_ms: 5_000,
        }
    }
}

impl Config {
    /// Defaults, then the config file if one is named, then the environment.
    pub fn load(
        file: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let from_env = env(CONFIG_ENV).map(PathBuf::from);
        let mut config = match file.map(Path::to_path_buf).or(from_env) {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env(env)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "config file loaded");
        Ok(config)
    }

    /// Apply `POSTAID_*` overrides. Empty values count as unset.
    pub fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        let get = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("POSTAID_STORE") {
            self.store_path = Some(PathBuf::from(v));
        }
        if let Some(v) = get("POSTAID_KMA_KEY") {
            self.kma_service_key = Some(v);
        }
        if let Some(v) = get("POSTAID_KAKAO_KEY") {
            self.kakao_rest_key = Some(v);
        }
        if let Some(v) = get("POSTAID_LOCATION") {
            self.location = v;
        }
        if let Some(v) = get("POSTAID_BUILDINGS") {
            self.buildings = v
                .split(';')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect();
        }
        if let Some(v) = get("POSTAID_KMA_NX") {
            self.kma_nx = parse_env("POSTAID_KMA_NX", &v)?;
        }
        if let Some(v) = get("POSTAID_KMA_NY") {
            self.kma_ny = parse_env("POSTAID_KMA_NY", &v)?;
        }
        if let Some(v) = get("POSTAID_WEATHER_TIMEOUT_MS") {
            self.weather_timeout_ms = parse_env("POSTAID_WEATHER_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = get("POSTAID_GEOCODE_TIMEOUT_MS") {
            self.geocode_timeout_ms = parse_env("POSTAID_GEOCODE_TIMEOUT_MS", &v)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.overflow_label.trim().is_empty() {
            return Err(ConfigError::Invalid("overflow_label is empty".into()));
        }
        if !self.map_center.is_valid() {
            return Err(ConfigError::Invalid(format!(
                "map_center {} is out of range",
                self.map_center
            )));
        }
        if self.weather_timeout_ms == 0 {
            return Err(ConfigError::Invalid("weather_timeout_ms must be positive".into()));
        }
        Ok(())
    }

    #[must_use]
    pub fn canonical_order(&self) -> CanonicalOrder {
        CanonicalOrder::new(&self.buildings).with_overflow_label(self.overflow_label.clone())
    }

    /// Seed records, skipping incomplete entries. Ids start at 1.
    #[must_use]
    pub fn seed_records(&self) -> Vec<Resident> {
        self.residents
            .iter()
            .filter(|r| {
                [&r.building, &r.unit, &r.tenant]
                    .iter()
                    .all(|f| !f.trim().is_empty())
            })
            .zip(1u64..)
            .map(|(r, id)| Resident::new(id, r.building.trim(), r.unit.trim(), r.tenant.trim()))
            .collect()
    }

    #[must_use]
    pub fn weather_timeout(&self) -> Duration {
        Duration::from_millis(self.weather_timeout_ms)
    }

    #[must_use]
    pub fn briefing_options(&self) -> BriefingOptions {
        BriefingOptions {
            timeout: self.weather_timeout(),
            location: self.location.clone(),
        }
    }

    /// KMA client settings, when a service key is configured.
    #[must_use]
    pub fn kma(&self) -> Option<KmaConfig> {
        let key = self.kma_service_key.as_deref()?;
        let mut kma = KmaConfig::new(key);
        kma.nx = self.kma_nx;
        kma.ny = self.kma_ny;
        kma.location = self.location.clone();
        kma.timeout = self.weather_timeout();
        Some(kma)
    }

    /// Kakao geocoder settings, when a REST key is configured.
    #[must_use]
    pub fn kakao(&self) -> Option<KakaoConfig> {
        let key = self.kakao_rest_key.as_deref()?;
        let mut kakao = KakaoConfig::new(key);
        kakao.timeout = Duration::from_millis(self.geocode_timeout_ms);
        Some(kakao)
    }
}

fn parse_env<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Env {
        key,
        value: value.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_cover_the_delivery_area() {
        let config = Config::load(None, env_of(&[])).unwrap();
        assert_eq!(config.route_seeds.len(), 4);
        assert_eq!(config.route_seeds[0].address, "광주 광산구 월계로 169");
        assert_eq!(config.map_center, LatLng::new(35.2140, 126.8360));
        assert_eq!((config.kma_nx, config.kma_ny), (57, 74));
        assert!(config.kma().is_none());
        assert!(config.kakao().is_none());
    }

    #[test]
    fn file_overrides_defaults_and_keeps_missing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("postaid.json");
        fs::write(
            &path,
            r#"{"buildings":["A동 (1번지)","B동"],"residents":[{"building":"B동","unit":"202","tenant":"이영희"}]}"#,
        )
        .unwrap();

        let config = Config::load(Some(&path), env_of(&[])).unwrap();
        assert_eq!(config.buildings, ["A동 (1번지)", "B동"]);
        assert_eq!(config.location, "광산구 월계동");
        assert_eq!(config.seed_records(), [Resident::new(1, "B동", "202", "이영희")]);
    }

    #[test]
    fn config_path_can_come_from_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.json");
        fs::write(&path, r#"{"location":"월곡동"}"#).unwrap();
        let path_str = path.to_string_lossy().into_owned();

        let config = Config::load(None, env_of(&[(CONFIG_ENV, path_str.as_str())])).unwrap();
        assert_eq!(config.location, "월곡동");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.json");
        fs::write(&path, r#"{"colour":"red"}"#).unwrap();
        assert!(matches!(
            Config::load(Some(&path), env_of(&[])),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Config::load(Some(Path::new("/nonexistent/postaid.json")), env_of(&[]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/postaid.json"));
    }

    #[test]
    fn env_overrides_file() {
        let config = Config::load(
            None,
            env_of(&[
                ("POSTAID_KMA_KEY", "secret"),
                ("POSTAID_KMA_NX", "60"),
                ("POSTAID_BUILDINGS", "가동; 나동 ;"),
                ("POSTAID_KAKAO_KEY", "  "),
            ]),
        )
        .unwrap();
        assert_eq!(config.buildings, ["가동", "나동"]);
        let kma = config.kma().unwrap();
        assert_eq!(kma.service_key, "secret");
        assert_eq!(kma.nx, 60);
        assert_eq!(kma.timeout, Duration::from_secs(10));
        // blank values are ignored
        assert!(config.kakao().is_none());
    }

    #[test]
    fn bad_env_numbers_are_reported() {
        let err = Config::load(None, env_of(&[("POSTAID_KMA_NY", "north")])).unwrap_err();
        assert!(matches!(err, ConfigError::Env { key: "POSTAID_KMA_NY", .. }));
    }

    #[test]
    fn seed_records_skip_blank_fields() {
        let config = Config {
            residents: vec![
                SeedResident {
                    building: "A동".into(),
                    unit: " ".into(),
                    tenant: "김철수".into(),
                },
                SeedResident {
                    building: "A동".into(),
                    unit: "101".into(),
                    tenant: "김철수".into(),
                },
            ],
            ..Config::default()
        };
        assert_eq!(config.seed_records(), [Resident::new(1, "A동", "101", "김철수")]);
    }

    #[test]
    fn canonical_order_uses_overflow_label() {
        let config = Config {
            buildings: vec!["A동".into()],
            overflow_label: "미분류".into(),
            ..Config::default()
        };
        let order = config.canonical_order();
        assert_eq!(order.overflow_label(), "미분류");
        assert_eq!(order.iter().collect::<Vec<_>>(), ["A동"]);
    }
}
