#![forbid(unsafe_code)]

//! End-to-end shell scenarios: typed lines go through the parser, the
//! program and the store, and assertions read the model and the rendered
//! screen.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use time::OffsetDateTime;

use postaid::route::GeocodeResult;
use postaid::weather::{Origin, WeatherResult, seasonal_forecast};
use postaid::{
    CancelToken, Forecast, ForecastSource, GeocodeError, Geocoder, LatLng, MemoryStore, Mode,
    Program, ProgramConfig, RecordStore, WeatherError,
};
use postaid_demo::app::{self, AppModel, Services, Tab};
use postaid_demo::config::Config;
use postaid_demo::input::parse_line;
use postaid_demo::view;

// =============================================================================
// Test Infrastructure
// =============================================================================

struct FailingForecast;

impl ForecastSource for FailingForecast {
    fn name(&self) -> &str {
        "failing"
    }

    fn fetch(&self, _at: OffsetDateTime, _cancel: &CancelToken) -> WeatherResult<Forecast> {
        Err(WeatherError::Status(503))
    }
}

struct FixedForecast;

impl ForecastSource for FixedForecast {
    fn name(&self) -> &str {
        "fixed"
    }

    fn fetch(&self, at: OffsetDateTime, _cancel: &CancelToken) -> WeatherResult<Forecast> {
        let mut forecast = seasonal_forecast(at, "테스트동");
        forecast.origin = Origin::Service;
        forecast.last_updated = Some("05:00".to_owned());
        Ok(forecast)
    }
}

/// Knows two of the default seed addresses.
struct TableGeocoder;

impl Geocoder for TableGeocoder {
    fn resolve(&self, address: &str) -> GeocodeResult<Option<LatLng>> {
        match address {
            "광주 광산구 월계로 169" => Ok(Some(LatLng::new(35.2135, 126.8351))),
            "광주 광산구 월계로 175" => Ok(Some(LatLng::new(35.2146, 126.8369))),
            "광주 광산구 월계로 183" => Err(GeocodeError::Status(500)),
            _ => Ok(None),
        }
    }
}

struct Shell {
    program: Program<AppModel>,
    store: Arc<MemoryStore>,
}

impl Shell {
    fn with_services(
        forecast: Option<Arc<dyn ForecastSource>>,
        geocoder: Option<Arc<dyn Geocoder>>,
    ) -> Self {
        let store = Arc::new(MemoryStore::new());
        let services = Services {
            store: store.clone(),
            forecast,
            geocoder,
        };
        let model = AppModel::new(&Config::default(), services);
        let mut program = Program::new(model, ProgramConfig::inline());
        app::connect_store(&mut program);
        program.init();
        program.pump();
        Self { program, store }
    }

    fn offline() -> Self {
        Self::with_services(None, None)
    }

    /// Type one line and settle.
    fn type_line(&mut self, line: &str) {
        let msg = parse_line(line)
            .unwrap_or_else(|e| panic!("'{line}' should parse: {e}"))
            .unwrap_or_else(|| panic!("'{line}' produced no message"));
        self.program.send(msg);
        self.program.pump();
    }

    fn model(&self) -> &AppModel {
        self.program.model()
    }

    fn screen(&self) -> String {
        self.program.render()
    }
}

// =============================================================================
// Residents
// =============================================================================

#[test]
fn added_resident_appears_after_store_notification() {
    let mut shell = Shell::offline();
    assert!(shell.model().records().is_empty());

    shell.type_line("add 월계로 169 | 101 | 김철수");

    assert_eq!(shell.model().records().len(), 1);
    assert_eq!(shell.model().notice(), Some("#1 추가됨"));
    let screen = shell.screen();
    assert!(screen.contains("▾ 월계로 169 · 1"), "{screen}");
    assert!(screen.contains("김철수"), "{screen}");
}

#[test]
fn chosung_search_finds_tenant() {
    let mut shell = Shell::offline();
    shell.type_line("add 월계로 169 | 101 | 김철수");
    shell.type_line("add 월계로 173 | 202 | 이영희");

    shell.type_line("search ㅊㅅ");

    let model = shell.model();
    let view = model.search().view(model.records(), model.order());
    assert!(view.query_active);
    assert_eq!(view.match_count, 1);
    assert_eq!(view.sections.len(), 1);
    assert_eq!(view.sections[0].building, "월계로 169");
    assert!(view.sections[0].expanded);

    let screen = shell.screen();
    assert!(screen.contains("검색: \"ㅊㅅ\" (전체) · 1건"), "{screen}");
    assert!(screen.contains("김["), "{screen}");
    assert!(!screen.contains("이영희"), "{screen}");
}

#[test]
fn search_scope_limits_fields() {
    let mut shell = Shell::offline();
    shell.type_line("add 월계로 169 | 101 | 김철수");
    shell.type_line("scope unit");
    shell.type_line("search ㄱㅊㅅ");

    let model = shell.model();
    assert_eq!(model.search().view(model.records(), model.order()).match_count, 0);
    assert!(shell.screen().contains("검색 결과가 없습니다."));
}

#[test]
fn unknown_building_lands_in_overflow_group() {
    let mut shell = Shell::offline();
    shell.type_line("add 새빌라 (월계로 190) | 1층 | 박민수");

    let screen = shell.screen();
    assert!(screen.contains("▾ 기타 · 1"), "{screen}");
    assert!(screen.contains("(새빌라 (월계로 190))"), "{screen}");
}

#[test]
fn building_key_files_under_canonical_spelling() {
    let mut shell = Shell::offline();
    shell.type_line("add 월계로 169 (광산구 월계동) | 3 | 최지우");

    assert_eq!(shell.model().records()[0].building_name, "월계로 169");
}

#[test]
fn blank_field_is_rejected_before_the_store() {
    let mut shell = Shell::offline();
    shell.type_line("add 월계로 169 |   | 김철수");

    assert!(shell.store.snapshot().is_empty());
    let notice = shell.model().notice().unwrap_or_default();
    assert!(notice.starts_with("추가하지 않음"), "{notice}");
}

#[test]
fn edit_changes_record_in_place() {
    let mut shell = Shell::offline();
    shell.type_line("add 월계로 169 | 101 | 김철수");
    shell.type_line("edit #1 월계로 173 | 102 | 김철수");

    let records = shell.store.snapshot();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].building_name, "월계로 173");
    assert_eq!(shell.model().records()[0].unit_number, "102");
}

#[test]
fn edit_of_unknown_id_reports_failure() {
    let mut shell = Shell::offline();
    shell.type_line("edit 42 월계로 169 | 101 | 김철수");

    let notice = shell.model().notice().unwrap_or_default();
    assert!(notice.starts_with("저장 실패"), "{notice}");
}

#[test]
fn toggle_by_list_position() {
    let mut shell = Shell::offline();
    shell.type_line("add 월계로 173 | 202 | 이영희");
    assert!(shell.model().search().is_expanded("월계로 173"));

    // every canonical building is listed while no query is active
    shell.type_line("toggle 2");
    assert!(!shell.model().search().is_expanded("월계로 173"));

    shell.type_line("toggle 월계로 999");
    assert_eq!(shell.model().notice(), Some("건물 없음: 월계로 999"));
}

#[test]
fn store_writes_from_elsewhere_reach_the_list() {
    let mut shell = Shell::offline();
    let draft = postaid::ResidentDraft::new("월계로 175", "5층", "정우성").unwrap();
    shell.store.append(draft).unwrap();

    shell.program.pump();
    assert_eq!(shell.model().records().len(), 1);
}

// =============================================================================
// Tabs
// =============================================================================

#[test]
fn tabs_switch_views() {
    let mut shell = Shell::offline();
    shell.type_line("add 월계로 169 | 101 | 김철수");

    shell.type_line("2");
    assert_eq!(shell.model().tab(), Tab::Database);
    let screen = shell.screen();
    assert!(screen.contains("[2 데이터베이스]"), "{screen}");
    assert!(screen.contains("총 세대 1 · 등록 건물 1"), "{screen}");

    shell.type_line("tab map");
    assert!(shell.screen().contains("[3 지도]"));

    // searching jumps back to the list
    shell.type_line("search 김");
    assert_eq!(shell.model().tab(), Tab::List);
}

// =============================================================================
// Route
// =============================================================================

#[test]
fn route_starts_empty_without_geocoder() {
    let mut shell = Shell::offline();
    assert!(shell.model().route().is_empty());

    // startup notes are shown to the user, not only traced
    let mut out = String::new();
    view::render_logs(&shell.program.take_logs(), &mut out);
    assert!(out.contains("* no geocoder configured, route starts empty"), "{out}");
    assert!(shell.program.logs().is_empty());
}

#[test]
fn route_add_rename_delete() {
    let mut shell = Shell::offline();
    shell.type_line("route edit");
    assert_eq!(shell.model().route().mode(), Mode::Editing);

    shell.type_line("route add @35.2150,126.8370");
    shell.type_line("route add 편의점");
    shell.type_line("route rename 1 우체국");

    let names: Vec<&str> = shell
        .model()
        .route()
        .points()
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(names, vec!["우체국", "편의점"]);
    let screen = shell.screen();
    assert!(screen.contains("편집 중 · 2개 지점"), "{screen}");

    shell.type_line("route delete 1");
    assert_eq!(shell.model().route().len(), 1);
    assert_eq!(shell.model().route().points()[0].name, "편의점");

    shell.type_line("route delete 5");
    assert_eq!(shell.model().route().len(), 1);
    assert_eq!(shell.model().notice(), Some("경로 변경 없음"));
}

#[test]
fn seeds_resolve_in_order_and_misses_drop() {
    let shell = Shell::with_services(None, Some(Arc::new(TableGeocoder)));
    let names: Vec<&str> = shell
        .model()
        .route()
        .points()
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(names, vec!["169", "175"]);
    assert_eq!(shell.model().route().mode(), Mode::Viewing);
}

// =============================================================================
// Weather
// =============================================================================

#[test]
fn offline_uses_seasonal_forecast() {
    let shell = Shell::offline();
    let forecast = shell.model().forecast().expect("forecast after init");
    assert!(forecast.is_fallback());
    assert!(!shell.model().weather_pending());
    assert!(shell.screen().contains("(예상치)"));
}

#[test]
fn failing_service_falls_back() {
    let shell = Shell::with_services(Some(Arc::new(FailingForecast)), None);
    let forecast = shell.model().forecast().expect("forecast after init");
    assert!(forecast.is_fallback());
    assert!(!forecast.advice_text().is_empty());
}

#[test]
fn service_forecast_is_shown_as_is() {
    let mut shell = Shell::with_services(Some(Arc::new(FixedForecast)), None);
    let screen = shell.screen();
    assert!(screen.contains("테스트동"), "{screen}");
    assert!(screen.contains("발표 05:00"), "{screen}");
    assert!(!screen.contains("(예상치)"), "{screen}");

    shell.type_line("weather");
    assert!(!shell.model().weather_pending());
}

// =============================================================================
// Lifecycle
// =============================================================================

#[test]
fn quit_stops_program_and_unsubscribes() {
    let mut shell = Shell::offline();
    shell.type_line("quit");

    assert!(!shell.program.is_running());
    assert!(format!("{:?}", shell.store).contains("listeners: 0"));
}

#[test]
fn bad_input_is_reported_not_sent() {
    assert!(parse_line("dance").is_err());
    assert!(parse_line("route move 1 north").is_err());
    assert!(parse_line("add only-one-field").is_err());
}
