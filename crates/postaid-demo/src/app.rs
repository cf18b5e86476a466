#![forbid(unsafe_code)]

//! Application model for the Post Aid shell.
//!
//! All state lives in [`AppModel`] and changes only through
//! [`Model::update`]. Slow work (the weather briefing, seed geocoding) runs as
//! [`Cmd::task`]s and comes back as messages. Resident writes go to the store;
//! the list changes only when the store's change notification arrives as
//! [`Msg::RecordsChanged`].

use std::sync::Arc;

use postaid::route::resolve_seeds;
use postaid::weather::seasonal_forecast;
use postaid::{
    BriefingOptions, CanonicalOrder, Cmd, Forecast, ForecastSource, Geocoder, LatLng, Model,
    Program, RecordStore, RecordingSurface, Resident, ResidentDraft, ResidentId, RouteEditor,
    SearchScope, SearchState, Seed, SubscriptionId, Waypoint, fetch_with_fallback,
};
use time::OffsetDateTime;

use crate::config::Config;
use crate::input::COMMAND_HELP;

/// Top-level views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    List,
    Database,
    Map,
}

impl Tab {
    pub const ALL: [Self; 3] = [Self::List, Self::Database, Self::Map];

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::List => "목록",
            Self::Database => "데이터베이스",
            Self::Map => "지도",
        }
    }
}

/// Route editing requests. Indices are 0-based.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteAction {
    ToggleEdit,
    /// `label` defaults to the next point number, `at` to the map center.
    Add {
        label: Option<String>,
        at: Option<LatLng>,
    },
    Rename {
        index: usize,
        label: String,
    },
    /// A marker was dragged.
    Move {
        index: usize,
        to: LatLng,
    },
    Delete {
        index: usize,
    },
    Pan(LatLng),
}

#[derive(Debug, Clone)]
pub enum Msg {
    /// Full snapshot pushed by the store.
    RecordsChanged(Vec<Resident>),
    Search(String),
    Scope(SearchScope),
    /// Building name, key, or 1-based position in the current list.
    Toggle(String),
    SwitchTab(Tab),
    Add {
        building: String,
        unit: String,
        tenant: String,
    },
    Edit {
        id: ResidentId,
        building: String,
        unit: String,
        tenant: String,
    },
    RefreshWeather,
    WeatherLoaded(Forecast),
    RouteResolved(Vec<Waypoint>),
    Route(RouteAction),
    Help,
    Quit,
}

/// External collaborators. `None` means the service is not configured.
#[derive(Clone)]
pub struct Services {
    pub store: Arc<dyn RecordStore>,
    pub forecast: Option<Arc<dyn ForecastSource>>,
    pub geocoder: Option<Arc<dyn Geocoder>>,
}

pub struct AppModel {
    order: CanonicalOrder,
    records: Vec<Resident>,
    search: SearchState,
    tab: Tab,
    route: RouteEditor<RecordingSurface>,
    seeds: Vec<Seed>,
    forecast: Option<Forecast>,
    weather_pending: bool,
    briefing: BriefingOptions,
    notice: Option<String>,
    services: Services,
    subscription: Option<SubscriptionId>,
}

impl AppModel {
    #[must_use]
    pub fn new(config: &Config, services: Services) -> Self {
        Self {
            order: config.canonical_order(),
            records: Vec::new(),
            search: SearchState::new(),
            tab: Tab::List,
            route: RouteEditor::new(RecordingSurface::new(config.map_center)),
            seeds: config.route_seeds.clone(),
            forecast: None,
            weather_pending: false,
            briefing: config.briefing_options(),
            notice: None,
            services,
            subscription: None,
        }
    }

    #[must_use]
    pub fn order(&self) -> &CanonicalOrder {
        &self.order
    }

    #[must_use]
    pub fn records(&self) -> &[Resident] {
        &self.records
    }

    #[must_use]
    pub fn search(&self) -> &SearchState {
        &self.search
    }

    #[must_use]
    pub fn tab(&self) -> Tab {
        self.tab
    }

    #[must_use]
    pub fn route(&self) -> &RouteEditor<RecordingSurface> {
        &self.route
    }

    #[must_use]
    pub fn forecast(&self) -> Option<&Forecast> {
        self.forecast.as_ref()
    }

    #[must_use]
    pub fn weather_pending(&self) -> bool {
        self.weather_pending
    }

    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    fn weather_cmd(&mut self) -> Cmd<Msg> {
        if self.weather_pending {
            return Cmd::none();
        }
        self.weather_pending = true;
        let options = self.briefing.clone();
        match self.services.forecast.clone() {
            Some(source) => Cmd::task_named("weather", move || {
                Msg::WeatherLoaded(fetch_with_fallback(source, OffsetDateTime::now_utc(), &options))
            }),
            None => Cmd::batch(vec![
                Cmd::log("no forecast service configured, showing seasonal forecast"),
                Cmd::msg(Msg::WeatherLoaded(seasonal_forecast(
                    OffsetDateTime::now_utc(),
                    &options.location,
                ))),
            ]),
        }
    }

    fn route_cmd(&self) -> Cmd<Msg> {
        let Some(geocoder) = self.services.geocoder.clone() else {
            return Cmd::log("no geocoder configured, route starts empty");
        };
        let seeds = self.seeds.clone();
        Cmd::task_named("geocode", move || {
            Msg::RouteResolved(resolve_seeds(geocoder.as_ref(), &seeds))
        })
    }

    /// Canonical entry, overflow label, or list position for a toggle target.
    fn resolve_building(&self, target: &str) -> Option<String> {
        let target = target.trim();
        if let Ok(n) = target.parse::<usize>() {
            let view = self.search.view(&self.records, &self.order);
            return n
                .checked_sub(1)
                .and_then(|i| view.sections.get(i))
                .map(|s| s.building.clone());
        }
        if target == self.order.overflow_label() {
            return Some(target.to_owned());
        }
        self.order.resolve(target).map(str::to_owned)
    }

    fn add_resident(&mut self, building: &str, unit: &str, tenant: &str) {
        // file under the configured spelling when the key is known
        let canonical = self.order.resolve(building).map(str::to_owned);
        let draft = match ResidentDraft::new(canonical.as_deref().unwrap_or(building), unit, tenant)
        {
            Ok(draft) => draft,
            Err(e) => {
                tracing::debug!(error = %e, "add rejected");
                self.notice = Some(format!("추가하지 않음: {e}"));
                return;
            }
        };
        let section = canonical.unwrap_or_else(|| self.order.overflow_label().to_owned());
        match self.services.store.append(draft) {
            Ok(id) => {
                self.search.expand(&section);
                self.notice = Some(format!("{id} 추가됨"));
            }
            Err(e) => {
                tracing::warn!(store = self.services.store.name(), error = %e, "append failed");
                self.notice = Some(format!("저장 실패: {e}"));
            }
        }
    }

    fn edit_resident(&mut self, id: ResidentId, building: &str, unit: &str, tenant: &str) {
        let draft = match ResidentDraft::new(building, unit, tenant) {
            Ok(draft) => draft,
            Err(e) => {
                tracing::debug!(error = %e, %id, "edit rejected");
                self.notice = Some(format!("수정하지 않음: {e}"));
                return;
            }
        };
        match self.services.store.update(id, draft) {
            Ok(()) => self.notice = Some(format!("{id} 수정됨")),
            Err(e) => {
                tracing::warn!(store = self.services.store.name(), error = %e, "update failed");
                self.notice = Some(format!("저장 실패: {e}"));
            }
        }
    }

    fn route_action(&mut self, action: RouteAction) {
        let applied = match action {
            RouteAction::ToggleEdit => {
                self.route.toggle_edit();
                true
            }
            RouteAction::Add { label, at } => {
                let label = label.unwrap_or_else(|| self.route.next_default_label());
                self.route.add_point(&label, at).is_some()
            }
            RouteAction::Rename { index, label } => self.route.rename_point(index, &label),
            RouteAction::Move { index, to } => self.route.move_point(index, to),
            RouteAction::Delete { index } => self.route.delete_point(index).is_some(),
            RouteAction::Pan(center) => {
                self.route.surface_mut().set_center(center);
                true
            }
        };
        if !applied {
            self.notice = Some("경로 변경 없음".to_owned());
        }
    }
}

impl Model for AppModel {
    type Message = Msg;

    fn init(&mut self) -> Cmd<Msg> {
        Cmd::batch(vec![self.weather_cmd(), self.route_cmd()])
    }

    fn update(&mut self, msg: Msg) -> Cmd<Msg> {
        if !matches!(msg, Msg::RecordsChanged(_) | Msg::WeatherLoaded(_) | Msg::RouteResolved(_)) {
            self.notice = None;
        }
        match msg {
            Msg::RecordsChanged(records) => {
                tracing::debug!(records = records.len(), "record snapshot received");
                self.records = records;
                self.search.records_changed(&self.records, &self.order);
            }
            Msg::Search(raw) => {
                self.tab = Tab::List;
                self.search.set_query(&raw, &self.records, &self.order);
            }
            Msg::Scope(scope) => {
                self.search.set_scope(scope, &self.records, &self.order);
            }
            Msg::Toggle(target) => match self.resolve_building(&target) {
                Some(building) => {
                    self.search.toggle(&building);
                }
                None => self.notice = Some(format!("건물 없음: {}", target.trim())),
            },
            Msg::SwitchTab(tab) => self.tab = tab,
            Msg::Add {
                building,
                unit,
                tenant,
            } => self.add_resident(&building, &unit, &tenant),
            Msg::Edit {
                id,
                building,
                unit,
                tenant,
            } => self.edit_resident(id, &building, &unit, &tenant),
            Msg::RefreshWeather => return self.weather_cmd(),
            Msg::WeatherLoaded(forecast) => {
                self.weather_pending = false;
                self.forecast = Some(forecast);
            }
            Msg::RouteResolved(points) => self.route.load(points),
            Msg::Route(action) => {
                self.tab = Tab::Map;
                self.route_action(action);
            }
            Msg::Help => self.notice = Some(COMMAND_HELP.to_owned()),
            Msg::Quit => {
                if let Some(id) = self.subscription.take() {
                    self.services.store.unsubscribe(id);
                }
                return Cmd::quit();
            }
        }
        Cmd::none()
    }

    fn view(&self, out: &mut String) {
        crate::view::render(self, out);
    }
}

/// Subscribe the program to its store. The current snapshot is queued
/// immediately; later changes follow as [`Msg::RecordsChanged`].
pub fn connect_store(program: &mut Program<AppModel>) {
    let sender = program.sender();
    let store = Arc::clone(&program.model().services.store);
    let id = store.subscribe(Box::new(move |records: &[Resident]| {
        if !sender.send(Msg::RecordsChanged(records.to_vec())) {
            tracing::debug!("program gone, dropping record snapshot");
        }
    }));
    program.model_mut().subscription = Some(id);
}
