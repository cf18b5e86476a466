#![forbid(unsafe_code)]

//! Search state and the derived list view.
//!
//! [`SearchState`] owns the query, the search scope, and the set of expanded
//! buildings. It holds no records: every transition that depends on data takes
//! the current snapshot, and [`SearchState::view`] derives the list to render.
//!
//! # Auto-expand
//!
//! While a query is active the expanded set is re-derived to exactly the
//! buildings with at least one match whenever the query, the scope, or the
//! snapshot changes. Toggles in between are honored until the next
//! re-derivation. Clearing the query leaves the last set in place.

use std::collections::BTreeSet;

use postaid_core::{CanonicalOrder, Resident};
use postaid_text::Query;

use crate::filter::{SearchScope, filter};
use crate::group::{Group, group, visible_building_order};

/// One building section of the rendered list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section<'a> {
    pub building: String,
    pub members: Vec<&'a Resident>,
    pub expanded: bool,
    /// True for the catch-all group of unknown buildings.
    pub overflow: bool,
}

/// The list as it should be displayed for one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView<'a> {
    pub query_active: bool,
    /// Visible canonical buildings in order, then the overflow group if it
    /// has members.
    pub sections: Vec<Section<'a>>,
    /// Number of records that passed the filter.
    pub match_count: usize,
}

impl<'a> ListView<'a> {
    #[must_use]
    pub fn section(&self, building: &str) -> Option<&Section<'a>> {
        self.sections.iter().find(|s| s.building == building)
    }

    /// Labels of the visible sections, in order.
    pub fn buildings(&self) -> impl Iterator<Item = &str> + '_ {
        self.sections.iter().map(|s| s.building.as_str())
    }
}

/// Query, scope, and expand/collapse state of the resident list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    raw_query: String,
    query: Option<Query>,
    scope: SearchScope,
    expanded: BTreeSet<String>,
}

impl SearchState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The query exactly as typed.
    #[must_use]
    pub fn raw_query(&self) -> &str {
        &self.raw_query
    }

    #[must_use]
    pub fn query(&self) -> Option<&Query> {
        self.query.as_ref()
    }

    #[must_use]
    pub fn is_query_active(&self) -> bool {
        self.query.is_some()
    }

    #[must_use]
    pub fn scope(&self) -> SearchScope {
        self.scope
    }

    #[must_use]
    pub fn is_expanded(&self, building: &str) -> bool {
        self.expanded.contains(building)
    }

    pub fn expanded(&self) -> impl Iterator<Item = &str> + '_ {
        self.expanded.iter().map(String::as_str)
    }

    /// Replace the query text.
    pub fn set_query(&mut self, raw: &str, records: &[Resident], order: &CanonicalOrder) {
        self.raw_query = raw.to_owned();
        self.query = Query::parse(raw);
        tracing::debug!(query = %raw, active = self.query.is_some(), "search query changed");
        self.sync_expanded(records, order);
    }

    pub fn set_scope(&mut self, scope: SearchScope, records: &[Resident], order: &CanonicalOrder) {
        self.scope = scope;
        self.sync_expanded(records, order);
    }

    /// A new record snapshot arrived.
    pub fn records_changed(&mut self, records: &[Resident], order: &CanonicalOrder) {
        self.sync_expanded(records, order);
    }

    /// Flip one building between expanded and collapsed. Returns the new state.
    pub fn toggle(&mut self, building: &str) -> bool {
        if self.expanded.remove(building) {
            false
        } else {
            self.expanded.insert(building.to_owned());
            true
        }
    }

    /// Expand one building (no-op if already expanded).
    pub fn expand(&mut self, building: &str) {
        self.expanded.insert(building.to_owned());
    }

    /// Derive the list to render from a record snapshot.
    #[must_use]
    pub fn view<'a>(&self, records: &'a [Resident], order: &CanonicalOrder) -> ListView<'a> {
        let span = tracing::debug_span!(
            "postaid.search.view",
            records = records.len(),
            query_active = self.query.is_some()
        );
        let _guard = span.enter();

        let filtered = filter(records, self.query.as_ref(), self.scope);
        let match_count = filtered.len();
        let grouping = group(&filtered, order);
        let visible: Vec<String> = visible_building_order(order, &grouping, self.query.is_some())
            .into_iter()
            .map(str::to_owned)
            .collect();

        let (groups, overflow) = grouping.into_parts();
        let mut sections: Vec<Section<'a>> = groups
            .into_iter()
            .filter(|g| visible.contains(&g.building))
            .map(|g| self.section(g, false))
            .collect();
        if !overflow.is_empty() {
            sections.push(self.section(overflow, true));
        }

        ListView {
            query_active: self.query.is_some(),
            sections,
            match_count,
        }
    }

    fn section<'a>(&self, group: Group<'a>, overflow: bool) -> Section<'a> {
        Section {
            expanded: self.expanded.contains(&group.building),
            building: group.building,
            members: group.members,
            overflow,
        }
    }

    fn sync_expanded(&mut self, records: &[Resident], order: &CanonicalOrder) {
        if self.query.is_none() {
            return;
        }
        let filtered = filter(records, self.query.as_ref(), self.scope);
        let grouping = group(&filtered, order);
        self.expanded = visible_building_order(order, &grouping, true)
            .into_iter()
            .map(str::to_owned)
            .collect();
        if let Some(overflow) = grouping.overflow() {
            self.expanded.insert(overflow.building.clone());
        }
        tracing::debug!(expanded = self.expanded.len(), "auto-expanded matching buildings");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order() -> CanonicalOrder {
        CanonicalOrder::new(["A동 (1번지)", "B동", "C동"])
    }

    fn records() -> Vec<Resident> {
        vec![
            Resident::new(1, "A동 (1번지)", "101", "김철수"),
            Resident::new(2, "B동", "202", "이영희"),
            Resident::new(3, "C동", "303", "김민수"),
        ]
    }

    #[test]
    fn toggle_flips() {
        let mut state = SearchState::new();
        assert!(state.toggle("B동"));
        assert!(state.is_expanded("B동"));
        assert!(!state.toggle("B동"));
        assert!(!state.is_expanded("B동"));
    }

    #[test]
    fn query_forces_expanded_to_matches() {
        let (recs, order) = (records(), order());
        let mut state = SearchState::new();
        state.toggle("B동");
        state.set_query("김", &recs, &order);
        let expanded: Vec<_> = state.expanded().collect();
        assert_eq!(expanded, vec!["A동 (1번지)", "C동"]);
    }

    #[test]
    fn clearing_query_keeps_last_expansion() {
        let (recs, order) = (records(), order());
        let mut state = SearchState::new();
        state.set_query("이영", &recs, &order);
        state.set_query("", &recs, &order);
        assert!(!state.is_query_active());
        assert!(state.is_expanded("B동"));
    }

    #[test]
    fn snapshot_change_rederives_while_active() {
        let order = order();
        let mut recs = records();
        let mut state = SearchState::new();
        state.set_query("ㅂㄱ", &recs, &order);
        assert_eq!(state.expanded().count(), 0);
        recs.push(Resident::new(4, "B동", "201", "박광수"));
        state.records_changed(&recs, &order);
        assert_eq!(state.expanded().collect::<Vec<_>>(), vec!["B동"]);
    }

    #[test]
    fn view_without_query_lists_every_building() {
        let (recs, order) = (records(), order());
        let state = SearchState::new();
        let view = state.view(&recs, &order);
        assert_eq!(view.buildings().collect::<Vec<_>>(), vec!["A동 (1번지)", "B동", "C동"]);
        assert_eq!(view.match_count, 3);
        assert!(!view.query_active);
    }

    #[test]
    fn view_with_query_hides_empty_buildings() {
        let (recs, order) = (records(), order());
        let mut state = SearchState::new();
        state.set_query("민수", &recs, &order);
        let view = state.view(&recs, &order);
        assert_eq!(view.buildings().collect::<Vec<_>>(), vec!["C동"]);
        assert!(view.section("C동").unwrap().expanded);
    }

    #[test]
    fn overflow_section_appended_last() {
        let order = order();
        let recs = vec![
            Resident::new(1, "Z동", "1", "가"),
            Resident::new(2, "A동", "1", "나"),
        ];
        let view = SearchState::new().view(&recs, &order);
        let last = view.sections.last().unwrap();
        assert!(last.overflow);
        assert_eq!(last.building, "기타");
        assert_eq!(last.members[0].id.0, 1);
    }

    #[test]
    fn query_expands_overflow_when_it_matches() {
        let order = CanonicalOrder::new(["A동 (1번지)", "B동"]);
        let recs = vec![
            Resident::new(1, "A동 (1번지)", "101", "김철수"),
            Resident::new(2, "Z동", "1", "홍길동"),
        ];
        let mut state = SearchState::new();
        state.set_query("ㅎ", &recs, &order);

        let view = state.view(&recs, &order);
        let overflow = view.section("기타").unwrap();
        assert!(overflow.overflow);
        assert_eq!(overflow.members.len(), 1);
        assert!(overflow.expanded);
        assert_eq!(state.expanded().collect::<Vec<_>>(), vec!["기타"]);
    }
}
