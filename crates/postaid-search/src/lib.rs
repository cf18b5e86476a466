#![forbid(unsafe_code)]

//! Resident search engine for Post Aid.
//!
//! The engine is a set of pure functions over a record snapshot plus one
//! small state holder:
//!
//! - [`filter`] keeps the records a [`Query`](postaid_text::Query) matches.
//! - [`group`] buckets records by canonical building, with an overflow group.
//! - [`visible_building_order`] decides which buildings to list.
//! - [`SearchState`] tracks the query, the scope, and which buildings are
//!   expanded, and derives a [`ListView`].
//! - [`DatabaseSummary`] counts records and distinct buildings.
//!
//! # Example
//! ```
//! use postaid_core::{CanonicalOrder, Resident};
//! use postaid_search::SearchState;
//!
//! let order = CanonicalOrder::new(["A동", "B동"]);
//! let records = vec![Resident::new(1, "A동", "101", "김철수")];
//!
//! let mut state = SearchState::new();
//! state.set_query("ㅊㅅ", &records, &order);
//! let view = state.view(&records, &order);
//! assert_eq!(view.buildings().collect::<Vec<_>>(), vec!["A동"]);
//! assert!(view.sections[0].expanded);
//! ```

pub mod filter;
pub mod group;
pub mod state;
pub mod summary;

pub use filter::{SearchScope, UnknownScope, filter, filter_text, matches};
pub use group::{Group, Grouping, group, visible_building_order};
pub use state::{ListView, SearchState, Section};
pub use summary::DatabaseSummary;
