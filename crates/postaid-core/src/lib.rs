#![forbid(unsafe_code)]

//! Post Aid core types.
//!
//! This crate holds the value types every other Post Aid crate speaks:
//!
//! - [`Resident`] and [`ResidentDraft`]: an unknown-recipient record and the
//!   validated input used to create or replace one.
//! - [`CanonicalOrder`] and [`building_key`]: the configured building list and
//!   the rule that maps a free-text building name onto it.
//! - [`LatLng`] and [`Bounds`]: geographic positions for the route editor.
//!
//! # Role in Post Aid
//! `postaid-core` has no behavior of its own beyond validation and key
//! derivation. The search engine, the record store, and the route editor all
//! build on these types.

pub mod building;
pub mod geo;
pub mod resident;

pub use building::{BuildingLabel, CanonicalOrder, OVERFLOW_LABEL, building_key};
pub use geo::{Bounds, LatLng};
pub use resident::{DraftError, Resident, ResidentDraft, ResidentId, next_id};
