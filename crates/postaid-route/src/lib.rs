#![forbid(unsafe_code)]

//! Delivery route editor for Post Aid.
//!
//! A route is an ordered list of named [`Waypoint`]s. [`RouteEditor`] owns the
//! list and draws it against any [`MapSurface`]; [`resolve_seeds`] turns the
//! configured seed addresses into the initial waypoints through a
//! [`Geocoder`].
//!
//! # Example
//! ```
//! use postaid_core::LatLng;
//! use postaid_route::{Mode, RecordingSurface, RouteEditor, Waypoint};
//!
//! let center = LatLng::new(35.2140, 126.8360);
//! let mut editor = RouteEditor::new(RecordingSurface::new(center));
//! editor.load(vec![Waypoint::new("169", LatLng::new(35.2141, 126.8361))]);
//!
//! assert_eq!(editor.toggle_edit(), Mode::Editing);
//! editor.add_point("2", None);
//! assert_eq!(editor.points()[1].position, center);
//! ```

pub mod editor;
pub mod geocode;
pub mod surface;
pub mod waypoint;

pub use editor::{Mode, RouteEditor};
pub use geocode::{
    GeocodeError, GeocodeResult, Geocoder, KAKAO_ADDRESS_URL, KakaoConfig, KakaoGeocoder,
    parse_address_response, resolve_seeds,
};
pub use surface::{DrawHandle, Drawn, LabelStyle, MapSurface, RecordingSurface, SurfaceStats};
pub use waypoint::{Seed, Waypoint};
