#![forbid(unsafe_code)]

//! Map rendering capability.
//!
//! The route editor never talks to a map SDK directly. It issues draw
//! commands against a [`MapSurface`] and keeps the returned [`DrawHandle`]s so
//! it can dispose of them on the next redraw.
//!
//! [`RecordingSurface`] is the in-memory implementation: it keeps every live
//! item in a table keyed by handle, which is enough for tests and for a
//! textual rendering of the route.
//!
//! # Invariants
//!
//! 1. Handles are never reused by a surface, so a stale handle can only miss.
//! 2. `remove`, `relocate` and `update_polyline` on an unknown handle return
//!    `false` and change nothing.

use std::collections::BTreeMap;
use std::fmt;

use postaid_core::{Bounds, LatLng};

/// Opaque reference to something drawn on a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DrawHandle(u64);

impl DrawHandle {
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DrawHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "h{}", self.0)
    }
}

/// How a waypoint label is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelStyle {
    /// Interactive chip with rename and delete affordances.
    Chip,
    /// Static, non-interactive pin.
    Pin,
}

/// Capability interface over a map widget.
pub trait MapSurface {
    /// Draw a connected line through `path`, in order.
    fn draw_polyline(&mut self, path: &[LatLng]) -> DrawHandle;

    /// Place a marker. Draggable markers report drags back to the host,
    /// which maps the handle to a waypoint index.
    fn place_marker(&mut self, position: LatLng, draggable: bool) -> DrawHandle;

    /// Place a text overlay anchored at `position`.
    fn place_label(&mut self, position: LatLng, text: &str, style: LabelStyle) -> DrawHandle;

    /// Replace the path of a live polyline.
    fn update_polyline(&mut self, handle: DrawHandle, path: &[LatLng]) -> bool;

    /// Move a live marker or label.
    fn relocate(&mut self, handle: DrawHandle, position: LatLng) -> bool;

    /// Dispose of a drawn item.
    fn remove(&mut self, handle: DrawHandle) -> bool;

    /// Current view center.
    fn center(&self) -> LatLng;

    /// Adjust the view so `bounds` is visible.
    fn fit_bounds(&mut self, bounds: Bounds);
}

// ─────────────────────────────────────────────────────────────────────────────
// Recording surface
// ─────────────────────────────────────────────────────────────────────────────

/// A live item on a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum Drawn {
    Polyline {
        path: Vec<LatLng>,
    },
    Marker {
        position: LatLng,
        draggable: bool,
    },
    Label {
        position: LatLng,
        text: String,
        style: LabelStyle,
    },
}

/// Cumulative operation counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SurfaceStats {
    pub draws: u64,
    pub removals: u64,
    pub updates: u64,
}

/// In-memory [`MapSurface`].
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    center: LatLng,
    next_handle: u64,
    items: BTreeMap<DrawHandle, Drawn>,
    fitted: Option<Bounds>,
    stats: SurfaceStats,
}

impl RecordingSurface {
    #[must_use]
    pub fn new(center: LatLng) -> Self {
        Self {
            center,
            next_handle: 1,
            items: BTreeMap::new(),
            fitted: None,
            stats: SurfaceStats::default(),
        }
    }

    /// Pan the view, as a user dragging the map would.
    pub fn set_center(&mut self, center: LatLng) {
        self.center = center;
    }

    #[must_use]
    pub fn live_count(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn get(&self, handle: DrawHandle) -> Option<&Drawn> {
        self.items.get(&handle)
    }

    /// Live items in draw order.
    pub fn items(&self) -> impl Iterator<Item = (DrawHandle, &Drawn)> {
        self.items.iter().map(|(h, d)| (*h, d))
    }

    /// Path of the live polyline, if one is drawn.
    #[must_use]
    pub fn polyline(&self) -> Option<&[LatLng]> {
        self.items.values().find_map(|d| match d {
            Drawn::Polyline { path } => Some(path.as_slice()),
            _ => None,
        })
    }

    #[must_use]
    pub fn marker_count(&self) -> usize {
        self.items
            .values()
            .filter(|d| matches!(d, Drawn::Marker { .. }))
            .count()
    }

    /// Live labels as `(text, style)`, in draw order.
    #[must_use]
    pub fn labels(&self) -> Vec<(&str, LabelStyle)> {
        self.items
            .values()
            .filter_map(|d| match d {
                Drawn::Label { text, style, .. } => Some((text.as_str(), *style)),
                _ => None,
            })
            .collect()
    }

    /// Last bounds passed to [`MapSurface::fit_bounds`].
    #[must_use]
    pub fn fitted(&self) -> Option<Bounds> {
        self.fitted
    }

    #[must_use]
    pub fn stats(&self) -> SurfaceStats {
        self.stats
    }

    fn insert(&mut self, item: Drawn) -> DrawHandle {
        let handle = DrawHandle(self.next_handle);
        self.next_handle += 1;
        self.stats.draws += 1;
        self.items.insert(handle, item);
        handle
    }
}

impl MapSurface for RecordingSurface {
    fn draw_polyline(&mut self, path: &[LatLng]) -> DrawHandle {
        self.insert(Drawn::Polyline {
            path: path.to_vec(),
        })
    }

    fn place_marker(&mut self, position: LatLng, draggable: bool) -> DrawHandle {
        self.insert(Drawn::Marker {
            position,
            draggable,
        })
    }

    fn place_label(&mut self, position: LatLng, text: &str, style: LabelStyle) -> DrawHandle {
        self.insert(Drawn::Label {
            position,
            text: text.to_owned(),
            style,
        })
    }

    fn update_polyline(&mut self, handle: DrawHandle, new_path: &[LatLng]) -> bool {
        match self.items.get_mut(&handle) {
            Some(Drawn::Polyline { path }) => {
                *path = new_path.to_vec();
                self.stats.updates += 1;
                true
            }
            _ => false,
        }
    }

    fn relocate(&mut self, handle: DrawHandle, to: LatLng) -> bool {
        match self.items.get_mut(&handle) {
            Some(Drawn::Marker { position, .. } | Drawn::Label { position, .. }) => {
                *position = to;
                self.stats.updates += 1;
                true
            }
            _ => false,
        }
    }

    fn remove(&mut self, handle: DrawHandle) -> bool {
        let removed = self.items.remove(&handle).is_some();
        if removed {
            self.stats.removals += 1;
        }
        removed
    }

    fn center(&self) -> LatLng {
        self.center
    }

    fn fit_bounds(&mut self, bounds: Bounds) {
        self.fitted = Some(bounds);
    }
}
