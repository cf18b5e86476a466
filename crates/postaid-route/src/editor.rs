#![forbid(unsafe_code)]

//! Route editor state machine.
//!
//! The editor owns the ordered waypoint list, the viewing/editing mode, and
//! the handles of everything it has drawn on its [`MapSurface`].
//!
//! # Design Invariants
//!
//! 1. **Full redraw**: every change other than a move discards every handle
//!    drawn before and redraws from the waypoint list. Drawn state cannot
//!    drift from the model, and redrawing twice leaves the same live items.
//! 2. **Moves are geometry only**: [`RouteEditor::move_point`] never changes
//!    an index. It patches the polyline path and that point's marker and label
//!    in place.
//! 3. **Silent rejection**: blank labels and out-of-range indices leave the
//!    editor untouched and draw nothing.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Nothing resolves | geocoder down | empty route, no polyline |
//! | Stale handle | host reports drag on a removed marker | `marker_index` is `None` |

use postaid_core::{Bounds, LatLng};

use crate::geocode::{Geocoder, resolve_seeds};
use crate::surface::{DrawHandle, LabelStyle, MapSurface};
use crate::waypoint::{Seed, Waypoint, clean_label};

/// Editor mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// Static labeled pins, view fitted to the route.
    #[default]
    Viewing,
    /// Draggable markers with rename and delete chips.
    Editing,
}

impl Mode {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Viewing => Self::Editing,
            Self::Editing => Self::Viewing,
        }
    }

    #[must_use]
    pub const fn is_editing(self) -> bool {
        matches!(self, Self::Editing)
    }
}

/// Per-waypoint handles from the last render.
#[derive(Debug, Clone, Copy)]
struct PointHandles {
    marker: Option<DrawHandle>,
    label: DrawHandle,
}

#[derive(Debug, Default)]
struct Rendered {
    polyline: Option<DrawHandle>,
    points: Vec<PointHandles>,
}

impl Rendered {
    fn all(&self) -> impl Iterator<Item = DrawHandle> + '_ {
        self.polyline.into_iter().chain(
            self.points
                .iter()
                .flat_map(|p| p.marker.into_iter().chain(std::iter::once(p.label))),
        )
    }
}

/// Ordered waypoints drawn on a map surface.
#[derive(Debug)]
pub struct RouteEditor<S: MapSurface> {
    surface: S,
    points: Vec<Waypoint>,
    mode: Mode,
    rendered: Rendered,
}

impl<S: MapSurface> RouteEditor<S> {
    /// An empty route in [`Mode::Viewing`]. Nothing is drawn yet.
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            points: Vec::new(),
            mode: Mode::Viewing,
            rendered: Rendered::default(),
        }
    }

    /// Resolve `seeds` and load the result. See [`resolve_seeds`].
    pub fn initialize(&mut self, geocoder: &dyn Geocoder, seeds: &[Seed]) {
        let points = resolve_seeds(geocoder, seeds);
        self.load(points);
    }

    /// Replace the route with already-resolved points, in viewing mode.
    pub fn load(&mut self, points: Vec<Waypoint>) {
        tracing::debug!(points = points.len(), "route loaded");
        self.points = points;
        self.mode = Mode::Viewing;
        self.render();
    }

    #[must_use]
    pub fn points(&self) -> &[Waypoint] {
        &self.points
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Direct access for host-side view changes such as panning.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Label suggested for the next added point: its 1-based position.
    #[must_use]
    pub fn next_default_label(&self) -> String {
        (self.points.len() + 1).to_string()
    }

    /// Flip between viewing and editing. Waypoints are unchanged.
    pub fn toggle_edit(&mut self) -> Mode {
        self.mode = self.mode.toggled();
        tracing::debug!(mode = ?self.mode, "route mode toggled");
        self.render();
        self.mode
    }

    /// Append a point at `position`, or at the surface center.
    ///
    /// Returns the new index, or `None` for a blank label.
    pub fn add_point(&mut self, label: &str, position: Option<LatLng>) -> Option<usize> {
        let Some(name) = clean_label(label) else {
            tracing::debug!("add_point rejected: blank label");
            return None;
        };
        let position = position.unwrap_or_else(|| self.surface.center());
        self.points.push(Waypoint::new(name, position));
        self.render();
        Some(self.points.len() - 1)
    }

    /// Rename the point at `index`. Blank labels and bad indices are ignored.
    pub fn rename_point(&mut self, index: usize, label: &str) -> bool {
        let Some(name) = clean_label(label) else {
            tracing::debug!(index, "rename_point rejected: blank label");
            return false;
        };
        let Some(point) = self.points.get_mut(index) else {
            tracing::debug!(index, len = self.points.len(), "rename_point out of range");
            return false;
        };
        point.name = name.to_owned();
        self.render();
        true
    }

    /// Move the point at `index`. Order is unchanged and nothing is redrawn
    /// beyond the moved geometry.
    pub fn move_point(&mut self, index: usize, position: LatLng) -> bool {
        let Some(point) = self.points.get_mut(index) else {
            tracing::debug!(index, len = self.points.len(), "move_point out of range");
            return false;
        };
        point.position = position;

        if let Some(line) = self.rendered.polyline {
            let path = self.path();
            self.surface.update_polyline(line, &path);
        }
        if let Some(handles) = self.rendered.points.get(index).copied() {
            if let Some(marker) = handles.marker {
                self.surface.relocate(marker, position);
            }
            self.surface.relocate(handles.label, position);
        }
        true
    }

    /// Remove and return the point at `index`; later points shift down by one.
    pub fn delete_point(&mut self, index: usize) -> Option<Waypoint> {
        if index >= self.points.len() {
            tracing::debug!(index, len = self.points.len(), "delete_point out of range");
            return None;
        }
        let removed = self.points.remove(index);
        self.render();
        Some(removed)
    }

    /// Waypoint index for a marker handle from the last render.
    #[must_use]
    pub fn marker_index(&self, handle: DrawHandle) -> Option<usize> {
        self.rendered
            .points
            .iter()
            .position(|p| p.marker == Some(handle))
    }

    /// Waypoint index for a label handle from the last render.
    #[must_use]
    pub fn label_index(&self, handle: DrawHandle) -> Option<usize> {
        self.rendered.points.iter().position(|p| p.label == handle)
    }

    /// Discard everything drawn so far and draw the route again.
    pub fn render(&mut self) {
        let previous = std::mem::take(&mut self.rendered);
        for handle in previous.all() {
            self.surface.remove(handle);
        }
        if self.points.is_empty() {
            return;
        }

        let path = self.path();
        self.rendered.polyline = Some(self.surface.draw_polyline(&path));

        let editing = self.mode.is_editing();
        for point in &self.points {
            let handles = if editing {
                PointHandles {
                    marker: Some(self.surface.place_marker(point.position, true)),
                    label: self
                        .surface
                        .place_label(point.position, &point.name, LabelStyle::Chip),
                }
            } else {
                PointHandles {
                    marker: None,
                    label: self
                        .surface
                        .place_label(point.position, &point.name, LabelStyle::Pin),
                }
            };
            self.rendered.points.push(handles);
        }

        if !editing && let Some(bounds) = Bounds::enclosing(&path) {
            self.surface.fit_bounds(bounds);
        }
    }

    fn path(&self) -> Vec<LatLng> {
        self.points.iter().map(|p| p.position).collect()
    }
}
