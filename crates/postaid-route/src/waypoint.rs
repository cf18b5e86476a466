#![forbid(unsafe_code)]

//! Named route points.

use postaid_core::LatLng;
use serde::{Deserialize, Serialize};

/// One stop on the delivery route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub position: LatLng,
    pub name: String,
}

impl Waypoint {
    #[must_use]
    pub fn new(name: impl Into<String>, position: LatLng) -> Self {
        Self {
            position,
            name: name.into(),
        }
    }
}

/// An address to resolve into a [`Waypoint`] when the route is first loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seed {
    /// Label given to the resulting waypoint.
    pub name: String,
    pub address: String,
}

impl Seed {
    #[must_use]
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }
}

/// Trimmed label, or `None` when nothing is left.
pub(crate) fn clean_label(label: &str) -> Option<&str> {
    let trimmed = label.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_labels_are_rejected() {
        assert_eq!(clean_label("  "), None);
        assert_eq!(clean_label(""), None);
        assert_eq!(clean_label(" 173 "), Some("173"));
    }
}
