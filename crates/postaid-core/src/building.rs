#![forbid(unsafe_code)]

//! Building names and the canonical building order.
//!
//! Building names are free text of the form `"<name> (<address>)"`, where the
//! address suffix is optional. The part before the first `" ("` is the
//! building *key*; two names with the same key refer to the same building.

/// Label of the catch-all group for buildings outside the canonical order.
pub const OVERFLOW_LABEL: &str = "기타";

const ADDRESS_OPEN: &str = " (";

/// The building key of a building name: everything before the first `" ("`.
///
/// A name without an address suffix is its own key.
///
/// ```
/// use postaid_core::building_key;
///
/// assert_eq!(building_key("A동 (월계로 169)"), "A동");
/// assert_eq!(building_key("B동"), "B동");
/// ```
#[must_use]
pub fn building_key(name: &str) -> &str {
    match name.find(ADDRESS_OPEN) {
        Some(pos) => &name[..pos],
        None => name,
    }
}

/// A building name split into its display parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildingLabel<'a> {
    pub name: &'a str,
    /// Address without the surrounding parentheses.
    pub address: Option<&'a str>,
}

impl<'a> BuildingLabel<'a> {
    #[must_use]
    pub fn parse(full: &'a str) -> Self {
        match full.split_once(ADDRESS_OPEN) {
            Some((name, rest)) => {
                let address = rest.strip_suffix(')').unwrap_or(rest).trim();
                Self {
                    name,
                    address: (!address.is_empty()).then_some(address),
                }
            }
            None => Self {
                name: full,
                address: None,
            },
        }
    }
}

/// The configured, ordered list of known buildings.
///
/// Order is display order and is never derived from data. Entries are kept as
/// given (including any address suffix); membership is decided by building
/// key, so `"A동"` and `"A동 (1번지)"` land in the same group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalOrder {
    entries: Vec<String>,
    overflow: String,
}

impl CanonicalOrder {
    /// Build an order from configured names.
    ///
    /// Blank entries are skipped. An entry whose key repeats an earlier
    /// entry's key is dropped (first wins).
    #[must_use]
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut entries: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            let trimmed = name.trim();
            if trimmed.is_empty() {
                continue;
            }
            let key = building_key(trimmed);
            if entries.iter().any(|e| building_key(e) == key) {
                tracing::warn!(building = %trimmed, "duplicate building key in canonical order, dropped");
                continue;
            }
            entries.push(trimmed.to_owned());
        }
        Self {
            entries,
            overflow: OVERFLOW_LABEL.to_owned(),
        }
    }

    /// Replace the overflow group label.
    #[must_use]
    pub fn with_overflow_label(mut self, label: impl Into<String>) -> Self {
        self.overflow = label.into();
        self
    }

    #[must_use]
    pub fn overflow_label(&self) -> &str {
        &self.overflow
    }

    /// Canonical entries in display order.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    /// Index of the canonical entry a building name belongs to, if any.
    #[must_use]
    pub fn position(&self, building_name: &str) -> Option<usize> {
        let key = building_key(building_name.trim());
        self.entries.iter().position(|e| building_key(e) == key)
    }

    /// The canonical entry a building name belongs to, if any.
    #[must_use]
    pub fn resolve(&self, building_name: &str) -> Option<&str> {
        self.position(building_name).map(|i| self.entries[i].as_str())
    }
}
