#![forbid(unsafe_code)]

//! Record matching and filtering.
//!
//! A record matches when the normalized query is a substring of the
//! normalized tenant, building name, or unit number, or of the chosung form of
//! the tenant or building name. Unit numbers are matched literally only.

use std::fmt;
use std::str::FromStr;

use postaid_core::Resident;
use postaid_text::{Query, SearchKey};

/// Which fields a query is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchScope {
    /// Tenant, building, and unit.
    #[default]
    All,
    Building,
    Tenant,
    Unit,
}

impl SearchScope {
    pub const ALL: [Self; 4] = [Self::All, Self::Building, Self::Tenant, Self::Unit];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Building => "building",
            Self::Tenant => "tenant",
            Self::Unit => "unit",
        }
    }
}

impl fmt::Display for SearchScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for an unrecognized scope name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownScope(pub String);

impl fmt::Display for UnknownScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown search scope '{}' (expected all, building, tenant, unit)",
            self.0
        )
    }
}

impl std::error::Error for UnknownScope {}

impl FromStr for SearchScope {
    type Err = UnknownScope;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|scope| scope.name() == lowered)
            .ok_or_else(|| UnknownScope(s.to_owned()))
    }
}

/// Whether `record` matches `query` within `scope`.
#[must_use]
pub fn matches(record: &Resident, query: &Query, scope: SearchScope) -> bool {
    let tenant = || SearchKey::new(&record.tenant);
    let building = || SearchKey::new(&record.building_name);
    let unit = || SearchKey::new(&record.unit_number);
    match scope {
        SearchScope::All => {
            tenant().contains(query) || building().contains(query) || unit().contains_plain(query)
        }
        SearchScope::Building => building().contains(query),
        SearchScope::Tenant => tenant().contains(query),
        SearchScope::Unit => unit().contains_plain(query),
    }
}

/// Records matching `query`, in their original relative order.
///
/// `None` (an empty query) keeps every record.
#[must_use]
pub fn filter<'a>(
    records: &'a [Resident],
    query: Option<&Query>,
    scope: SearchScope,
) -> Vec<&'a Resident> {
    match query {
        None => records.iter().collect(),
        Some(q) => records.iter().filter(|r| matches(r, q, scope)).collect(),
    }
}

/// [`filter`] over raw input text.
#[must_use]
pub fn filter_text<'a>(records: &'a [Resident], raw: &str, scope: SearchScope) -> Vec<&'a Resident> {
    filter(records, Query::parse(raw).as_ref(), scope)
}
