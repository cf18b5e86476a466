#![forbid(unsafe_code)]

//! Database tab summary.

use std::collections::BTreeSet;

use postaid_core::Resident;

/// Record totals shown above the raw record table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DatabaseSummary {
    /// Number of records.
    pub total: usize,
    /// Number of distinct building names, compared exactly as stored.
    pub buildings: usize,
}

impl DatabaseSummary {
    #[must_use]
    pub fn of(records: &[Resident]) -> Self {
        let buildings: BTreeSet<&str> = records.iter().map(|r| r.building_name.as_str()).collect();
        Self {
            total: records.len(),
            buildings: buildings.len(),
        }
    }
}
