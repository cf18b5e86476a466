#![forbid(unsafe_code)]

//! Grouping of records by building.
//!
//! # Invariants
//!
//! 1. Every canonical building has a group, in canonical order, even when
//!    empty.
//! 2. A record lands in exactly one group: its canonical building, or the
//!    overflow group when its building key is unknown.
//! 3. Group members keep the input's relative order.

use postaid_core::{CanonicalOrder, Resident};

/// Records of one building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group<'a> {
    /// Canonical entry (or the overflow label).
    pub building: String,
    pub members: Vec<&'a Resident>,
}

impl Group<'_> {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }
}

/// Records grouped by canonical building plus an overflow bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grouping<'a> {
    groups: Vec<Group<'a>>,
    overflow: Group<'a>,
}

impl<'a> Grouping<'a> {
    /// Canonical groups in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &Group<'a>> + '_ {
        self.groups.iter()
    }

    /// Members of a canonical building or of the overflow group, by label.
    #[must_use]
    pub fn get(&self, building: &str) -> Option<&[&'a Resident]> {
        self.groups
            .iter()
            .chain(std::iter::once(&self.overflow))
            .find(|g| g.building == building)
            .map(|g| g.members.as_slice())
    }

    /// The overflow group, present only when at least one record overflowed.
    #[must_use]
    pub fn overflow(&self) -> Option<&Group<'a>> {
        (!self.overflow.is_empty()).then_some(&self.overflow)
    }

    /// Every grouped record: canonical groups in order, then overflow.
    pub fn members(&self) -> impl Iterator<Item = &'a Resident> + '_ {
        self.groups
            .iter()
            .chain(std::iter::once(&self.overflow))
            .flat_map(|g| g.members.iter().copied())
    }

    /// Total number of grouped records.
    #[must_use]
    pub fn total(&self) -> usize {
        self.groups.iter().map(Group::len).sum::<usize>() + self.overflow.len()
    }

    pub(crate) fn into_parts(self) -> (Vec<Group<'a>>, Group<'a>) {
        (self.groups, self.overflow)
    }
}

/// Group `records` by building following `order`.
#[must_use]
pub fn group<'a>(records: &[&'a Resident], order: &CanonicalOrder) -> Grouping<'a> {
    let mut groups: Vec<Group<'a>> = order
        .iter()
        .map(|b| Group {
            building: b.to_owned(),
            members: Vec::new(),
        })
        .collect();
    let mut overflow = Group {
        building: order.overflow_label().to_owned(),
        members: Vec::new(),
    };
    for &record in records {
        match order.position(&record.building_name) {
            Some(i) => groups[i].members.push(record),
            None => overflow.members.push(record),
        }
    }
    Grouping { groups, overflow }
}

/// Buildings to display.
///
/// With an active query only canonical buildings that have matches are
/// listed; otherwise the full canonical order is returned so empty buildings
/// can show a placeholder. The overflow group is never part of this order.
#[must_use]
pub fn visible_building_order<'o>(
    order: &'o CanonicalOrder,
    grouping: &Grouping<'_>,
    query_active: bool,
) -> Vec<&'o str> {
    if !query_active {
        return order.iter().collect();
    }
    order
        .iter()
        .filter(|b| grouping.get(b).is_some_and(|m| !m.is_empty()))
        .collect()
}
