#![forbid(unsafe_code)]

//! Resident records.
//!
//! A [`Resident`] is an immutable value: an edit produces a new record with
//! the same id. New records enter through a [`ResidentDraft`], which is the
//! only place the "all fields non-empty" rule is enforced.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Store-assigned identifier of a resident record.
///
/// Ids are never reused: a store hands out `max(existing) + 1` and keeps a
/// high-water mark so a removed id is not handed out again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResidentId(pub u64);

impl ResidentId {
    /// The first id handed out by an empty store.
    pub const FIRST: Self = Self(1);

    /// The id following this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for ResidentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An unknown-recipient entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resident {
    pub id: ResidentId,
    /// Building name, optionally followed by `" (<address>)"`.
    pub building_name: String,
    /// Unit number or floor description, free text.
    pub unit_number: String,
    /// Name on the undeliverable mail.
    pub tenant: String,
}

impl Resident {
    /// Build a record from a validated draft.
    #[must_use]
    pub fn from_draft(id: ResidentId, draft: ResidentDraft) -> Self {
        Self {
            id,
            building_name: draft.building_name,
            unit_number: draft.unit_number,
            tenant: draft.tenant,
        }
    }

    /// Convenience constructor used by fixtures and seed data.
    #[must_use]
    pub fn new(
        id: u64,
        building_name: impl Into<String>,
        unit_number: impl Into<String>,
        tenant: impl Into<String>,
    ) -> Self {
        Self {
            id: ResidentId(id),
            building_name: building_name.into(),
            unit_number: unit_number.into(),
            tenant: tenant.into(),
        }
    }

    /// A copy of this record with its editable fields replaced by `draft`.
    #[must_use]
    pub fn replaced_by(&self, draft: ResidentDraft) -> Self {
        Self::from_draft(self.id, draft)
    }

    /// The draft that would recreate this record's fields.
    #[must_use]
    pub fn to_draft(&self) -> ResidentDraft {
        ResidentDraft {
            building_name: self.building_name.clone(),
            unit_number: self.unit_number.clone(),
            tenant: self.tenant.clone(),
        }
    }
}

/// Reason a draft was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftError {
    EmptyBuilding,
    EmptyUnit,
    EmptyTenant,
}

impl fmt::Display for DraftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyBuilding => write!(f, "building name is empty"),
            Self::EmptyUnit => write!(f, "unit number is empty"),
            Self::EmptyTenant => write!(f, "tenant name is empty"),
        }
    }
}

impl std::error::Error for DraftError {}

/// Validated input for creating or replacing a resident.
///
/// Fields are stored trimmed. A draft can only be obtained through
/// [`ResidentDraft::new`], so holding one means every field is non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResidentDraft {
    building_name: String,
    unit_number: String,
    tenant: String,
}

impl ResidentDraft {
    /// Validate and trim the three fields.
    pub fn new(
        building_name: impl AsRef<str>,
        unit_number: impl AsRef<str>,
        tenant: impl AsRef<str>,
    ) -> Result<Self, DraftError> {
        let building_name = building_name.as_ref().trim();
        let unit_number = unit_number.as_ref().trim();
        let tenant = tenant.as_ref().trim();
        if building_name.is_empty() {
            return Err(DraftError::EmptyBuilding);
        }
        if unit_number.is_empty() {
            return Err(DraftError::EmptyUnit);
        }
        if tenant.is_empty() {
            return Err(DraftError::EmptyTenant);
        }
        Ok(Self {
            building_name: building_name.to_owned(),
            unit_number: unit_number.to_owned(),
            tenant: tenant.to_owned(),
        })
    }

    #[must_use]
    pub fn building_name(&self) -> &str {
        &self.building_name
    }

    #[must_use]
    pub fn unit_number(&self) -> &str {
        &self.unit_number
    }

    #[must_use]
    pub fn tenant(&self) -> &str {
        &self.tenant
    }
}

/// Next free id for a record set: `max(existing) + 1`, or [`ResidentId::FIRST`].
#[must_use]
pub fn next_id<'a>(records: impl IntoIterator<Item = &'a Resident>) -> ResidentId {
    records
        .into_iter()
        .map(|r| r.id)
        .max()
        .map_or(ResidentId::FIRST, ResidentId::next)
}
