use std::fmt;

use serde::{Deserialize, Serialize};

use super::domain::{
    AllocationCommit, AllocationRecord, Applicant, ApplicantId, ApplicantStatus, House, HouseId,
    HouseStatus, NewApplicant, NewHouse,
};
use super::location::HouseLink;

/// Query filter for applicants. `None` fields match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantFilter {
    pub status: Option<ApplicantStatus>,
    pub has_house: Option<bool>,
}

impl ApplicantFilter {
    pub fn eligible() -> Self {
        Self {
            status: Some(ApplicantStatus::Approved),
            has_house: Some(false),
        }
    }

    pub fn with_status(status: ApplicantStatus) -> Self {
        Self {
            status: Some(status),
            has_house: None,
        }
    }

    pub fn matches(&self, applicant: &Applicant) -> bool {
        self.status.map_or(true, |status| applicant.status == status)
            && self
                .has_house
                .map_or(true, |wanted| applicant.allocated_house.is_some() == wanted)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HouseFilter {
    pub status: Option<HouseStatus>,
}

impl HouseFilter {
    pub fn available() -> Self {
        Self {
            status: Some(HouseStatus::Available),
        }
    }

    pub fn matches(&self, house: &House) -> bool {
        self.status.map_or(true, |status| house.status == status)
    }
}

/// Persistence collaborator for applicants, houses and the allocation log.
///
/// Listing calls return records in id order. `commit_allocation` must check
/// its preconditions and apply every write as one atomic unit.
pub trait AllocationStore: Send + Sync {
    fn record_application(&self, applicant: NewApplicant) -> Result<Applicant, StoreError>;
    fn fetch_applicant(&self, id: ApplicantId) -> Result<Option<Applicant>, StoreError>;
    fn list_applicants(&self, filter: &ApplicantFilter) -> Result<Vec<Applicant>, StoreError>;
    /// Compare-and-set on the applicant status.
    fn update_applicant_status(
        &self,
        id: ApplicantId,
        expected: ApplicantStatus,
        next: ApplicantStatus,
    ) -> Result<Applicant, StoreError>;

    fn insert_house(&self, house: NewHouse) -> Result<House, StoreError>;
    fn fetch_house(&self, id: HouseId) -> Result<Option<House>, StoreError>;
    fn list_houses(&self, filter: &HouseFilter) -> Result<Vec<House>, StoreError>;
    /// Compare-and-set on the house status. Never used for occupancy.
    fn update_house_status(
        &self,
        id: HouseId,
        expected: HouseStatus,
        next: HouseStatus,
    ) -> Result<House, StoreError>;
    /// Delete an unoccupied house together with its links.
    fn remove_house(&self, id: HouseId) -> Result<House, StoreError>;
    /// Insert or replace the link between two existing houses.
    fn link_houses(&self, link: HouseLink) -> Result<HouseLink, StoreError>;
    fn house_links(&self) -> Result<Vec<HouseLink>, StoreError>;

    fn commit_allocation(&self, commit: AllocationCommit) -> Result<AllocationRecord, StoreError>;
    /// Audit records, newest first.
    fn allocations(&self, limit: Option<usize>) -> Result<Vec<AllocationRecord>, StoreError>;
}

/// Which record a lookup referred to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum RecordRef {
    Applicant(ApplicantId),
    House(HouseId),
}

impl fmt::Display for RecordRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordRef::Applicant(id) => write!(f, "applicant {id}"),
            RecordRef::House(id) => write!(f, "{id}"),
        }
    }
}

/// Why a write was refused because of the current state of the records.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AllocationConflict {
    #[error("house {code} is {status}, not available")]
    HouseUnavailable { code: String, status: HouseStatus },
    #[error("applicant {applicant_id} is {status}; only approved applicants can be housed")]
    ApplicantNotApproved {
        applicant_id: ApplicantId,
        status: ApplicantStatus,
    },
    #[error("applicant {applicant_id} already holds {house_id}")]
    ApplicantAlreadyHoused {
        applicant_id: ApplicantId,
        house_id: HouseId,
    },
    #[error("applicant {applicant_id} cannot move from {from} to {to}")]
    InvalidApplicantTransition {
        applicant_id: ApplicantId,
        from: ApplicantStatus,
        to: ApplicantStatus,
    },
    #[error("house {code} cannot move from {from} to {to}")]
    InvalidHouseTransition {
        code: String,
        from: HouseStatus,
        to: HouseStatus,
    },
    #[error("house {code} is occupied and cannot be removed")]
    HouseOccupied { code: String },
    #[error("house code {0} is already registered")]
    DuplicateHouseCode(String),
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(RecordRef),
    #[error(transparent)]
    Conflict(#[from] AllocationConflict),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
