use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned applicant identifier, rendered as `APP-0001`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicantId(pub u64);

impl fmt::Display for ApplicantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "APP-{:04}", self.0)
    }
}

/// Store-assigned house identifier. The public code lives on [`House::code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HouseId(pub u64);

impl fmt::Display for HouseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "house #{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllocationId(pub u64);

/// Username of the administrator acting on a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdminId(pub String);

impl fmt::Display for AdminId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Authenticated administrator on whose behalf an operation runs.
///
/// There is no ambient session: every administrative call receives one of these
/// explicitly, and its id is written into the audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminPrincipal {
    pub admin_id: AdminId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl AdminPrincipal {
    pub fn new(admin_id: impl Into<String>) -> Self {
        Self {
            admin_id: AdminId(admin_id.into()),
            display_name: None,
        }
    }
}

/// How to reach an applicant. Only the phone number is mandatory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Raw application form as received from the intake surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationSubmission {
    pub name: String,
    pub age: u32,
    pub family_size: u32,
    pub monthly_income: f64,
    pub contact: ContactDetails,
}

/// Validated application plus its priority score, ready to be stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewApplicant {
    pub name: String,
    pub age: u32,
    pub family_size: u32,
    pub monthly_income: f64,
    pub contact: ContactDetails,
    pub priority_score: u8,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicantStatus {
    Pending,
    Approved,
    Rejected,
    Allocated,
}

impl ApplicantStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicantStatus::Pending => "pending",
            ApplicantStatus::Approved => "approved",
            ApplicantStatus::Rejected => "rejected",
            ApplicantStatus::Allocated => "allocated",
        }
    }

    /// Transitions an administrator may request directly. `Allocated` is only
    /// reachable through an allocation commit.
    pub const fn admits_review(self, next: ApplicantStatus) -> bool {
        matches!(
            (self, next),
            (ApplicantStatus::Pending, ApplicantStatus::Approved)
                | (ApplicantStatus::Pending, ApplicantStatus::Rejected)
                | (ApplicantStatus::Approved, ApplicantStatus::Pending)
        )
    }
}

impl fmt::Display for ApplicantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Administrator decision on a pending application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewAction {
    Approve,
    Reject,
    Reopen,
}

impl ReviewAction {
    pub const fn target_status(self) -> ApplicantStatus {
        match self {
            ReviewAction::Approve => ApplicantStatus::Approved,
            ReviewAction::Reject => ApplicantStatus::Rejected,
            ReviewAction::Reopen => ApplicantStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Applicant {
    pub id: ApplicantId,
    pub name: String,
    pub age: u32,
    pub family_size: u32,
    pub monthly_income: f64,
    pub contact: ContactDetails,
    pub status: ApplicantStatus,
    pub priority_score: u8,
    pub submitted_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allocated_house: Option<HouseId>,
}

impl Applicant {
    /// Approved and not yet housed.
    pub fn is_eligible(&self) -> bool {
        self.status == ApplicantStatus::Approved && self.allocated_house.is_none()
    }

    pub fn status_view(&self) -> ApplicantStatusView {
        ApplicantStatusView {
            applicant_id: self.id,
            reference: self.id.to_string(),
            status: self.status.label(),
            priority_score: self.priority_score,
            allocated_house: self.allocated_house,
        }
    }
}

/// Public projection of an application; contact details stay private.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicantStatusView {
    pub applicant_id: ApplicantId,
    pub reference: String,
    pub status: &'static str,
    pub priority_score: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allocated_house: Option<HouseId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HouseStatus {
    Available,
    Occupied,
    Maintenance,
}

impl HouseStatus {
    pub const fn label(self) -> &'static str {
        match self {
            HouseStatus::Available => "available",
            HouseStatus::Occupied => "occupied",
            HouseStatus::Maintenance => "maintenance",
        }
    }
}

impl fmt::Display for HouseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub const DEFAULT_FACILITIES: [&str; 3] = ["Parking", "Water", "Electricity"];

/// Administrator-provided description of a new unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseListing {
    #[serde(default)]
    pub code: Option<String>,
    pub address: String,
    pub house_type: String,
    pub bedrooms: u32,
    pub size_sqft: u32,
    pub monthly_rent: f64,
    #[serde(default)]
    pub facilities: Option<Vec<String>>,
}

/// Validated listing ready for the store. The store fills in the code when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewHouse {
    pub code: Option<String>,
    pub address: String,
    pub house_type: String,
    pub bedrooms: u32,
    pub size_sqft: u32,
    pub monthly_rent: f64,
    pub facilities: Vec<String>,
    pub status: HouseStatus,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct House {
    pub id: HouseId,
    pub code: String,
    pub address: String,
    pub house_type: String,
    pub bedrooms: u32,
    pub size_sqft: u32,
    pub monthly_rent: f64,
    pub facilities: Vec<String>,
    pub status: HouseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupant: Option<ApplicantId>,
    pub added_at: DateTime<Utc>,
}

impl House {
    pub fn is_available(&self) -> bool {
        self.status == HouseStatus::Available && self.occupant.is_none()
    }
}

/// Immutable audit entry written once per committed allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationRecord {
    pub id: AllocationId,
    pub applicant_id: ApplicantId,
    pub house_id: HouseId,
    pub allocated_by: AdminId,
    pub allocated_at: DateTime<Utc>,
    pub match_score: u32,
}

/// Request handed to the store's atomic commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationCommit {
    pub applicant_id: ApplicantId,
    pub house_id: HouseId,
    pub allocated_by: AdminId,
    pub match_score: u32,
    pub allocated_at: DateTime<Utc>,
}
