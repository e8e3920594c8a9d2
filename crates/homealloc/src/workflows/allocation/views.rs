use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{
    AdminId, AllocationRecord, Applicant, ApplicantId, ApplicantStatusView, House, HouseId,
};
use super::selector::{NoEligibleMatch, SelectionOutcome};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaitingListEntry {
    pub position: usize,
    pub applicant_id: ApplicantId,
    pub reference: String,
    pub name: String,
    pub age: u32,
    pub family_size: u32,
    pub priority_score: u8,
    pub status: &'static str,
    pub submitted_at: DateTime<Utc>,
}

impl WaitingListEntry {
    pub(crate) fn new(position: usize, applicant: &Applicant) -> Self {
        Self {
            position,
            applicant_id: applicant.id,
            reference: applicant.id.to_string(),
            name: applicant.name.clone(),
            age: applicant.age,
            family_size: applicant.family_size,
            priority_score: applicant.priority_score,
            status: applicant.status.label(),
            submitted_at: applicant.submitted_at,
        }
    }
}

/// Eligible applicants and open houses an administrator can pair by hand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationCandidates {
    pub applicants: Vec<Applicant>,
    pub houses: Vec<House>,
}

/// A house reachable from another within a distance bound.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyHouse {
    pub distance: f64,
    #[serde(flatten)]
    pub house: House,
}

/// A pairing the batch run selected but the store refused to commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchConflict {
    pub applicant_id: ApplicantId,
    pub house_id: HouseId,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchAllocationReport {
    pub run_by: AdminId,
    pub committed: Vec<AllocationRecord>,
    pub unmatched: Vec<NoEligibleMatch>,
    pub conflicts: Vec<BatchConflict>,
    pub total_priority: u32,
}

/// Dry-run result; nothing in it has been persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestionPreview {
    pub match_threshold: u32,
    #[serde(flatten)]
    pub outcome: SelectionOutcome,
    pub total_priority: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub allocated: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HouseCounts {
    pub available: usize,
    pub occupied: usize,
    pub maintenance: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSnapshot {
    pub total_applications: usize,
    pub applications: StatusCounts,
    pub total_houses: usize,
    pub houses: HouseCounts,
    pub recent_applications: Vec<ApplicantStatusView>,
    pub recent_allocations: Vec<AllocationRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PublicStats {
    pub total_applications: usize,
    pub pending_applications: usize,
    pub available_houses: usize,
    pub allocated_today: usize,
}
