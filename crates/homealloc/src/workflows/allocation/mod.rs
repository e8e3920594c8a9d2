//! Waiting-list intake, priority and match scoring, and house allocation.
//!
//! Applicants are scored on need when they apply. Administrators approve
//! them, then either run the greedy selector over every eligible applicant or
//! pair an applicant with a house by hand. Every allocation is committed
//! atomically by the store and leaves an audit record naming the principal.
//! Road distances between houses let administrators look up nearby
//! alternatives when a preferred house is taken.

mod config;
pub mod domain;
pub(crate) mod intake;
pub mod location;
mod memory;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod selector;
pub mod service;
pub mod views;

#[cfg(test)]
mod tests;

pub use config::{
    AllocationConfig, SelectionPolicy, SizeAdequacyConfig, DEFAULT_MATCH_THRESHOLD,
    DEFAULT_REFERENCE_INCOME,
};
pub use domain::{
    AdminId, AdminPrincipal, AllocationCommit, AllocationId, AllocationRecord, Applicant,
    ApplicantId, ApplicantStatus, ApplicantStatusView, ApplicationSubmission, ContactDetails,
    House, HouseId, HouseListing, HouseStatus, NewApplicant, NewHouse, ReviewAction,
    DEFAULT_FACILITIES,
};
pub use intake::{IntakeGuard, ValidationError, MAX_APPLICANT_AGE};
pub use location::{HouseLink, LocationGraph, RouteDistance};
pub use memory::InMemoryAllocationStore;
pub use repository::{
    AllocationConflict, AllocationStore, ApplicantFilter, HouseFilter, RecordRef, StoreError,
};
pub use router::{allocation_router, ADMIN_HEADER};
pub use scoring::{compute_match_score, compute_priority_score, MatchScorer, PriorityScorer};
pub use selector::{
    run_batch_allocation, AllocationSelector, NoEligibleMatch, Pairing, SelectionOutcome,
    UnmatchedReason,
};
pub use service::{AllocationService, AllocationServiceError};
pub use views::{
    AllocationCandidates, BatchAllocationReport, BatchConflict, DashboardSnapshot, NearbyHouse,
    PublicStats, SuggestionPreview, WaitingListEntry,
};
