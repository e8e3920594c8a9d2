use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::config::{AllocationConfig, SelectionPolicy};
use super::domain::{
    AdminPrincipal, AllocationCommit, AllocationRecord, Applicant, ApplicantId, ApplicantStatus,
    ApplicationSubmission, House, HouseId, HouseListing, HouseStatus, NewApplicant, ReviewAction,
};
use super::intake::{check_distance, IntakeGuard, ValidationError};
use super::location::{HouseLink, LocationGraph};
use super::repository::{
    AllocationConflict, AllocationStore, ApplicantFilter, HouseFilter, RecordRef, StoreError,
};
use super::scoring::{MatchBreakdown, MatchScorer, PriorityBreakdown, PriorityScorer};
use super::selector::{rank_eligible, waiting_order, AllocationSelector, Pairing};
use super::views::{
    AllocationCandidates, BatchAllocationReport, BatchConflict, DashboardSnapshot, HouseCounts,
    NearbyHouse, PublicStats, StatusCounts, SuggestionPreview, WaitingListEntry,
};

const RECENT_APPLICATIONS: usize = 10;
const RECENT_ALLOCATIONS: usize = 5;

/// Service composing intake validation, scoring, selection and the store.
pub struct AllocationService<S> {
    store: Arc<S>,
    guard: IntakeGuard,
    priority: PriorityScorer,
    matcher: MatchScorer,
    config: AllocationConfig,
}

impl<S> AllocationService<S>
where
    S: AllocationStore + 'static,
{
    pub fn new(store: Arc<S>, config: AllocationConfig) -> Result<Self, AllocationServiceError> {
        let matcher = MatchScorer::from_config(&config);
        Self::with_matcher(store, config, matcher)
    }

    /// Use a custom factor set instead of the one derived from `config`.
    pub fn with_matcher(
        store: Arc<S>,
        config: AllocationConfig,
        matcher: MatchScorer,
    ) -> Result<Self, AllocationServiceError> {
        let priority = PriorityScorer::new(config.reference_income)?;

        Ok(Self {
            store,
            guard: IntakeGuard::default(),
            priority,
            matcher,
            config,
        })
    }

    pub fn config(&self) -> &AllocationConfig {
        &self.config
    }

    pub fn compute_priority_score(&self, age: u32, family_size: u32, monthly_income: f64) -> u8 {
        self.priority.score(age, family_size, monthly_income)
    }

    pub fn priority_breakdown(
        &self,
        age: u32,
        family_size: u32,
        monthly_income: f64,
    ) -> PriorityBreakdown {
        self.priority.breakdown(age, family_size, monthly_income)
    }

    /// Priority breakdown for a household that has not applied yet.
    pub fn preview_priority(
        &self,
        age: u32,
        family_size: u32,
        monthly_income: f64,
    ) -> Result<PriorityBreakdown, AllocationServiceError> {
        self.guard.check_household(age, family_size, monthly_income)?;
        Ok(self.priority.breakdown(age, family_size, monthly_income))
    }

    pub fn compute_match_score(&self, applicant: &Applicant, house: &House) -> u32 {
        self.matcher.score(applicant, house)
    }

    /// Factor-by-factor fit for a stored applicant and house.
    pub fn match_breakdown(
        &self,
        applicant_id: ApplicantId,
        house_id: HouseId,
    ) -> Result<MatchBreakdown, AllocationServiceError> {
        let applicant = self.applicant(applicant_id)?;
        let house = self.house(house_id)?;
        Ok(self.matcher.evaluate(&applicant, &house))
    }

    /// Validate, score and store a new application in the `pending` state.
    pub fn submit_application(
        &self,
        submission: ApplicationSubmission,
    ) -> Result<Applicant, AllocationServiceError> {
        let submission = self.guard.check_submission(submission)?;
        let priority_score = self.priority.score(
            submission.age,
            submission.family_size,
            submission.monthly_income,
        );

        let applicant = self.store.record_application(NewApplicant {
            name: submission.name,
            age: submission.age,
            family_size: submission.family_size,
            monthly_income: submission.monthly_income,
            contact: submission.contact,
            priority_score,
            submitted_at: Utc::now(),
        })?;

        info!(applicant = %applicant.id, priority_score, "application recorded");
        Ok(applicant)
    }

    pub fn applicant(&self, id: ApplicantId) -> Result<Applicant, AllocationServiceError> {
        self.store
            .fetch_applicant(id)?
            .ok_or(AllocationServiceError::NotFound(RecordRef::Applicant(id)))
    }

    pub fn house(&self, id: HouseId) -> Result<House, AllocationServiceError> {
        self.store
            .fetch_house(id)?
            .ok_or(AllocationServiceError::NotFound(RecordRef::House(id)))
    }

    pub fn houses(&self, filter: &HouseFilter) -> Result<Vec<House>, AllocationServiceError> {
        Ok(self.store.list_houses(filter)?)
    }

    /// Apply an administrator decision to an application.
    pub fn review_application(
        &self,
        principal: &AdminPrincipal,
        id: ApplicantId,
        action: ReviewAction,
    ) -> Result<Applicant, AllocationServiceError> {
        let current = self.applicant(id)?;
        let target = action.target_status();

        if !current.status.admits_review(target) {
            return Err(AllocationConflict::InvalidApplicantTransition {
                applicant_id: id,
                from: current.status,
                to: target,
            }
            .into());
        }

        let updated = self
            .store
            .update_applicant_status(id, current.status, target)?;
        info!(
            admin = %principal.admin_id,
            applicant = %id,
            from = %current.status,
            to = %updated.status,
            "application reviewed"
        );
        Ok(updated)
    }

    /// Every application in waiting-list order with its 1-based position.
    pub fn waiting_list(&self) -> Result<Vec<WaitingListEntry>, AllocationServiceError> {
        let mut applicants = self.store.list_applicants(&ApplicantFilter::default())?;
        applicants.sort_by(waiting_order);

        Ok(applicants
            .iter()
            .enumerate()
            .map(|(index, applicant)| WaitingListEntry::new(index + 1, applicant))
            .collect())
    }

    pub fn register_house(
        &self,
        principal: &AdminPrincipal,
        listing: HouseListing,
    ) -> Result<House, AllocationServiceError> {
        let draft = self.guard.check_listing(listing, Utc::now())?;
        let house = self.store.insert_house(draft)?;
        info!(admin = %principal.admin_id, house = %house.code, bedrooms = house.bedrooms, "house registered");
        Ok(house)
    }

    /// Move a house between `available` and `maintenance`.
    pub fn set_house_maintenance(
        &self,
        principal: &AdminPrincipal,
        id: HouseId,
        under_maintenance: bool,
    ) -> Result<House, AllocationServiceError> {
        let (expected, next) = if under_maintenance {
            (HouseStatus::Available, HouseStatus::Maintenance)
        } else {
            (HouseStatus::Maintenance, HouseStatus::Available)
        };

        let current = self.house(id)?;
        if current.status == next {
            return Ok(current);
        }
        if current.status != expected {
            return Err(AllocationConflict::InvalidHouseTransition {
                code: current.code,
                from: current.status,
                to: next,
            }
            .into());
        }

        let house = self.store.update_house_status(id, expected, next)?;
        info!(admin = %principal.admin_id, house = %house.code, status = %house.status, "house status changed");
        Ok(house)
    }

    pub fn remove_house(
        &self,
        principal: &AdminPrincipal,
        id: HouseId,
    ) -> Result<House, AllocationServiceError> {
        let house = self.store.remove_house(id)?;
        info!(admin = %principal.admin_id, house = %house.code, "house removed");
        Ok(house)
    }

    /// Record the road distance between two registered houses.
    pub fn link_houses(
        &self,
        principal: &AdminPrincipal,
        from: HouseId,
        to: HouseId,
        distance: f64,
    ) -> Result<HouseLink, AllocationServiceError> {
        let link = self.guard.check_link(from, to, distance)?;
        let link = self.store.link_houses(link)?;
        info!(admin = %principal.admin_id, from = %link.from, to = %link.to, distance = link.distance, "houses linked");
        Ok(link)
    }

    /// Houses matching `filter` within `max_distance` of `origin`, nearest first.
    pub fn nearby_houses(
        &self,
        origin: HouseId,
        max_distance: f64,
        filter: &HouseFilter,
    ) -> Result<Vec<NearbyHouse>, AllocationServiceError> {
        let max_distance = check_distance(max_distance)?;
        self.house(origin)?;

        let links = self.store.house_links()?;
        let graph = LocationGraph::from_links(&links);

        let mut nearby = Vec::new();
        for route in graph.within(origin, max_distance) {
            let Some(house) = self.store.fetch_house(route.house_id)? else {
                continue;
            };
            if filter.matches(&house) {
                nearby.push(NearbyHouse {
                    distance: route.distance,
                    house,
                });
            }
        }
        Ok(nearby)
    }

    /// Approved, unhoused applicants in priority order.
    pub fn eligible_applicants(&self) -> Result<Vec<Applicant>, AllocationServiceError> {
        let applicants = self.store.list_applicants(&ApplicantFilter::eligible())?;
        Ok(rank_eligible(&applicants).into_iter().cloned().collect())
    }

    pub fn available_houses(&self) -> Result<Vec<House>, AllocationServiceError> {
        let mut houses = self.store.list_houses(&HouseFilter::available())?;
        houses.sort_by_key(|house| house.id);
        Ok(houses)
    }

    pub fn candidates(&self) -> Result<AllocationCandidates, AllocationServiceError> {
        Ok(AllocationCandidates {
            applicants: self.eligible_applicants()?,
            houses: self.available_houses()?,
        })
    }

    /// Run the selector under the suggestion policy without committing anything.
    pub fn preview_suggestions(&self) -> Result<SuggestionPreview, AllocationServiceError> {
        let policy = self.config.suggestions;
        let applicants = self.eligible_applicants()?;
        let houses = self.available_houses()?;

        let outcome = AllocationSelector::new(&self.matcher, policy).select(&applicants, &houses);
        let total_priority = outcome.total_priority();
        Ok(SuggestionPreview {
            match_threshold: policy.match_threshold,
            outcome,
            total_priority,
        })
    }

    /// Best open house for one eligible applicant under the batch threshold.
    pub fn suggest_house_for(
        &self,
        applicant_id: ApplicantId,
    ) -> Result<Pairing, AllocationServiceError> {
        let applicant = self.applicant(applicant_id)?;
        ensure_eligible(&applicant)?;

        let houses = self.available_houses()?;
        let policy = SelectionPolicy {
            max_applicants: None,
            ..self.config.batch
        };
        let outcome = AllocationSelector::new(&self.matcher, policy)
            .select(std::slice::from_ref(&applicant), &houses);

        match outcome.pairings.first() {
            Some(pairing) => Ok(*pairing),
            None => Err(AllocationServiceError::NoEligibleMatch {
                applicant_id,
                best_score: outcome.unmatched.first().and_then(|miss| miss.best_score()),
            }),
        }
    }

    /// Select pairings under the batch policy and commit each one atomically.
    ///
    /// A pairing the store refuses (for example because another writer took
    /// the house first) is reported in `conflicts` and not retried.
    pub fn run_batch_allocation(
        &self,
        principal: &AdminPrincipal,
    ) -> Result<BatchAllocationReport, AllocationServiceError> {
        let applicants = self.eligible_applicants()?;
        let houses = self.available_houses()?;
        let outcome =
            AllocationSelector::new(&self.matcher, self.config.batch).select(&applicants, &houses);

        for miss in &outcome.unmatched {
            debug!(applicant = %miss.applicant_id, reason = ?miss.reason, "no eligible match");
        }

        let mut committed = Vec::with_capacity(outcome.pairings.len());
        let mut conflicts = Vec::new();
        let mut total_priority = 0u32;

        for pairing in &outcome.pairings {
            let commit = AllocationCommit {
                applicant_id: pairing.applicant_id,
                house_id: pairing.house_id,
                allocated_by: principal.admin_id.clone(),
                match_score: pairing.match_score,
                allocated_at: Utc::now(),
            };

            match self.store.commit_allocation(commit) {
                Ok(record) => {
                    info!(
                        admin = %principal.admin_id,
                        applicant = %record.applicant_id,
                        house = %record.house_id,
                        match_score = record.match_score,
                        "house allocated"
                    );
                    total_priority += u32::from(pairing.priority_score);
                    committed.push(record);
                }
                Err(StoreError::Unavailable(reason)) => {
                    return Err(AllocationServiceError::Unavailable(reason));
                }
                Err(err) => {
                    warn!(
                        applicant = %pairing.applicant_id,
                        house = %pairing.house_id,
                        error = %err,
                        "batch pairing rejected by store"
                    );
                    conflicts.push(BatchConflict {
                        applicant_id: pairing.applicant_id,
                        house_id: pairing.house_id,
                        reason: err.to_string(),
                    });
                }
            }
        }

        Ok(BatchAllocationReport {
            run_by: principal.admin_id.clone(),
            committed,
            unmatched: outcome.unmatched,
            conflicts,
            total_priority,
        })
    }

    /// Assign a chosen house to a chosen applicant, bypassing ranking and threshold.
    pub fn allocate_manually(
        &self,
        principal: &AdminPrincipal,
        applicant_id: ApplicantId,
        house_id: HouseId,
    ) -> Result<AllocationRecord, AllocationServiceError> {
        let applicant = self.applicant(applicant_id)?;
        let house = self.house(house_id)?;

        if !house.is_available() {
            return Err(AllocationConflict::HouseUnavailable {
                code: house.code,
                status: house.status,
            }
            .into());
        }
        ensure_eligible(&applicant)?;

        let match_score = self.matcher.score(&applicant, &house);
        let record = self
            .store
            .commit_allocation(AllocationCommit {
                applicant_id,
                house_id,
                allocated_by: principal.admin_id.clone(),
                match_score,
                allocated_at: Utc::now(),
            })
            .map_err(|err| {
                warn!(applicant = %applicant_id, house = %house.code, error = %err, "manual allocation refused");
                AllocationServiceError::from(err)
            })?;

        info!(
            admin = %principal.admin_id,
            applicant = %applicant_id,
            house = %house.code,
            match_score,
            "house allocated manually"
        );
        Ok(record)
    }

    pub fn allocation_history(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<AllocationRecord>, AllocationServiceError> {
        Ok(self.store.allocations(limit)?)
    }

    pub fn dashboard(&self) -> Result<DashboardSnapshot, AllocationServiceError> {
        let mut applicants = self.store.list_applicants(&ApplicantFilter::default())?;
        let houses = self.store.list_houses(&HouseFilter::default())?;

        let mut applications = StatusCounts::default();
        for applicant in &applicants {
            match applicant.status {
                ApplicantStatus::Pending => applications.pending += 1,
                ApplicantStatus::Approved => applications.approved += 1,
                ApplicantStatus::Rejected => applications.rejected += 1,
                ApplicantStatus::Allocated => applications.allocated += 1,
            }
        }

        let mut house_counts = HouseCounts::default();
        for house in &houses {
            match house.status {
                HouseStatus::Available => house_counts.available += 1,
                HouseStatus::Occupied => house_counts.occupied += 1,
                HouseStatus::Maintenance => house_counts.maintenance += 1,
            }
        }

        applicants.sort_by(|left, right| {
            right
                .submitted_at
                .cmp(&left.submitted_at)
                .then_with(|| right.id.cmp(&left.id))
        });
        let total_applications = applicants.len();
        let recent_applications = applicants
            .iter()
            .take(RECENT_APPLICATIONS)
            .map(Applicant::status_view)
            .collect();

        Ok(DashboardSnapshot {
            total_applications,
            applications,
            total_houses: houses.len(),
            houses: house_counts,
            recent_applications,
            recent_allocations: self.store.allocations(Some(RECENT_ALLOCATIONS))?,
        })
    }

    /// Unauthenticated counters. "Today" is the UTC calendar day of `now`.
    pub fn public_stats(&self, now: DateTime<Utc>) -> Result<PublicStats, AllocationServiceError> {
        let applicants = self.store.list_applicants(&ApplicantFilter::default())?;
        let pending_applications = applicants
            .iter()
            .filter(|applicant| applicant.status == ApplicantStatus::Pending)
            .count();
        let available_houses = self.store.list_houses(&HouseFilter::available())?.len();
        let today = now.date_naive();
        let allocated_today = self
            .store
            .allocations(None)?
            .iter()
            .filter(|record| record.allocated_at.date_naive() == today)
            .count();

        Ok(PublicStats {
            total_applications: applicants.len(),
            pending_applications,
            available_houses,
            allocated_today,
        })
    }
}

fn ensure_eligible(applicant: &Applicant) -> Result<(), AllocationConflict> {
    if let Some(house_id) = applicant.allocated_house {
        return Err(AllocationConflict::ApplicantAlreadyHoused {
            applicant_id: applicant.id,
            house_id,
        });
    }
    if applicant.status != ApplicantStatus::Approved {
        return Err(AllocationConflict::ApplicantNotApproved {
            applicant_id: applicant.id,
            status: applicant.status,
        });
    }
    Ok(())
}

/// Error raised by the allocation service.
#[derive(Debug, thiserror::Error)]
pub enum AllocationServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{0} not found")]
    NotFound(RecordRef),
    #[error(transparent)]
    Conflict(#[from] AllocationConflict),
    #[error("no available house reaches the match threshold for applicant {applicant_id}")]
    NoEligibleMatch {
        applicant_id: ApplicantId,
        best_score: Option<u32>,
    },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for AllocationServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(record) => Self::NotFound(record),
            StoreError::Conflict(conflict) => Self::Conflict(conflict),
            StoreError::Unavailable(reason) => Self::Unavailable(reason),
        }
    }
}
