use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::domain::{
    AllocationCommit, AllocationId, AllocationRecord, Applicant, ApplicantId, ApplicantStatus,
    House, HouseId, HouseStatus, NewApplicant, NewHouse,
};
use super::location::HouseLink;
use super::repository::{
    AllocationConflict, AllocationStore, ApplicantFilter, HouseFilter, RecordRef, StoreError,
};

const HOUSE_CODE_OFFSET: u64 = 100;

#[derive(Debug, Default)]
struct StoreState {
    applicants: BTreeMap<ApplicantId, Applicant>,
    houses: BTreeMap<HouseId, House>,
    allocations: Vec<AllocationRecord>,
    links: Vec<HouseLink>,
    last_applicant: u64,
    last_house: u64,
    last_allocation: u64,
}

impl StoreState {
    fn code_taken(&self, code: &str) -> bool {
        self.houses
            .values()
            .any(|house| house.code.eq_ignore_ascii_case(code))
    }

    fn generated_code(&self, id: HouseId) -> String {
        let mut suffix = HOUSE_CODE_OFFSET + id.0;
        loop {
            let candidate = format!("H-{suffix:03}");
            if !self.code_taken(&candidate) {
                return candidate;
            }
            suffix += 1;
        }
    }
}

/// Process-local store. One lock guards every table, so each call is atomic
/// with respect to every other call.
#[derive(Debug, Default, Clone)]
pub struct InMemoryAllocationStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryAllocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("allocation store lock poisoned".to_string()))
    }
}

impl AllocationStore for InMemoryAllocationStore {
    fn record_application(&self, applicant: NewApplicant) -> Result<Applicant, StoreError> {
        let mut state = self.lock()?;
        state.last_applicant += 1;
        let id = ApplicantId(state.last_applicant);

        let record = Applicant {
            id,
            name: applicant.name,
            age: applicant.age,
            family_size: applicant.family_size,
            monthly_income: applicant.monthly_income,
            contact: applicant.contact,
            status: ApplicantStatus::Pending,
            priority_score: applicant.priority_score,
            submitted_at: applicant.submitted_at,
            allocated_house: None,
        };
        state.applicants.insert(id, record.clone());
        Ok(record)
    }

    fn fetch_applicant(&self, id: ApplicantId) -> Result<Option<Applicant>, StoreError> {
        Ok(self.lock()?.applicants.get(&id).cloned())
    }

    fn list_applicants(&self, filter: &ApplicantFilter) -> Result<Vec<Applicant>, StoreError> {
        Ok(self
            .lock()?
            .applicants
            .values()
            .filter(|applicant| filter.matches(applicant))
            .cloned()
            .collect())
    }

    fn update_applicant_status(
        &self,
        id: ApplicantId,
        expected: ApplicantStatus,
        next: ApplicantStatus,
    ) -> Result<Applicant, StoreError> {
        let mut state = self.lock()?;
        let applicant = state
            .applicants
            .get_mut(&id)
            .ok_or(StoreError::NotFound(RecordRef::Applicant(id)))?;

        if applicant.status != expected || next == ApplicantStatus::Allocated {
            return Err(AllocationConflict::InvalidApplicantTransition {
                applicant_id: id,
                from: applicant.status,
                to: next,
            }
            .into());
        }

        applicant.status = next;
        Ok(applicant.clone())
    }

    fn insert_house(&self, house: NewHouse) -> Result<House, StoreError> {
        let mut state = self.lock()?;

        if let Some(code) = house.code.as_deref() {
            if state.code_taken(code) {
                return Err(AllocationConflict::DuplicateHouseCode(code.to_string()).into());
            }
        }

        state.last_house += 1;
        let id = HouseId(state.last_house);
        let code = match house.code {
            Some(code) => code,
            None => state.generated_code(id),
        };

        let record = House {
            id,
            code,
            address: house.address,
            house_type: house.house_type,
            bedrooms: house.bedrooms,
            size_sqft: house.size_sqft,
            monthly_rent: house.monthly_rent,
            facilities: house.facilities,
            status: house.status,
            occupant: None,
            added_at: house.added_at,
        };
        state.houses.insert(id, record.clone());
        Ok(record)
    }

    fn fetch_house(&self, id: HouseId) -> Result<Option<House>, StoreError> {
        Ok(self.lock()?.houses.get(&id).cloned())
    }

    fn list_houses(&self, filter: &HouseFilter) -> Result<Vec<House>, StoreError> {
        Ok(self
            .lock()?
            .houses
            .values()
            .filter(|house| filter.matches(house))
            .cloned()
            .collect())
    }

    fn update_house_status(
        &self,
        id: HouseId,
        expected: HouseStatus,
        next: HouseStatus,
    ) -> Result<House, StoreError> {
        let mut state = self.lock()?;
        let house = state
            .houses
            .get_mut(&id)
            .ok_or(StoreError::NotFound(RecordRef::House(id)))?;

        let touches_occupancy =
            house.status == HouseStatus::Occupied || next == HouseStatus::Occupied;
        if house.status != expected || touches_occupancy {
            return Err(AllocationConflict::InvalidHouseTransition {
                code: house.code.clone(),
                from: house.status,
                to: next,
            }
            .into());
        }

        house.status = next;
        Ok(house.clone())
    }

    fn remove_house(&self, id: HouseId) -> Result<House, StoreError> {
        let mut state = self.lock()?;
        let house = state
            .houses
            .get(&id)
            .ok_or(StoreError::NotFound(RecordRef::House(id)))?;

        if house.status == HouseStatus::Occupied || house.occupant.is_some() {
            return Err(AllocationConflict::HouseOccupied {
                code: house.code.clone(),
            }
            .into());
        }

        let removed = state
            .houses
            .remove(&id)
            .ok_or(StoreError::NotFound(RecordRef::House(id)))?;
        state.links.retain(|link| !link.touches(id));
        Ok(removed)
    }

    fn link_houses(&self, link: HouseLink) -> Result<HouseLink, StoreError> {
        let mut state = self.lock()?;
        for id in [link.from, link.to] {
            if !state.houses.contains_key(&id) {
                return Err(StoreError::NotFound(RecordRef::House(id)));
            }
        }

        match state
            .links
            .iter_mut()
            .find(|existing| existing.joins(link.from, link.to))
        {
            Some(existing) => *existing = link,
            None => state.links.push(link),
        }
        Ok(link)
    }

    fn house_links(&self) -> Result<Vec<HouseLink>, StoreError> {
        Ok(self.lock()?.links.clone())
    }

    fn commit_allocation(&self, commit: AllocationCommit) -> Result<AllocationRecord, StoreError> {
        let mut guard = self.lock()?;
        let state: &mut StoreState = &mut guard;

        let applicant = state
            .applicants
            .get(&commit.applicant_id)
            .ok_or(StoreError::NotFound(RecordRef::Applicant(commit.applicant_id)))?;
        let house = state
            .houses
            .get(&commit.house_id)
            .ok_or(StoreError::NotFound(RecordRef::House(commit.house_id)))?;

        if !house.is_available() {
            return Err(AllocationConflict::HouseUnavailable {
                code: house.code.clone(),
                status: house.status,
            }
            .into());
        }
        if let Some(house_id) = applicant.allocated_house {
            return Err(AllocationConflict::ApplicantAlreadyHoused {
                applicant_id: applicant.id,
                house_id,
            }
            .into());
        }
        if applicant.status != ApplicantStatus::Approved {
            return Err(AllocationConflict::ApplicantNotApproved {
                applicant_id: applicant.id,
                status: applicant.status,
            }
            .into());
        }

        // Preconditions hold; nothing below can fail.
        if let Some(applicant) = state.applicants.get_mut(&commit.applicant_id) {
            applicant.status = ApplicantStatus::Allocated;
            applicant.allocated_house = Some(commit.house_id);
        }
        if let Some(house) = state.houses.get_mut(&commit.house_id) {
            house.status = HouseStatus::Occupied;
            house.occupant = Some(commit.applicant_id);
        }

        state.last_allocation += 1;
        let record = AllocationRecord {
            id: AllocationId(state.last_allocation),
            applicant_id: commit.applicant_id,
            house_id: commit.house_id,
            allocated_by: commit.allocated_by,
            allocated_at: commit.allocated_at,
            match_score: commit.match_score,
        };
        state.allocations.push(record.clone());
        Ok(record)
    }

    fn allocations(&self, limit: Option<usize>) -> Result<Vec<AllocationRecord>, StoreError> {
        let state = self.lock()?;
        let limit = limit.unwrap_or(state.allocations.len());
        Ok(state.allocations.iter().rev().take(limit).cloned().collect())
    }
}
