use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::allocation::domain::{
    AdminPrincipal, AllocationCommit, AllocationRecord, Applicant, ApplicantId, ApplicantStatus,
    ApplicationSubmission, ContactDetails, House, HouseId, HouseListing, HouseStatus,
    NewApplicant, NewHouse, ReviewAction,
};
use crate::workflows::allocation::location::HouseLink;
use crate::workflows::allocation::repository::{
    AllocationStore, ApplicantFilter, HouseFilter, StoreError,
};
use crate::workflows::allocation::{
    allocation_router, AllocationConfig, AllocationService, InMemoryAllocationStore,
};

pub(super) fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 3, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn admin() -> AdminPrincipal {
    AdminPrincipal::new("housing-officer")
}

/// Approved applicant built in memory; submission time follows the id.
pub(super) fn applicant(id: u64, priority_score: u8, family_size: u32) -> Applicant {
    Applicant {
        id: ApplicantId(id),
        name: format!("Applicant {id}"),
        age: 40,
        family_size,
        monthly_income: 12_000.0,
        contact: ContactDetails {
            phone: format!("0300-00000{id:02}"),
            email: None,
            address: None,
        },
        status: ApplicantStatus::Approved,
        priority_score,
        submitted_at: base_time() + Duration::minutes(id as i64),
        allocated_house: None,
    }
}

pub(super) fn house(id: u64, bedrooms: u32) -> House {
    House {
        id: HouseId(id),
        code: format!("H-{:03}", 100 + id),
        address: format!("{id} Garden Road"),
        house_type: "apartment".to_string(),
        bedrooms,
        size_sqft: 900,
        monthly_rent: 15_000.0,
        facilities: vec!["Water".to_string()],
        status: HouseStatus::Available,
        occupant: None,
        added_at: base_time(),
    }
}

pub(super) fn submission(name: &str, age: u32, family_size: u32, income: f64) -> ApplicationSubmission {
    ApplicationSubmission {
        name: name.to_string(),
        age,
        family_size,
        monthly_income: income,
        contact: ContactDetails {
            phone: "0300-1234567".to_string(),
            email: Some("applicant@example.com".to_string()),
            address: Some("12 Mall Road".to_string()),
        },
    }
}

pub(super) fn listing(code: Option<&str>, bedrooms: u32) -> HouseListing {
    HouseListing {
        code: code.map(str::to_string),
        address: "7 Canal View".to_string(),
        house_type: "House".to_string(),
        bedrooms,
        size_sqft: 1_100,
        monthly_rent: 18_000.0,
        facilities: None,
    }
}

pub(super) fn build_service() -> (
    Arc<AllocationService<InMemoryAllocationStore>>,
    Arc<InMemoryAllocationStore>,
) {
    let store = Arc::new(InMemoryAllocationStore::new());
    let service = Arc::new(AllocationService::new(
        store.clone(),
        AllocationConfig::default(),
    )
    .expect("default config is valid"));
    (service, store)
}

/// Submit and approve an applicant through the service.
pub(super) fn approved(
    service: &AllocationService<InMemoryAllocationStore>,
    name: &str,
    age: u32,
    family_size: u32,
    income: f64,
) -> Applicant {
    let applicant = service
        .submit_application(submission(name, age, family_size, income))
        .expect("submission accepted");
    service
        .review_application(&admin(), applicant.id, ReviewAction::Approve)
        .expect("approval accepted")
}

pub(super) fn registered(
    service: &AllocationService<InMemoryAllocationStore>,
    bedrooms: u32,
) -> House {
    service
        .register_house(&admin(), listing(None, bedrooms))
        .expect("house registered")
}

/// Store whose backend is permanently down.
pub(super) struct UnavailableStore;

fn offline<T>() -> Result<T, StoreError> {
    Err(StoreError::Unavailable("database offline".to_string()))
}

impl AllocationStore for UnavailableStore {
    fn record_application(&self, _applicant: NewApplicant) -> Result<Applicant, StoreError> {
        offline()
    }

    fn fetch_applicant(&self, _id: ApplicantId) -> Result<Option<Applicant>, StoreError> {
        offline()
    }

    fn list_applicants(&self, _filter: &ApplicantFilter) -> Result<Vec<Applicant>, StoreError> {
        offline()
    }

    fn update_applicant_status(
        &self,
        _id: ApplicantId,
        _expected: ApplicantStatus,
        _next: ApplicantStatus,
    ) -> Result<Applicant, StoreError> {
        offline()
    }

    fn insert_house(&self, _house: NewHouse) -> Result<House, StoreError> {
        offline()
    }

    fn fetch_house(&self, _id: HouseId) -> Result<Option<House>, StoreError> {
        offline()
    }

    fn list_houses(&self, _filter: &HouseFilter) -> Result<Vec<House>, StoreError> {
        offline()
    }

    fn update_house_status(
        &self,
        _id: HouseId,
        _expected: HouseStatus,
        _next: HouseStatus,
    ) -> Result<House, StoreError> {
        offline()
    }

    fn remove_house(&self, _id: HouseId) -> Result<House, StoreError> {
        offline()
    }

    fn link_houses(&self, _link: HouseLink) -> Result<HouseLink, StoreError> {
        offline()
    }

    fn house_links(&self) -> Result<Vec<HouseLink>, StoreError> {
        offline()
    }

    fn commit_allocation(&self, _commit: AllocationCommit) -> Result<AllocationRecord, StoreError> {
        offline()
    }

    fn allocations(&self, _limit: Option<usize>) -> Result<Vec<AllocationRecord>, StoreError> {
        offline()
    }
}

pub(super) fn router_with_service(
    service: Arc<AllocationService<InMemoryAllocationStore>>,
) -> axum::Router {
    allocation_router(service)
}

pub(super) fn assert_conflict_response(response: Response) {
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
