//! End-to-end allocation scenarios exercised through the public service facade
//! and HTTP router.

mod common {
    use std::sync::Arc;

    use homealloc::workflows::allocation::{
        AdminPrincipal, AllocationConfig, AllocationService, Applicant, ApplicationSubmission,
        ContactDetails, House, HouseListing, InMemoryAllocationStore, ReviewAction,
    };

    pub(super) type Service = AllocationService<InMemoryAllocationStore>;

    pub(super) fn officer() -> AdminPrincipal {
        AdminPrincipal::new("officer-nadia")
    }

    pub(super) fn service() -> Arc<Service> {
        Arc::new(AllocationService::new(
            Arc::new(InMemoryAllocationStore::new()),
            AllocationConfig::default(),
        )
        .expect("default config is valid"))
    }

    pub(super) fn apply(
        service: &Service,
        name: &str,
        age: u32,
        family_size: u32,
        monthly_income: f64,
    ) -> Applicant {
        service
            .submit_application(ApplicationSubmission {
                name: name.to_string(),
                age,
                family_size,
                monthly_income,
                contact: ContactDetails {
                    phone: "0300-5550101".to_string(),
                    email: None,
                    address: None,
                },
            })
            .expect("submission accepted")
    }

    pub(super) fn apply_and_approve(
        service: &Service,
        name: &str,
        age: u32,
        family_size: u32,
        monthly_income: f64,
    ) -> Applicant {
        let applicant = apply(service, name, age, family_size, monthly_income);
        service
            .review_application(&officer(), applicant.id, ReviewAction::Approve)
            .expect("approved")
    }

    pub(super) fn add_house(service: &Service, bedrooms: u32, size_sqft: u32) -> House {
        service
            .register_house(
                &officer(),
                HouseListing {
                    code: None,
                    address: format!("{bedrooms} bed unit, Johar Town"),
                    house_type: "house".to_string(),
                    bedrooms,
                    size_sqft,
                    monthly_rent: 16_000.0,
                    facilities: None,
                },
            )
            .expect("house registered")
    }
}

use std::collections::HashSet;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use homealloc::workflows::allocation::{
    allocation_router, AllocationConfig, AllocationService, ApplicantStatus, HouseStatus,
    InMemoryAllocationStore, SizeAdequacyConfig, UnmatchedReason, ADMIN_HEADER,
};
use tower::ServiceExt;

use common::*;

#[test]
fn waiting_list_flows_into_a_committed_batch() {
    let service = service();
    let elder = apply_and_approve(&service, "Ghulam Rasool", 68, 7, 6_000.0);
    let family = apply_and_approve(&service, "Ayesha Siddiqui", 41, 4, 14_000.0);
    let couple = apply_and_approve(&service, "Bilal Ahmed", 29, 2, 19_000.0);
    let waiting = apply(&service, "Hina Tariq", 35, 3, 11_000.0);

    let large = add_house(&service, 4, 1_600);
    let medium = add_house(&service, 2, 950);
    let studio = add_house(&service, 1, 420);

    let report = service.run_batch_allocation(&officer()).expect("batch run");

    let pairs: Vec<_> = report
        .committed
        .iter()
        .map(|record| (record.applicant_id, record.house_id, record.match_score))
        .collect();
    assert_eq!(
        pairs,
        vec![
            (elder.id, large.id, 80),
            (family.id, medium.id, 80),
            (couple.id, studio.id, 80),
        ]
    );
    assert!(report.unmatched.is_empty());

    let houses: HashSet<_> = report.committed.iter().map(|record| record.house_id).collect();
    assert_eq!(houses.len(), 3);
    assert_eq!(
        service.applicant(waiting.id).expect("applicant").status,
        ApplicantStatus::Pending
    );

    let dashboard = service.dashboard().expect("dashboard");
    assert_eq!(dashboard.applications.allocated, 3);
    assert_eq!(dashboard.houses.occupied, 3);
    assert_eq!(dashboard.recent_allocations[0].applicant_id, couple.id);
}

#[test]
fn second_batch_only_places_the_leftovers() {
    let service = service();
    let first = apply_and_approve(&service, "First", 61, 4, 9_000.0);
    let second = apply_and_approve(&service, "Second", 30, 4, 18_000.0);
    add_house(&service, 2, 900);

    let opening = service.run_batch_allocation(&officer()).expect("first run");
    assert_eq!(opening.committed[0].applicant_id, first.id);
    assert_eq!(
        opening.unmatched[0].reason,
        UnmatchedReason::NoHousesRemaining
    );

    let later = add_house(&service, 2, 900);
    let follow_up = service.run_batch_allocation(&officer()).expect("second run");

    assert_eq!(follow_up.committed.len(), 1);
    assert_eq!(follow_up.committed[0].applicant_id, second.id);
    assert_eq!(follow_up.committed[0].house_id, later.id);
    assert_eq!(service.allocation_history(None).expect("history").len(), 2);
}

#[test]
fn house_back_from_maintenance_rejoins_the_pool() {
    let service = service();
    let tenant = apply_and_approve(&service, "Tenant", 50, 2, 9_000.0);
    let house = add_house(&service, 1, 500);
    service
        .set_house_maintenance(&officer(), house.id, true)
        .expect("maintenance");

    let idle = service.run_batch_allocation(&officer()).expect("batch");
    assert!(idle.committed.is_empty());
    assert_eq!(idle.unmatched[0].applicant_id, tenant.id);

    service
        .set_house_maintenance(&officer(), house.id, false)
        .expect("back in service");
    let placed = service.run_batch_allocation(&officer()).expect("batch");
    assert_eq!(placed.committed[0].house_id, house.id);
    assert_eq!(
        service.house(house.id).expect("house").status,
        HouseStatus::Occupied
    );
}

#[test]
fn size_factor_breaks_bedroom_ties_when_enabled() {
    let config = AllocationConfig {
        size_adequacy: Some(SizeAdequacyConfig::default()),
        ..AllocationConfig::default()
    };
    let service: Arc<Service> = Arc::new(AllocationService::new(
        Arc::new(InMemoryAllocationStore::new()),
        config,
    )
    .expect("size factor config is valid"));
    let family = apply_and_approve(&service, "Family", 40, 4, 12_000.0);
    add_house(&service, 2, 700);
    let roomy = add_house(&service, 2, 1_200);

    let pairing = service.suggest_house_for(family.id).expect("suggestion");

    assert_eq!(pairing.house_id, roomy.id);
    assert_eq!(pairing.match_score, 80 + 12);
}

#[tokio::test]
async fn router_serves_the_admin_dashboard() {
    let service = service();
    apply_and_approve(&service, "Ali Khan", 45, 5, 25_000.0);
    add_house(&service, 3, 1_100);
    let router = allocation_router(service);

    let response = router
        .oneshot(
            Request::get("/api/v1/admin/dashboard")
                .header(ADMIN_HEADER, "officer-nadia")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    let snapshot: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(snapshot["total_applications"], 1);
    assert_eq!(snapshot["applications"]["approved"], 1);
    assert_eq!(snapshot["houses"]["available"], 1);
}
