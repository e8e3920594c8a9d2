use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use super::domain::{
    AdminPrincipal, ApplicantId, ApplicationSubmission, HouseId, HouseListing, HouseStatus,
    ReviewAction,
};
use super::repository::{AllocationStore, HouseFilter};
use super::service::{AllocationService, AllocationServiceError};

/// Header carrying the acting administrator's id.
pub const ADMIN_HEADER: &str = "x-admin-id";

/// Router builder exposing public intake endpoints and the admin console API.
pub fn allocation_router<S>(service: Arc<AllocationService<S>>) -> Router
where
    S: AllocationStore + 'static,
{
    Router::new()
        .route("/api/v1/applications", post(submit_handler::<S>))
        .route(
            "/api/v1/applications/:applicant_id",
            get(application_status_handler::<S>),
        )
        .route("/api/v1/waiting-list", get(waiting_list_handler::<S>))
        .route("/api/v1/stats", get(public_stats_handler::<S>))
        .route("/api/v1/houses/:house_id", get(house_handler::<S>))
        .route(
            "/api/v1/admin/applications/:applicant_id/review",
            post(review_handler::<S>),
        )
        .route(
            "/api/v1/admin/applications/:applicant_id/suggestion",
            get(applicant_suggestion_handler::<S>),
        )
        .route(
            "/api/v1/admin/houses",
            get(list_houses_handler::<S>).post(register_house_handler::<S>),
        )
        .route(
            "/api/v1/admin/houses/:house_id",
            delete(remove_house_handler::<S>),
        )
        .route(
            "/api/v1/admin/houses/:house_id/maintenance",
            post(maintenance_handler::<S>),
        )
        .route(
            "/api/v1/admin/houses/:house_id/links",
            post(link_houses_handler::<S>),
        )
        .route(
            "/api/v1/admin/houses/:house_id/nearby",
            get(nearby_houses_handler::<S>),
        )
        .route(
            "/api/v1/admin/allocation/candidates",
            get(candidates_handler::<S>),
        )
        .route(
            "/api/v1/admin/allocation/suggestions",
            get(suggestions_handler::<S>),
        )
        .route("/api/v1/admin/allocation/batch", post(batch_handler::<S>))
        .route(
            "/api/v1/admin/allocation/manual",
            post(manual_allocation_handler::<S>),
        )
        .route(
            "/api/v1/admin/allocation/history",
            get(history_handler::<S>),
        )
        .route("/api/v1/admin/dashboard", get(dashboard_handler::<S>))
        .with_state(service)
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ReviewRequest {
    pub action: ReviewAction,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MaintenanceRequest {
    pub under_maintenance: bool,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ManualAllocationRequest {
    pub applicant_id: ApplicantId,
    pub house_id: HouseId,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct HouseQuery {
    pub status: Option<HouseStatus>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LinkRequest {
    pub to: HouseId,
    pub distance: f64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct NearbyQuery {
    pub max_distance: f64,
    pub status: Option<HouseStatus>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

pub(crate) fn principal_from(headers: &HeaderMap) -> Result<AdminPrincipal, Response> {
    let admin_id = headers
        .get(ADMIN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty());

    match admin_id {
        Some(admin_id) => Ok(AdminPrincipal::new(admin_id)),
        None => {
            let payload = json!({
                "error": format!("missing {ADMIN_HEADER} header"),
            });
            Err((StatusCode::UNAUTHORIZED, axum::Json(payload)).into_response())
        }
    }
}

pub(crate) fn error_response(error: AllocationServiceError) -> Response {
    let status = match &error {
        AllocationServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AllocationServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        AllocationServiceError::Conflict(_) => StatusCode::CONFLICT,
        AllocationServiceError::NoEligibleMatch { .. } => StatusCode::NOT_FOUND,
        AllocationServiceError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    };

    let payload = match &error {
        AllocationServiceError::NoEligibleMatch {
            applicant_id,
            best_score,
        } => json!({
            "error": error.to_string(),
            "applicant_id": applicant_id,
            "best_score": best_score,
        }),
        other => json!({
            "error": other.to_string(),
        }),
    };
    (status, axum::Json(payload)).into_response()
}

fn ok_json<T: serde::Serialize>(status: StatusCode, body: T) -> Response {
    (status, axum::Json(body)).into_response()
}

pub(crate) async fn submit_handler<S>(
    State(service): State<Arc<AllocationService<S>>>,
    axum::Json(submission): axum::Json<ApplicationSubmission>,
) -> Response
where
    S: AllocationStore + 'static,
{
    match service.submit_application(submission) {
        Ok(applicant) => ok_json(StatusCode::CREATED, applicant.status_view()),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn application_status_handler<S>(
    State(service): State<Arc<AllocationService<S>>>,
    Path(applicant_id): Path<u64>,
) -> Response
where
    S: AllocationStore + 'static,
{
    match service.applicant(ApplicantId(applicant_id)) {
        Ok(applicant) => ok_json(StatusCode::OK, applicant.status_view()),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn waiting_list_handler<S>(
    State(service): State<Arc<AllocationService<S>>>,
) -> Response
where
    S: AllocationStore + 'static,
{
    match service.waiting_list() {
        Ok(entries) => ok_json(StatusCode::OK, entries),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn public_stats_handler<S>(
    State(service): State<Arc<AllocationService<S>>>,
) -> Response
where
    S: AllocationStore + 'static,
{
    match service.public_stats(Utc::now()) {
        Ok(stats) => ok_json(StatusCode::OK, stats),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn house_handler<S>(
    State(service): State<Arc<AllocationService<S>>>,
    Path(house_id): Path<u64>,
) -> Response
where
    S: AllocationStore + 'static,
{
    match service.house(HouseId(house_id)) {
        Ok(house) => ok_json(StatusCode::OK, house),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn review_handler<S>(
    State(service): State<Arc<AllocationService<S>>>,
    headers: HeaderMap,
    Path(applicant_id): Path<u64>,
    axum::Json(request): axum::Json<ReviewRequest>,
) -> Response
where
    S: AllocationStore + 'static,
{
    let principal = match principal_from(&headers) {
        Ok(principal) => principal,
        Err(response) => return response,
    };

    match service.review_application(&principal, ApplicantId(applicant_id), request.action) {
        Ok(applicant) => ok_json(StatusCode::OK, applicant.status_view()),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn applicant_suggestion_handler<S>(
    State(service): State<Arc<AllocationService<S>>>,
    headers: HeaderMap,
    Path(applicant_id): Path<u64>,
) -> Response
where
    S: AllocationStore + 'static,
{
    if let Err(response) = principal_from(&headers) {
        return response;
    }

    match service.suggest_house_for(ApplicantId(applicant_id)) {
        Ok(pairing) => ok_json(StatusCode::OK, pairing),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_houses_handler<S>(
    State(service): State<Arc<AllocationService<S>>>,
    headers: HeaderMap,
    Query(query): Query<HouseQuery>,
) -> Response
where
    S: AllocationStore + 'static,
{
    if let Err(response) = principal_from(&headers) {
        return response;
    }

    let filter = HouseFilter {
        status: query.status,
    };
    match service.houses(&filter) {
        Ok(houses) => ok_json(StatusCode::OK, houses),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn register_house_handler<S>(
    State(service): State<Arc<AllocationService<S>>>,
    headers: HeaderMap,
    axum::Json(listing): axum::Json<HouseListing>,
) -> Response
where
    S: AllocationStore + 'static,
{
    let principal = match principal_from(&headers) {
        Ok(principal) => principal,
        Err(response) => return response,
    };

    match service.register_house(&principal, listing) {
        Ok(house) => ok_json(StatusCode::CREATED, house),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn remove_house_handler<S>(
    State(service): State<Arc<AllocationService<S>>>,
    headers: HeaderMap,
    Path(house_id): Path<u64>,
) -> Response
where
    S: AllocationStore + 'static,
{
    let principal = match principal_from(&headers) {
        Ok(principal) => principal,
        Err(response) => return response,
    };

    match service.remove_house(&principal, HouseId(house_id)) {
        Ok(house) => ok_json(StatusCode::OK, house),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn maintenance_handler<S>(
    State(service): State<Arc<AllocationService<S>>>,
    headers: HeaderMap,
    Path(house_id): Path<u64>,
    axum::Json(request): axum::Json<MaintenanceRequest>,
) -> Response
where
    S: AllocationStore + 'static,
{
    let principal = match principal_from(&headers) {
        Ok(principal) => principal,
        Err(response) => return response,
    };

    match service.set_house_maintenance(&principal, HouseId(house_id), request.under_maintenance) {
        Ok(house) => ok_json(StatusCode::OK, house),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn link_houses_handler<S>(
    State(service): State<Arc<AllocationService<S>>>,
    headers: HeaderMap,
    Path(house_id): Path<u64>,
    axum::Json(request): axum::Json<LinkRequest>,
) -> Response
where
    S: AllocationStore + 'static,
{
    let principal = match principal_from(&headers) {
        Ok(principal) => principal,
        Err(response) => return response,
    };

    match service.link_houses(&principal, HouseId(house_id), request.to, request.distance) {
        Ok(link) => ok_json(StatusCode::CREATED, link),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn nearby_houses_handler<S>(
    State(service): State<Arc<AllocationService<S>>>,
    headers: HeaderMap,
    Path(house_id): Path<u64>,
    Query(query): Query<NearbyQuery>,
) -> Response
where
    S: AllocationStore + 'static,
{
    if let Err(response) = principal_from(&headers) {
        return response;
    }

    let filter = HouseFilter {
        status: query.status,
    };
    match service.nearby_houses(HouseId(house_id), query.max_distance, &filter) {
        Ok(nearby) => ok_json(StatusCode::OK, nearby),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn candidates_handler<S>(
    State(service): State<Arc<AllocationService<S>>>,
    headers: HeaderMap,
) -> Response
where
    S: AllocationStore + 'static,
{
    if let Err(response) = principal_from(&headers) {
        return response;
    }

    match service.candidates() {
        Ok(candidates) => ok_json(StatusCode::OK, candidates),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn suggestions_handler<S>(
    State(service): State<Arc<AllocationService<S>>>,
    headers: HeaderMap,
) -> Response
where
    S: AllocationStore + 'static,
{
    if let Err(response) = principal_from(&headers) {
        return response;
    }

    match service.preview_suggestions() {
        Ok(preview) => ok_json(StatusCode::OK, preview),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn batch_handler<S>(
    State(service): State<Arc<AllocationService<S>>>,
    headers: HeaderMap,
) -> Response
where
    S: AllocationStore + 'static,
{
    let principal = match principal_from(&headers) {
        Ok(principal) => principal,
        Err(response) => return response,
    };

    match service.run_batch_allocation(&principal) {
        Ok(report) => ok_json(StatusCode::OK, report),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn manual_allocation_handler<S>(
    State(service): State<Arc<AllocationService<S>>>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<ManualAllocationRequest>,
) -> Response
where
    S: AllocationStore + 'static,
{
    let principal = match principal_from(&headers) {
        Ok(principal) => principal,
        Err(response) => return response,
    };

    match service.allocate_manually(&principal, request.applicant_id, request.house_id) {
        Ok(record) => ok_json(StatusCode::CREATED, record),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn history_handler<S>(
    State(service): State<Arc<AllocationService<S>>>,
    headers: HeaderMap,
    Query(query): Query<HistoryQuery>,
) -> Response
where
    S: AllocationStore + 'static,
{
    if let Err(response) = principal_from(&headers) {
        return response;
    }

    match service.allocation_history(query.limit) {
        Ok(records) => ok_json(StatusCode::OK, records),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn dashboard_handler<S>(
    State(service): State<Arc<AllocationService<S>>>,
    headers: HeaderMap,
) -> Response
where
    S: AllocationStore + 'static,
{
    if let Err(response) = principal_from(&headers) {
        return response;
    }

    match service.dashboard() {
        Ok(snapshot) => ok_json(StatusCode::OK, snapshot),
        Err(error) => error_response(error),
    }
}
