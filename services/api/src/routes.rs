use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use homealloc::error::AppError;
use homealloc::workflows::allocation::scoring::PriorityBreakdown;
use homealloc::workflows::allocation::{allocation_router, AllocationService, AllocationStore};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_allocation_routes<S>(service: Arc<AllocationService<S>>) -> axum::Router
where
    S: AllocationStore + 'static,
{
    let preview_service = service.clone();

    allocation_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/priority/preview",
            axum::routing::post(move |Json(request): Json<PriorityPreviewRequest>| {
                let service = preview_service.clone();
                async move { priority_preview_endpoint(&service, request) }
            }),
        )
}

/// Household figures for an eligibility estimate before applying.
#[derive(Debug, Clone, Copy, Deserialize)]
pub(crate) struct PriorityPreviewRequest {
    pub(crate) age: u32,
    pub(crate) family_size: u32,
    pub(crate) monthly_income: f64,
}

#[derive(Debug, Serialize)]
pub(crate) struct PriorityPreviewResponse {
    pub(crate) priority_score: u8,
    pub(crate) breakdown: PriorityBreakdown,
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) fn priority_preview_endpoint<S>(
    service: &AllocationService<S>,
    request: PriorityPreviewRequest,
) -> Result<Json<PriorityPreviewResponse>, AppError>
where
    S: AllocationStore + 'static,
{
    let breakdown =
        service.preview_priority(request.age, request.family_size, request.monthly_income)?;

    Ok(Json(PriorityPreviewResponse {
        priority_score: breakdown.total,
        breakdown,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use homealloc::workflows::allocation::{
        AllocationConfig, AllocationServiceError, InMemoryAllocationStore,
    };
    use tower::ServiceExt;

    fn service() -> Arc<AllocationService<InMemoryAllocationStore>> {
        Arc::new(
            AllocationService::new(
                Arc::new(InMemoryAllocationStore::new()),
                AllocationConfig::default(),
            )
            .expect("default config is valid"),
        )
    }

    fn router() -> axum::Router {
        with_allocation_routes(service())
    }

    #[tokio::test]
    async fn health_route_reports_ok() {
        let response = router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn priority_preview_scores_a_valid_household() {
        let Json(body) = priority_preview_endpoint(
            &service(),
            PriorityPreviewRequest {
                age: 65,
                family_size: 6,
                monthly_income: 5_000.0,
            },
        )
        .expect("valid household");

        assert_eq!(body.priority_score, 100);
        assert_eq!(body.breakdown.components.len(), 3);
    }

    #[test]
    fn priority_preview_rejects_out_of_range_figures() {
        let result = priority_preview_endpoint(
            &service(),
            PriorityPreviewRequest {
                age: 500,
                family_size: 0,
                monthly_income: -5_000.0,
            },
        );

        assert!(matches!(
            result,
            Err(AppError::Allocation(AllocationServiceError::Validation(_)))
        ));
    }

    #[tokio::test]
    async fn allocation_routes_are_mounted() {
        let response = router()
            .oneshot(
                Request::get("/api/v1/waiting-list")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn priority_preview_route_scores_households() {
        let response = router()
            .oneshot(
                Request::post("/api/v1/priority/preview")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        r#"{"age":45,"family_size":4,"monthly_income":12000}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), 4096)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["priority_score"], 60);
    }

    #[tokio::test]
    async fn priority_preview_route_rejects_an_empty_household() {
        let response = router()
            .oneshot(
                Request::post("/api/v1/priority/preview")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        r#"{"age":45,"family_size":0,"monthly_income":12000}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = axum::body::to_bytes(response.into_body(), 4096)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(value["error"]
            .as_str()
            .is_some_and(|message| message.contains("family size")));
    }
}
