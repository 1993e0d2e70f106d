// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Dhaara Labs

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    models::{
        CompleteRequest, DataCategory, ErasureScope, ExportFormat, GrievanceCategory,
        RejectRequest, RequestDetail, RequestStatus, RequestType, SubmitAccessRequest,
        SubmitCorrectionRequest, SubmitErasureRequest, SubmitGrievanceRequest,
        SubmitPortabilityRequest,
    },
    state::AppState,
    storage::{AuditEvent, AuditEventType, StoredRightsRequest},
};

pub mod admin;
pub mod grievances;
pub mod health;
pub mod requests;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route(
            "/requests",
            get(requests::list_my_requests),
        )
        .route("/requests/access", post(requests::submit_access))
        .route("/requests/erasure", post(requests::submit_erasure))
        .route("/requests/correction", post(requests::submit_correction))
        .route("/requests/portability", post(requests::submit_portability))
        .route("/requests/{request_id}", get(requests::get_request))
        .route("/requests/{request_id}/cancel", post(requests::cancel_request))
        .route("/grievances", post(grievances::submit_grievance))
        .route("/admin/requests", get(admin::list_requests))
        .route("/admin/requests/{request_id}/process", post(admin::process_request))
        .route(
            "/admin/requests/{request_id}/complete",
            post(admin::complete_request),
        )
        .route("/admin/requests/{request_id}/reject", post(admin::reject_request))
        .route("/admin/audit", get(admin::read_audit))
        .with_state(state.clone());

    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .nest("/v1", v1_routes)
        .merge(health_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(CorsLayer::permissive()),
        )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        requests::submit_access,
        requests::submit_erasure,
        requests::submit_correction,
        requests::submit_portability,
        requests::list_my_requests,
        requests::get_request,
        requests::cancel_request,
        grievances::submit_grievance,
        admin::list_requests,
        admin::process_request,
        admin::complete_request,
        admin::reject_request,
        admin::read_audit,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            StoredRightsRequest,
            RequestDetail,
            RequestType,
            RequestStatus,
            DataCategory,
            ErasureScope,
            ExportFormat,
            GrievanceCategory,
            SubmitAccessRequest,
            SubmitErasureRequest,
            SubmitCorrectionRequest,
            SubmitPortabilityRequest,
            SubmitGrievanceRequest,
            CompleteRequest,
            RejectRequest,
            AuditEvent,
            AuditEventType
        )
    ),
    tags(
        (name = "Requests", description = "Data principal rights requests"),
        (name = "Grievances", description = "Grievance submission"),
        (name = "Admin", description = "Officer request processing and audit"),
        (name = "Health", description = "Service health probes")
    )
)]
struct ApiDoc;
