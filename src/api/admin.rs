// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Dhaara Labs

//! Officer endpoints: request lifecycle management and audit views.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    audit_log,
    auth::{Auth, OfficerOnly},
    error::ApiError,
    export::ExportBundle,
    models::{CompleteRequest, RejectRequest, RequestDetail, RequestStatus, RequestType},
    state::AppState,
    storage::{
        AuditEvent, AuditEventType, AuditRepository, RightsRequestRepository, StoredRightsRequest,
    },
};

#[derive(Deserialize, IntoParams)]
pub struct AdminListQuery {
    /// Restrict the listing to one lifecycle state.
    pub status: Option<RequestStatus>,
    /// When true, only open requests past their statutory deadline.
    pub overdue: Option<bool>,
}

#[derive(Deserialize, IntoParams)]
pub struct AuditQuery {
    /// Single day to read (`YYYY-MM-DD`). Defaults to today.
    pub date: Option<String>,
    /// Range start (`YYYY-MM-DD`); requires `end_date`.
    pub start_date: Option<String>,
    /// Range end (`YYYY-MM-DD`); requires `start_date`.
    pub end_date: Option<String>,
}

/// List requests across all principals.
#[utoipa::path(
    get,
    path = "/v1/admin/requests",
    params(AdminListQuery),
    tag = "Admin",
    security(("bearer" = [])),
    responses(
        (status = 200, body = [StoredRightsRequest]),
        (status = 403, description = "Requires officer or admin role")
    )
)]
pub async fn list_requests(
    State(state): State<AppState>,
    OfficerOnly(user): OfficerOnly,
    Query(params): Query<AdminListQuery>,
) -> Result<Json<Vec<StoredRightsRequest>>, ApiError> {
    let repo = RightsRequestRepository::new(&state.storage);
    let mut requests = repo.list_all()?;

    if let Some(status) = params.status {
        requests.retain(|r| r.status == status);
    }
    if params.overdue == Some(true) {
        let now = Utc::now();
        requests.retain(|r| r.is_overdue(now));
    }

    audit_log!(&state.storage, AuditEventType::OfficerAccess, user);

    Ok(Json(requests))
}

/// Begin processing a pending request.
#[utoipa::path(
    post,
    path = "/v1/admin/requests/{request_id}/process",
    params(
        ("request_id" = String, Path, description = "Identifier of the request")
    ),
    tag = "Admin",
    security(("bearer" = [])),
    responses(
        (status = 200, body = StoredRightsRequest),
        (status = 404, description = "Unknown request"),
        (status = 422, description = "Request is not pending")
    )
)]
pub async fn process_request(
    Path(request_id): Path<String>,
    State(state): State<AppState>,
    OfficerOnly(user): OfficerOnly,
) -> Result<Json<StoredRightsRequest>, ApiError> {
    let repo = RightsRequestRepository::new(&state.storage);
    let mut request = repo.get(&request_id)?;

    request
        .transition(RequestStatus::Processing, None)
        .map_err(|e| ApiError::unprocessable(e.to_string()))?;

    // Erasure is destructive: confirm the principal's identity with the
    // verification provider before the officer starts acting on it. An
    // unreachable provider does not block processing, only goes unrecorded.
    if request.request_type == RequestType::Erasure {
        if let Some(verifier) = &state.verifier {
            match verifier.verify_identity(&request.requester_id).await {
                Ok(status) => {
                    let note = serde_json::json!({
                        "verified": status.verified,
                        "status": status.status,
                    });
                    match request.metadata {
                        Some(serde_json::Value::Object(ref mut map)) => {
                            map.insert("identity_verification".to_string(), note);
                        }
                        _ => {
                            request.metadata =
                                Some(serde_json::json!({ "identity_verification": note }));
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(request_id = %request.id, error = %e, "identity verification unavailable");
                }
            }
        }
    }

    repo.update(&request)?;

    tracing::info!(request_id = %request.id, officer = %user.user_id, "request moved to processing");
    audit_log!(
        &state.storage,
        AuditEventType::RequestProcessing,
        user,
        "request",
        &request.id
    );

    Ok(Json(request))
}

/// Complete a request that is being processed.
///
/// For portability requests the payload is the per-category data bundle;
/// it is rendered in the requested format and stored under `exports/`,
/// and the recorded response carries the artifact path and checksum.
#[utoipa::path(
    post,
    path = "/v1/admin/requests/{request_id}/complete",
    request_body = CompleteRequest,
    params(
        ("request_id" = String, Path, description = "Identifier of the request")
    ),
    tag = "Admin",
    security(("bearer" = [])),
    responses(
        (status = 200, body = StoredRightsRequest),
        (status = 400, description = "Malformed completion payload"),
        (status = 404, description = "Unknown request"),
        (status = 422, description = "Request is not being processed")
    )
)]
pub async fn complete_request(
    Path(request_id): Path<String>,
    State(state): State<AppState>,
    OfficerOnly(user): OfficerOnly,
    Json(payload): Json<CompleteRequest>,
) -> Result<Json<StoredRightsRequest>, ApiError> {
    let repo = RightsRequestRepository::new(&state.storage);
    let mut request = repo.get(&request_id)?;

    // Refuse the transition before rendering anything, so no artifact is
    // written for a request that cannot complete.
    if !request.status.can_transition(RequestStatus::Completed) {
        return Err(ApiError::unprocessable(format!(
            "cannot move a {} request to completed",
            request.status
        )));
    }

    let response = if let RequestDetail::Portability { format } = &request.detail {
        let format = *format;
        let bundle = ExportBundle::from_payload(&request.id, &request.requester_id, &payload.response)
            .map_err(|e| ApiError::bad_request(e.to_string()))?;
        let artifact = bundle
            .render(format)
            .map_err(|e| ApiError::internal(e.to_string()))?;

        let artifact_path = state.storage.paths().export_artifact(&request.id, format);
        state.storage.write_raw(&artifact_path, &artifact.bytes)?;

        audit_log!(
            &state.storage,
            AuditEventType::ExportGenerated,
            user,
            "export",
            artifact_path.to_string_lossy()
        );

        serde_json::json!({
            "export": {
                "format": format,
                "path": artifact_path.to_string_lossy(),
                "checksum": artifact.checksum,
                "size_bytes": artifact.bytes.len(),
            }
        })
    } else {
        payload.response
    };

    request
        .transition(RequestStatus::Completed, Some(response))
        .map_err(|e| ApiError::unprocessable(e.to_string()))?;
    repo.update(&request)?;

    tracing::info!(request_id = %request.id, officer = %user.user_id, "request completed");
    audit_log!(
        &state.storage,
        AuditEventType::RequestCompleted,
        user,
        "request",
        &request.id
    );

    Ok(Json(request))
}

/// Reject a request with a mandatory reason.
#[utoipa::path(
    post,
    path = "/v1/admin/requests/{request_id}/reject",
    request_body = RejectRequest,
    params(
        ("request_id" = String, Path, description = "Identifier of the request")
    ),
    tag = "Admin",
    security(("bearer" = [])),
    responses(
        (status = 200, body = StoredRightsRequest),
        (status = 400, description = "Missing rejection reason"),
        (status = 404, description = "Unknown request"),
        (status = 422, description = "Request is already terminal")
    )
)]
pub async fn reject_request(
    Path(request_id): Path<String>,
    State(state): State<AppState>,
    OfficerOnly(user): OfficerOnly,
    Json(payload): Json<RejectRequest>,
) -> Result<Json<StoredRightsRequest>, ApiError> {
    payload.validate()?;

    let repo = RightsRequestRepository::new(&state.storage);
    let mut request = repo.get(&request_id)?;

    request
        .transition(
            RequestStatus::Rejected,
            Some(serde_json::json!({ "reason": payload.reason })),
        )
        .map_err(|e| ApiError::unprocessable(e.to_string()))?;
    repo.update(&request)?;

    tracing::info!(request_id = %request.id, officer = %user.user_id, "request rejected");
    audit_log!(
        &state.storage,
        AuditEventType::RequestRejected,
        user,
        "request",
        &request.id
    );

    Ok(Json(request))
}

/// Read audit events.
///
/// Accessible to officers, admins and auditors.
#[utoipa::path(
    get,
    path = "/v1/admin/audit",
    params(AuditQuery),
    tag = "Admin",
    security(("bearer" = [])),
    responses(
        (status = 200, body = [AuditEvent]),
        (status = 400, description = "Malformed date"),
        (status = 403, description = "Requires an audit-capable role")
    )
)]
pub async fn read_audit(
    State(state): State<AppState>,
    Auth(user): Auth,
    Query(params): Query<AuditQuery>,
) -> Result<Json<Vec<AuditEvent>>, ApiError> {
    if !user.role.can_view_audit() {
        audit_log!(&state.storage, AuditEventType::PermissionDenied, user);
        return Err(ApiError::new(
            StatusCode::FORBIDDEN,
            "audit access requires an officer, admin or auditor role",
        ));
    }

    let repo = AuditRepository::new(&state.storage);

    let events = match (params.start_date, params.end_date) {
        (Some(start), Some(end)) => repo
            .read_events_range(&start, &end)
            .map_err(|e| ApiError::bad_request(e.to_string()))?,
        (None, None) => {
            let date = params
                .date
                .unwrap_or_else(|| Utc::now().format("%Y-%m-%d").to_string());
            // A day with no activity has no log file.
            repo.read_events(&date).unwrap_or_default()
        }
        _ => {
            return Err(ApiError::bad_request(
                "start_date and end_date must be provided together",
            ))
        }
    };

    Ok(Json(events))
}
