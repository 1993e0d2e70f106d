// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Dhaara Labs

//! Principal-facing rights request endpoints.
//!
//! All submissions create a pending [`StoredRightsRequest`] with the
//! statutory deadline stamped at creation. Principals only ever see their
//! own requests; cross-principal reads 404.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    audit_log,
    auth::Auth,
    error::ApiError,
    models::{
        normalize_categories, ErasureScope, RequestDetail, RequestStatus, SubmitAccessRequest,
        SubmitCorrectionRequest, SubmitErasureRequest, SubmitPortabilityRequest,
    },
    state::AppState,
    storage::{AuditEventType, OwnershipEnforcer, RightsRequestRepository, StoredRightsRequest},
};

#[derive(Deserialize, IntoParams)]
pub struct StatusQuery {
    /// Restrict the listing to one lifecycle state.
    pub status: Option<RequestStatus>,
}

fn persist_submission(
    state: &AppState,
    request: &StoredRightsRequest,
) -> Result<(), ApiError> {
    let repo = RightsRequestRepository::new(&state.storage);
    repo.create(request)?;

    tracing::info!(
        request_id = %request.id,
        request_type = %request.request_type,
        "rights request submitted"
    );
    Ok(())
}

/// Submit an access request.
#[utoipa::path(
    post,
    path = "/v1/requests/access",
    request_body = SubmitAccessRequest,
    tag = "Requests",
    security(("bearer" = [])),
    responses(
        (status = 201, body = StoredRightsRequest),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn submit_access(
    State(state): State<AppState>,
    Auth(user): Auth,
    Json(request): Json<SubmitAccessRequest>,
) -> Result<(StatusCode, Json<StoredRightsRequest>), ApiError> {
    request.validate()?;

    let stored = StoredRightsRequest::new(
        &user.user_id,
        RequestDetail::Access,
        normalize_categories(request.categories),
        request.reason,
        None,
    );
    persist_submission(&state, &stored)?;
    audit_log!(
        &state.storage,
        AuditEventType::RequestSubmitted,
        user,
        "request",
        &stored.id
    );

    Ok((StatusCode::CREATED, Json(stored)))
}

/// Submit an erasure request.
///
/// A `partial` scope requires at least one data category; a `full` scope
/// covers everything and ignores any category list.
#[utoipa::path(
    post,
    path = "/v1/requests/erasure",
    request_body = SubmitErasureRequest,
    tag = "Requests",
    security(("bearer" = [])),
    responses(
        (status = 201, body = StoredRightsRequest),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn submit_erasure(
    State(state): State<AppState>,
    Auth(user): Auth,
    Json(request): Json<SubmitErasureRequest>,
) -> Result<(StatusCode, Json<StoredRightsRequest>), ApiError> {
    request.validate()?;

    let categories = match request.scope {
        ErasureScope::Full => Vec::new(),
        ErasureScope::Partial => normalize_categories(request.categories),
    };

    let stored = StoredRightsRequest::new(
        &user.user_id,
        RequestDetail::Erasure {
            scope: request.scope,
        },
        categories,
        Some(request.reason),
        None,
    );
    persist_submission(&state, &stored)?;
    audit_log!(
        &state.storage,
        AuditEventType::RequestSubmitted,
        user,
        "request",
        &stored.id
    );

    Ok((StatusCode::CREATED, Json(stored)))
}

/// Submit a correction request.
#[utoipa::path(
    post,
    path = "/v1/requests/correction",
    request_body = SubmitCorrectionRequest,
    tag = "Requests",
    security(("bearer" = [])),
    responses(
        (status = 201, body = StoredRightsRequest),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn submit_correction(
    State(state): State<AppState>,
    Auth(user): Auth,
    Json(request): Json<SubmitCorrectionRequest>,
) -> Result<(StatusCode, Json<StoredRightsRequest>), ApiError> {
    request.validate()?;

    let stored = StoredRightsRequest::new(
        &user.user_id,
        RequestDetail::Correction {
            corrections: request.corrections,
        },
        Vec::new(),
        request.reason,
        None,
    );
    persist_submission(&state, &stored)?;
    audit_log!(
        &state.storage,
        AuditEventType::RequestSubmitted,
        user,
        "request",
        &stored.id
    );

    Ok((StatusCode::CREATED, Json(stored)))
}

/// Submit a portability request.
#[utoipa::path(
    post,
    path = "/v1/requests/portability",
    request_body = SubmitPortabilityRequest,
    tag = "Requests",
    security(("bearer" = [])),
    responses(
        (status = 201, body = StoredRightsRequest),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn submit_portability(
    State(state): State<AppState>,
    Auth(user): Auth,
    Json(request): Json<SubmitPortabilityRequest>,
) -> Result<(StatusCode, Json<StoredRightsRequest>), ApiError> {
    request.validate()?;

    let stored = StoredRightsRequest::new(
        &user.user_id,
        RequestDetail::Portability {
            format: request.format,
        },
        normalize_categories(request.categories),
        None,
        None,
    );
    persist_submission(&state, &stored)?;
    audit_log!(
        &state.storage,
        AuditEventType::RequestSubmitted,
        user,
        "request",
        &stored.id
    );

    Ok((StatusCode::CREATED, Json(stored)))
}

/// List the caller's requests, newest first.
#[utoipa::path(
    get,
    path = "/v1/requests",
    params(StatusQuery),
    tag = "Requests",
    security(("bearer" = [])),
    responses((status = 200, body = [StoredRightsRequest]))
)]
pub async fn list_my_requests(
    State(state): State<AppState>,
    Auth(user): Auth,
    Query(params): Query<StatusQuery>,
) -> Result<Json<Vec<StoredRightsRequest>>, ApiError> {
    let repo = RightsRequestRepository::new(&state.storage);
    let mut requests = repo.list_by_requester(&user.user_id)?;

    if let Some(status) = params.status {
        requests.retain(|r| r.status == status);
    }

    Ok(Json(requests))
}

/// Fetch a single request.
///
/// Principals can only fetch their own; officers, admins and auditors can
/// fetch any.
#[utoipa::path(
    get,
    path = "/v1/requests/{request_id}",
    params(
        ("request_id" = String, Path, description = "Identifier of the request")
    ),
    tag = "Requests",
    security(("bearer" = [])),
    responses(
        (status = 200, body = StoredRightsRequest),
        (status = 404, description = "Unknown request")
    )
)]
pub async fn get_request(
    Path(request_id): Path<String>,
    State(state): State<AppState>,
    Auth(user): Auth,
) -> Result<Json<StoredRightsRequest>, ApiError> {
    let repo = RightsRequestRepository::new(&state.storage);
    let request = repo.get(&request_id)?;

    if !user.role.can_manage_requests() && !user.role.can_view_audit() {
        request.verify_ownership(&user)?;
    }

    Ok(Json(request))
}

/// Cancel a pending request.
///
/// Only the requester may cancel, and only while the request is pending.
#[utoipa::path(
    post,
    path = "/v1/requests/{request_id}/cancel",
    params(
        ("request_id" = String, Path, description = "Identifier of the request")
    ),
    tag = "Requests",
    security(("bearer" = [])),
    responses(
        (status = 200, body = StoredRightsRequest),
        (status = 404, description = "Unknown request"),
        (status = 422, description = "Request is not pending")
    )
)]
pub async fn cancel_request(
    Path(request_id): Path<String>,
    State(state): State<AppState>,
    Auth(user): Auth,
) -> Result<Json<StoredRightsRequest>, ApiError> {
    let repo = RightsRequestRepository::new(&state.storage);
    let mut request = repo.get(&request_id)?;

    // Cancellation is requester-only, even for officers.
    request.verify_ownership(&user)?;

    request
        .transition(RequestStatus::Cancelled, None)
        .map_err(|e| ApiError::unprocessable(e.to_string()))?;
    repo.update(&request)?;

    audit_log!(
        &state.storage,
        AuditEventType::RequestCancelled,
        user,
        "request",
        &request.id
    );

    Ok(Json(request))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthenticatedUser, Role};
    use crate::models::{DataCategory, RequestType};
    use crate::storage::{FileStorage, StoragePaths};
    use tempfile::TempDir;

    fn test_state() -> (AppState, TempDir) {
        let temp = TempDir::new().unwrap();
        let mut storage = FileStorage::new(StoragePaths::new(temp.path()));
        storage.initialize().unwrap();
        (AppState::new(storage), temp)
    }

    fn principal(user_id: &str) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: user_id.to_string(),
            role: Role::Principal,
            session_id: None,
            issuer: "test".to_string(),
            expires_at: 0,
        }
    }

    #[tokio::test]
    async fn submit_access_creates_pending_request() {
        let (state, _temp) = test_state();

        let (status, Json(stored)) = submit_access(
            State(state.clone()),
            Auth(principal("user-1")),
            Json(SubmitAccessRequest {
                categories: Some(vec![DataCategory::Profile, DataCategory::Profile]),
                reason: None,
            }),
        )
        .await
        .expect("submission succeeds");

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(stored.request_type, RequestType::Access);
        assert_eq!(stored.status, RequestStatus::Pending);
        assert_eq!(stored.requester_id, "user-1");
        // Duplicates collapse
        assert_eq!(stored.categories, vec![DataCategory::Profile]);

        let repo = RightsRequestRepository::new(&state.storage);
        assert!(repo.exists(&stored.id));
    }

    #[tokio::test]
    async fn partial_erasure_without_categories_is_rejected() {
        let (state, _temp) = test_state();

        let err = submit_erasure(
            State(state),
            Auth(principal("user-1")),
            Json(SubmitErasureRequest {
                scope: ErasureScope::Partial,
                categories: Some(vec![]),
                reason: "please erase".into(),
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn full_erasure_ignores_categories() {
        let (state, _temp) = test_state();

        let (_, Json(stored)) = submit_erasure(
            State(state),
            Auth(principal("user-1")),
            Json(SubmitErasureRequest {
                scope: ErasureScope::Full,
                categories: Some(vec![DataCategory::Staking]),
                reason: "closing my account".into(),
            }),
        )
        .await
        .unwrap();

        assert!(stored.categories.is_empty());
        assert_eq!(
            stored.detail,
            RequestDetail::Erasure {
                scope: ErasureScope::Full
            }
        );
    }

    #[tokio::test]
    async fn oversized_reason_is_rejected() {
        let (state, _temp) = test_state();

        let err = submit_erasure(
            State(state),
            Auth(principal("user-1")),
            Json(SubmitErasureRequest {
                scope: ErasureScope::Full,
                categories: None,
                reason: "x".repeat(501),
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn listing_is_scoped_to_the_caller() {
        let (state, _temp) = test_state();

        for user in ["user-1", "user-1", "user-2"] {
            submit_access(
                State(state.clone()),
                Auth(principal(user)),
                Json(SubmitAccessRequest {
                    categories: None,
                    reason: None,
                }),
            )
            .await
            .unwrap();
        }

        let Json(mine) = list_my_requests(
            State(state.clone()),
            Auth(principal("user-1")),
            Query(StatusQuery { status: None }),
        )
        .await
        .unwrap();
        assert_eq!(mine.len(), 2);

        let Json(none) = list_my_requests(
            State(state),
            Auth(principal("user-3")),
            Query(StatusQuery {
                status: Some(RequestStatus::Pending),
            }),
        )
        .await
        .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn cross_principal_get_returns_404() {
        let (state, _temp) = test_state();

        let (_, Json(stored)) = submit_access(
            State(state.clone()),
            Auth(principal("user-1")),
            Json(SubmitAccessRequest {
                categories: None,
                reason: None,
            }),
        )
        .await
        .unwrap();

        let err = get_request(
            Path(stored.id.clone()),
            State(state.clone()),
            Auth(principal("user-2")),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);

        // An officer can read it.
        let officer = AuthenticatedUser {
            user_id: "officer-1".to_string(),
            role: Role::Officer,
            session_id: None,
            issuer: "test".to_string(),
            expires_at: 0,
        };
        let Json(seen) = get_request(Path(stored.id.clone()), State(state), Auth(officer))
            .await
            .unwrap();
        assert_eq!(seen.id, stored.id);
    }

    #[tokio::test]
    async fn cancel_is_pending_only_and_requester_only() {
        let (state, _temp) = test_state();

        let (_, Json(stored)) = submit_portability(
            State(state.clone()),
            Auth(principal("user-1")),
            Json(SubmitPortabilityRequest {
                format: crate::models::ExportFormat::Json,
                categories: None,
            }),
        )
        .await
        .unwrap();

        // Another principal cannot cancel (404, not 403).
        let err = cancel_request(
            Path(stored.id.clone()),
            State(state.clone()),
            Auth(principal("user-2")),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);

        // The requester can.
        let Json(cancelled) = cancel_request(
            Path(stored.id.clone()),
            State(state.clone()),
            Auth(principal("user-1")),
        )
        .await
        .unwrap();
        assert_eq!(cancelled.status, RequestStatus::Cancelled);
        assert!(cancelled.completed_at.is_some());

        // A second cancel is refused: terminal states are absorbing.
        let err = cancel_request(
            Path(stored.id),
            State(state),
            Auth(principal("user-1")),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
