// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Dhaara Labs

//! Grievance endpoints.
//!
//! Grievances travel the same lifecycle as other rights requests; the
//! complaint text and classification live in the typed detail.

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    audit_log,
    auth::Auth,
    error::ApiError,
    models::{RequestDetail, SubmitGrievanceRequest},
    state::AppState,
    storage::{AuditEventType, RightsRequestRepository, StoredRightsRequest},
};

/// File a grievance.
///
/// `related_request_id`, when present, must reference an existing request
/// submitted by the same principal.
#[utoipa::path(
    post,
    path = "/v1/grievances",
    request_body = SubmitGrievanceRequest,
    tag = "Grievances",
    security(("bearer" = [])),
    responses(
        (status = 201, body = StoredRightsRequest),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Related request does not exist")
    )
)]
pub async fn submit_grievance(
    State(state): State<AppState>,
    Auth(user): Auth,
    Json(request): Json<SubmitGrievanceRequest>,
) -> Result<(StatusCode, Json<StoredRightsRequest>), ApiError> {
    request.validate()?;

    let repo = RightsRequestRepository::new(&state.storage);

    if let Some(ref related_id) = request.related_request_id {
        // The same message for "missing" and "someone else's" so related
        // ids cannot be used to probe for other principals' requests.
        let related = repo
            .get(related_id)
            .map_err(|_| ApiError::unprocessable("related_request_id does not reference one of your requests"))?;
        if related.requester_id != user.user_id {
            return Err(ApiError::unprocessable(
                "related_request_id does not reference one of your requests",
            ));
        }
    }

    let stored = StoredRightsRequest::new(
        &user.user_id,
        RequestDetail::Grievance {
            category: request.category,
            description: request.description,
            related_request_id: request.related_request_id,
        },
        Vec::new(),
        None,
        None,
    );
    repo.create(&stored)?;

    tracing::info!(request_id = %stored.id, "grievance filed");
    audit_log!(
        &state.storage,
        AuditEventType::GrievanceFiled,
        user,
        "request",
        &stored.id
    );

    Ok((StatusCode::CREATED, Json(stored)))
}
