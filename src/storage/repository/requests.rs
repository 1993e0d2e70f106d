// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Dhaara Labs

//! Rights request repository.
//!
//! Each request is stored as a separate JSON file under
//! `{data_dir}/requests/`. Requests are retained after they reach a
//! terminal state; there is no delete operation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{
    response_deadline, DataCategory, RequestDetail, RequestStatus, RequestType,
};

use super::super::{FileStorage, OwnedResource, StorageError, StorageResult};

/// A data-subject-rights request on disk.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct StoredRightsRequest {
    /// Unique request identifier (UUID).
    pub id: String,
    /// The data principal who submitted the request.
    pub requester_id: String,
    /// The statutory right being exercised.
    pub request_type: RequestType,
    /// Current lifecycle state.
    pub status: RequestStatus,
    /// Data categories in scope. Empty means all categories.
    pub categories: Vec<DataCategory>,
    /// Free-text justification supplied by the principal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Per-type payload.
    pub detail: RequestDetail,
    /// Submission timestamp.
    pub submitted_at: DateTime<Utc>,
    /// Statutory response deadline.
    pub due_at: DateTime<Utc>,
    /// When the request reached a terminal state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Response payload recorded at completion or rejection.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub response: Option<serde_json::Value>,
    /// Free-form metadata bag.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<serde_json::Value>,
}

/// Attempted lifecycle transition that the graph does not allow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidTransition {
    pub from: RequestStatus,
    pub to: RequestStatus,
}

impl std::fmt::Display for InvalidTransition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cannot move a {} request to {}", self.from, self.to)
    }
}

impl std::error::Error for InvalidTransition {}

impl StoredRightsRequest {
    /// Build a fresh pending request. The statutory deadline is fixed at
    /// submission time and never recomputed.
    pub fn new(
        requester_id: impl Into<String>,
        detail: RequestDetail,
        categories: Vec<DataCategory>,
        reason: Option<String>,
        metadata: Option<serde_json::Value>,
    ) -> Self {
        let submitted_at = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            requester_id: requester_id.into(),
            request_type: detail.request_type(),
            status: RequestStatus::Pending,
            categories,
            reason,
            detail,
            submitted_at,
            due_at: response_deadline(submitted_at),
            completed_at: None,
            response: None,
            metadata,
        }
    }

    /// Whether the statutory deadline has passed on an open request.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.status.is_terminal() && now > self.due_at
    }

    /// Move the request to `next`, recording `response` and stamping
    /// `completed_at` when a terminal state is entered.
    pub fn transition(
        &mut self,
        next: RequestStatus,
        response: Option<serde_json::Value>,
    ) -> Result<(), InvalidTransition> {
        if !self.status.can_transition(next) {
            return Err(InvalidTransition {
                from: self.status,
                to: next,
            });
        }

        self.status = next;
        if let Some(response) = response {
            self.response = Some(response);
        }
        if next.is_terminal() {
            self.completed_at = Some(Utc::now());
        }
        Ok(())
    }
}

impl OwnedResource for StoredRightsRequest {
    fn owner_user_id(&self) -> &str {
        &self.requester_id
    }

    fn resource_label(&self) -> String {
        format!("Request {}", self.id)
    }
}

/// Repository for rights request operations.
pub struct RightsRequestRepository<'a> {
    storage: &'a FileStorage,
}

impl<'a> RightsRequestRepository<'a> {
    /// Create a new RightsRequestRepository.
    pub fn new(storage: &'a FileStorage) -> Self {
        Self { storage }
    }

    /// Check if a request exists.
    pub fn exists(&self, request_id: &str) -> bool {
        self.storage.exists(self.storage.paths().request(request_id))
    }

    /// Get a request by ID.
    pub fn get(&self, request_id: &str) -> StorageResult<StoredRightsRequest> {
        let path = self.storage.paths().request(request_id);
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("Request {request_id}")));
        }
        self.storage.read_json(path)
    }

    /// Persist a new request.
    pub fn create(&self, request: &StoredRightsRequest) -> StorageResult<()> {
        let request_id = &request.id;

        if self.exists(request_id) {
            return Err(StorageError::AlreadyExists(format!("Request {request_id}")));
        }

        self.storage
            .write_json(self.storage.paths().request(request_id), request)
    }

    /// Overwrite an existing request.
    pub fn update(&self, request: &StoredRightsRequest) -> StorageResult<()> {
        let request_id = &request.id;

        if !self.exists(request_id) {
            return Err(StorageError::NotFound(format!("Request {request_id}")));
        }

        self.storage
            .write_json(self.storage.paths().request(request_id), request)
    }

    /// List all requests, newest first (officer view).
    pub fn list_all(&self) -> StorageResult<Vec<StoredRightsRequest>> {
        let ids = self
            .storage
            .list_files(self.storage.paths().requests_dir(), "json")?;

        let mut requests = Vec::new();
        for id in ids {
            if let Ok(request) = self.get(&id) {
                requests.push(request);
            }
        }

        sort_newest_first(&mut requests);
        Ok(requests)
    }

    /// List all requests submitted by a principal, newest first.
    pub fn list_by_requester(
        &self,
        requester_id: &str,
    ) -> StorageResult<Vec<StoredRightsRequest>> {
        let mut requests: Vec<StoredRightsRequest> = self
            .list_all()?
            .into_iter()
            .filter(|r| r.requester_id == requester_id)
            .collect();

        sort_newest_first(&mut requests);
        Ok(requests)
    }
}

/// Directory listing order is filesystem-dependent; sort by submission
/// time (ties broken by id) so responses are stable.
fn sort_newest_first(requests: &mut [StoredRightsRequest]) {
    requests.sort_by(|a, b| {
        b.submitted_at
            .cmp(&a.submitted_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}
