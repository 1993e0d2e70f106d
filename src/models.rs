// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Dhaara Labs

//! # API Data Models
//!
//! Request and response structures for the data-principal-rights API,
//! together with the domain rules that govern them: the request lifecycle
//! graph, the statutory response deadline and submission validation.
//!
//! ## Model Categories
//!
//! - **Rights requests**: access / erasure / correction / portability
//! - **Grievances**: complaints, optionally tied to an earlier request
//! - **Lifecycle**: status labels and the allowed transitions between them

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ApiError;

/// Maximum length (in characters) of a free-text reason.
pub const MAX_REASON_LEN: usize = 500;

/// Maximum length (in characters) of a grievance description.
pub const MAX_GRIEVANCE_DESCRIPTION_LEN: usize = 2000;

/// Days the fiduciary has to answer a request under the DPDP framework.
pub const STATUTORY_RESPONSE_DAYS: i64 = 30;

/// Statutory response deadline for a request submitted at `submitted_at`.
pub fn response_deadline(submitted_at: DateTime<Utc>) -> DateTime<Utc> {
    submitted_at + Duration::days(STATUTORY_RESPONSE_DAYS)
}

// =============================================================================
// Domain Enumerations
// =============================================================================

/// The statutory right a request exercises.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    Access,
    Erasure,
    Correction,
    Portability,
    Grievance,
}

impl std::fmt::Display for RequestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestType::Access => write!(f, "access"),
            RequestType::Erasure => write!(f, "erasure"),
            RequestType::Correction => write!(f, "correction"),
            RequestType::Portability => write!(f, "portability"),
            RequestType::Grievance => write!(f, "grievance"),
        }
    }
}

/// Lifecycle state of a rights request.
///
/// Transitions are monotonic: once a request reaches a terminal state it
/// never leaves it, and a request never moves back to an earlier state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Processing,
    Completed,
    Rejected,
    Cancelled,
}

impl RequestStatus {
    /// Whether `next` is a legal successor of this state.
    ///
    /// ```text
    /// pending    -> processing | rejected | cancelled
    /// processing -> completed  | rejected
    /// completed / rejected / cancelled are absorbing
    /// ```
    pub fn can_transition(self, next: RequestStatus) -> bool {
        use RequestStatus::*;
        matches!(
            (self, next),
            (Pending, Processing)
                | (Pending, Rejected)
                | (Pending, Cancelled)
                | (Processing, Completed)
                | (Processing, Rejected)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RequestStatus::Completed | RequestStatus::Rejected | RequestStatus::Cancelled
        )
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Processing => "processing",
            RequestStatus::Completed => "completed",
            RequestStatus::Rejected => "rejected",
            RequestStatus::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

/// The fixed enumeration of personal-data categories held by the platform.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "snake_case")]
pub enum DataCategory {
    Profile,
    Identity,
    Verifications,
    Credentials,
    Reputation,
    Consents,
    Staking,
    Activity,
    Pii,
}

impl DataCategory {
    /// All categories, in canonical order. A request with no explicit
    /// category list covers everything.
    pub const ALL: [DataCategory; 9] = [
        DataCategory::Profile,
        DataCategory::Identity,
        DataCategory::Verifications,
        DataCategory::Credentials,
        DataCategory::Reputation,
        DataCategory::Consents,
        DataCategory::Staking,
        DataCategory::Activity,
        DataCategory::Pii,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DataCategory::Profile => "profile",
            DataCategory::Identity => "identity",
            DataCategory::Verifications => "verifications",
            DataCategory::Credentials => "credentials",
            DataCategory::Reputation => "reputation",
            DataCategory::Consents => "consents",
            DataCategory::Staking => "staking",
            DataCategory::Activity => "activity",
            DataCategory::Pii => "pii",
        }
    }
}

/// Whether an erasure request covers all held data or named categories.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErasureScope {
    Full,
    Partial,
}

/// Output format of a portability export.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Json,
    Csv,
    Xml,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Xml => "xml",
        }
    }
}

/// Grievance classification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GrievanceCategory {
    DataMisuse,
    ConsentViolation,
    SecurityConcern,
    ResponseDelay,
    Other,
}

// =============================================================================
// Request Detail
// =============================================================================

/// Per-type payload carried by a stored request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RequestDetail {
    Access,
    Erasure {
        scope: ErasureScope,
    },
    Correction {
        corrections: BTreeMap<String, String>,
    },
    Portability {
        format: ExportFormat,
    },
    Grievance {
        category: GrievanceCategory,
        description: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        related_request_id: Option<String>,
    },
}

impl RequestDetail {
    pub fn request_type(&self) -> RequestType {
        match self {
            RequestDetail::Access => RequestType::Access,
            RequestDetail::Erasure { .. } => RequestType::Erasure,
            RequestDetail::Correction { .. } => RequestType::Correction,
            RequestDetail::Portability { .. } => RequestType::Portability,
            RequestDetail::Grievance { .. } => RequestType::Grievance,
        }
    }
}

// =============================================================================
// Submission DTOs
// =============================================================================

/// Deduplicate a submitted category list, preserving canonical order.
/// `None` and `Some([])` both mean "all categories".
pub fn normalize_categories(categories: Option<Vec<DataCategory>>) -> Vec<DataCategory> {
    let mut set: Vec<DataCategory> = Vec::new();
    if let Some(submitted) = categories {
        for category in DataCategory::ALL {
            if submitted.contains(&category) {
                set.push(category);
            }
        }
    }
    set
}

fn validate_reason(reason: &str) -> Result<(), ApiError> {
    if reason.trim().is_empty() {
        return Err(ApiError::bad_request("reason must not be empty"));
    }
    if reason.chars().count() > MAX_REASON_LEN {
        return Err(ApiError::bad_request(format!(
            "reason must be at most {MAX_REASON_LEN} characters"
        )));
    }
    Ok(())
}

/// Request to access held personal data.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmitAccessRequest {
    /// Categories to include; empty or absent means all.
    #[serde(default)]
    pub categories: Option<Vec<DataCategory>>,
    /// Optional context for the request.
    #[serde(default)]
    pub reason: Option<String>,
}

impl SubmitAccessRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if let Some(ref reason) = self.reason {
            validate_reason(reason)?;
        }
        Ok(())
    }
}

/// Request to erase held personal data.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmitErasureRequest {
    /// Whether the erasure covers everything or only named categories.
    pub scope: ErasureScope,
    /// Required and non-empty when `scope` is `partial`; ignored for `full`.
    #[serde(default)]
    pub categories: Option<Vec<DataCategory>>,
    /// Justification for the erasure. Required.
    pub reason: String,
}

impl SubmitErasureRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        validate_reason(&self.reason)?;
        if self.scope == ErasureScope::Partial
            && normalize_categories(self.categories.clone()).is_empty()
        {
            return Err(ApiError::bad_request(
                "partial erasure requires at least one data category",
            ));
        }
        Ok(())
    }
}

/// Request to correct held personal data.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmitCorrectionRequest {
    /// Field name to corrected value.
    pub corrections: BTreeMap<String, String>,
    #[serde(default)]
    pub reason: Option<String>,
}

impl SubmitCorrectionRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.corrections.is_empty() {
            return Err(ApiError::bad_request(
                "correction requires at least one field",
            ));
        }
        if self.corrections.keys().any(|k| k.trim().is_empty()) {
            return Err(ApiError::bad_request("correction field names must not be empty"));
        }
        if let Some(ref reason) = self.reason {
            validate_reason(reason)?;
        }
        Ok(())
    }
}

/// Request for a machine-readable export of held personal data.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmitPortabilityRequest {
    /// Output format of the export artifact.
    pub format: ExportFormat,
    /// Categories to include; empty or absent means all.
    #[serde(default)]
    pub categories: Option<Vec<DataCategory>>,
}

impl SubmitPortabilityRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        Ok(())
    }
}

/// Grievance submission.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmitGrievanceRequest {
    pub category: GrievanceCategory,
    /// What happened, in the principal's words.
    pub description: String,
    /// An earlier request this grievance relates to, if any.
    #[serde(default)]
    pub related_request_id: Option<String>,
}

impl SubmitGrievanceRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.description.trim().is_empty() {
            return Err(ApiError::bad_request("description must not be empty"));
        }
        if self.description.chars().count() > MAX_GRIEVANCE_DESCRIPTION_LEN {
            return Err(ApiError::bad_request(format!(
                "description must be at most {MAX_GRIEVANCE_DESCRIPTION_LEN} characters"
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Officer DTOs
// =============================================================================

/// Officer completion payload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CompleteRequest {
    /// Response recorded on the request. For portability requests this is
    /// the per-category data bundle to render.
    #[schema(value_type = Object)]
    pub response: serde_json::Value,
}

/// Officer rejection payload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RejectRequest {
    /// Why the request was refused. Recorded on the request and audited.
    pub reason: String,
}

impl RejectRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        validate_reason(&self.reason)
    }
}
