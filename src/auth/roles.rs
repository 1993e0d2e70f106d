// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Dhaara Labs

//! User roles for authorization.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// User roles for authorization.
///
/// ## Role Hierarchy
///
/// - `Admin` - Full access to all endpoints
/// - `Officer` - Data protection officer; processes rights requests
/// - `Principal` - Data principal; can only access own requests
/// - `Auditor` - Read-only access to audit logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full administrative access
    Admin,
    /// Data protection officer (manages request lifecycles)
    Officer,
    /// Normal data principal (owns requests)
    Principal,
    /// Auditor (read-only audit logs)
    Auditor,
}

impl Role {
    /// Check if this role has at least the privileges of the required role.
    pub fn has_privilege(&self, required: Role) -> bool {
        match (self, required) {
            // Admin can do anything
            (Role::Admin, _) => true,
            (Role::Officer, Role::Officer) => true,
            (Role::Principal, Role::Principal) => true,
            (Role::Auditor, Role::Auditor) => true,
            _ => false,
        }
    }

    /// Whether this role may drive request lifecycles (process, complete,
    /// reject) and see requests across principals.
    pub fn can_manage_requests(&self) -> bool {
        matches!(self, Role::Admin | Role::Officer)
    }

    /// Whether this role may read the audit log.
    pub fn can_view_audit(&self) -> bool {
        matches!(self, Role::Admin | Role::Officer | Role::Auditor)
    }

    /// Parse role from string (case-insensitive).
    pub fn from_str(s: &str) -> Option<Role> {
        match s.to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "officer" => Some(Role::Officer),
            "principal" => Some(Role::Principal),
            "auditor" => Some(Role::Auditor),
            _ => None,
        }
    }
}

impl Default for Role {
    /// Default role is Principal (least privilege for authenticated users).
    fn default() -> Self {
        Role::Principal
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Officer => write!(f, "officer"),
            Role::Principal => write!(f, "principal"),
            Role::Auditor => write!(f, "auditor"),
        }
    }
}
