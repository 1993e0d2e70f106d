// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Dhaara Labs

//! JWT claims and authenticated user representation.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::roles::Role;

/// Claims carried by a platform-issued JWT.
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    /// Subject (user ID) - the canonical platform user identifier
    pub sub: String,

    /// Issued at timestamp
    #[serde(default)]
    pub iat: i64,

    /// Expiration timestamp
    #[serde(default)]
    pub exp: i64,

    /// Issuer
    #[serde(default)]
    pub iss: String,

    /// Audience (validated by the jsonwebtoken crate, not read directly)
    #[serde(default)]
    #[allow(dead_code)]
    pub aud: Option<serde_json::Value>,

    /// Session ID
    #[serde(default)]
    pub sid: Option<String>,

    /// User's role (custom claim set by the gateway)
    #[serde(default)]
    pub role: Option<String>,
}

/// Authenticated user information extracted from a JWT.
///
/// This is the primary type used throughout the application to represent
/// the authenticated user making a request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Canonical user ID (`sub` claim)
    pub user_id: String,

    /// User's role
    pub role: Role,

    /// Session ID (if available)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    /// Original issuer (used for validation, not serialized)
    #[serde(skip)]
    pub issuer: String,

    /// Token expiration (Unix timestamp, used for validation, not serialized)
    #[serde(skip)]
    pub expires_at: i64,
}

impl AuthenticatedUser {
    /// Create from token claims, defaulting unknown roles to Principal.
    pub fn from_claims(claims: Claims) -> Self {
        let role = claims
            .role
            .as_deref()
            .and_then(Role::from_str)
            .unwrap_or(Role::Principal);

        Self {
            user_id: claims.sub,
            role,
            session_id: claims.sid,
            issuer: claims.iss,
            expires_at: claims.exp,
        }
    }

    /// Check if the user has the required role.
    pub fn has_role(&self, required: Role) -> bool {
        self.role.has_privilege(required)
    }

    /// Check if this user is an admin.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_claims() -> Claims {
        Claims {
            sub: "user_123".to_string(),
            iat: 1700000000,
            exp: 1700003600,
            iss: "https://auth.dhaara.example".to_string(),
            aud: None,
            sid: Some("sess_abc".to_string()),
            role: Some("officer".to_string()),
        }
    }

    #[test]
    fn from_claims_extracts_user_id() {
        let user = AuthenticatedUser::from_claims(sample_claims());
        assert_eq!(user.user_id, "user_123");
    }

    #[test]
    fn from_claims_extracts_role() {
        let user = AuthenticatedUser::from_claims(sample_claims());
        assert_eq!(user.role, Role::Officer);
    }

    #[test]
    fn from_claims_defaults_to_principal_role() {
        let mut claims = sample_claims();
        claims.role = None;
        let user = AuthenticatedUser::from_claims(claims);
        assert_eq!(user.role, Role::Principal);

        let mut claims = sample_claims();
        claims.role = Some("superuser".to_string());
        let user = AuthenticatedUser::from_claims(claims);
        assert_eq!(user.role, Role::Principal);
    }

    #[test]
    fn has_role_checks_privilege() {
        let mut claims = sample_claims();
        claims.role = Some("admin".to_string());
        let user = AuthenticatedUser::from_claims(claims);

        assert!(user.is_admin());
        assert!(user.has_role(Role::Officer));
        assert!(user.has_role(Role::Principal));
    }
}
