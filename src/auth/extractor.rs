// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Dhaara Labs

//! Axum extractor for authenticated users.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is AuthenticatedUser
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use super::{claims::Claims, AuthenticatedUser, AuthError};
use crate::state::{AppState, AuthConfig};

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Extractor for authenticated users.
///
/// Validates the JWT from the Authorization header and provides the
/// authenticated user information.
///
/// ## Authentication Modes
///
/// - **Production mode** (JWT_SECRET set): full HS256 signature verification
/// - **Development mode** (no secret): structure validation only
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // First check if middleware already set the user
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>().cloned() {
            return Ok(Auth(user));
        }

        // Extract Authorization header
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthHeader)?
            .to_str()
            .map_err(|_| AuthError::InvalidAuthHeader)?;

        // Extract Bearer token
        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidAuthHeader)?;

        let user = verify_jwt(token, &state.auth_config)?;

        Ok(Auth(user))
    }
}

/// Verify a JWT and extract user information.
fn verify_jwt(token: &str, auth_config: &AuthConfig) -> Result<AuthenticatedUser, AuthError> {
    if let Some(ref secret) = auth_config.secret {
        verify_jwt_production(token, secret, auth_config)
    } else {
        verify_jwt_development(token)
    }
}

/// Production JWT verification (HS256 against the configured secret).
fn verify_jwt_production(
    token: &str,
    secret: &str,
    auth_config: &AuthConfig,
) -> Result<AuthenticatedUser, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = CLOCK_SKEW_LEEWAY;

    if let Some(ref issuer) = auth_config.issuer {
        validation.set_issuer(&[issuer]);
    }
    if let Some(ref audience) = auth_config.audience {
        validation.set_audience(&[audience]);
    } else {
        validation.validate_aud = false;
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let token_data =
        decode::<Claims>(token, &decoding_key, &validation).map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
            jsonwebtoken::errors::ErrorKind::InvalidIssuer => AuthError::InvalidIssuer,
            jsonwebtoken::errors::ErrorKind::InvalidAudience => AuthError::InvalidAudience,
            jsonwebtoken::errors::ErrorKind::ImmatureSignature => AuthError::TokenNotYetValid,
            _ => AuthError::MalformedToken,
        })?;

    Ok(AuthenticatedUser::from_claims(token_data.claims))
}

/// Development JWT verification (no signature check).
///
/// WARNING: This should only be used in development environments.
fn verify_jwt_development(token: &str) -> Result<AuthenticatedUser, AuthError> {
    let token_data = jsonwebtoken::dangerous::insecure_decode::<Claims>(token)
        .map_err(|_e| AuthError::MalformedToken)?;

    let claims = token_data.claims;

    // Check expiration manually
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_err(|e| AuthError::InternalError(e.to_string()))?
        .as_secs() as i64;

    if claims.exp > 0 && claims.exp < now - CLOCK_SKEW_LEEWAY as i64 {
        return Err(AuthError::TokenExpired);
    }

    Ok(AuthenticatedUser::from_claims(claims))
}

/// Extractor that requires a request-management role (officer or admin).
pub struct OfficerOnly(pub AuthenticatedUser);

impl FromRequestParts<AppState> for OfficerOnly {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Auth(user) = Auth::from_request_parts(parts, state).await?;

        if !user.role.can_manage_requests() {
            return Err(AuthError::InsufficientPermissions);
        }

        Ok(OfficerOnly(user))
    }
}

/// Extractor that requires admin role.
pub struct AdminOnly(pub AuthenticatedUser);

impl FromRequestParts<AppState> for AdminOnly {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Auth(user) = Auth::from_request_parts(parts, state).await?;

        if !user.is_admin() {
            return Err(AuthError::InsufficientPermissions);
        }

        Ok(AdminOnly(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::state::{AppState, AuthConfig};
    use crate::storage::{FileStorage, StoragePaths};
    use axum::http::Request;
    use tempfile::TempDir;

    /// Helper to create a test AppState (development mode by default).
    fn create_test_state(secret: Option<&str>) -> (AppState, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let paths = StoragePaths::new(temp_dir.path());
        let mut storage = FileStorage::new(paths);
        storage.initialize().expect("Failed to initialize storage");

        let state = AppState::new(storage).with_auth_config(AuthConfig {
            secret: secret.map(String::from),
            issuer: None,
            audience: None,
        });
        (state, temp_dir)
    }

    /// Helper to create a test JWT token (unsigned, for development mode).
    fn create_test_jwt(user_id: &str, role: &str) -> String {
        use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

        let header = r#"{"alg":"HS256","typ":"JWT"}"#;
        let claims = format!(
            r#"{{"sub":"{user_id}","iat":1609459200,"exp":9999999999,"iss":"test","sid":"sess_123","role":"{role}"}}"#
        );

        let header_b64 = URL_SAFE_NO_PAD.encode(header.as_bytes());
        let claims_b64 = URL_SAFE_NO_PAD.encode(claims.as_bytes());

        // Signature doesn't matter in development mode
        format!("{header_b64}.{claims_b64}.fake_signature")
    }

    fn parts_with_token(token: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/test");
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn auth_extractor_requires_auth_header() {
        let (state, _temp_dir) = create_test_state(None);
        let mut parts = parts_with_token(None);

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingAuthHeader)));
    }

    #[tokio::test]
    async fn auth_extractor_succeeds_with_jwt() {
        let (state, _temp_dir) = create_test_state(None);
        let token = create_test_jwt("user_123", "principal");
        let mut parts = parts_with_token(Some(&token));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        let user = result.unwrap().0;
        assert_eq!(user.user_id, "user_123");
        assert_eq!(user.role, Role::Principal);
    }

    #[tokio::test]
    async fn auth_extractor_prefers_extensions() {
        let (state, _temp_dir) = create_test_state(None);
        let mut parts = parts_with_token(None);

        let user = AuthenticatedUser {
            user_id: "user_from_middleware".to_string(),
            role: Role::Admin,
            session_id: None,
            issuer: "middleware".to_string(),
            expires_at: 0,
        };
        parts.extensions.insert(user.clone());

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert_eq!(result.unwrap().0.user_id, "user_from_middleware");
    }

    #[tokio::test]
    async fn production_mode_verifies_signature() {
        let secret = "test-signing-secret";
        let (state, _temp_dir) = create_test_state(Some(secret));

        let claims = serde_json::json!({
            "sub": "user_hs256",
            "iat": 1609459200,
            "exp": 9999999999u64,
            "iss": "test",
            "role": "officer"
        });
        let token = jsonwebtoken::encode(
            &jsonwebtoken::Header::new(Algorithm::HS256),
            &claims,
            &jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        let mut parts = parts_with_token(Some(&token));
        let user = Auth::from_request_parts(&mut parts, &state).await.unwrap().0;
        assert_eq!(user.user_id, "user_hs256");
        assert_eq!(user.role, Role::Officer);
    }

    #[tokio::test]
    async fn production_mode_rejects_bad_signature() {
        let (state, _temp_dir) = create_test_state(Some("real-secret"));

        let claims = serde_json::json!({
            "sub": "user_evil",
            "exp": 9999999999u64,
        });
        let token = jsonwebtoken::encode(
            &jsonwebtoken::Header::new(Algorithm::HS256),
            &claims,
            &jsonwebtoken::EncodingKey::from_secret(b"wrong-secret"),
        )
        .unwrap();

        let mut parts = parts_with_token(Some(&token));
        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InvalidSignature)));
    }

    #[tokio::test]
    async fn officer_only_rejects_principal() {
        let (state, _temp_dir) = create_test_state(None);
        let token = create_test_jwt("user_123", "principal");
        let mut parts = parts_with_token(Some(&token));

        let result = OfficerOnly::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InsufficientPermissions)));
    }

    #[tokio::test]
    async fn officer_only_accepts_officer_and_admin() {
        let (state, _temp_dir) = create_test_state(None);

        for role in ["officer", "admin"] {
            let token = create_test_jwt("user_123", role);
            let mut parts = parts_with_token(Some(&token));
            let result = OfficerOnly::from_request_parts(&mut parts, &state).await;
            assert!(result.is_ok(), "{role} should pass OfficerOnly");
        }
    }

    #[tokio::test]
    async fn admin_only_rejects_officer() {
        let (state, _temp_dir) = create_test_state(None);
        let token = create_test_jwt("user_123", "officer");
        let mut parts = parts_with_token(Some(&token));

        let result = AdminOnly::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InsufficientPermissions)));
    }
}
