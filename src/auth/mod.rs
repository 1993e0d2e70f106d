// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Dhaara Labs

//! # Authentication Module
//!
//! JWT authentication for the rights API.
//!
//! ## Auth Flow
//!
//! 1. The platform gateway authenticates the user and issues a JWT
//! 2. Clients send `Authorization: Bearer <JWT>`
//! 3. This service:
//!    - Verifies signature (HS256 against `JWT_SECRET`), expiry, issuer
//!    - Extracts `sub` → canonical `user_id` and the `role` claim
//!
//! ## Security
//!
//! - All non-health endpoints require authentication
//! - Without a configured secret (development only) tokens are decoded
//!   without signature verification
//! - Clock skew tolerance is 60 seconds

pub mod claims;
pub mod error;
pub mod extractor;
pub mod roles;

pub use claims::AuthenticatedUser;
pub use error::AuthError;
pub use extractor::{AdminOnly, Auth, OfficerOnly};
pub use roles::Role;
