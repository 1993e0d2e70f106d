// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Dhaara Labs

//! # Storage Module
//!
//! File-backed persistence for rights requests, portability export
//! artifacts and the audit log. Each entity is a JSON file under the
//! configured data directory; writes are atomic (temp file + rename).
//!
//! ## Storage Layout
//!
//! ```text
//! /data/
//!   requests/
//!     {request_id}.json
//!   exports/
//!     {request_id}.{json|csv|xml}
//!   audit/
//!     {date}/events.jsonl  # Daily audit logs
//! ```

pub mod audit;
pub mod fs;
pub mod ownership;
pub mod paths;
pub mod repository;

pub use audit::{AuditEvent, AuditEventType, AuditRepository};
pub use fs::{FileStorage, StorageError, StorageResult};
pub use ownership::{OwnedResource, OwnershipEnforcer};
pub use paths::StoragePaths;
pub use repository::{RightsRequestRepository, StoredRightsRequest};
