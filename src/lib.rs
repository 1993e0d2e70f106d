// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Dhaara Labs

//! Dhaara Rights - DPDP Data Principal Rights Service
//!
//! This crate provides the data-subject-rights backend for the Dhaara
//! identity platform: access, erasure, correction, portability and
//! grievance requests, processed under the statutory DPDP deadline.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Authentication and authorization (JWT)
//! - `export` - Portability export rendering (json / csv / xml)
//! - `storage` - File-backed persistence and audit log
//! - `verify` - API Setu identity verification client

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod state;
pub mod storage;
pub mod verify;
