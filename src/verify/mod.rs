// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Dhaara Labs

//! API Setu identity verification client.

pub mod client;

pub use client::{ApiSetuClient, VerificationStatus, VerifyError};
