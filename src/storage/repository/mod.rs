// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Dhaara Labs

//! Repository layer providing typed access to the rights store.

pub mod requests;

pub use requests::{RightsRequestRepository, StoredRightsRequest};
