// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Dhaara Labs

use std::sync::Arc;

use crate::config::AppConfig;
use crate::storage::FileStorage;
use crate::verify::ApiSetuClient;

/// JWT verification settings.
///
/// With a secret configured (production) tokens are verified as HS256
/// against `JWT_SECRET`. Without one (development) tokens are decoded
/// without signature verification.
#[derive(Clone, Default)]
pub struct AuthConfig {
    pub secret: Option<String>,
    pub issuer: Option<String>,
    pub audience: Option<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<FileStorage>,
    pub auth_config: AuthConfig,
    pub verifier: Option<Arc<ApiSetuClient>>,
}

impl AppState {
    pub fn new(storage: FileStorage) -> Self {
        Self {
            storage: Arc::new(storage),
            auth_config: AuthConfig::default(),
            verifier: None,
        }
    }

    pub fn with_auth_config(mut self, auth_config: AuthConfig) -> Self {
        self.auth_config = auth_config;
        self
    }

    pub fn with_verifier(mut self, verifier: ApiSetuClient) -> Self {
        self.verifier = Some(Arc::new(verifier));
        self
    }

    /// Assemble state from validated configuration and initialized storage.
    pub fn from_config(config: &AppConfig, storage: FileStorage) -> Self {
        let mut state = Self::new(storage).with_auth_config(AuthConfig {
            secret: config.jwt_secret.clone(),
            issuer: None,
            audience: None,
        });

        if let Some(ref api_setu) = config.api_setu {
            state = state.with_verifier(ApiSetuClient::new(
                api_setu.base_url.clone(),
                &api_setu.client_id,
                &api_setu.client_secret,
            ));
        }

        state
    }
}
