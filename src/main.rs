// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Dhaara Labs

use std::net::SocketAddr;

use tokio_util::sync::CancellationToken;

use dhaara_rights_server::api::router;
use dhaara_rights_server::config::{AppConfig, LogFormat};
use dhaara_rights_server::state::AppState;
use dhaara_rights_server::storage::{FileStorage, StoragePaths};

#[tokio::main]
async fn main() {
    // Pick up a local .env in development; harmless elsewhere.
    dotenvy::dotenv().ok();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            std::process::exit(1);
        }
    };

    init_tracing(&config);

    let mut storage = FileStorage::new(StoragePaths::new(&config.data_dir));
    if let Err(e) = storage.initialize() {
        tracing::error!(data_dir = %config.data_dir.display(), error = %e, "failed to initialize storage");
        std::process::exit(1);
    }

    let state = AppState::from_config(&config, storage);
    let app = router(state);

    let addr: SocketAddr = config
        .bind_addr()
        .parse()
        .expect("Failed to parse bind address");

    tracing::info!(
        %addr,
        environment = %config.environment,
        "rights service listening (docs at /docs)"
    );

    // Drain in-flight requests on SIGINT before exiting.
    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown signal received");
            shutdown.cancel();
        });
    }

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .expect("HTTP server failed");
}

fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));

    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}
