// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Dhaara Labs

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment once at startup and
//! validated into an [`AppConfig`]. Anything invalid aborts startup with a
//! [`ConfigError`].
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `APP_ENV` | `development`, `test` or `production` | `development` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `DATA_DIR` | Root directory for persistent storage | `/data` |
//! | `DATABASE_URL` | Platform database connection string | Optional |
//! | `REDIS_HOST` | Cache host | `127.0.0.1` |
//! | `REDIS_PORT` | Cache port | `6379` |
//! | `REDIS_PASSWORD` | Cache password | Optional |
//! | `JWT_SECRET` | HS256 signing secret | Required for production |
//! | `SOLANA_RPC_URL` | Blockchain RPC endpoint | `https://api.devnet.solana.com` |
//! | `SOLANA_NETWORK` | `mainnet-beta`, `testnet`, `devnet`, `localnet` | `devnet` |
//! | `IDENTITY_REGISTRY_PROGRAM_ID` | On-chain program id (opaque) | Optional |
//! | `VERIFICATION_ORACLE_PROGRAM_ID` | On-chain program id (opaque) | Optional |
//! | `CREDENTIAL_MANAGER_PROGRAM_ID` | On-chain program id (opaque) | Optional |
//! | `REPUTATION_ENGINE_PROGRAM_ID` | On-chain program id (opaque) | Optional |
//! | `STAKING_MANAGER_PROGRAM_ID` | On-chain program id (opaque) | Optional |
//! | `API_SETU_BASE_URL` | Verification API base URL | `https://apisetu.gov.in` |
//! | `API_SETU_CLIENT_ID` | Verification API client id | Required for production |
//! | `API_SETU_CLIENT_SECRET` | Verification API client secret | Required for production |
//! | `BCRYPT_ROUNDS` | Password hashing cost factor (4..=31) | `12` |
//! | `ENCRYPTION_KEY` | 32-byte key for field-level encryption | Required for production |
//! | `LOG_LEVEL` | Log level filter | `info` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use url::Url;

/// Environment variable name for the persistent data directory.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Configuration validation error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is required when APP_ENV=production")]
    MissingInProduction(&'static str),
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(var: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            var,
            reason: reason.into(),
        }
    }
}

/// Deployment environment selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    fn parse(s: &str) -> Result<Self, ConfigError> {
        match s {
            "development" => Ok(Environment::Development),
            "test" => Ok(Environment::Test),
            "production" => Ok(Environment::Production),
            other => Err(ConfigError::invalid(
                "APP_ENV",
                format!("expected development, test or production, got '{other}'"),
            )),
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Solana cluster selector. The rights service never talks to the chain
/// itself; the value is passed through to downstream platform services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolanaNetwork {
    MainnetBeta,
    Testnet,
    Devnet,
    Localnet,
}

impl SolanaNetwork {
    fn parse(s: &str) -> Result<Self, ConfigError> {
        match s {
            "mainnet-beta" => Ok(SolanaNetwork::MainnetBeta),
            "testnet" => Ok(SolanaNetwork::Testnet),
            "devnet" => Ok(SolanaNetwork::Devnet),
            "localnet" => Ok(SolanaNetwork::Localnet),
            other => Err(ConfigError::invalid(
                "SOLANA_NETWORK",
                format!("expected mainnet-beta, testnet, devnet or localnet, got '{other}'"),
            )),
        }
    }
}

/// Logging output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(s: &str) -> Result<Self, ConfigError> {
        match s {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(ConfigError::invalid(
                "LOG_FORMAT",
                format!("expected pretty or json, got '{other}'"),
            )),
        }
    }
}

/// Cache connection settings.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
}

/// The five on-chain program identifiers of the platform. Treated as
/// opaque strings here; no RPC calls are made by this service.
#[derive(Debug, Clone, Default)]
pub struct ProgramIds {
    pub identity_registry: Option<String>,
    pub verification_oracle: Option<String>,
    pub credential_manager: Option<String>,
    pub reputation_engine: Option<String>,
    pub staking_manager: Option<String>,
}

/// API Setu verification service credentials.
#[derive(Debug, Clone)]
pub struct ApiSetuConfig {
    pub base_url: Url,
    pub client_id: String,
    pub client_secret: String,
}

/// Validated application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub database_url: Option<String>,
    pub redis: RedisConfig,
    pub jwt_secret: Option<String>,
    pub solana_rpc_url: Url,
    pub solana_network: SolanaNetwork,
    pub program_ids: ProgramIds,
    pub api_setu: Option<ApiSetuConfig>,
    pub bcrypt_rounds: u32,
    pub encryption_key: Option<String>,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let vars: HashMap<String, String> = env::vars().collect();
        Self::load_from(&vars)
    }

    /// Load configuration from an explicit variable map.
    ///
    /// Tests use this directly so they never mutate process-global state.
    pub fn load_from(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |key: &str| vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

        let environment = match get("APP_ENV") {
            Some(v) => Environment::parse(v)?,
            None => Environment::Development,
        };

        let host = get("HOST").unwrap_or("0.0.0.0").to_string();
        let port: u16 = match get("PORT") {
            Some(v) => v
                .parse()
                .map_err(|_| ConfigError::invalid("PORT", format!("'{v}' is not a valid port")))?,
            None => 8080,
        };

        let data_dir = PathBuf::from(get(DATA_DIR_ENV).unwrap_or("/data"));
        let database_url = get("DATABASE_URL").map(String::from);
        if environment.is_production() && database_url.is_none() {
            return Err(ConfigError::MissingInProduction("DATABASE_URL"));
        }

        let redis = RedisConfig {
            host: get("REDIS_HOST").unwrap_or("127.0.0.1").to_string(),
            port: match get("REDIS_PORT") {
                Some(v) => v.parse().map_err(|_| {
                    ConfigError::invalid("REDIS_PORT", format!("'{v}' is not a valid port"))
                })?,
                None => 6379,
            },
            password: get("REDIS_PASSWORD").map(String::from),
        };

        let jwt_secret = get("JWT_SECRET").map(String::from);
        if environment.is_production() && jwt_secret.is_none() {
            return Err(ConfigError::MissingInProduction("JWT_SECRET"));
        }

        let solana_rpc_url = {
            let raw = get("SOLANA_RPC_URL").unwrap_or("https://api.devnet.solana.com");
            Url::parse(raw).map_err(|e| ConfigError::invalid("SOLANA_RPC_URL", e.to_string()))?
        };
        let solana_network = match get("SOLANA_NETWORK") {
            Some(v) => SolanaNetwork::parse(v)?,
            None => SolanaNetwork::Devnet,
        };

        let program_ids = ProgramIds {
            identity_registry: get("IDENTITY_REGISTRY_PROGRAM_ID").map(String::from),
            verification_oracle: get("VERIFICATION_ORACLE_PROGRAM_ID").map(String::from),
            credential_manager: get("CREDENTIAL_MANAGER_PROGRAM_ID").map(String::from),
            reputation_engine: get("REPUTATION_ENGINE_PROGRAM_ID").map(String::from),
            staking_manager: get("STAKING_MANAGER_PROGRAM_ID").map(String::from),
        };

        let api_setu_client_id = get("API_SETU_CLIENT_ID").map(String::from);
        let api_setu_client_secret = get("API_SETU_CLIENT_SECRET").map(String::from);
        if environment.is_production() {
            if api_setu_client_id.is_none() {
                return Err(ConfigError::MissingInProduction("API_SETU_CLIENT_ID"));
            }
            if api_setu_client_secret.is_none() {
                return Err(ConfigError::MissingInProduction("API_SETU_CLIENT_SECRET"));
            }
        }
        let api_setu = match (api_setu_client_id, api_setu_client_secret) {
            (Some(client_id), Some(client_secret)) => {
                let raw = get("API_SETU_BASE_URL").unwrap_or("https://apisetu.gov.in");
                let base_url = Url::parse(raw)
                    .map_err(|e| ConfigError::invalid("API_SETU_BASE_URL", e.to_string()))?;
                Some(ApiSetuConfig {
                    base_url,
                    client_id,
                    client_secret,
                })
            }
            _ => None,
        };

        let bcrypt_rounds: u32 = match get("BCRYPT_ROUNDS") {
            Some(v) => v.parse().map_err(|_| {
                ConfigError::invalid("BCRYPT_ROUNDS", format!("'{v}' is not a number"))
            })?,
            None => 12,
        };
        if !(4..=31).contains(&bcrypt_rounds) {
            return Err(ConfigError::invalid(
                "BCRYPT_ROUNDS",
                format!("cost factor must be between 4 and 31, got {bcrypt_rounds}"),
            ));
        }

        let encryption_key = get("ENCRYPTION_KEY").map(String::from);
        if let Some(ref key) = encryption_key {
            if key.len() != 32 {
                return Err(ConfigError::invalid(
                    "ENCRYPTION_KEY",
                    format!("key must be exactly 32 bytes, got {}", key.len()),
                ));
            }
        }
        if environment.is_production() && encryption_key.is_none() {
            return Err(ConfigError::MissingInProduction("ENCRYPTION_KEY"));
        }

        let log_level = get("LOG_LEVEL").unwrap_or("info").to_string();
        let log_format = match get("LOG_FORMAT") {
            Some(v) => LogFormat::parse(v)?,
            None => LogFormat::Pretty,
        };

        Ok(AppConfig {
            environment,
            host,
            port,
            data_dir,
            database_url,
            redis,
            jwt_secret,
            solana_rpc_url,
            solana_network,
            program_ids,
            api_setu,
            bcrypt_rounds,
            encryption_key,
            log_level,
            log_format,
        })
    }

    /// Socket address string for the HTTP listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
