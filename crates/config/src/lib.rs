//! Configuration loading, validation, and env substitution.
//!
//! Config files: `agora.toml`, `agora.yaml`, or `agora.json`
//! Searched in `./` then `~/.config/agora/`.
//!
//! Supports `${ENV_VAR}` substitution in all string values, and `AGORA_*`
//! environment overrides for deployment secrets.

pub mod env_subst;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    loader::{
        apply_env_overrides, config_dir, discover_and_load, find_config_file, load_config,
        load_with_overrides,
    },
    schema::{
        AgoraConfig, AuthConfig, DatabaseConfig, FrontendConfig, GoogleOAuthConfig, LimitsConfig,
        OAuthProvidersConfig, PaymentsConfig, ServerConfig, StorageBackend, StorageConfig,
    },
    validate::{Diagnostic, Severity, ValidationResult, validate},
};
