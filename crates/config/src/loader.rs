use std::path::{Path, PathBuf};

use {
    secrecy::Secret,
    tracing::{debug, warn},
};

use crate::{env_subst::substitute_env, schema::AgoraConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &["agora.toml", "agora.yaml", "agora.yml", "agora.json"];

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<AgoraConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./agora.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/agora/agora.{toml,yaml,yml,json}` (user-global)
///
/// Returns `AgoraConfig::default()` if no config file is found. Environment
/// overrides are applied in every case.
pub fn discover_and_load() -> AgoraConfig {
    let mut config = match find_config_file() {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            load_config(&path).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
                AgoraConfig::default()
            })
        },
        None => {
            debug!("no config file found, using defaults");
            AgoraConfig::default()
        },
    };
    apply_env_overrides(&mut config);
    config
}

/// Load an explicit config file, then apply environment overrides.
pub fn load_with_overrides(path: &Path) -> anyhow::Result<AgoraConfig> {
    let mut config = load_config(path)?;
    apply_env_overrides(&mut config);
    Ok(config)
}

/// Find the first config file in standard locations.
pub fn find_config_file() -> Option<PathBuf> {
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.exists() {
            return Some(p);
        }
    }

    let config_dir = config_dir()?;
    CONFIG_FILENAMES
        .iter()
        .map(|name| config_dir.join(name))
        .find(|p| p.exists())
}

/// Returns the user-global config directory (`~/.config/agora/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "agora").map(|d| d.config_dir().to_path_buf())
}

/// Overlay `AGORA_*` environment variables onto a loaded config.
pub fn apply_env_overrides(config: &mut AgoraConfig) {
    apply_env_overrides_with(config, |name| std::env::var(name).ok());
}

fn apply_env_overrides_with(config: &mut AgoraConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(bind) = lookup("AGORA_BIND") {
        config.server.bind = bind;
    }
    if let Some(port) = lookup("AGORA_PORT") {
        match port.parse() {
            Ok(port) => config.server.port = port,
            Err(e) => warn!(value = %port, error = %e, "ignoring invalid AGORA_PORT"),
        }
    }
    if let Some(origin) = lookup("AGORA_CORS_ORIGIN") {
        config.server.cors_origin = Some(origin);
    }
    if let Some(url) = lookup("AGORA_DATABASE_URL") {
        config.database.url = url;
    }
    if let Some(secret) = lookup("AGORA_ACCESS_TOKEN_SECRET") {
        config.auth.access_token_secret = Some(Secret::new(secret));
    }
    if let Some(secret) = lookup("AGORA_REFRESH_TOKEN_SECRET") {
        config.auth.refresh_token_secret = Some(Secret::new(secret));
    }
    if let Some(key) = lookup("AGORA_STRIPE_SECRET_KEY") {
        config.payments.stripe_secret_key = Some(Secret::new(key));
    }
    if let Some(key) = lookup("AGORA_FIREBASE_API_KEY") {
        config.storage.firebase_api_key = Some(Secret::new(key));
    }
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<AgoraConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use {super::*, crate::schema::StorageBackend, secrecy::ExposeSecret};

    #[test]
    fn loads_toml_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agora.toml");
        std::fs::write(
            &path,
            r#"
[server]
port = 8080
cors_origin = "http://localhost:3000"

[limits]
posts = 3

[storage]
backend = "firebase"
firebase_bucket = "agora-test.appspot.com"
"#,
        )
        .unwrap();

        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.bind, "127.0.0.1");
        assert_eq!(cfg.limits.posts, 3);
        assert_eq!(cfg.limits.blogs, 6);
        assert_eq!(cfg.storage.backend, StorageBackend::Firebase);
        assert_eq!(cfg.auth.refresh_cookie_name, "ecommerce_refresh_token");
    }

    #[test]
    fn loads_yaml_and_json() {
        let dir = tempfile::tempdir().unwrap();

        let yaml = dir.path().join("agora.yaml");
        std::fs::write(&yaml, "database:\n  url: \"sqlite::memory:\"\n").unwrap();
        assert_eq!(load_config(&yaml).unwrap().database.url, "sqlite::memory:");

        let json = dir.path().join("agora.json");
        std::fs::write(&json, r#"{"payments":{"currency":"eur"}}"#).unwrap();
        assert_eq!(load_config(&json).unwrap().payments.currency, "eur");
    }

    #[test]
    fn rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agora.ini");
        std::fs::write(&path, "").unwrap();
        let err = load_config(&path).expect_err("ini is not supported");
        assert!(err.to_string().contains("unsupported config format"));
    }

    #[test]
    fn env_overrides_replace_file_values() {
        let mut cfg = AgoraConfig::default();
        apply_env_overrides_with(&mut cfg, |name| match name {
            "AGORA_PORT" => Some("9000".into()),
            "AGORA_ACCESS_TOKEN_SECRET" => Some("access".into()),
            "AGORA_DATABASE_URL" => Some("sqlite:/tmp/agora.db".into()),
            _ => None,
        });
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.database.url, "sqlite:/tmp/agora.db");
        assert_eq!(
            cfg.auth
                .access_token_secret
                .as_ref()
                .map(|s| s.expose_secret().as_str()),
            Some("access")
        );
        assert!(cfg.auth.refresh_token_secret.is_none());
    }

    #[test]
    fn invalid_port_override_is_ignored() {
        let mut cfg = AgoraConfig::default();
        apply_env_overrides_with(&mut cfg, |name| {
            (name == "AGORA_PORT").then(|| "not-a-port".to_string())
        });
        assert_eq!(cfg.server.port, 4000);
    }
}
