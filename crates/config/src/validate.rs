//! Semantic checks on a loaded configuration.
//!
//! Parsing already rejects malformed files; this pass reports settings that
//! parse fine but leave the server unable to do its job (missing signing
//! secrets, zero page sizes, a storage backend without its bucket).

use secrecy::ExposeSecret;

use crate::schema::{AgoraConfig, StorageBackend};

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Dotted path, e.g. "auth.access_token_secret"
    pub path: String,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Count diagnostics by severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    fn push(&mut self, severity: Severity, path: &str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            severity,
            path: path.to_string(),
            message: message.into(),
        });
    }
}

pub fn validate(config: &AgoraConfig) -> ValidationResult {
    let mut result = ValidationResult::default();

    let access = config.auth.access_token_secret.as_ref();
    let refresh = config.auth.refresh_token_secret.as_ref();
    if access.is_none_or(|s| s.expose_secret().is_empty()) {
        result.push(
            Severity::Error,
            "auth.access_token_secret",
            "access tokens cannot be signed without a secret",
        );
    }
    if refresh.is_none_or(|s| s.expose_secret().is_empty()) {
        result.push(
            Severity::Error,
            "auth.refresh_token_secret",
            "refresh tokens cannot be signed without a secret",
        );
    }
    if let (Some(a), Some(r)) = (access, refresh)
        && !a.expose_secret().is_empty()
        && a.expose_secret() == r.expose_secret()
    {
        result.push(
            Severity::Warning,
            "auth.refresh_token_secret",
            "access and refresh secrets are identical; a refresh token would pass as an access token",
        );
    }
    if config.auth.access_token_ttl_secs == 0 || config.auth.refresh_token_ttl_secs == 0 {
        result.push(Severity::Error, "auth", "token lifetimes must be non-zero");
    }

    let limits = &config.limits;
    for (name, value) in [
        ("popular_products", limits.popular_products),
        ("top_rated_products", limits.top_rated_products),
        ("on_sale_products", limits.on_sale_products),
        ("all_products", limits.all_products),
        ("category_products", limits.category_products),
        ("similar_products", limits.similar_products),
        ("personal_products", limits.personal_products),
        ("personal_orders", limits.personal_orders),
        ("posts", limits.posts),
        ("blogs", limits.blogs),
        ("recent_orders", limits.recent_orders),
        ("recent_accounts", limits.recent_accounts),
    ] {
        if value == 0 {
            result.push(
                Severity::Error,
                &format!("limits.{name}"),
                "page size must be at least 1",
            );
        }
    }

    if config.payments.stripe_secret_key.is_none() {
        result.push(
            Severity::Warning,
            "payments.stripe_secret_key",
            "checkout is disabled until a Stripe secret key is configured",
        );
    }

    if config.storage.backend == StorageBackend::Firebase
        && config.storage.firebase_bucket.as_deref().is_none_or(str::is_empty)
    {
        result.push(
            Severity::Error,
            "storage.firebase_bucket",
            "the firebase backend needs a bucket name",
        );
    }

    if config.server.cors_origin.is_none() {
        result.push(
            Severity::Info,
            "server.cors_origin",
            "no origin configured; browsers will not send the refresh cookie cross-origin",
        );
    }

    result
}

#[cfg(test)]
mod tests {
    use {super::*, secrecy::Secret};

    fn configured() -> AgoraConfig {
        let mut cfg = AgoraConfig::default();
        cfg.auth.access_token_secret = Some(Secret::new("access".into()));
        cfg.auth.refresh_token_secret = Some(Secret::new("refresh".into()));
        cfg.payments.stripe_secret_key = Some(Secret::new("sk_test".into()));
        cfg.server.cors_origin = Some("http://localhost:3000".into());
        cfg
    }

    #[test]
    fn complete_config_is_clean() {
        let result = validate(&configured());
        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    }

    #[test]
    fn default_config_lacks_secrets() {
        let result = validate(&AgoraConfig::default());
        assert!(result.has_errors());
        assert_eq!(result.count(Severity::Error), 2);
        assert!(
            result
                .diagnostics
                .iter()
                .any(|d| d.path == "payments.stripe_secret_key")
        );
    }

    #[test]
    fn identical_secrets_warn() {
        let mut cfg = configured();
        cfg.auth.refresh_token_secret = Some(Secret::new("access".into()));
        let result = validate(&cfg);
        assert!(!result.has_errors());
        assert_eq!(result.count(Severity::Warning), 1);
    }

    #[test]
    fn zero_limit_and_missing_bucket_are_errors() {
        let mut cfg = configured();
        cfg.limits.posts = 0;
        cfg.storage.backend = StorageBackend::Firebase;
        let result = validate(&cfg);
        let paths: Vec<_> = result.diagnostics.iter().map(|d| d.path.as_str()).collect();
        assert!(paths.contains(&"limits.posts"));
        assert!(paths.contains(&"storage.firebase_bucket"));
    }
}
