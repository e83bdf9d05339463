/// Config schema types (server, database, auth, listing limits, storage,
/// payments, frontend redirects, OAuth providers).
use {
    secrecy::Secret,
    serde::{Deserialize, Serialize},
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgoraConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub limits: LimitsConfig,
    pub frontend: FrontendConfig,
    pub payments: PaymentsConfig,
    pub storage: StorageConfig,
    pub oauth: OAuthProvidersConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to. Defaults to "127.0.0.1".
    pub bind: String,
    pub port: u16,
    /// Allowed browser origin. Credentials (the refresh cookie) are only
    /// accepted from this origin; `None` allows any origin without credentials.
    pub cors_origin: Option<String>,
    /// Upper bound for a single uploaded file.
    pub max_upload_bytes: usize,
    pub max_upload_files: usize,
    /// Serve GraphiQL on GET `/graphql`.
    pub graphiql: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".into(),
            port: 4000,
            cors_origin: None,
            max_upload_bytes: 10_000_000,
            max_upload_files: 10,
            graphiql: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite connection URL, e.g. `sqlite:agora.db`.
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:agora.db".into(),
            max_connections: 5,
        }
    }
}

/// Token signing and refresh-cookie settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    #[serde(
        serialize_with = "serialize_redacted",
        skip_serializing_if = "Option::is_none"
    )]
    pub access_token_secret: Option<Secret<String>>,
    #[serde(
        serialize_with = "serialize_redacted",
        skip_serializing_if = "Option::is_none"
    )]
    pub refresh_token_secret: Option<Secret<String>>,
    pub access_token_ttl_secs: u64,
    pub refresh_token_ttl_secs: u64,
    pub refresh_cookie_name: String,
    pub refresh_cookie_max_age_secs: i64,
    /// Mark the refresh cookie `Secure`. Enable behind TLS.
    pub secure_cookies: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_secret: None,
            refresh_token_secret: None,
            access_token_ttl_secs: 15 * 60,
            refresh_token_ttl_secs: 24 * 60 * 60,
            refresh_cookie_name: "ecommerce_refresh_token".into(),
            refresh_cookie_max_age_secs: 30 * 24 * 60 * 60,
            secure_cookies: false,
        }
    }
}

/// Default page sizes for every listing query.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub popular_products: u32,
    pub top_rated_products: u32,
    pub on_sale_products: u32,
    pub all_products: u32,
    pub category_products: u32,
    pub similar_products: u32,
    pub personal_products: u32,
    pub personal_orders: u32,
    pub posts: u32,
    pub blogs: u32,
    pub recent_orders: u32,
    pub recent_accounts: u32,
    /// Cap on how many products the popular and top-rated showcases report.
    pub showcase_products: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            popular_products: 8,
            top_rated_products: 8,
            on_sale_products: 8,
            all_products: 12,
            category_products: 12,
            similar_products: 6,
            personal_products: 6,
            personal_orders: 5,
            posts: 5,
            blogs: 6,
            recent_orders: 10,
            recent_accounts: 10,
            showcase_products: 24,
        }
    }
}

/// Browser-facing URLs the API redirects to or embeds in checkout sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontendConfig {
    pub redirect_url: String,
    pub cart_url: String,
    pub checkout_success_url: String,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            redirect_url: "http://localhost:3000/login".into(),
            cart_url: "http://localhost:3000/cart".into(),
            checkout_success_url: "http://localhost:3000/checkout/success".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentsConfig {
    #[serde(
        serialize_with = "serialize_redacted",
        skip_serializing_if = "Option::is_none"
    )]
    pub stripe_secret_key: Option<Secret<String>>,
    pub stripe_api_base: String,
    pub currency: String,
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            stripe_secret_key: None,
            stripe_api_base: "https://api.stripe.com".into(),
            currency: "usd".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Files written under `storage.directory` and served from `public_base_url`.
    #[default]
    Local,
    Firebase,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub directory: String,
    pub public_base_url: String,
    pub firebase_bucket: Option<String>,
    pub firebase_api_base: String,
    #[serde(
        serialize_with = "serialize_redacted",
        skip_serializing_if = "Option::is_none"
    )]
    pub firebase_api_key: Option<Secret<String>>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Local,
            directory: "uploads".into(),
            public_base_url: "http://localhost:4000/uploads".into(),
            firebase_bucket: None,
            firebase_api_base: "https://firebasestorage.googleapis.com".into(),
            firebase_api_key: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuthProvidersConfig {
    pub google: Option<GoogleOAuthConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    #[serde(serialize_with = "serialize_secret_redacted")]
    pub client_secret: Secret<String>,
    /// Where Google sends the user back, e.g. `http://localhost:4000/auth/google/callback`.
    pub callback_url: String,
    #[serde(default = "default_google_auth_url")]
    pub auth_url: String,
    #[serde(default = "default_google_token_url")]
    pub token_url: String,
    #[serde(default = "default_google_userinfo_url")]
    pub userinfo_url: String,
    #[serde(default = "default_google_scopes")]
    pub scopes: Vec<String>,
}

fn default_google_auth_url() -> String {
    "https://accounts.google.com/o/oauth2/v2/auth".into()
}

fn default_google_token_url() -> String {
    "https://oauth2.googleapis.com/token".into()
}

fn default_google_userinfo_url() -> String {
    "https://openidconnect.googleapis.com/v1/userinfo".into()
}

fn default_google_scopes() -> Vec<String> {
    vec!["openid".into(), "profile".into(), "email".into()]
}

// ── Serde helpers for Secret<String> ────────────────────────────────────────

fn serialize_redacted<S: serde::Serializer>(
    secret: &Option<Secret<String>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match secret {
        Some(_) => serializer.serialize_some("[REDACTED]"),
        None => serializer.serialize_none(),
    }
}

fn serialize_secret_redacted<S: serde::Serializer>(
    _secret: &Secret<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str("[REDACTED]")
}
