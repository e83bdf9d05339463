use std::sync::Arc;

use {
    agora_auth::{RefreshCookie, TokenIssuer},
    agora_config::{AgoraConfig, ServerConfig, StorageBackend},
    agora_graphql::{AgoraSchema, GqlContext, build_schema},
    agora_oauth::GoogleFlow,
    agora_service_traits::Services,
    agora_store::Database,
    anyhow::Context as _,
    tracing::info,
};

/// Shared state handed to every axum handler.
#[derive(Clone)]
pub struct AppState {
    pub gql: Arc<GqlContext>,
    pub schema: AgoraSchema,
    /// Present only when `oauth.google` is configured.
    pub google: Option<Arc<GoogleFlow>>,
    pub server: Arc<ServerConfig>,
    /// Directory served under `/uploads` when files are stored locally.
    pub uploads_dir: Option<String>,
}

impl AppState {
    pub fn new(gql: GqlContext, server: ServerConfig, google: Option<GoogleFlow>) -> Self {
        let gql = Arc::new(gql);
        Self {
            schema: build_schema(Arc::clone(&gql)),
            gql,
            google: google.map(Arc::new),
            server: Arc::new(server),
            uploads_dir: None,
        }
    }

    #[must_use]
    pub fn with_uploads_dir(mut self, dir: impl Into<String>) -> Self {
        self.uploads_dir = Some(dir.into());
        self
    }

    /// Connect the database, apply migrations and wire every collaborator.
    pub async fn from_config(config: &AgoraConfig) -> anyhow::Result<Self> {
        let db = Database::connect(&config.database.url, config.database.max_connections)
            .await
            .with_context(|| format!("opening database {}", config.database.url))?;
        db.migrate().await.context("applying migrations")?;

        let services = Services {
            payments: agora_payments::build_payments(&config.payments),
            storage: agora_media::build_storage(&config.storage)
                .context("configuring object storage")?,
        };
        let gql = GqlContext {
            db,
            services,
            tokens: TokenIssuer::from_config(&config.auth).context("configuring tokens")?,
            refresh_cookie: RefreshCookie::from_config(&config.auth),
            limits: config.limits.clone(),
            frontend: config.frontend.clone(),
            currency: config.payments.currency.clone(),
        };

        let google = config.oauth.google.clone().map(GoogleFlow::new);
        if google.is_none() {
            info!("google sign-in disabled: oauth.google is not configured");
        }

        let state = Self::new(gql, config.server.clone(), google);
        Ok(match config.storage.backend {
            StorageBackend::Local => state.with_uploads_dir(config.storage.directory.clone()),
            StorageBackend::Firebase => state,
        })
    }
}
