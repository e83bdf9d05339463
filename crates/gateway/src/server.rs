use std::net::SocketAddr;

use {
    agora_config::AgoraConfig,
    anyhow::Context as _,
    axum::{
        Router,
        extract::{DefaultBodyLimit, State},
        http::{HeaderValue, Method, header},
        response::{IntoResponse, Json},
        routing::{get, post},
    },
    tower_http::{
        cors::{Any, CorsLayer},
        services::ServeDir,
        trace::TraceLayer,
    },
    tracing::info,
};

use crate::{
    auth_routes::{google_callback_handler, google_login_handler, refresh_token_handler},
    graphql_routes::{graphql_get_handler, graphql_handler},
    state::AppState,
};

// ── Router ───────────────────────────────────────────────────────────────────

/// With an explicit origin the browser may send the refresh cookie along;
/// without one any origin is allowed but credentials are not.
fn cors_layer(origin: Option<&str>) -> anyhow::Result<CorsLayer> {
    Ok(match origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(
                HeaderValue::from_str(origin)
                    .with_context(|| format!("invalid server.cors_origin {origin:?}"))?,
            )
            .allow_credentials(true)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    })
}

/// Build the gateway router (shared between production startup and tests).
pub fn build_app(state: AppState) -> anyhow::Result<Router> {
    let cors = cors_layer(state.server.cors_origin.as_deref())?;

    let mut router = Router::new()
        .route("/health", get(health_handler))
        .route("/graphql", get(graphql_get_handler).post(graphql_handler))
        .route("/refresh_token", post(refresh_token_handler))
        .route("/auth/google/login", get(google_login_handler))
        .route("/auth/google/callback", get(google_callback_handler));

    if let Some(dir) = state.uploads_dir.as_deref() {
        router = router.nest_service("/uploads", ServeDir::new(dir));
    }

    // Multipart bodies are bounded per file by the GraphQL handler; this caps
    // the whole request.
    let body_limit = state
        .server
        .max_upload_bytes
        .saturating_mul(state.server.max_upload_files.max(1))
        .saturating_add(1024 * 1024);

    Ok(router
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

// ── Server startup ───────────────────────────────────────────────────────────

/// Wire every collaborator from `config` and serve until Ctrl-C.
pub async fn start_server(config: &AgoraConfig) -> anyhow::Result<()> {
    let state = AppState::from_config(config).await?;
    let app = build_app(state)?;

    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port)
        .parse()
        .with_context(|| format!("invalid bind address {}", config.server.bind))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("server started on http://{addr}/graphql");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

// ── Handlers ─────────────────────────────────────────────────────────────────

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "google": state.google.is_some(),
    }))
}
