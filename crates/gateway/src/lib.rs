//! HTTP gateway: serves the GraphQL schema, the refresh-token endpoint and
//! the Google sign-in redirects over axum.

pub mod auth_routes;
pub mod graphql_routes;
pub mod server;
pub mod state;

pub use {
    server::{build_app, start_server},
    state::AppState,
};
