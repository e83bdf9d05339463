//! GraphQL HTTP handlers.
//!
//! GraphiQL on GET `/graphql`; queries and mutations on POST `/graphql`,
//! including `multipart/form-data` requests carrying file uploads.

use std::io;

use {
    agora_auth::Credential,
    async_graphql::http::{GraphiQLSource, MultipartOptions, receive_body},
    async_graphql_axum::GraphQLResponse,
    axum::{
        Json,
        body::Body,
        extract::State,
        http::{HeaderMap, HeaderValue, StatusCode, header},
        response::{Html, IntoResponse, Response},
    },
    futures::TryStreamExt,
    tracing::{debug, warn},
};

use crate::state::AppState;

/// Serve the GraphiQL IDE, or 404 when it is disabled.
pub async fn graphql_get_handler(State(state): State<AppState>) -> Response {
    if !state.server.graphiql {
        return StatusCode::NOT_FOUND.into_response();
    }
    Html(GraphiQLSource::build().endpoint("/graphql").finish()).into_response()
}

/// Execute one query or mutation.
///
/// The caller's `Authorization` header becomes the request's credential;
/// cookies queued by resolvers (sign-in, logout) are returned as
/// `Set-Cookie` headers.
pub async fn graphql_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Body,
) -> Response {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let options = MultipartOptions::default()
        .max_file_size(state.server.max_upload_bytes)
        .max_num_files(state.server.max_upload_files);
    let reader = body
        .into_data_stream()
        .map_err(io::Error::other)
        .into_async_read();

    let request = match receive_body(content_type, reader, options).await {
        Ok(request) => request,
        Err(e) => {
            debug!(error = %e, "rejected graphql request body");
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "errors": [{ "message": e.to_string() }] })),
            )
                .into_response();
        },
    };

    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    let credential = Credential::from_authorization(authorization, &state.gql.tokens);

    let (response, request_ctx) =
        agora_graphql::execute(&state.schema, &state.gql, credential, request).await;

    let mut http = GraphQLResponse::from(response).into_response();
    for cookie in request_ctx.take_cookies() {
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                http.headers_mut().append(header::SET_COOKIE, value);
            },
            Err(e) => warn!(error = %e, "dropping malformed set-cookie value"),
        }
    }
    http
}
