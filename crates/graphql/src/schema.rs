//! Schema construction and type alias.

use std::sync::Arc;

use {
    agora_auth::Credential,
    async_graphql::{EmptySubscription, Request, Response, Schema},
    tracing::debug,
};

use crate::{
    context::{GqlContext, RequestContext},
    mutations::MutationRoot,
    queries::QueryRoot,
};

/// The full Agora GraphQL schema type.
pub type AgoraSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Build the schema around the process-wide context.
///
/// Per-request state ([`RequestContext`]) is not part of the schema; attach
/// it to every request, or use [`execute`].
pub fn build_schema(ctx: Arc<GqlContext>) -> AgoraSchema {
    Schema::build(QueryRoot::default(), MutationRoot::default(), EmptySubscription)
        .data(ctx)
        .finish()
}

/// Execute one request with a fresh [`RequestContext`] for `credential`.
///
/// Returns the response together with the request context so the caller can
/// collect cookies the resolvers queued.
pub async fn execute(
    schema: &AgoraSchema,
    app: &GqlContext,
    credential: Credential,
    request: impl Into<Request>,
) -> (Response, Arc<RequestContext>) {
    let request_ctx = Arc::new(RequestContext::new(app, credential));
    let response = schema
        .execute(request.into().data(Arc::clone(&request_ctx)))
        .await;
    debug!(
        batches = request_ctx.loaders.batches(),
        errors = response.errors.len(),
        "request resolved"
    );
    (response, request_ctx)
}
