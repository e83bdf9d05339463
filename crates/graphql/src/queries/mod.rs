//! GraphQL query resolvers, one object per domain merged into the root.

mod accounts;
mod blogs;
mod catalog;
mod favorites;
mod orders;
mod posts;

use {agora_common::PageRequest, async_graphql::MergedObject};

pub use {
    accounts::AccountQuery, blogs::BlogQuery, catalog::CatalogQuery, favorites::FavoriteQuery,
    orders::OrderQuery, posts::PostQuery,
};

/// Root query type composing all domain queries.
#[derive(Default, MergedObject)]
pub struct QueryRoot(
    AccountQuery,
    CatalogQuery,
    PostQuery,
    BlogQuery,
    FavoriteQuery,
    OrderQuery,
);

/// Page window from optional `limit` / `offset` arguments.
pub(crate) fn page(limit: Option<u32>, default_limit: u32, offset: Option<u32>) -> PageRequest {
    PageRequest::new(limit.unwrap_or(default_limit), offset.unwrap_or(0))
}
