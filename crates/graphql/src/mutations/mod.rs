//! GraphQL mutation resolvers.
//!
//! Mutations that act for an account go through [`OwnershipGate`]: the
//! caller's credential is checked against the account id in the arguments,
//! and every write then happens on the gate's transaction. Uploads are read
//! before the gate opens; read-backs go through the pool after commit.
//!
//! [`OwnershipGate`]: crate::gate::OwnershipGate

mod accounts;
mod blogs;
mod catalog;
mod favorites;
mod orders;
mod posts;

use async_graphql::MergedObject;

pub use {
    accounts::AccountMutation, blogs::BlogMutation, catalog::CatalogMutation,
    favorites::FavoriteMutation, orders::OrderMutation, posts::PostMutation,
};

/// Root mutation type composing all domain mutations.
#[derive(Default, MergedObject)]
pub struct MutationRoot(
    AccountMutation,
    CatalogMutation,
    PostMutation,
    BlogMutation,
    FavoriteMutation,
    OrderMutation,
);
