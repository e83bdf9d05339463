//! GraphQL output and input types.
//!
//! Output types are built from the store's row models with `From`; input
//! types derive `InputObject`. Nested child lists (`Post.comments`,
//! `Blog.blogComments`, `Order.products`) resolve through the request's
//! batch loaders.

pub mod accounts;
pub mod catalog;
pub mod favorites;
pub mod orders;
pub mod social;

pub use {accounts::*, catalog::*, favorites::*, orders::*, social::*};
