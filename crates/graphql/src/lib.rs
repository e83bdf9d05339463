//! GraphQL API for Agora.
//!
//! Defines the schema, its types and resolvers. Two mechanisms carry most of
//! the weight:
//!
//! - [`loader::BatchLoader`] collects child-record lookups issued while one
//!   request resolves (comments of posts, line items of orders) and answers
//!   them with a single query per batch.
//! - [`gate::OwnershipGate`] admits a mutation only when the caller's access
//!   token belongs to the account the mutation acts for, and runs its writes
//!   in one transaction.
//!
//! The gateway crate serves the schema over HTTP; this crate knows nothing
//! about routing or headers beyond the raw `Authorization` value.

pub mod context;
pub mod error;
pub mod gate;
pub mod loader;
pub mod loaders;
pub mod mutations;
pub mod queries;
pub mod scalars;
pub mod schema;
pub mod types;
pub mod uploads;

pub use {
    context::{GqlContext, RequestContext},
    error::{ApiError, ApiResult},
    gate::{OwnershipClaim, OwnershipGate},
    loader::{BatchLoader, BulkFetch, LoadError},
    schema::{AgoraSchema, build_schema, execute},
};
