//! Shared types, error definitions, and utilities used across all agora crates.

pub mod error;
pub mod id;
pub mod page;

pub use {
    error::{AgoraError, Error, FromMessage, Result},
    id::RecordId,
    page::{Page, PageRequest},
};
