//! Google sign-in: authorization URL, code exchange, and profile lookup.

pub mod error;
pub mod flow;
pub mod state;
pub mod types;

pub use {
    error::{Error, Result},
    flow::GoogleFlow,
    state::generate_state,
    types::{GoogleProfile, GoogleTokens},
};
