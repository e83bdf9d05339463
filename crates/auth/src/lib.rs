//! Authentication primitives.
//!
//! This crate provides:
//! - `TokenIssuer`: signs and verifies the short-lived access token and the
//!   longer-lived refresh token (HS256 JWTs carrying `account_id`)
//! - `Credential`: the per-request outcome of reading an `Authorization` header
//! - `RefreshCookie`: the http-only cookie that carries the refresh token
//! - Argon2 password hashing

pub mod cookie;
pub mod credential;
pub mod error;
pub mod password;
pub mod tokens;

pub use {
    cookie::{RefreshCookie, parse_cookie},
    credential::{AuthIdentity, Credential, bearer_token},
    error::{Error, Result},
    password::{hash_password, verify_password},
    tokens::{Claims, TokenIssuer, TokenPair},
};
