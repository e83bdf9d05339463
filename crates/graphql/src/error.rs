//! Error taxonomy for resolvers and its mapping onto GraphQL errors.
//!
//! Every error reaching a client carries `extensions.code`. Authorization
//! and validation messages are passed through verbatim; store and auth
//! internals are logged and replaced by a generic message.

use std::future::Future;

use {
    agora_service_traits::ServiceError,
    async_graphql::{ErrorExtensions, ResultExt},
    tracing::error,
};

use crate::loader::LoadError;

pub const UNAUTHORIZED: &str = "Unauthorized";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or invalid access credential.
    #[error("{0}")]
    Unauthenticated(String),

    /// Valid credential acting for someone else.
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    BadUserInput(String),

    #[error("{0}")]
    NotFound(String),

    /// Begin or commit of a gated transaction failed.
    #[error("transaction failed")]
    Transaction(#[source] agora_store::Error),

    #[error("{0}")]
    Upstream(#[from] ServiceError),

    #[error(transparent)]
    Store(#[from] agora_store::Error),

    #[error(transparent)]
    Auth(#[from] agora_auth::Error),

    #[error("{0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn unauthenticated() -> Self {
        Self::Unauthenticated(UNAUTHORIZED.into())
    }

    pub fn forbidden() -> Self {
        Self::Forbidden(UNAUTHORIZED.into())
    }

    pub fn bad_input(message: impl Into<String>) -> Self {
        Self::BadUserInput(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated(_) => "UNAUTHENTICATED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::BadUserInput(_) => "BAD_USER_INPUT",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Transaction(_) => "TRANSACTION_FAILED",
            Self::Upstream(_) => "UPSTREAM_FAILURE",
            Self::Store(_) | Self::Auth(_) | Self::Internal(_) => "INTERNAL",
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::Store(e) => {
                error!(error = %e, "database error");
                "Internal database error".into()
            },
            Self::Auth(e) => {
                error!(error = %e, "token error");
                "Internal authentication error".into()
            },
            Self::Transaction(e) => {
                error!(error = %e, "transaction error");
                self.to_string()
            },
            _ => self.to_string(),
        }
    }
}

impl<E: std::error::Error + 'static> From<LoadError<E>> for ApiError {
    fn from(e: LoadError<E>) -> Self {
        error!(error = %e, "loader failed");
        Self::internal("Failed to load related records")
    }
}

impl ErrorExtensions for ApiError {
    fn extend(&self) -> async_graphql::Error {
        let code = self.code();
        async_graphql::Error::new(self.client_message()).extend_with(|_, ext| ext.set("code", code))
    }
}

/// Await a resolver body written against [`ApiResult`] and attach the
/// error code on the way out.
pub(crate) async fn resolve<T>(body: impl Future<Output = ApiResult<T>>) -> async_graphql::Result<T> {
    body.await.extend()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_the_taxonomy() {
        assert_eq!(ApiError::unauthenticated().code(), "UNAUTHENTICATED");
        assert_eq!(ApiError::forbidden().code(), "FORBIDDEN");
        assert_eq!(ApiError::bad_input("x").code(), "BAD_USER_INPUT");
        assert_eq!(
            ApiError::from(ServiceError::upstream("stripe", "down")).code(),
            "UPSTREAM_FAILURE"
        );
    }

    #[test]
    fn validation_message_is_verbatim() {
        let err = ApiError::bad_input("Products are not provided.").extend();
        assert_eq!(err.message, "Products are not provided.");
        let code = err.extensions.and_then(|ext| ext.get("code").cloned());
        assert_eq!(code, Some(async_graphql::Value::from("BAD_USER_INPUT")));
    }

    #[test]
    fn store_details_are_hidden() {
        let err = ApiError::from(agora_store::Error::InvalidEnum {
            field: "status",
            value: "Lost".into(),
        })
        .extend();
        assert_eq!(err.message, "Internal database error");
    }
}
