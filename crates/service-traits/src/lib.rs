//! Service trait interfaces for the external systems the API talks to.
//!
//! Each trait has a `Noop` implementation that refuses every call, allowing
//! the server to run (and tests to build a schema) before a payment provider
//! or object store is configured.

use std::sync::Arc;

use {
    async_trait::async_trait,
    bytes::Bytes,
    serde::{Deserialize, Serialize},
    tracing::warn,
};

/// Error type returned by service methods.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{message}")]
    Message { message: String },
    #[error("{service}: {message}")]
    Upstream {
        service: &'static str,
        message: String,
    },
    #[error("{0}")]
    Serde(#[from] serde_json::Error),
}

impl ServiceError {
    #[must_use]
    pub fn message(message: impl std::fmt::Display) -> Self {
        Self::Message {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn upstream(service: &'static str, message: impl std::fmt::Display) -> Self {
        Self::Upstream {
            service,
            message: message.to_string(),
        }
    }

    /// `true` when the failure came from a remote provider rather than local setup.
    #[must_use]
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Upstream { .. })
    }
}

impl From<String> for ServiceError {
    fn from(value: String) -> Self {
        Self::message(value)
    }
}

impl From<&str> for ServiceError {
    fn from(value: &str) -> Self {
        Self::message(value)
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

// ── Payments ────────────────────────────────────────────────────────────────

/// One product line of a hosted checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutLineItem {
    pub name: String,
    /// Price per unit in the currency's minor unit (cents).
    pub unit_amount: i64,
    pub quantity: i64,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub line_items: Vec<CheckoutLineItem>,
    pub success_url: String,
    pub cancel_url: String,
    pub currency: String,
    pub metadata: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub id: String,
    pub payment_status: String,
    pub amount_total: Option<i64>,
}

impl SessionStatus {
    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.payment_status == "paid"
    }
}

#[async_trait]
pub trait PaymentService: Send + Sync {
    async fn create_checkout_session(&self, request: CheckoutRequest)
    -> ServiceResult<CheckoutSession>;
    async fn retrieve_session(&self, session_id: &str) -> ServiceResult<SessionStatus>;
}

pub struct NoopPaymentService;

#[async_trait]
impl PaymentService for NoopPaymentService {
    async fn create_checkout_session(
        &self,
        _request: CheckoutRequest,
    ) -> ServiceResult<CheckoutSession> {
        warn!("checkout requested but no payment provider is configured");
        Err("payment service not configured".into())
    }

    async fn retrieve_session(&self, _session_id: &str) -> ServiceResult<SessionStatus> {
        Err("payment service not configured".into())
    }
}

// ── Object storage ──────────────────────────────────────────────────────────

/// A file to be persisted, addressed by a slash-separated relative path.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub path: String,
    pub content_type: String,
    pub bytes: Bytes,
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Persist the object and return its public URL.
    async fn upload(&self, object: StoredObject) -> ServiceResult<String>;
}

pub struct NoopObjectStorage;

#[async_trait]
impl ObjectStorage for NoopObjectStorage {
    async fn upload(&self, object: StoredObject) -> ServiceResult<String> {
        warn!(path = %object.path, "upload requested but no object storage is configured");
        Err("object storage not configured".into())
    }
}

// ── Bundle ──────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct Services {
    pub payments: Arc<dyn PaymentService>,
    pub storage: Arc<dyn ObjectStorage>,
}

impl Default for Services {
    fn default() -> Self {
        Self {
            payments: Arc::new(NoopPaymentService),
            storage: Arc::new(NoopObjectStorage),
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
