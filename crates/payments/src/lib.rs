//! Hosted checkout through the Stripe REST API.

pub mod stripe;

use std::sync::Arc;

use {
    agora_config::PaymentsConfig,
    agora_service_traits::{NoopPaymentService, PaymentService},
    tracing::info,
};

pub use stripe::{StripeClient, checkout_form};

/// Stripe when a secret key is configured, otherwise a service that refuses checkout.
pub fn build_payments(config: &PaymentsConfig) -> Arc<dyn PaymentService> {
    match &config.stripe_secret_key {
        Some(key) => Arc::new(StripeClient::new(&config.stripe_api_base, key.clone())),
        None => {
            info!("no stripe secret key configured, checkout disabled");
            Arc::new(NoopPaymentService)
        },
    }
}
