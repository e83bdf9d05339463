use {
    agora_service_traits::{
        CheckoutRequest, CheckoutSession, PaymentService, ServiceError, ServiceResult,
        SessionStatus,
    },
    async_trait::async_trait,
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, de::DeserializeOwned},
    tracing::{debug, warn},
};

const SERVICE: &str = "stripe";

pub struct StripeClient {
    api_base: String,
    secret_key: Secret<String>,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SessionBody {
    id: String,
    url: Option<String>,
    payment_status: Option<String>,
    amount_total: Option<i64>,
}

/// Flatten a checkout request into Stripe's bracketed form encoding.
pub fn checkout_form(request: &CheckoutRequest) -> Vec<(String, String)> {
    let mut form = vec![
        ("mode".to_string(), "payment".to_string()),
        ("payment_method_types[0]".to_string(), "card".to_string()),
        ("success_url".to_string(), request.success_url.clone()),
        ("cancel_url".to_string(), request.cancel_url.clone()),
    ];
    for (i, item) in request.line_items.iter().enumerate() {
        let prefix = format!("line_items[{i}]");
        form.push((
            format!("{prefix}[price_data][currency]"),
            request.currency.clone(),
        ));
        form.push((
            format!("{prefix}[price_data][unit_amount]"),
            item.unit_amount.to_string(),
        ));
        form.push((
            format!("{prefix}[price_data][product_data][name]"),
            item.name.clone(),
        ));
        if let Some(image) = &item.image {
            form.push((
                format!("{prefix}[price_data][product_data][images][0]"),
                image.clone(),
            ));
        }
        form.push((format!("{prefix}[quantity]"), item.quantity.to_string()));
    }
    for (key, value) in &request.metadata {
        form.push((format!("metadata[{key}]"), value.clone()));
    }
    form
}

impl StripeClient {
    pub fn new(api_base: impl Into<String>, secret_key: Secret<String>) -> Self {
        Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            secret_key,
            client: reqwest::Client::new(),
        }
    }

    async fn read<T: DeserializeOwned>(resp: reqwest::Response) -> ServiceResult<T> {
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| ServiceError::upstream(SERVICE, e))?;
        if !status.is_success() {
            let message = serde_json::from_str::<StripeErrorBody>(&body)
                .ok()
                .and_then(|b| b.error.message)
                .unwrap_or_else(|| format!("request failed with status {status}"));
            warn!(%status, %message, "stripe request failed");
            return Err(ServiceError::upstream(SERVICE, message));
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl PaymentService for StripeClient {
    async fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> ServiceResult<CheckoutSession> {
        let resp = self
            .client
            .post(format!("{}/v1/checkout/sessions", self.api_base))
            .bearer_auth(self.secret_key.expose_secret())
            .form(&checkout_form(&request))
            .send()
            .await
            .map_err(|e| ServiceError::upstream(SERVICE, e))?;
        let session: SessionBody = Self::read(resp).await?;
        debug!(session_id = %session.id, "created checkout session");
        Ok(CheckoutSession {
            id: session.id,
            url: session.url,
        })
    }

    async fn retrieve_session(&self, session_id: &str) -> ServiceResult<SessionStatus> {
        let resp = self
            .client
            .get(format!(
                "{}/v1/checkout/sessions/{}",
                self.api_base,
                urlencoding::encode(session_id)
            ))
            .bearer_auth(self.secret_key.expose_secret())
            .send()
            .await
            .map_err(|e| ServiceError::upstream(SERVICE, e))?;
        let session: SessionBody = Self::read(resp).await?;
        Ok(SessionStatus {
            id: session.id,
            payment_status: session.payment_status.unwrap_or_default(),
            amount_total: session.amount_total,
        })
    }
}
