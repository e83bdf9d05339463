//! Process-wide resolver state and the per-request context.

use std::sync::{Arc, Mutex};

use {
    agora_auth::{Credential, RefreshCookie, TokenIssuer},
    agora_config::{FrontendConfig, LimitsConfig},
    agora_service_traits::Services,
    agora_store::Database,
};

use crate::{gate::OwnershipGate, loaders::Loaders};

/// State shared by every request, injected once into the schema.
pub struct GqlContext {
    pub db: Database,
    pub services: Services,
    pub tokens: TokenIssuer,
    pub refresh_cookie: RefreshCookie,
    pub limits: LimitsConfig,
    pub frontend: FrontendConfig,
    /// ISO currency code used for checkout sessions.
    pub currency: String,
}

impl GqlContext {
    pub fn gate(&self) -> OwnershipGate {
        OwnershipGate::new(self.db.pool().clone())
    }
}

/// Everything that lives exactly as long as one GraphQL request.
///
/// The HTTP layer builds one per request, attaches it with
/// `Request::data(Arc<RequestContext>)` and afterwards collects the cookies
/// resolvers asked to set.
pub struct RequestContext {
    pub credential: Credential,
    pub loaders: Loaders,
    cookies: Mutex<Vec<String>>,
}

impl RequestContext {
    pub fn new(app: &GqlContext, credential: Credential) -> Self {
        Self {
            credential,
            loaders: Loaders::new(app.db.pool()),
            cookies: Mutex::new(Vec::new()),
        }
    }

    /// Build from a raw `Authorization` header value.
    pub fn from_authorization(app: &GqlContext, header: Option<&str>) -> Self {
        Self::new(app, Credential::from_authorization(header, &app.tokens))
    }

    /// Queue a `Set-Cookie` header value for the response.
    pub fn set_cookie(&self, value: String) {
        self.cookies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(value);
    }

    pub fn take_cookies(&self) -> Vec<String> {
        std::mem::take(&mut *self.cookies.lock().unwrap_or_else(|e| e.into_inner()))
    }
}

/// Both contexts, borrowed from a resolver's `Context`.
pub(crate) struct Scope<'a> {
    pub app: &'a GqlContext,
    pub request: &'a RequestContext,
}

impl<'a> Scope<'a> {
    pub fn of(ctx: &'a async_graphql::Context<'_>) -> async_graphql::Result<Self> {
        Ok(Self {
            app: ctx.data::<Arc<GqlContext>>()?,
            request: ctx.data::<Arc<RequestContext>>()?,
        })
    }

    pub fn pool(&self) -> &'a sqlx::SqlitePool {
        self.app.db.pool()
    }
}
