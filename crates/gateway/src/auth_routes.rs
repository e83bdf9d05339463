//! Cookie-based token refresh and the Google sign-in redirects.

use {
    agora_auth::{hash_password, parse_cookie},
    agora_oauth::{GoogleProfile, generate_state},
    agora_store::accounts::{self, NewProviderAccount},
    axum::{
        Json,
        extract::{Query, State},
        http::{HeaderMap, HeaderValue, StatusCode, header},
        response::{IntoResponse, Redirect, Response},
    },
    axum_extra::extract::cookie::{Cookie, SameSite},
    serde::{Deserialize, Serialize},
    tracing::{error, info, warn},
};

use crate::state::AppState;

const GOOGLE_PROVIDER: &str = "google";
const STATE_COOKIE: &str = "agora_oauth_state";
const STATE_COOKIE_MAX_AGE_SECS: i64 = 600;
const DEFAULT_USER_IMAGE: &str = "/images/default_user.png";

/// Body of `POST /refresh_token`.
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(rename = "errorMessage", skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl RefreshResponse {
    fn failure(message: &str) -> Self {
        Self {
            ok: false,
            access_token: None,
            error_message: Some(message.to_string()),
        }
    }
}

fn cookie_header(headers: &HeaderMap) -> &str {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

fn with_cookie(mut response: Response, cookie: &str) -> Response {
    match HeaderValue::from_str(cookie) {
        Ok(value) => {
            response.headers_mut().append(header::SET_COOKIE, value);
        },
        Err(e) => warn!(error = %e, "dropping malformed set-cookie value"),
    }
    response
}

/// Trade the refresh cookie for a new access token and rotate the cookie.
///
/// Failures are reported in the body with status 200 so the frontend can
/// treat "not signed in" as a normal outcome.
pub async fn refresh_token_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let app = &state.gql;
    let Some(token) = app.refresh_cookie.read(cookie_header(&headers)) else {
        return Json(RefreshResponse::failure("Refresh token doesn't exist")).into_response();
    };

    let account_id = match app.tokens.verify_refresh(token) {
        Ok(claims) => match claims.account_id.parse::<i64>() {
            Ok(id) if id > 0 => id,
            _ => {
                warn!(account_id = %claims.account_id, "refresh token carries a bad account id");
                return Json(RefreshResponse::failure("Invalid refresh token")).into_response();
            },
        },
        Err(e) => {
            info!(error = %e, "rejected refresh token");
            return Json(RefreshResponse::failure("Invalid refresh token")).into_response();
        },
    };

    match accounts::find_by_id(app.db.pool(), account_id).await {
        Ok(Some(_)) => {},
        Ok(None) => {
            return Json(RefreshResponse::failure("Cannot find account")).into_response();
        },
        Err(e) => {
            error!(error = %e, account_id, "account lookup failed during refresh");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        },
    }

    let pair = match app.tokens.issue(account_id) {
        Ok(pair) => pair,
        Err(e) => {
            error!(error = %e, account_id, "failed to issue tokens");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        },
    };

    let body = Json(RefreshResponse {
        ok: true,
        access_token: Some(pair.access_token),
        error_message: None,
    });
    with_cookie(
        body.into_response(),
        &app.refresh_cookie.set(&pair.refresh_token),
    )
}

fn state_cookie(value: String, max_age_secs: i64) -> String {
    Cookie::build((STATE_COOKIE, value))
        .http_only(true)
        .path("/auth/google")
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(max_age_secs))
        .build()
        .to_string()
}

/// Redirect the browser to Google's consent screen.
pub async fn google_login_handler(State(state): State<AppState>) -> Response {
    let Some(google) = state.google.as_ref() else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let csrf = generate_state();
    match google.authorize_url(&csrf) {
        Ok(url) => with_cookie(
            Redirect::to(&url).into_response(),
            &state_cookie(csrf, STATE_COOKIE_MAX_AGE_SECS),
        ),
        Err(e) => {
            error!(error = %e, "cannot build google authorization url");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        },
    }
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Finish the Google flow: check the anti-forgery state, exchange the code,
/// create the account on first sign-in and hand the provider id to the
/// frontend, which completes the login with `providerLogin`.
pub async fn google_callback_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<CallbackParams>,
) -> Response {
    let redirect_base = state.gql.frontend.redirect_url.clone();
    let Some(google) = state.google.clone() else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let expected = parse_cookie(cookie_header(&headers), STATE_COOKIE);
    let outcome = match (params.code, params.state, params.error) {
        (_, _, Some(reason)) => Err(format!("google returned an error: {reason}")),
        (Some(code), Some(returned), None) if expected == Some(returned.as_str()) => {
            match google.complete(&code).await {
                Ok(profile) => ensure_account(&state, &profile)
                    .await
                    .map(|()| profile.sub),
                Err(e) => Err(e.to_string()),
            }
        },
        _ => Err("missing code or state mismatch".to_string()),
    };

    let target = match outcome {
        Ok(provider_id) => {
            info!(provider = GOOGLE_PROVIDER, "google sign-in completed");
            format!(
                "{redirect_base}?provider={GOOGLE_PROVIDER}&provider_id={}",
                urlencoding::encode(&provider_id)
            )
        },
        Err(reason) => {
            warn!(%reason, "google sign-in failed");
            format!("{redirect_base}?failure=true")
        },
    };
    with_cookie(
        Redirect::to(&target).into_response(),
        &state_cookie(String::new(), 0),
    )
}

/// Create the provider account unless it already exists.
async fn ensure_account(state: &AppState, profile: &GoogleProfile) -> Result<(), String> {
    let pool = state.gql.db.pool();
    if accounts::find_by_provider(pool, GOOGLE_PROVIDER, &profile.sub)
        .await
        .map_err(|e| e.to_string())?
        .is_some()
    {
        return Ok(());
    }

    let sub = profile.sub.clone();
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&sub))
        .await
        .map_err(|e| e.to_string())?
        .map_err(|e| e.to_string())?;
    let name = profile.display_name();
    let id = accounts::insert_provider(pool, &NewProviderAccount {
        name: &name,
        email: profile.email.as_deref(),
        img_url: Some(profile.picture.as_deref().unwrap_or(DEFAULT_USER_IMAGE)),
        provider: GOOGLE_PROVIDER,
        provider_id: &profile.sub,
        password_hash: &password_hash,
    })
    .await
    .map_err(|e| e.to_string())?;
    info!(account_id = id, provider = GOOGLE_PROVIDER, "created provider account");
    Ok(())
}
