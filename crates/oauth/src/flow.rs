use {
    agora_config::GoogleOAuthConfig,
    secrecy::{ExposeSecret, Secret},
    tracing::debug,
    url::Url,
};

use crate::{
    Error, Result,
    types::{GoogleProfile, GoogleTokens},
};

/// Authorization code flow against Google's OAuth 2.0 endpoints.
pub struct GoogleFlow {
    config: GoogleOAuthConfig,
    client: reqwest::Client,
}

impl GoogleFlow {
    pub fn new(config: GoogleOAuthConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Build the consent-screen URL the browser is redirected to.
    pub fn authorize_url(&self, state: &str) -> Result<String> {
        let mut url = Url::parse(&self.config.auth_url)
            .map_err(|source| Error::external(format!("invalid auth_url: {source}"), source))?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.callback_url)
            .append_pair("state", state);
        if !self.config.scopes.is_empty() {
            url.query_pairs_mut()
                .append_pair("scope", &self.config.scopes.join(" "));
        }
        Ok(url.to_string())
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange(&self, code: &str) -> Result<GoogleTokens> {
        let form = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.callback_url.as_str()),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.expose_secret().as_str()),
        ];
        let resp = self
            .client
            .post(&self.config.token_url)
            .form(&form)
            .send()
            .await?
            .error_for_status()?
            .json::<serde_json::Value>()
            .await?;
        parse_token_response(&resp)
    }

    pub async fn fetch_profile(&self, access_token: &Secret<String>) -> Result<GoogleProfile> {
        let profile: GoogleProfile = self
            .client
            .get(&self.config.userinfo_url)
            .bearer_auth(access_token.expose_secret())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        debug!(sub = %profile.sub, "fetched google profile");
        Ok(profile)
    }

    /// Run the callback half of the flow: code in, profile out.
    pub async fn complete(&self, code: &str) -> Result<GoogleProfile> {
        let tokens = self.exchange(code).await?;
        self.fetch_profile(&tokens.access_token).await
    }
}

fn parse_token_response(resp: &serde_json::Value) -> Result<GoogleTokens> {
    let access_token = resp["access_token"]
        .as_str()
        .ok_or_else(|| Error::message("missing access_token in response"))?
        .to_string();
    let id_token = resp["id_token"].as_str().map(|s| Secret::new(s.to_string()));

    Ok(GoogleTokens {
        access_token: Secret::new(access_token),
        id_token,
        expires_in: resp["expires_in"].as_u64(),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn token_response_requires_access_token() {
        let err = parse_token_response(&serde_json::json!({ "id_token": "x" })).unwrap_err();
        assert!(err.to_string().contains("access_token"));

        let tokens =
            parse_token_response(&serde_json::json!({ "access_token": "ya29", "expires_in": 3599 }))
                .unwrap();
        assert_eq!(tokens.access_token.expose_secret(), "ya29");
        assert_eq!(tokens.expires_in, Some(3599));
        assert!(tokens.id_token.is_none());
    }
}
