use {secrecy::Secret, serde::Deserialize};

/// Tokens returned by the Google token endpoint.
#[derive(Debug)]
pub struct GoogleTokens {
    pub access_token: Secret<String>,
    pub id_token: Option<Secret<String>>,
    pub expires_in: Option<u64>,
}

/// The subset of the OpenID userinfo document used to create accounts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GoogleProfile {
    /// Stable Google account id, stored as the account's `provider_id`.
    pub sub: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

impl GoogleProfile {
    /// Display name, falling back to the email local part and then the id.
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .or_else(|| {
                self.email
                    .as_deref()
                    .and_then(|e| e.split('@').next())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| self.sub.clone())
    }
}
