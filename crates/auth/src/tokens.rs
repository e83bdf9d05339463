use std::{
    fmt,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use {
    agora_config::AuthConfig,
    jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode},
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Deserializer, Serialize, de},
};

use crate::{Error, Result};

/// JWT payload shared by access and refresh tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Accepts both `"7"` and `7` so tokens minted by older clients verify.
    #[serde(deserialize_with = "account_id_from_any")]
    pub account_id: String,
    pub iat: u64,
    pub exp: u64,
}

#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Clone)]
struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl SigningKeys {
    fn new(secret: &Secret<String>, ttl: Duration) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            ttl,
        }
    }
}

/// Signs and verifies access and refresh tokens with independent secrets.
#[derive(Clone)]
pub struct TokenIssuer {
    access: SigningKeys,
    refresh: SigningKeys,
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("access_ttl", &self.access.ttl)
            .field("refresh_ttl", &self.refresh.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    pub fn new(
        access_secret: &Secret<String>,
        refresh_secret: &Secret<String>,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            access: SigningKeys::new(access_secret, access_ttl),
            refresh: SigningKeys::new(refresh_secret, refresh_ttl),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        let access = config
            .access_token_secret
            .as_ref()
            .ok_or(Error::MissingSecret("auth.access_token_secret"))?;
        let refresh = config
            .refresh_token_secret
            .as_ref()
            .ok_or(Error::MissingSecret("auth.refresh_token_secret"))?;
        Ok(Self::new(
            access,
            refresh,
            Duration::from_secs(config.access_token_ttl_secs),
            Duration::from_secs(config.refresh_token_ttl_secs),
        ))
    }

    pub fn issue(&self, account_id: impl fmt::Display) -> Result<TokenPair> {
        let account_id = account_id.to_string();
        Ok(TokenPair {
            access_token: sign(&self.access, &account_id)?,
            refresh_token: sign(&self.refresh, &account_id)?,
        })
    }

    pub fn verify_access(&self, token: &str) -> Result<Claims> {
        verify(&self.access, token)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<Claims> {
        verify(&self.refresh, token)
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

fn sign(keys: &SigningKeys, account_id: &str) -> Result<String> {
    let iat = now_secs();
    let claims = Claims {
        account_id: account_id.to_string(),
        iat,
        exp: iat + keys.ttl.as_secs(),
    };
    Ok(encode(&Header::default(), &claims, &keys.encoding)?)
}

fn verify(keys: &SigningKeys, token: &str) -> Result<Claims> {
    let validation = Validation::new(Algorithm::HS256);
    Ok(decode::<Claims>(token, &keys.decoding, &validation)?.claims)
}

fn account_id_from_any<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    struct AccountIdVisitor;

    impl de::Visitor<'_> for AccountIdVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an account id as string or integer")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<String, E> {
            Ok(v.trim().to_string())
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<String, E> {
            Ok(v.to_string())
        }
    }

    deserializer.deserialize_any(AccountIdVisitor)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(
            &Secret::new("access-secret".into()),
            &Secret::new("refresh-secret".into()),
            Duration::from_secs(900),
            Duration::from_secs(86_400),
        )
    }

    #[test]
    fn access_token_round_trips_account_id() {
        let issuer = issuer();
        let pair = issuer.issue(42).unwrap();
        let claims = issuer.verify_access(&pair.access_token).unwrap();
        assert_eq!(claims.account_id, "42");
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn tokens_are_not_interchangeable() {
        let issuer = issuer();
        let pair = issuer.issue(1).unwrap();
        assert!(issuer.verify_access(&pair.refresh_token).is_err());
        assert!(issuer.verify_refresh(&pair.access_token).is_err());
        assert!(issuer.verify_refresh(&pair.refresh_token).is_ok());
    }

    #[test]
    fn expired_token_is_rejected() {
        let issuer = issuer();
        let stale = Claims {
            account_id: "3".into(),
            iat: 1_000,
            exp: 2_000,
        };
        let token = encode(&Header::default(), &stale, &issuer.access.encoding).unwrap();
        assert!(matches!(issuer.verify_access(&token), Err(Error::Token(_))));
    }

    #[test]
    fn numeric_account_id_claim_is_accepted() {
        let issuer = issuer();
        let exp = now_secs() + 60;
        let payload = serde_json::json!({ "account_id": 7, "iat": now_secs(), "exp": exp });
        let token = encode(&Header::default(), &payload, &issuer.access.encoding).unwrap();
        let claims = issuer.verify_access(&token).unwrap();
        assert_eq!(claims.account_id, "7");
    }

    #[test]
    fn from_config_requires_both_secrets() {
        let mut cfg = AuthConfig::default();
        cfg.access_token_secret = Some(Secret::new("a".into()));
        let err = TokenIssuer::from_config(&cfg).expect_err("refresh secret missing");
        assert!(matches!(err, Error::MissingSecret("auth.refresh_token_secret")));
    }
}
