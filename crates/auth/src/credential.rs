use tracing::debug;

use crate::TokenIssuer;

/// The account a verified access token speaks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthIdentity {
    /// Account id exactly as carried in the token (string form).
    pub account_id: String,
    pub access_token: String,
}

/// Outcome of inspecting the `Authorization` header of one request.
///
/// Resolvers distinguish "no header at all" from "header present but bad":
/// some reads return an error for the former and an empty result for the latter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Credential {
    #[default]
    Missing,
    Invalid,
    Valid(AuthIdentity),
}

impl Credential {
    pub fn from_authorization(header: Option<&str>, issuer: &TokenIssuer) -> Self {
        let Some(header) = header else {
            return Self::Missing;
        };
        let Some(token) = bearer_token(header) else {
            debug!("authorization header is not a bearer token");
            return Self::Invalid;
        };
        match issuer.verify_access(token) {
            Ok(claims) => Self::Valid(AuthIdentity {
                account_id: claims.account_id,
                access_token: token.to_string(),
            }),
            Err(e) => {
                debug!(error = %e, "rejected access token");
                Self::Invalid
            },
        }
    }

    pub fn identity(&self) -> Option<&AuthIdentity> {
        match self {
            Self::Valid(identity) => Some(identity),
            Self::Missing | Self::Invalid => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

/// Extract the token from `Bearer <token>`. The scheme is case-insensitive.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use {super::*, secrecy::Secret, std::time::Duration};

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(
            &Secret::new("a".into()),
            &Secret::new("r".into()),
            Duration::from_secs(60),
            Duration::from_secs(120),
        )
    }

    #[test]
    fn bearer_scheme_parsing() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("bearer   abc "), Some("abc"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("abc"), None);
    }

    #[test]
    fn missing_invalid_and_valid() {
        let issuer = issuer();
        assert_eq!(
            Credential::from_authorization(None, &issuer),
            Credential::Missing
        );
        assert_eq!(
            Credential::from_authorization(Some("Bearer junk"), &issuer),
            Credential::Invalid
        );

        let pair = issuer.issue(5).unwrap();
        let header = format!("Bearer {}", pair.access_token);
        let cred = Credential::from_authorization(Some(&header), &issuer);
        let identity = cred.identity().expect("valid token");
        assert_eq!(identity.account_id, "5");
        assert_eq!(identity.access_token, pair.access_token);
    }

    #[test]
    fn refresh_token_is_not_an_access_credential() {
        let issuer = issuer();
        let pair = issuer.issue(5).unwrap();
        let header = format!("Bearer {}", pair.refresh_token);
        assert_eq!(
            Credential::from_authorization(Some(&header), &issuer),
            Credential::Invalid
        );
    }
}
