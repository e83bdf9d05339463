use {
    agora_config::AuthConfig,
    axum_extra::extract::cookie::{Cookie, SameSite},
};

/// Parse a specific cookie value from a `Cookie` header string.
pub fn parse_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    for part in header.split(';') {
        let part = part.trim();
        if let Some(value) = part.strip_prefix(name)
            && let Some(value) = value.strip_prefix('=')
        {
            return Some(value);
        }
    }
    None
}

/// The http-only cookie carrying the refresh token.
#[derive(Debug, Clone)]
pub struct RefreshCookie {
    name: String,
    max_age_secs: i64,
    secure: bool,
}

impl RefreshCookie {
    pub fn new(name: impl Into<String>, max_age_secs: i64, secure: bool) -> Self {
        Self {
            name: name.into(),
            max_age_secs,
            secure,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            config.refresh_cookie_name.clone(),
            config.refresh_cookie_max_age_secs,
            config.secure_cookies,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read the refresh token out of a `Cookie` request header.
    pub fn read<'a>(&self, cookie_header: &'a str) -> Option<&'a str> {
        parse_cookie(cookie_header, &self.name).filter(|v| !v.is_empty())
    }

    /// `Set-Cookie` value storing `token`.
    pub fn set(&self, token: &str) -> String {
        self.build(token.to_string(), self.max_age_secs)
    }

    /// `Set-Cookie` value that expires the cookie immediately.
    pub fn clear(&self) -> String {
        self.build(String::new(), 0)
    }

    fn build(&self, value: String, max_age_secs: i64) -> String {
        let mut cookie = Cookie::build((self.name.clone(), value))
            .http_only(true)
            .path("/")
            .max_age(time::Duration::seconds(max_age_secs));
        if self.secure {
            // Cross-site frontends only receive the cookie with SameSite=None.
            cookie = cookie.secure(true).same_site(SameSite::None);
        } else {
            cookie = cookie.same_site(SameSite::Lax);
        }
        cookie.build().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_cookie_finds_named_value() {
        let header = "theme=dark; ecommerce_refresh_token=abc.def; other=1";
        assert_eq!(
            parse_cookie(header, "ecommerce_refresh_token"),
            Some("abc.def")
        );
        assert_eq!(parse_cookie(header, "missing"), None);
        assert_eq!(parse_cookie("", "theme"), None);
    }

    #[test]
    fn read_ignores_empty_value() {
        let cookie = RefreshCookie::new("rt", 60, false);
        assert_eq!(cookie.read("rt=; a=b"), None);
        assert_eq!(cookie.read("a=b; rt=tok"), Some("tok"));
    }

    #[test]
    fn set_cookie_attributes() {
        let cookie = RefreshCookie::from_config(&AuthConfig::default());
        let header = cookie.set("tok");
        assert!(header.starts_with("ecommerce_refresh_token=tok"));
        assert!(header.contains("HttpOnly"));
        assert!(header.contains("Path=/"));
        assert!(header.contains("Max-Age=2592000"));
        assert!(!header.contains("Secure"));
    }

    #[test]
    fn secure_cookie_allows_cross_site() {
        let cookie = RefreshCookie::new("rt", 60, true);
        let header = cookie.set("tok");
        assert!(header.contains("Secure"));
        assert!(header.contains("SameSite=None"));
    }

    #[test]
    fn clear_expires_immediately() {
        let cookie = RefreshCookie::new("rt", 60, false);
        let header = cookie.clear();
        assert!(header.starts_with("rt="));
        assert!(header.contains("Max-Age=0"));
    }
}
