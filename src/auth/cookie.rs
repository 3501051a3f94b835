//! Session transport: the `token` cookie.

use axum::http::{header::COOKIE, HeaderMap, HeaderValue};

use crate::config::AppConfig;

pub const SESSION_COOKIE: &str = "token";

const MAX_AGE_SECS: i64 = 7 * 24 * 60 * 60;

/// Build the `Set-Cookie` value carrying a freshly issued session token.
pub fn session_cookie(
    config: &AppConfig,
    token: &str,
) -> Result<HeaderValue, axum::http::header::InvalidHeaderValue> {
    build(config, token, MAX_AGE_SECS)
}

/// Build the `Set-Cookie` value that clears the session cookie.
///
/// Browsers only honor the clear when every attribute except `Max-Age`
/// matches the cookie originally set, so both paths share `build`.
pub fn clear_session_cookie(
    config: &AppConfig,
) -> Result<HeaderValue, axum::http::header::InvalidHeaderValue> {
    build(config, "", 0)
}

fn build(
    config: &AppConfig,
    value: &str,
    max_age: i64,
) -> Result<HeaderValue, axum::http::header::InvalidHeaderValue> {
    let mut cookie = format!("{SESSION_COOKIE}={value}; Path=/; HttpOnly; Max-Age={max_age}");
    if config.is_production() {
        // Cross-site cookies require SameSite=None, which requires Secure
        cookie.push_str("; SameSite=None; Secure");
        if let Some(domain) = &config.security.cookie_domain {
            cookie.push_str("; Domain=");
            cookie.push_str(domain);
        }
    } else {
        cookie.push_str("; SameSite=Lax");
    }
    HeaderValue::from_str(&cookie)
}

/// Pull the session token out of the request's `Cookie` header, if present.
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    let header = headers.get(COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let trimmed = pair.trim();
        let mut parts = trimmed.splitn(2, '=');
        let key = parts.next()?.trim();
        let val = parts.next()?.trim();
        if key == SESSION_COOKIE && !val.is_empty() {
            return Some(val.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn dev_config() -> AppConfig {
        let mut config = AppConfig::from_env();
        config.environment = crate::config::Environment::Development;
        config.security.cookie_domain = None;
        config
    }

    fn prod_config() -> AppConfig {
        let mut config = dev_config();
        config.environment = crate::config::Environment::Production;
        config.security.cookie_domain = Some("example.com".to_string());
        config
    }

    #[test]
    fn development_cookie_attributes() {
        let cookie = session_cookie(&dev_config(), "abc").unwrap();
        let cookie = cookie.to_str().unwrap();
        assert!(cookie.starts_with("token=abc; "));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Max-Age=604800"));
        assert!(!cookie.contains("Secure"));
        assert!(!cookie.contains("Domain="));
    }

    #[test]
    fn production_cookie_is_cross_site_and_secure() {
        let cookie = session_cookie(&prod_config(), "abc").unwrap();
        let cookie = cookie.to_str().unwrap();
        assert!(cookie.contains("SameSite=None"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("Domain=example.com"));
    }

    #[test]
    fn clear_cookie_matches_set_cookie_except_max_age() {
        let config = dev_config();
        let set = session_cookie(&config, "abc").unwrap();
        let clear = clear_session_cookie(&config).unwrap();
        let strip = |s: &HeaderValue| {
            s.to_str()
                .unwrap()
                .split("; ")
                .filter(|attr| !attr.starts_with("Max-Age") && !attr.starts_with("token="))
                .collect::<Vec<_>>()
                .join("; ")
        };
        assert_eq!(strip(&set), strip(&clear));
        assert!(clear.to_str().unwrap().contains("Max-Age=0"));
        assert!(clear.to_str().unwrap().starts_with("token=;"));
    }

    #[test]
    fn extracts_token_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; token=abc123; lang=en"),
        );
        assert_eq!(extract_session_token(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn missing_or_empty_token_yields_none() {
        let mut headers = HeaderMap::new();
        assert!(extract_session_token(&headers).is_none());

        headers.insert(COOKIE, HeaderValue::from_static("token=; theme=dark"));
        assert!(extract_session_token(&headers).is_none());
    }
}
