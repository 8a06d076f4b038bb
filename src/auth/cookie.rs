use axum::http::{header, HeaderMap, HeaderValue};

use crate::config::SessionConfig;

/// Value of the named cookie from the request's Cookie headers
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

fn build(config: &SessionConfig, value: &str, max_age_secs: i64) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        config.cookie_name, value, max_age_secs
    );
    if config.secure_cookie {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Set-Cookie value establishing the session
pub fn session_cookie(config: &SessionConfig, token: &str) -> Result<HeaderValue, header::InvalidHeaderValue> {
    HeaderValue::from_str(&build(config, token, config.ttl().num_seconds()))
}

/// Set-Cookie value that makes the browser drop the session cookie
pub fn clear_cookie(config: &SessionConfig) -> Result<HeaderValue, header::InvalidHeaderValue> {
    HeaderValue::from_str(&build(config, "", 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn reads_named_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; sitecms.sid=abc.def.ghi; lang=en"),
        );
        assert_eq!(read_cookie(&headers, "sitecms.sid").as_deref(), Some("abc.def.ghi"));
        assert_eq!(read_cookie(&headers, "missing"), None);
    }

    #[test]
    fn empty_cookie_counts_as_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("sitecms.sid="));
        assert_eq!(read_cookie(&headers, "sitecms.sid"), None);
    }

    #[test]
    fn builds_http_only_cookie() {
        let mut config = AppConfig::development().session;
        let cookie = session_cookie(&config, "tok").unwrap();
        let cookie = cookie.to_str().unwrap();
        assert!(cookie.starts_with("sitecms.sid=tok;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=86400"));
        assert!(!cookie.contains("Secure"));

        config.secure_cookie = true;
        let cleared = clear_cookie(&config).unwrap();
        assert!(cleared.to_str().unwrap().contains("Max-Age=0"));
        assert!(cleared.to_str().unwrap().ends_with("; Secure"));
    }

    #[test]
    fn huge_ttl_does_not_overflow_max_age() {
        let mut config = AppConfig::development().session;
        config.ttl_hours = u64::MAX;
        let cookie = session_cookie(&config, "tok").unwrap();
        assert!(cookie.to_str().unwrap().contains("Max-Age=31536000"));
    }
}
