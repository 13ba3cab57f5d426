use axum::http::{header, HeaderMap};

use crate::config::AuthConfig;

/// `Max-Age` mirrors the server-side session lifetime.
pub fn session_cookie(config: &AuthConfig, token: &str, ttl: chrono::Duration) -> String {
    let max_age_secs = ttl.num_seconds().max(0);
    format!(
        "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}{}",
        config.cookie_name,
        token,
        max_age_secs,
        secure_flag(config)
    )
}

pub fn clear_session_cookie(config: &AuthConfig) -> String {
    format!(
        "{}=; HttpOnly; SameSite=Strict; Path=/; Max-Age=0{}",
        config.cookie_name,
        secure_flag(config)
    )
}

fn secure_flag(config: &AuthConfig) -> &'static str {
    if config.secure_cookie {
        "; Secure"
    } else {
        ""
    }
}

/// Value of the first cookie called `name` across all Cookie headers.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|s| s.split(';'))
        .map(|s| s.trim())
        .find_map(|cookie| {
            let mut split = cookie.splitn(2, '=');
            let key = split.next()?.trim();
            let val = split.next()?.trim();
            if key == name && !val.is_empty() {
                Some(val)
            } else {
                None
            }
        })
}
