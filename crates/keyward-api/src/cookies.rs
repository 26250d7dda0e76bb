//! Refresh credential cookie.
//!
//! HttpOnly so client-side script never reads it; SameSite=Strict and
//! scoped to the auth path so the browser only sends it to the auth routes.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use keyward_core::config::RefreshCookieConfig;

/// Build the cookie carrying a refresh credential.
pub fn refresh_cookie(config: &RefreshCookieConfig, token: String) -> Cookie<'static> {
    Cookie::build((config.name.clone(), token))
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(config.secure)
        .path(config.path.clone())
        .max_age(time::Duration::seconds(
            i64::try_from(config.max_age_seconds).unwrap_or(i64::MAX),
        ))
        .build()
}

/// Build a cookie that instructs the client to drop the refresh credential.
pub fn removal_cookie(config: &RefreshCookieConfig) -> Cookie<'static> {
    let mut cookie = refresh_cookie(config, String::new());
    cookie.make_removal();
    cookie
}

/// The refresh credential presented with the request, if any.
pub fn read_refresh_token(jar: &CookieJar, config: &RefreshCookieConfig) -> Option<String> {
    jar.get(&config.name)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}
