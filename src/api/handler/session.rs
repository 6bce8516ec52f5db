use std::sync::Arc;

use axum::extract::State;
use axum_extra::extract::cookie::{Cookie, CookieJar};
use time::OffsetDateTime;
use tracing::{error, info};

use crate::error::AppError;
use crate::models::AppState;

pub const SESSION_COOKIE: &str = "session_id";

pub async fn create_session_handler(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<CookieJar, AppError> {
    let session = state.session_service.create().await.map_err(|e| {
        error!(error = %e, "Session could not be created");
        AppError::SessionNotCreated
    })?;

    let expires = OffsetDateTime::from_unix_timestamp(session.expire_at.timestamp())
        .map_err(|e| {
            error!(error = %e, "Session expiry out of range");
            AppError::SessionNotCreated
        })?;

    info!(session_id = %session.session_id, "Issued session");

    let cookie = Cookie::build((SESSION_COOKIE, session.session_id))
        .path("/")
        .secure(true)
        .expires(expires);

    Ok(jar.add(cookie))
}

/// Pulls the session token out of the request cookies; absent or empty is
/// treated as unauthenticated.
pub fn session_from_cookies(jar: &CookieJar) -> Result<String, AppError> {
    jar.get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
        .ok_or(AppError::Unauthorized)
}
