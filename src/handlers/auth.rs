use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, Json};
use axum_extra::extract::{
    cookie::{Cookie, SameSite},
    CookieJar,
};
use time::Duration;

use crate::{
    auth::{
        session::{Session, TokenTtls},
        AuthSubject, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE, REFRESH_TOKEN_HEADER,
    },
    dto::auth::{LoginRequest, MeResponse, TokenResponse},
    errors::{AppError, AuthError},
    services::auth_service,
    state::AppState,
};

/// The refresh cookie is only sent to the endpoints that consume it.
const REFRESH_COOKIE_PATH: &str = "/auth";

pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<TokenResponse>), AppError> {
    let session = auth_service::login(&state, req).await?;
    let jar = set_session_cookies(jar, &session, state.sessions.ttls());
    Ok((jar, Json(session.into())))
}

pub async fn refresh_access(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Result<(CookieJar, Json<TokenResponse>), AppError> {
    let refresh_token = presented_refresh_token(&jar, &headers)?;
    let session = auth_service::refresh(&state, &refresh_token).await?;
    let jar = set_session_cookies(jar, &session, state.sessions.ttls());
    Ok((jar, Json(session.into())))
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Result<(CookieJar, Json<serde_json::Value>), AppError> {
    let refresh_token = presented_refresh_token(&jar, &headers)?;
    auth_service::logout(&state, &refresh_token).await?;

    let jar = jar
        .remove(Cookie::build(ACCESS_TOKEN_COOKIE).path("/"))
        .remove(Cookie::build(REFRESH_TOKEN_COOKIE).path(REFRESH_COOKIE_PATH));
    Ok((jar, Json(serde_json::json!({ "status": "ok" }))))
}

pub async fn me(
    State(state): State<Arc<AppState>>,
    AuthSubject(subject): AuthSubject,
) -> Result<Json<MeResponse>, AppError> {
    let profile = auth_service::me(&state, &subject).await?;
    Ok(Json(profile.into()))
}

fn presented_refresh_token(jar: &CookieJar, headers: &HeaderMap) -> Result<String, AppError> {
    if let Some(c) = jar.get(REFRESH_TOKEN_COOKIE) {
        return Ok(c.value().to_string());
    }
    headers
        .get(REFRESH_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(AppError::Auth(AuthError::TokenInvalid))
}

/// Cookie lifetimes are the token TTLs, so a cookie never outlives its token.
fn set_session_cookies(jar: CookieJar, session: &Session, ttls: TokenTtls) -> CookieJar {
    let access = Cookie::build((ACCESS_TOKEN_COOKIE, session.access_token.clone()))
        .path("/")
        .max_age(Duration::seconds(ttls.access.num_seconds()))
        .http_only(true)
        .same_site(SameSite::Lax);

    let refresh = Cookie::build((REFRESH_TOKEN_COOKIE, session.refresh_token.clone()))
        .path(REFRESH_COOKIE_PATH)
        .max_age(Duration::seconds(ttls.refresh.num_seconds()))
        .http_only(true)
        .same_site(SameSite::Lax);

    jar.add(access).add(refresh)
}
