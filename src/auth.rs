pub mod jwt;
pub mod keys;
pub mod session;

use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts, RequestPartsExt};
use axum_extra::{
    extract::CookieJar,
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::{
    errors::{AppError, AuthError},
    state::AppState,
};

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";
pub const REFRESH_TOKEN_HEADER: &str = "x-refresh-token";

/// Subject of a valid access token, taken from `Authorization: Bearer` or the access cookie.
#[derive(Debug, Clone)]
pub struct AuthSubject(pub String);

impl FromRequestParts<Arc<AppState>> for AuthSubject {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = match parts.extract::<TypedHeader<Authorization<Bearer>>>().await {
            Ok(TypedHeader(Authorization(bearer))) => bearer.token().to_string(),
            Err(_) => CookieJar::from_headers(&parts.headers)
                .get(ACCESS_TOKEN_COOKIE)
                .map(|c| c.value().to_string())
                .ok_or(AuthError::TokenInvalid)?,
        };

        let subject = state.sessions.validate_access(&token)?;
        Ok(Self(subject))
    }
}
