use tokio::time::timeout_at;
use tracing::{error, warn};

use crate::{
    auth::session::Session,
    credentials::UserProfile,
    dto::auth::LoginRequest,
    errors::{AppError, AuthError},
    state::AppState,
};

pub async fn login(state: &AppState, req: LoginRequest) -> Result<Session, AppError> {
    let identifier = req.identifier.trim();
    if identifier.is_empty() || req.secret.is_empty() {
        return Err(AppError::Validation("identifier/secret required".into()));
    }

    let deadline = state.deadline();

    let subject = timeout_at(deadline, state.credentials.verify(identifier, &req.secret))
        .await
        .map_err(|_| {
            error!("credential check timed out");
            AuthError::StoreUnavailable
        })?
        .inspect_err(|e| warn!(error = %e, "login rejected"))?;

    Ok(state.sessions.login(&subject, deadline).await?)
}

pub async fn refresh(state: &AppState, refresh_token: &str) -> Result<Session, AppError> {
    Ok(state
        .sessions
        .rotate_refresh(refresh_token, state.deadline())
        .await?)
}

pub async fn me(state: &AppState, subject: &str) -> Result<UserProfile, AppError> {
    Ok(state.sessions.profile(subject, state.deadline()).await?)
}

pub async fn logout(state: &AppState, refresh_token: &str) -> Result<(), AppError> {
    Ok(state.sessions.revoke(refresh_token, state.deadline()).await?)
}
