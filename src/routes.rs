use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::{
    handlers::{api as api_handlers, auth as auth_handlers},
    state::AppState,
};

pub fn app_router(state: Arc<AppState>) -> Router {
    let auth = Router::new()
        .route("/login", post(auth_handlers::login))
        .route("/refresh-access", post(auth_handlers::refresh_access))
        .route("/logout", post(auth_handlers::logout))
        .route("/me", get(auth_handlers::me));

    Router::new()
        .route("/ping", get(api_handlers::ping))
        .nest("/auth", auth)
        .with_state(state)
}
