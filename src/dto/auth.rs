use serde::{Deserialize, Serialize};

use crate::{auth::session::Session, credentials::UserProfile};

#[derive(Deserialize)]
pub struct LoginRequest {
    pub identifier: String,
    pub secret: String,
}

#[derive(Serialize, Debug)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
}

impl From<Session> for TokenResponse {
    fn from(s: Session) -> Self {
        Self {
            access_token: s.access_token,
            refresh_token: s.refresh_token,
            token_type: "Bearer".to_string(),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct MeResponse {
    pub user_id: String,
    pub email: String,
}

impl From<UserProfile> for MeResponse {
    fn from(p: UserProfile) -> Self {
        Self {
            user_id: p.id,
            email: p.email,
        }
    }
}
