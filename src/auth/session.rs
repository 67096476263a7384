//! Login, access validation, and single-use refresh rotation.
//!
//! A refresh chain is `absent -> active -> rotated (-> active')`, with
//! `revoked` reachable from `active` via [`SessionManager::revoke`]. The store
//! holds exactly the record of the one refresh token allowed to move the chain
//! forward. A refresh token whose record is gone has been rotated away or
//! revoked, and presenting it is a replay. A chain also stops moving once its
//! subject is no longer in the [`UserDirectory`].

use std::{future::Future, sync::Arc};

use chrono::{Duration, Utc};
use tokio::time::{timeout_at, Instant};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    auth::jwt::{sha256_hex, TokenCodec, TokenKind},
    credentials::{UserDirectory, UserProfile},
    errors::AuthError,
    store::{RefreshRecord, RefreshStore, StoreError},
};

/// Response value of login and rotation. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, Copy)]
pub struct TokenTtls {
    pub access: Duration,
    pub refresh: Duration,
}

impl TokenTtls {
    pub fn from_seconds(access: i64, refresh: i64) -> Self {
        // saturate instead of panicking; minting rejects an unrepresentable expiry
        Self {
            access: Duration::try_seconds(access).unwrap_or(Duration::MAX),
            refresh: Duration::try_seconds(refresh).unwrap_or(Duration::MAX),
        }
    }
}

pub struct SessionManager {
    codec: Arc<dyn TokenCodec>,
    store: Arc<dyn RefreshStore>,
    users: Arc<dyn UserDirectory>,
    ttls: TokenTtls,
}

impl SessionManager {
    pub fn new(
        codec: Arc<dyn TokenCodec>,
        store: Arc<dyn RefreshStore>,
        users: Arc<dyn UserDirectory>,
        ttls: TokenTtls,
    ) -> Self {
        Self {
            codec,
            store,
            users,
            ttls,
        }
    }

    pub fn ttls(&self) -> TokenTtls {
        self.ttls
    }

    /// Starts a new refresh chain for an already authenticated subject.
    pub async fn login(&self, subject: &str, deadline: Instant) -> Result<Session, AuthError> {
        if subject.is_empty() {
            return Err(AuthError::CredentialInvalid);
        }

        let (session, record) = self.mint_pair(subject)?;
        let refresh_id = record.token_id;

        bounded(deadline, self.store.put(record)).await?;

        info!(subject, %refresh_id, "session started");
        Ok(session)
    }

    /// Stateless: signature and claims only, no store access.
    pub fn validate_access(&self, token: &str) -> Result<String, AuthError> {
        self.codec
            .verify(TokenKind::Access, token)
            .map(|claims| claims.user_id)
            .inspect_err(|e| warn!(error = %e, "access token rejected"))
    }

    /// Loads the profile of a subject that still exists; a removed one is `CredentialInvalid`.
    pub async fn profile(&self, subject: &str, deadline: Instant) -> Result<UserProfile, AuthError> {
        bounded(deadline, self.users.find_profile(subject))
            .await?
            .ok_or_else(|| {
                warn!(subject, "subject no longer exists");
                AuthError::CredentialInvalid
            })
    }

    /// Exchanges a current refresh token for a new pair, superseding its record.
    ///
    /// The pair is only returned once the store confirms the presented token's
    /// record was removed and the successor written.
    pub async fn rotate_refresh(&self, token: &str, deadline: Instant) -> Result<Session, AuthError> {
        let claims = self
            .codec
            .verify(TokenKind::Refresh, token)
            .inspect_err(|e| warn!(error = %e, "refresh token rejected"))?;

        self.profile(&claims.user_id, deadline).await?;

        let (session, record) = self.mint_pair(&claims.user_id)?;
        let next_id = record.token_id;
        let presented = sha256_hex(token);

        if !bounded(deadline, self.store.replace(claims.jti, &presented, record)).await? {
            warn!(
                subject = %claims.user_id,
                token_id = %claims.jti,
                "refresh token has no live record, refusing rotation"
            );
            return Err(AuthError::ReplayDetected);
        }

        info!(
            subject = %claims.user_id,
            previous = %claims.jti,
            %next_id,
            "refresh token rotated"
        );
        Ok(session)
    }

    /// Ends the chain the refresh token belongs to. Revoking an already-ended chain is a no-op.
    pub async fn revoke(&self, token: &str, deadline: Instant) -> Result<(), AuthError> {
        let claims = self
            .codec
            .verify(TokenKind::Refresh, token)
            .inspect_err(|e| warn!(error = %e, "refresh token rejected"))?;

        let removed = bounded(
            deadline,
            self.store.delete_by_token_id(claims.jti, &sha256_hex(token)),
        )
        .await?;

        info!(subject = %claims.user_id, token_id = %claims.jti, removed, "refresh chain revoked");
        Ok(())
    }

    fn mint_pair(&self, subject: &str) -> Result<(Session, RefreshRecord), AuthError> {
        let access_token =
            self.codec
                .mint(TokenKind::Access, subject, Uuid::new_v4(), self.ttls.access)?;

        let refresh_id = Uuid::new_v4();
        let refresh_token =
            self.codec
                .mint(TokenKind::Refresh, subject, refresh_id, self.ttls.refresh)?;

        let record = RefreshRecord {
            token_id: refresh_id,
            subject: subject.to_string(),
            token_hash: sha256_hex(&refresh_token),
            created_at: Utc::now(),
        };

        Ok((
            Session {
                access_token,
                refresh_token,
            },
            record,
        ))
    }
}

async fn bounded<T>(
    deadline: Instant,
    op: impl Future<Output = Result<T, StoreError>>,
) -> Result<T, AuthError> {
    match timeout_at(deadline, op).await {
        Ok(Ok(v)) => Ok(v),
        Ok(Err(e)) => {
            error!(error = %e, "store call failed");
            Err(AuthError::StoreUnavailable)
        }
        Err(_) => {
            error!("store call timed out");
            Err(AuthError::StoreUnavailable)
        }
    }
}
