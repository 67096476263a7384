use std::sync::Arc;

use mongodb::{bson::doc, options::ClientOptions, Client};
use thiserror::Error;
use tokio::time::Instant;
use tracing::warn;

use crate::{
    auth::{
        jwt::JwtCodec,
        keys::PemKeyProvider,
        session::{SessionManager, TokenTtls},
    },
    config::Config,
    credentials::{CredentialVerifier, MongoUsers, NoUsers, UserDirectory},
    errors::AuthError,
    store::{MemoryRefreshStore, MongoRefreshStore, RefreshStore},
};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("key material: {0}")]
    Keys(#[from] AuthError),

    #[error("database: {0}")]
    Db(#[from] mongodb::error::Error),
}

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub sessions: Arc<SessionManager>,
    pub credentials: Arc<dyn CredentialVerifier>,
}

impl AppState {
    pub async fn new(cfg: &Config) -> Result<Self, StartupError> {
        let keys = Arc::new(PemKeyProvider::from_files(&cfg.keys)?);
        let codec = Arc::new(JwtCodec::new(keys, cfg.token_issuer.clone()));

        let (store, credentials, users): (
            Arc<dyn RefreshStore>,
            Arc<dyn CredentialVerifier>,
            Arc<dyn UserDirectory>,
        ) = match &cfg.mongodb_uri {
            Some(uri) => {
                let mut opts = ClientOptions::parse(uri).await?;
                opts.app_name = Some("session-tokens".to_string());
                let client = Client::with_options(opts)?;
                let db = client.database(&cfg.db_name);
                db.run_command(doc! { "ping": 1 }).await?;

                let store: Arc<dyn RefreshStore> = Arc::new(MongoRefreshStore::new(&db));
                let mongo_users = Arc::new(MongoUsers::new(&db));
                let credentials: Arc<dyn CredentialVerifier> = mongo_users.clone();
                let users: Arc<dyn UserDirectory> = mongo_users;
                (store, credentials, users)
            }
            None => {
                warn!("MONGODB_URI not set: refresh records are kept in memory and logins are refused");
                let store: Arc<dyn RefreshStore> = Arc::new(MemoryRefreshStore::new());
                let credentials: Arc<dyn CredentialVerifier> = Arc::new(NoUsers);
                let users: Arc<dyn UserDirectory> = Arc::new(NoUsers);
                (store, credentials, users)
            }
        };

        let ttls = TokenTtls::from_seconds(cfg.access_ttl_seconds, cfg.refresh_ttl_seconds);
        let sessions = Arc::new(SessionManager::new(codec, store, users, ttls));

        Ok(Self::from_parts(cfg.clone(), sessions, credentials))
    }

    pub fn from_parts(
        cfg: Config,
        sessions: Arc<SessionManager>,
        credentials: Arc<dyn CredentialVerifier>,
    ) -> Self {
        Self {
            cfg: Arc::new(cfg),
            sessions,
            credentials,
        }
    }

    /// Deadline for the store calls of one request.
    pub fn deadline(&self) -> Instant {
        Instant::now() + self.cfg.store_timeout
    }
}
