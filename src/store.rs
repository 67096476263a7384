//! Persistence contract for refresh-token bookkeeping.
//!
//! One record per live refresh chain, keyed by the token id (`jti`) of the
//! refresh token currently allowed to rotate it.

pub mod memory;
pub mod mongo;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

pub use memory::MemoryRefreshStore;
pub use mongo::MongoRefreshStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshRecord {
    pub token_id: Uuid,
    pub subject: String,
    /// sha256 of the signed token; the bearer credential itself is never stored
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
#[error("refresh store: {0}")]
pub struct StoreError(pub String);

impl From<mongodb::error::Error> for StoreError {
    fn from(e: mongodb::error::Error) -> Self {
        StoreError(e.to_string())
    }
}

#[async_trait]
pub trait RefreshStore: Send + Sync {
    async fn put(&self, record: RefreshRecord) -> Result<(), StoreError>;

    /// Removes the record for `token_id` if its `token_hash` matches, and
    /// returns whether one was removed. Deleting an absent id is not an error.
    async fn delete_by_token_id(&self, token_id: Uuid, token_hash: &str)
        -> Result<bool, StoreError>;

    /// Supersedes the record of `previous` (whose hash must be `previous_hash`) with `record`.
    ///
    /// Returns `false` without writing anything when that record is no longer
    /// present. Only one of several concurrent callers naming the same
    /// `previous` may get `true`, which the default relies on the store's
    /// delete being single-writer per key to provide.
    async fn replace(
        &self,
        previous: Uuid,
        previous_hash: &str,
        record: RefreshRecord,
    ) -> Result<bool, StoreError> {
        if !self.delete_by_token_id(previous, previous_hash).await? {
            return Ok(false);
        }
        self.put(record).await?;
        Ok(true)
    }
}
