use async_trait::async_trait;
use mongodb::{bson::doc, Collection, Database};
use uuid::Uuid;

use super::{RefreshRecord, RefreshStore, StoreError};
use crate::models::refresh_token::RefreshTokenDoc;

#[derive(Clone, Debug)]
pub struct MongoRefreshStore {
    refresh_tokens: Collection<RefreshTokenDoc>,
}

impl MongoRefreshStore {
    pub fn new(db: &Database) -> Self {
        Self {
            refresh_tokens: db.collection("refresh_tokens"),
        }
    }
}

#[async_trait]
impl RefreshStore for MongoRefreshStore {
    async fn put(&self, record: RefreshRecord) -> Result<(), StoreError> {
        self.refresh_tokens
            .insert_one(RefreshTokenDoc::from(record))
            .await?;
        Ok(())
    }

    async fn delete_by_token_id(
        &self,
        token_id: Uuid,
        token_hash: &str,
    ) -> Result<bool, StoreError> {
        // delete_one is atomic per document, so concurrent callers see at most one deletion
        let res = self
            .refresh_tokens
            .delete_one(doc! { "_id": token_id.to_string(), "token_hash": token_hash })
            .await?;
        Ok(res.deleted_count == 1)
    }
}
