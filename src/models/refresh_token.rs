use mongodb::bson::DateTime as BsonDateTime;
use serde::{Deserialize, Serialize};

use crate::store::RefreshRecord;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenDoc {
    /// token id (`jti`) of the refresh token allowed to rotate this chain
    #[serde(rename = "_id")]
    pub id: String,

    pub subject: String,
    pub token_hash: String,

    pub created_at: BsonDateTime,
}

impl From<RefreshRecord> for RefreshTokenDoc {
    fn from(r: RefreshRecord) -> Self {
        Self {
            id: r.token_id.to_string(),
            subject: r.subject,
            token_hash: r.token_hash,
            created_at: BsonDateTime::from_millis(r.created_at.timestamp_millis()),
        }
    }
}
