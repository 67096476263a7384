use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// The slice of a user document needed to check a login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDoc {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub email: String,
    pub password_hash: String,
}
