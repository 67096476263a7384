//! Identity checks around the token core: the login credential check, and the
//! user lookup that rotation and `/auth/me` rely on. The core only sees principal ids.

use async_trait::async_trait;
use mongodb::{
    bson::{doc, oid::ObjectId},
    Collection, Database,
};
use tracing::error;

use crate::{
    errors::AuthError, models::user::UserDoc, password::verify_password, store::StoreError,
};

#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Returns the principal id, or `CredentialInvalid` for both unknown
    /// identifiers and wrong secrets.
    async fn verify(&self, identifier: &str, secret: &str) -> Result<String, AuthError>;
}

/// Public slice of a user record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
}

impl From<UserDoc> for UserProfile {
    fn from(u: UserDoc) -> Self {
        Self {
            id: u.id.to_hex(),
            email: u.email,
        }
    }
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// `None` once the principal no longer exists.
    async fn find_profile(&self, subject: &str) -> Result<Option<UserProfile>, StoreError>;
}

/// The `users` collection, serving both the login check and principal lookups.
#[derive(Clone, Debug)]
pub struct MongoUsers {
    users: Collection<UserDoc>,
}

impl MongoUsers {
    pub fn new(db: &Database) -> Self {
        Self {
            users: db.collection("users"),
        }
    }
}

#[async_trait]
impl CredentialVerifier for MongoUsers {
    async fn verify(&self, identifier: &str, secret: &str) -> Result<String, AuthError> {
        let email = identifier.trim().to_lowercase();

        let user = self
            .users
            .find_one(doc! { "email": &email })
            .await
            .map_err(|e| {
                error!(error = %e, "user lookup failed");
                AuthError::StoreUnavailable
            })?;

        principal_for(user.as_ref(), secret)
    }
}

#[async_trait]
impl UserDirectory for MongoUsers {
    async fn find_profile(&self, subject: &str) -> Result<Option<UserProfile>, StoreError> {
        // principal ids are ObjectId hex; anything else names nobody
        let Ok(id) = ObjectId::parse_str(subject) else {
            return Ok(None);
        };

        let user = self.users.find_one(doc! { "_id": id }).await?;
        Ok(user.map(UserProfile::from))
    }
}

fn principal_for(user: Option<&UserDoc>, secret: &str) -> Result<String, AuthError> {
    match user {
        Some(user) if verify_password(secret, &user.password_hash) => Ok(user.id.to_hex()),
        _ => Err(AuthError::CredentialInvalid),
    }
}

/// Used when no user database is configured: every login is refused and no principal exists.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoUsers;

#[async_trait]
impl CredentialVerifier for NoUsers {
    async fn verify(&self, _identifier: &str, _secret: &str) -> Result<String, AuthError> {
        Err(AuthError::CredentialInvalid)
    }
}

#[async_trait]
impl UserDirectory for NoUsers {
    async fn find_profile(&self, _subject: &str) -> Result<Option<UserProfile>, StoreError> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use mongodb::bson::oid::ObjectId;

    use super::*;
    use crate::password::hash_for_tests;

    fn user(secret: &str) -> UserDoc {
        UserDoc {
            id: ObjectId::new(),
            email: "alice@example.com".into(),
            password_hash: hash_for_tests(secret),
        }
    }

    #[test]
    fn right_secret_yields_object_id_hex() {
        let u = user("s3cret-pass");
        assert_eq!(principal_for(Some(&u), "s3cret-pass"), Ok(u.id.to_hex()));
    }

    #[test]
    fn unknown_user_and_wrong_secret_look_the_same() {
        let u = user("s3cret-pass");
        assert_eq!(
            principal_for(Some(&u), "wrong"),
            Err(AuthError::CredentialInvalid)
        );
        assert_eq!(principal_for(None, "s3cret-pass"), Err(AuthError::CredentialInvalid));
    }

    #[test]
    fn profile_exposes_id_and_email_only() {
        let u = user("s3cret-pass");
        let id = u.id.to_hex();
        assert_eq!(
            UserProfile::from(u),
            UserProfile {
                id,
                email: "alice@example.com".into()
            }
        );
    }

    #[tokio::test]
    async fn no_users_refuses_everyone() {
        assert_eq!(
            NoUsers.verify("alice", "pw").await,
            Err(AuthError::CredentialInvalid)
        );
        assert_eq!(NoUsers.find_profile("65f1c2a9e4b0a1b2c3d4e5f6").await.unwrap(), None);
    }
}
