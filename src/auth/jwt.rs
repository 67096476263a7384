use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, error};
use uuid::Uuid;

use crate::{auth::keys::KeyProvider, errors::AuthError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }

    fn other(self) -> Self {
        match self {
            TokenKind::Access => TokenKind::Refresh,
            TokenKind::Refresh => TokenKind::Access,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: TokenKind,
    pub iat: i64,
    pub exp: i64,
    pub jti: Uuid,
    pub iss: String,
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

pub trait TokenCodec: Send + Sync {
    /// Signs a fresh token of `kind` for `subject`, valid for `ttl` from now.
    fn mint(
        &self,
        kind: TokenKind,
        subject: &str,
        token_id: Uuid,
        ttl: Duration,
    ) -> Result<String, AuthError>;

    /// Checks signature, algorithm family, issuer, kind, expiry and subject, in that order.
    fn verify(&self, kind: TokenKind, token: &str) -> Result<Claims, AuthError>;
}

/// RS256 JWTs signed with the per-family keys of a [`KeyProvider`].
pub struct JwtCodec {
    keys: Arc<dyn KeyProvider>,
    clock: Arc<dyn Clock>,
    issuer: String,
    validation: Validation,
}

impl JwtCodec {
    pub fn new(keys: Arc<dyn KeyProvider>, issuer: impl Into<String>) -> Self {
        Self::with_clock(keys, issuer, Arc::new(SystemClock))
    }

    pub fn with_clock(
        keys: Arc<dyn KeyProvider>,
        issuer: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let issuer = issuer.into();

        let mut validation = Validation::new(Algorithm::RS256);
        // any other family (HS*, ES*, PS*, none) is refused before the key is used
        validation.algorithms = vec![Algorithm::RS256, Algorithm::RS384, Algorithm::RS512];
        // expiry is checked against `clock` in `verify`
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_issuer(&[issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss"]);

        Self {
            keys,
            clock,
            issuer,
            validation,
        }
    }
}

impl TokenCodec for JwtCodec {
    fn mint(
        &self,
        kind: TokenKind,
        subject: &str,
        token_id: Uuid,
        ttl: Duration,
    ) -> Result<String, AuthError> {
        let now = self.clock.now();
        let exp = now.checked_add_signed(ttl).ok_or_else(|| {
            error!(kind = kind.as_str(), ttl_seconds = ttl.num_seconds(), "token expiry out of range");
            AuthError::KeyUnavailable
        })?;
        let claims = Claims {
            user_id: subject.to_string(),
            kind,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: token_id,
            iss: self.issuer.clone(),
        };

        let key = self.keys.signing_key(kind)?;
        encode(&Header::new(Algorithm::RS256), &claims, key).map_err(|e| {
            error!(kind = kind.as_str(), error = %e, "unable to sign token");
            AuthError::KeyUnavailable
        })
    }

    fn verify(&self, kind: TokenKind, token: &str) -> Result<Claims, AuthError> {
        let key = self.keys.verification_key(kind)?;

        let claims = match decode::<Claims>(token, key, &self.validation) {
            Ok(data) => data.claims,
            Err(e) if matches!(e.kind(), ErrorKind::InvalidSignature) => {
                // genuine token of the other family, signed with its own key pair
                let other = self.keys.verification_key(kind.other())?;
                if decode::<Claims>(token, other, &self.validation).is_ok() {
                    return Err(AuthError::TokenKindMismatch);
                }
                debug!(kind = kind.as_str(), "token signature rejected");
                return Err(AuthError::TokenInvalid);
            }
            Err(e) => {
                debug!(kind = kind.as_str(), error = %e, "token rejected");
                return Err(AuthError::TokenInvalid);
            }
        };

        if claims.kind != kind {
            return Err(AuthError::TokenKindMismatch);
        }
        if self.clock.now().timestamp() > claims.exp {
            return Err(AuthError::TokenExpired);
        }
        if claims.user_id.is_empty() {
            return Err(AuthError::TokenInvalid);
        }

        Ok(claims)
    }
}

pub fn sha256_hex(s: &str) -> String {
    let mut h = Sha256::new();
    h.update(s.as_bytes());
    hex::encode(h.finalize())
}

#[cfg(test)]
pub(crate) mod test_clock {
    use std::sync::atomic::{AtomicI64, Ordering};

    use chrono::{DateTime, Utc};

    use super::Clock;

    /// A clock that only moves when told to.
    #[derive(Debug)]
    pub struct ManualClock(AtomicI64);

    impl ManualClock {
        pub fn at(secs: i64) -> Self {
            Self(AtomicI64::new(secs))
        }

        pub fn advance(&self, secs: i64) {
            self.0.fetch_add(secs, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            DateTime::from_timestamp(self.0.load(Ordering::SeqCst), 0).unwrap()
        }
    }
}
