use std::path::{Path, PathBuf};

use jsonwebtoken::{DecodingKey, EncodingKey};
use tracing::error;

use crate::{auth::jwt::TokenKind, errors::AuthError};

#[derive(Clone, Debug)]
pub struct KeyPaths {
    pub access_private: PathBuf,
    pub access_public: PathBuf,
    pub refresh_private: PathBuf,
    pub refresh_public: PathBuf,
}

/// Source of the signing/verification pair for each token family.
///
/// Callers only borrow keys per operation, so an implementation that swaps
/// key material at runtime can be dropped in without touching them.
pub trait KeyProvider: Send + Sync {
    fn signing_key(&self, kind: TokenKind) -> Result<&EncodingKey, AuthError>;
    fn verification_key(&self, kind: TokenKind) -> Result<&DecodingKey, AuthError>;
}

struct KeyPair {
    signing: EncodingKey,
    verification: DecodingKey,
}

impl KeyPair {
    fn from_pem(family: &str, private_pem: &[u8], public_pem: &[u8]) -> Result<Self, AuthError> {
        let signing = EncodingKey::from_rsa_pem(private_pem).map_err(|e| {
            error!(family, error = %e, "unable to parse private key");
            AuthError::KeyUnavailable
        })?;
        let verification = DecodingKey::from_rsa_pem(public_pem).map_err(|e| {
            error!(family, error = %e, "unable to parse public key");
            AuthError::KeyUnavailable
        })?;
        Ok(Self {
            signing,
            verification,
        })
    }
}

/// RSA key pairs loaded once from PEM and kept for the life of the process.
pub struct PemKeyProvider {
    access: KeyPair,
    refresh: KeyPair,
}

impl PemKeyProvider {
    pub fn from_files(paths: &KeyPaths) -> Result<Self, AuthError> {
        Self::from_pem(
            &read_pem(&paths.access_private)?,
            &read_pem(&paths.access_public)?,
            &read_pem(&paths.refresh_private)?,
            &read_pem(&paths.refresh_public)?,
        )
    }

    pub fn from_pem(
        access_private: &[u8],
        access_public: &[u8],
        refresh_private: &[u8],
        refresh_public: &[u8],
    ) -> Result<Self, AuthError> {
        Ok(Self {
            access: KeyPair::from_pem("access", access_private, access_public)?,
            refresh: KeyPair::from_pem("refresh", refresh_private, refresh_public)?,
        })
    }

    fn pair(&self, kind: TokenKind) -> &KeyPair {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }
}

impl KeyProvider for PemKeyProvider {
    fn signing_key(&self, kind: TokenKind) -> Result<&EncodingKey, AuthError> {
        Ok(&self.pair(kind).signing)
    }

    fn verification_key(&self, kind: TokenKind) -> Result<&DecodingKey, AuthError> {
        Ok(&self.pair(kind).verification)
    }
}

fn read_pem(path: &Path) -> Result<Vec<u8>, AuthError> {
    std::fs::read(path).map_err(|e| {
        error!(path = %path.display(), error = %e, "unable to read key file");
        AuthError::KeyUnavailable
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::PemKeyProvider;

    pub const ACCESS_PRIVATE: &str = include_str!("../../tests/fixtures/keys/access-private.pem");
    pub const ACCESS_PUBLIC: &str = include_str!("../../tests/fixtures/keys/access-public.pem");
    pub const REFRESH_PRIVATE: &str = include_str!("../../tests/fixtures/keys/refresh-private.pem");
    pub const REFRESH_PUBLIC: &str = include_str!("../../tests/fixtures/keys/refresh-public.pem");

    pub fn keys() -> PemKeyProvider {
        PemKeyProvider::from_pem(
            ACCESS_PRIVATE.as_bytes(),
            ACCESS_PUBLIC.as_bytes(),
            REFRESH_PRIVATE.as_bytes(),
            REFRESH_PUBLIC.as_bytes(),
        )
        .unwrap()
    }

    /// Both families signed by the same pair, so only the `type` claim tells them apart.
    pub fn shared_keys() -> PemKeyProvider {
        PemKeyProvider::from_pem(
            ACCESS_PRIVATE.as_bytes(),
            ACCESS_PUBLIC.as_bytes(),
            ACCESS_PRIVATE.as_bytes(),
            ACCESS_PUBLIC.as_bytes(),
        )
        .unwrap()
    }
}
