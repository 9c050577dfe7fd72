//! Host collaborator interfaces.
//!
//! The provider does not persist anything itself. Configuration, secrets,
//! issued-token secrets and the access decision belong to the host, which
//! plugs them in through these traits.
//!
//! # Example Implementation
//!
//! ```ignore
//! use zoomlion_auth::collaborators::{ConfigStore, StoreError};
//! use zoomlion_auth::ProviderConfig;
//!
//! struct InMemoryConfigStore {
//!     config: tokio::sync::RwLock<ProviderConfig>,
//! }
//!
//! #[async_trait::async_trait]
//! impl ConfigStore for InMemoryConfigStore {
//!     async fn load(&self) -> Result<ProviderConfig, StoreError> {
//!         Ok(self.config.read().await.clone())
//!     }
//!
//!     async fn save(&self, config: &ProviderConfig) -> Result<(), StoreError> {
//!         *self.config.write().await = config.clone();
//!         Ok(())
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::ProviderResult;
use crate::config::{AccessMode, ProviderConfig};
use crate::principal::{Principal, SessionToken};

/// Failure of a configuration or secret store.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct StoreError(pub String);

impl StoreError {
    /// Creates a store error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Failure to read the secret stored for an issued token.
#[derive(Debug, thiserror::Error)]
pub enum SecretLookupError {
    /// No secret is stored for the token.
    #[error("token secret not found")]
    NotFound,

    /// The secret backend failed.
    #[error("token secret lookup failed: {0}")]
    Backend(String),
}

/// Persistence of the provider configuration.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Loads the stored configuration. `client_secret` holds a secret
    /// reference, not the secret itself.
    async fn load(&self) -> Result<ProviderConfig, StoreError>;

    /// Replaces the stored configuration.
    async fn save(&self, config: &ProviderConfig) -> Result<(), StoreError>;
}

/// Storage of secret values keyed by a field name.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Reads the secret behind `reference`. A value that is not a secret
    /// reference is returned unchanged.
    async fn read(&self, reference: &str, field: &str) -> Result<String, StoreError>;

    /// Creates or updates the secret for `field` and returns its reference.
    async fn write(&self, field: &str, value: &str) -> Result<String, StoreError>;
}

/// Access to remote access tokens stored alongside issued host tokens.
#[async_trait]
pub trait TokenSecrets: Send + Sync {
    /// Returns the remote access token stored for `token`.
    async fn get_secret(&self, token: &SessionToken) -> Result<String, SecretLookupError>;
}

/// The host's access-decision gate.
#[async_trait]
pub trait AccessGate: Send + Sync {
    /// Decides whether the authenticated identity may use the host.
    async fn check_access(
        &self,
        mode: AccessMode,
        allowed_principal_ids: &[String],
        user: &Principal,
        groups: &[Principal],
    ) -> ProviderResult<bool>;
}

/// Allow-list based access gate.
///
/// `unrestricted` admits everyone. `restricted` and `required` admit the
/// user when the user id or one of the group ids is allow-listed.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowListGate;

#[async_trait]
impl AccessGate for AllowListGate {
    async fn check_access(
        &self,
        mode: AccessMode,
        allowed_principal_ids: &[String],
        user: &Principal,
        groups: &[Principal],
    ) -> ProviderResult<bool> {
        if mode == AccessMode::Unrestricted {
            return Ok(true);
        }

        let allowed = std::iter::once(user)
            .chain(groups)
            .any(|p| allowed_principal_ids.iter().any(|id| *id == p.id));
        Ok(allowed)
    }
}

/// Token secret lookup for hosts that keep the access token only in the
/// token's provider metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProviderInfoTokens;

#[async_trait]
impl TokenSecrets for ProviderInfoTokens {
    async fn get_secret(&self, _token: &SessionToken) -> Result<String, SecretLookupError> {
        Err(SecretLookupError::NotFound)
    }
}
