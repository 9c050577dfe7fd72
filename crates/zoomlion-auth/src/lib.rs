//! # zoomlion-auth
//!
//! Zoomlion identity provider adapter.
//!
//! This crate provides:
//! - OAuth 2.0 authorization code login against a Zoomlion server
//! - User, organization and team lookup with `link` header pagination
//! - Free-text principal search
//! - The `zoomlion_<type>://<id>` principal id codec
//! - Test-and-apply of a provider configuration
//!
//! Persistence, secret storage and the access decision belong to the host
//! and are plugged in through the traits in [`collaborators`].
//!
//! ## Modules
//!
//! - [`client`] - HTTP client, endpoints and pagination
//! - [`account`] - Remote resource shapes
//! - [`principal`] - Principals, principal ids and host tokens
//! - [`provider`] - Login, search and lookup orchestration
//! - [`actions`] - Configuration test and apply
//! - [`collaborators`] - Host collaborator traits
//! - [`config`] - Provider and transport configuration
//! - [`error`] - Error types

pub mod account;
pub mod actions;
pub mod client;
pub mod collaborators;
pub mod config;
pub mod error;
pub mod principal;
pub mod provider;

pub use account::Account;
pub use actions::{
    ApplyOutcome, ConfigApplyInput, ConfigureTestOutput, ProviderDescriptor, authorization_url,
};
pub use client::{Endpoint, RemoteClient, endpoint_url};
pub use collaborators::{
    AccessGate, AllowListGate, ConfigStore, ProviderInfoTokens, SecretLookupError, SecretStore,
    StoreError, TokenSecrets,
};
pub use config::{AccessMode, ClientSettings, ProviderConfig, ProviderOptions};
pub use error::ProviderError;
pub use principal::{
    PROVIDER_NAME, Principal, PrincipalId, PrincipalKind, PrincipalType, SessionToken,
};
pub use provider::{AuthProvider, Collaborators, LoginOutcome, ZoomlionProvider};

/// Type alias for provider results.
pub type ProviderResult<T> = Result<T, ProviderError>;
