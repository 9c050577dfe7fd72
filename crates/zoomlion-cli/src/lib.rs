//! Operator CLI wiring for the Zoomlion auth provider.
//!
//! The binary loads an [`config::AppConfig`], builds a [`ZoomlionProvider`]
//! over file-backed collaborators and runs one command.

pub mod cli;
pub mod commands;
pub mod config;
pub mod observability;
pub mod output;
pub mod stores;

use std::sync::Arc;

use anyhow::Context;
use zoomlion_auth::{
    AllowListGate, Collaborators, ProviderInfoTokens, RemoteClient, ZoomlionProvider,
};

use crate::config::AppConfig;
use crate::stores::{FileConfigStore, FileSecretStore};

/// Builds the provider from the application config.
pub fn build_provider(config: &AppConfig) -> anyhow::Result<ZoomlionProvider> {
    let client =
        RemoteClient::new(config.client.clone()).context("failed to build zoomlion HTTP client")?;

    let collaborators = Collaborators {
        configs: Arc::new(FileConfigStore::new(&config.store.config_file)),
        secrets: Arc::new(FileSecretStore::new(&config.store.secrets_dir)),
        gate: Arc::new(AllowListGate),
        tokens: Arc::new(ProviderInfoTokens),
    };

    Ok(ZoomlionProvider::new(
        client,
        collaborators,
        config.provider.clone(),
    ))
}
