//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use wiremock::MockServer;
use zoomlion_auth::{
    AllowListGate, ClientSettings, Collaborators, ConfigStore, ProviderConfig, ProviderInfoTokens,
    ProviderOptions, RemoteClient, SecretStore, StoreError, ZoomlionProvider,
};

pub const SECRET_PREFIX: &str = "secrets:";

#[derive(Default)]
pub struct MemoryConfigStore {
    pub config: RwLock<Option<ProviderConfig>>,
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn load(&self) -> Result<ProviderConfig, StoreError> {
        self.config
            .read()
            .await
            .clone()
            .ok_or_else(|| StoreError::new("no config stored"))
    }

    async fn save(&self, config: &ProviderConfig) -> Result<(), StoreError> {
        *self.config.write().await = Some(config.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemorySecretStore {
    pub secrets: RwLock<HashMap<String, String>>,
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn read(&self, reference: &str, _field: &str) -> Result<String, StoreError> {
        if !reference.starts_with(SECRET_PREFIX) {
            return Ok(reference.to_string());
        }
        self.secrets
            .read()
            .await
            .get(reference)
            .cloned()
            .ok_or_else(|| StoreError::new(format!("secret {reference} not found")))
    }

    async fn write(&self, field: &str, value: &str) -> Result<String, StoreError> {
        let reference = format!("{SECRET_PREFIX}{field}");
        self.secrets
            .write()
            .await
            .insert(reference.clone(), value.to_string());
        Ok(reference)
    }
}

pub struct Harness {
    pub provider: ZoomlionProvider,
    pub configs: Arc<MemoryConfigStore>,
    pub secrets: Arc<MemorySecretStore>,
}

/// A provider configuration pointing at the mock server.
pub fn mock_config(server: &MockServer) -> ProviderConfig {
    ProviderConfig::new("client-1", "secret-1").with_hostname(server.address().to_string(), false)
}

pub fn client() -> RemoteClient {
    RemoteClient::new(ClientSettings::default()).unwrap()
}

pub async fn harness(stored: Option<ProviderConfig>, options: ProviderOptions) -> Harness {
    let configs = Arc::new(MemoryConfigStore::default());
    let secrets = Arc::new(MemorySecretStore::default());
    *configs.config.write().await = stored;

    let collaborators = Collaborators {
        configs: configs.clone(),
        secrets: secrets.clone(),
        gate: Arc::new(AllowListGate),
        tokens: Arc::new(ProviderInfoTokens),
    };

    Harness {
        provider: ZoomlionProvider::new(client(), collaborators, options),
        configs,
        secrets,
    }
}
