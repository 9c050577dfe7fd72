//! File-backed collaborators for the operator CLI.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use zoomlion_auth::{ConfigStore, ProviderConfig, SecretStore, StoreError};

/// Prefix marking a client secret value as a reference into [`FileSecretStore`].
pub const SECRET_REF_PREFIX: &str = "file-secret:";

/// Provider config persisted as a TOML file.
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Reads a provider config from a TOML file.
pub async fn read_provider_file(path: &Path) -> Result<ProviderConfig, StoreError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| StoreError::new(format!("cannot read {}: {e}", path.display())))?;
    toml::from_str(&content)
        .map_err(|e| StoreError::new(format!("invalid provider config {}: {e}", path.display())))
}

async fn write_private(path: &Path, content: &str) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| StoreError::new(format!("cannot create {}: {e}", parent.display())))?;
    }
    tokio::fs::write(path, content)
        .await
        .map_err(|e| StoreError::new(format!("cannot write {}: {e}", path.display())))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
            .await
            .map_err(|e| StoreError::new(format!("cannot restrict {}: {e}", path.display())))?;
    }

    Ok(())
}

#[async_trait]
impl ConfigStore for FileConfigStore {
    async fn load(&self) -> Result<ProviderConfig, StoreError> {
        if !tokio::fs::try_exists(&self.path).await.unwrap_or(false) {
            return Err(StoreError::new(format!(
                "no zoomlion config at {}, run `zoomlion apply` first",
                self.path.display()
            )));
        }
        read_provider_file(&self.path).await
    }

    async fn save(&self, config: &ProviderConfig) -> Result<(), StoreError> {
        let content = toml::to_string_pretty(config)
            .map_err(|e| StoreError::new(format!("cannot encode provider config: {e}")))?;
        write_private(&self.path, &content).await
    }
}

/// Secrets kept as one file per field under a directory.
#[derive(Debug, Clone)]
pub struct FileSecretStore {
    dir: PathBuf,
}

impl FileSecretStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn secret_path(&self, name: &str) -> Result<PathBuf, StoreError> {
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::new(format!("invalid secret name {name:?}")));
        }
        Ok(self.dir.join(name))
    }
}

#[async_trait]
impl SecretStore for FileSecretStore {
    async fn read(&self, reference: &str, _field: &str) -> Result<String, StoreError> {
        let Some(name) = reference.strip_prefix(SECRET_REF_PREFIX) else {
            return Ok(reference.to_string());
        };
        let path = self.secret_path(name)?;
        let value = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| StoreError::new(format!("cannot read secret {name}: {e}")))?;
        Ok(value.trim_end_matches('\n').to_string())
    }

    async fn write(&self, field: &str, value: &str) -> Result<String, StoreError> {
        let name = format!("zoomlionconfig-{field}");
        let path = self.secret_path(&name)?;
        write_private(&path, value).await?;
        Ok(format!("{SECRET_REF_PREFIX}{name}"))
    }
}
