//! Administrative actions: test and apply a provider configuration.

use serde::{Deserialize, Serialize};

use crate::ProviderResult;
use crate::client::{Endpoint, endpoint_url};
use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::principal::PROVIDER_NAME;
use crate::provider::{CLIENT_SECRET_FIELD, LoginOutcome, ZoomlionProvider};

/// Type tag of [`ConfigureTestOutput`].
pub const CONFIG_TEST_OUTPUT_TYPE: &str = "zoomlionConfigTestOutput";

/// Type tag of [`ProviderDescriptor`].
pub const PROVIDER_TYPE: &str = "zoomlionProvider";

/// Where to send the administrator to authorize a configuration under test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigureTestOutput {
    /// Authorization URL for the configuration under test.
    pub redirect_url: String,
    /// Always [`CONFIG_TEST_OUTPUT_TYPE`].
    #[serde(rename = "type")]
    pub output_type: String,
}

/// A configuration to test, with the authorization code obtained for it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigApplyInput {
    /// Candidate configuration. Its client secret is a secret-store reference.
    pub config: ProviderConfig,
    /// Authorization code returned to the redirect URL.
    pub code: String,
    /// Whether the provider is enabled once the configuration is saved.
    pub enabled: bool,
}

/// Result of a successful test-and-apply, for the host to issue its token.
pub type ApplyOutcome = LoginOutcome;

/// Public listing entry of the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderDescriptor {
    /// Provider name, `zoomlion`.
    pub name: String,
    /// Always [`PROVIDER_TYPE`].
    #[serde(rename = "type")]
    pub provider_type: String,
    /// Authorization URL of the stored configuration.
    pub redirect_url: String,
}

/// Returns the authorization URL the administrator is redirected to.
#[must_use]
pub fn authorization_url(config: &ProviderConfig) -> String {
    let client_id: String =
        url::form_urlencoded::byte_serialize(config.client_id.as_bytes()).collect();
    format!(
        "{}?client_id={}",
        endpoint_url(Endpoint::Authorize, config),
        client_id
    )
}

impl ZoomlionProvider {
    /// Starts testing a configuration.
    #[must_use]
    pub fn configure_test(&self, config: &ProviderConfig) -> ConfigureTestOutput {
        ConfigureTestOutput {
            redirect_url: authorization_url(config),
            output_type: CONFIG_TEST_OUTPUT_TYPE.to_string(),
        }
    }

    /// Describes the stored configuration for public listing.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Configuration`] if the configuration cannot
    /// be loaded.
    pub async fn descriptor(&self) -> ProviderResult<ProviderDescriptor> {
        let config = self.load_config().await?;
        Ok(ProviderDescriptor {
            name: PROVIDER_NAME.to_string(),
            provider_type: PROVIDER_TYPE.to_string(),
            redirect_url: authorization_url(&config),
        })
    }

    /// Logs in with the configuration under test and, on success, stores it.
    ///
    /// The self-test exemption applies: under a restricted policy the
    /// administrator's own principal is admitted. Gate rejections surface as
    /// [`ProviderError::Unauthorized`]; every other login failure is wrapped
    /// as a server error.
    pub async fn test_and_apply(&self, input: ConfigApplyInput) -> ProviderResult<ApplyOutcome> {
        let mut config = input.config;

        if !config.client_secret.is_empty() {
            config.client_secret = self.read_client_secret(&config.client_secret).await?;
        }

        let outcome = self
            .login_user(&input.code, Some(config.clone()), true)
            .await
            .map_err(|e| {
                if e.is_unauthorized() {
                    e
                } else {
                    e.wrap("server error while authenticating")
                }
            })?;

        config.enabled = input.enabled;
        self.save_config(config).await?;

        Ok(outcome)
    }

    /// Stores the plaintext client secret and then the configuration
    /// referencing it.
    pub async fn save_config(&self, mut config: ProviderConfig) -> ProviderResult<()> {
        let reference = self
            .collaborators
            .secrets
            .write(CLIENT_SECRET_FIELD, &config.client_secret)
            .await
            .map_err(|e| {
                ProviderError::configuration(format!("failed to store client secret: {e}"))
            })?;
        config.client_secret = reference;

        self.collaborators
            .configs
            .save(&config)
            .await
            .map_err(|e| {
                ProviderError::configuration(format!("failed to save zoomlion config: {e}"))
            })?;

        tracing::debug!("Updated zoomlion config, enabled: {}", config.enabled);
        Ok(())
    }
}
