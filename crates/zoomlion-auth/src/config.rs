//! Provider and transport configuration.
//!
//! [`ProviderConfig`] is owned by the host configuration store and is only
//! read here, apart from `enabled` and the secret reference written back by
//! [`crate::ZoomlionProvider::test_and_apply`]. [`ClientSettings`] and
//! [`ProviderOptions`] are process-level settings chosen by the host.
//!
//! # Example (TOML)
//!
//! ```toml
//! [client]
//! request_timeout = "30s"
//! redirect_uri = "https://rancher.example.com/verify-auth"
//!
//! [provider]
//! hostname = "sso.example.com"
//! tls = true
//! clientId = "abc"
//! accessMode = "restricted"
//! allowedPrincipalIds = ["zoomlion_user://42"]
//! ```

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Host used when no hostname is configured.
pub const DEFAULT_HOST: &str = "https://zoomlion.com";

/// Default redirect URI sent with the authorization code exchange.
pub const DEFAULT_REDIRECT_URI: &str = "https://localhost:8443/verify-auth";

/// Access policy applied by the host's access-decision gate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessMode {
    /// Every authenticated identity is admitted.
    #[default]
    Unrestricted,
    /// Only allow-listed principals are admitted.
    Restricted,
    /// Only allow-listed principals are admitted, with no implicit grants.
    Required,
}

impl AccessMode {
    /// Returns the wire name of the mode.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unrestricted => "unrestricted",
            Self::Restricted => "restricted",
            Self::Required => "required",
        }
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration of the Zoomlion auth provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderConfig {
    /// Custom Zoomlion hostname; empty selects [`DEFAULT_HOST`].
    pub hostname: String,

    /// Use `https` for a custom hostname.
    pub tls: bool,

    /// OAuth client id.
    pub client_id: String,

    /// OAuth client secret, or the reference to a stored secret.
    pub client_secret: String,

    /// Access policy for the access-decision gate.
    pub access_mode: AccessMode,

    /// Principal ids admitted under a restricted or required policy.
    pub allowed_principal_ids: Vec<String>,

    /// Whether the provider is enabled.
    pub enabled: bool,
}

impl ProviderConfig {
    /// Creates a configuration for the default host.
    #[must_use]
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            ..Self::default()
        }
    }

    /// Sets a custom hostname and scheme.
    #[must_use]
    pub fn with_hostname(mut self, hostname: impl Into<String>, tls: bool) -> Self {
        self.hostname = hostname.into();
        self.tls = tls;
        self
    }

    /// Sets the access mode.
    #[must_use]
    pub fn with_access_mode(mut self, mode: AccessMode) -> Self {
        self.access_mode = mode;
        self
    }

    /// Sets the allow-list.
    #[must_use]
    pub fn with_allowed_principals(mut self, ids: Vec<impl Into<String>>) -> Self {
        self.allowed_principal_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Sets whether the provider is enabled.
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Returns the scheme and host every endpoint is built on.
    #[must_use]
    pub fn host_root(&self) -> String {
        if self.hostname.is_empty() {
            return DEFAULT_HOST.to_string();
        }
        let scheme = if self.tls { "https://" } else { "http://" };
        format!("{scheme}{}", self.hostname)
    }
}

/// Transport settings for the HTTP client talking to Zoomlion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Timeout applied to each individual HTTP call.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,

    /// `User-Agent` header sent on every request.
    pub user_agent: String,

    /// Skip TLS certificate verification. Off unless set explicitly.
    pub insecure_skip_tls_verify: bool,

    /// Redirect URI sent with the authorization code exchange.
    pub redirect_uri: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            user_agent: concat!("zoomlion-auth/", env!("CARGO_PKG_VERSION")).to_string(),
            insecure_skip_tls_verify: false,
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
        }
    }
}

impl ClientSettings {
    /// Sets the per-request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the redirect URI.
    #[must_use]
    pub fn with_redirect_uri(mut self, uri: impl Into<String>) -> Self {
        self.redirect_uri = uri.into();
        self
    }

    /// Skips TLS certificate verification.
    ///
    /// # Warning
    ///
    /// Only for identity services with self-signed certificates that cannot
    /// be added to the trust store.
    #[must_use]
    pub fn with_insecure_skip_tls_verify(mut self, skip: bool) -> Self {
        self.insecure_skip_tls_verify = skip;
        self
    }
}

/// Behaviour switches of the provider orchestration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderOptions {
    /// Fetch organizations and teams of the user at login and return them as
    /// group principals.
    pub include_groups: bool,
}

impl ProviderOptions {
    /// Enables or disables group-membership enrichment.
    #[must_use]
    pub fn with_include_groups(mut self, include: bool) -> Self {
        self.include_groups = include;
        self
    }
}
