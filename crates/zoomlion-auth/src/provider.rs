//! The Zoomlion auth provider.
//!
//! [`ZoomlionProvider`] composes the [`RemoteClient`], the resource mapping
//! and the principal id codec with the host collaborators, and exposes the
//! adapter boundary through [`AuthProvider`].
//!
//! # Login flow
//!
//! 1. **Start** - resolve the provider configuration
//! 2. **TokenExchanged** - exchange the authorization code for an access token
//! 3. **ProfileFetched** - fetch the user profile (and, when enabled, the
//!    user's organizations and teams)
//! 4. **AccessEvaluated** - consult the access-decision gate
//! 5. **Accepted** or **Rejected**
//!
//! A failure before step 4 ends the flow with the originating error; no
//! partial principal is returned.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::ProviderResult;
use crate::account::Account;
use crate::client::RemoteClient;
use crate::collaborators::{AccessGate, ConfigStore, SecretLookupError, SecretStore, TokenSecrets};
use crate::config::{AccessMode, ProviderConfig, ProviderOptions};
use crate::error::ProviderError;
use crate::principal::{
    PROVIDER_NAME, Principal, PrincipalId, PrincipalKind, PrincipalType, SessionToken,
};

/// Secret field name the OAuth client secret is stored under.
pub const CLIENT_SECRET_FIELD: &str = "clientsecret";

/// The adapter boundary seen by the host.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Provider name.
    fn name(&self) -> &str;

    /// Authenticates a user with an authorization code, using the stored
    /// configuration.
    async fn login(&self, code: &str) -> ProviderResult<LoginOutcome>;

    /// Searches users and groups by free text. `principal_type` is `user`,
    /// `group` or empty.
    async fn search_principals(
        &self,
        search_key: &str,
        principal_type: &str,
        token: &SessionToken,
    ) -> ProviderResult<Vec<Principal>>;

    /// Looks up a principal by id.
    async fn get_principal(
        &self,
        principal_id: &str,
        token: &SessionToken,
    ) -> ProviderResult<Principal>;
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// The authenticated user, with `me` set.
    pub user_principal: Principal,
    /// Group principals of the user (empty unless groups are enabled).
    pub group_principals: Vec<Principal>,
    /// The remote access token.
    pub access_token: String,
}

/// Stage of the login state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginStage {
    /// Configuration resolved.
    Start,
    /// Code exchanged for an access token.
    TokenExchanged,
    /// User profile (and groups) fetched.
    ProfileFetched,
    /// The access gate answered.
    AccessEvaluated,
    /// Login accepted.
    Accepted,
    /// Login rejected by the gate.
    Rejected,
}

impl fmt::Display for LoginStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Start => "start",
            Self::TokenExchanged => "token_exchanged",
            Self::ProfileFetched => "profile_fetched",
            Self::AccessEvaluated => "access_evaluated",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

/// Host collaborators used by the provider.
#[derive(Clone)]
pub struct Collaborators {
    /// Provider configuration persistence.
    pub configs: Arc<dyn ConfigStore>,
    /// Secret storage for the client secret.
    pub secrets: Arc<dyn SecretStore>,
    /// Access-decision gate.
    pub gate: Arc<dyn AccessGate>,
    /// Access tokens stored with issued host tokens.
    pub tokens: Arc<dyn TokenSecrets>,
}

/// Zoomlion implementation of [`AuthProvider`].
pub struct ZoomlionProvider {
    pub(crate) client: RemoteClient,
    pub(crate) collaborators: Collaborators,
    options: ProviderOptions,
}

impl ZoomlionProvider {
    /// Creates a provider.
    #[must_use]
    pub fn new(
        client: RemoteClient,
        collaborators: Collaborators,
        options: ProviderOptions,
    ) -> Self {
        Self {
            client,
            collaborators,
            options,
        }
    }

    /// Returns the remote client.
    #[must_use]
    pub fn client(&self) -> &RemoteClient {
        &self.client
    }

    /// Returns the orchestration options.
    #[must_use]
    pub fn options(&self) -> &ProviderOptions {
        &self.options
    }

    /// Loads the stored configuration and resolves its client secret.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Configuration`] if the configuration or the
    /// secret cannot be read.
    pub async fn load_config(&self) -> ProviderResult<ProviderConfig> {
        let mut config = self.collaborators.configs.load().await.map_err(|e| {
            ProviderError::configuration(format!("failed to retrieve ZoomlionConfig, error: {e}"))
        })?;

        if !config.client_secret.is_empty() {
            config.client_secret = self.read_client_secret(&config.client_secret).await?;
        }

        Ok(config)
    }

    pub(crate) async fn read_client_secret(&self, reference: &str) -> ProviderResult<String> {
        self.collaborators
            .secrets
            .read(reference, CLIENT_SECRET_FIELD)
            .await
            .map_err(|e| ProviderError::configuration(format!("failed to read client secret: {e}")))
    }

    /// Runs the login flow.
    ///
    /// `config` overrides the stored configuration. With `is_test` under a
    /// restricted policy the user's own principal id is added to the
    /// allow-list, so the administrator configuring the provider can always
    /// complete the test login.
    pub async fn login_user(
        &self,
        code: &str,
        config: Option<ProviderConfig>,
        is_test: bool,
    ) -> ProviderResult<LoginOutcome> {
        let config = match config {
            Some(config) => config,
            None => self.load_config().await?,
        };
        tracing::debug!(stage = %LoginStage::Start, "zoomlion login");

        let access_token = self.client.exchange_code(code, &config).await.inspect_err(|e| {
            tracing::info!("Error generating accessToken from zoomlion {}", e);
        })?;
        tracing::debug!(stage = %LoginStage::TokenExchanged, "zoomlion login");

        let user = self.client.fetch_user_profile(&access_token, &config).await?;
        let mut user_principal = to_principal(PrincipalKind::User, &user, None);
        user_principal.me = true;

        let group_principals = if self.options.include_groups {
            self.fetch_group_principals(&access_token, &config).await?
        } else {
            Vec::new()
        };
        tracing::debug!(
            stage = %LoginStage::ProfileFetched,
            groups = group_principals.len(),
            "zoomlion login"
        );

        let allowed_principals = effective_allow_list(&config, &user_principal, is_test);
        let allowed = self
            .collaborators
            .gate
            .check_access(
                config.access_mode,
                &allowed_principals,
                &user_principal,
                &group_principals,
            )
            .await?;
        tracing::debug!(stage = %LoginStage::AccessEvaluated, allowed, "zoomlion login");

        if !allowed {
            tracing::debug!(stage = %LoginStage::Rejected, "zoomlion login");
            return Err(ProviderError::unauthorized());
        }

        tracing::info!(
            "Successfully authenticated user {} via provider {}",
            user_principal.id,
            PROVIDER_NAME
        );
        tracing::debug!(stage = %LoginStage::Accepted, "zoomlion login");

        Ok(LoginOutcome {
            user_principal,
            group_principals,
            access_token,
        })
    }

    /// Fetches organizations and teams concurrently; the first failure
    /// aborts both.
    async fn fetch_group_principals(
        &self,
        access_token: &str,
        config: &ProviderConfig,
    ) -> ProviderResult<Vec<Principal>> {
        let (orgs, teams) = tokio::try_join!(
            self.client.fetch_organizations(access_token, config),
            self.client.fetch_teams(access_token, config),
        )?;

        let orgs = orgs.iter().map(|a| (PrincipalKind::Org, a));
        let teams = teams.iter().map(|a| (PrincipalKind::Team, a));
        Ok(orgs
            .chain(teams)
            .map(|(kind, account)| {
                let mut principal = to_principal(kind, account, None);
                principal.member_of = true;
                principal
            })
            .collect())
    }

    /// Resolves the remote access token for a host token.
    async fn access_token_for(&self, token: &SessionToken) -> ProviderResult<String> {
        match self.collaborators.tokens.get_secret(token).await {
            Ok(secret) => Ok(secret),
            Err(SecretLookupError::NotFound) => token
                .provider_access_token()
                .map(str::to_string)
                .ok_or_else(|| {
                    ProviderError::configuration("no zoomlion access token stored for the session")
                }),
            Err(e) => Err(ProviderError::configuration(e.to_string())),
        }
    }
}

#[async_trait]
impl AuthProvider for ZoomlionProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn login(&self, code: &str) -> ProviderResult<LoginOutcome> {
        self.login_user(code, None, false).await
    }

    async fn search_principals(
        &self,
        search_key: &str,
        principal_type: &str,
        token: &SessionToken,
    ) -> ProviderResult<Vec<Principal>> {
        let config = self.load_config().await?;
        let access_token = self.access_token_for(token).await?;

        let accounts = self
            .client
            .search_users(search_key, principal_type, &access_token, &config)
            .await?;

        Ok(accounts
            .iter()
            .map(|account| to_principal(account.kind(), account, Some(token)))
            .collect())
    }

    async fn get_principal(
        &self,
        principal_id: &str,
        token: &SessionToken,
    ) -> ProviderResult<Principal> {
        let config = self.load_config().await?;
        let access_token = self.access_token_for(token).await?;

        let id = PrincipalId::decode(principal_id)?;
        let kind = id.kind()?;
        let account = match kind {
            PrincipalKind::User | PrincipalKind::Org => {
                self.client
                    .fetch_account_by_id(id.external_id, &access_token, &config)
                    .await?
            }
            PrincipalKind::Team => {
                self.client
                    .fetch_team_by_id(id.external_id, &access_token, &config)
                    .await?
            }
        };

        Ok(to_principal(kind, &account, Some(token)))
    }
}

/// Maps an account to a principal, computing `me` or `member_of` relative to
/// the requester's token when one is given.
#[must_use]
pub fn to_principal(
    kind: PrincipalKind,
    account: &Account,
    token: Option<&SessionToken>,
) -> Principal {
    let mut principal = Principal::from_account(kind, account);

    if let Some(token) = token {
        match principal.principal_type {
            PrincipalType::User => principal.me = token.user_principal.is_same_user(&principal),
            PrincipalType::Group => principal.member_of = token.is_member_of(&principal),
        }
    }

    principal
}

/// Returns the allow-list handed to the access gate.
#[must_use]
pub fn effective_allow_list(
    config: &ProviderConfig,
    user_principal: &Principal,
    is_test: bool,
) -> Vec<String> {
    let mut allowed = config.allowed_principal_ids.clone();
    if is_test && config.access_mode == AccessMode::Restricted {
        allowed.push(user_principal.id.clone());
    }
    allowed
}
