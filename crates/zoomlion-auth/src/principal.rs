//! Principal model and the externally visible principal id.
//!
//! A principal id looks like `zoomlion_[user|org|team]://12345`. The type
//! segment distinguishes organizations from teams for lookup routing, while
//! both surface as [`PrincipalType::Group`] to the access-control layer.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ProviderResult;
use crate::account::Account;
use crate::error::ProviderError;

/// Name of this provider, used as the principal id prefix.
pub const PROVIDER_NAME: &str = "zoomlion";

/// Kind of remote entity a principal was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrincipalKind {
    /// A person.
    User,
    /// An organization.
    Org,
    /// A team inside an organization.
    Team,
}

impl PrincipalKind {
    /// Returns the id segment for this kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Org => "org",
            Self::Team => "team",
        }
    }

    /// Parses an id type segment. Only exact lowercase names match.
    #[must_use]
    pub fn from_id_segment(segment: &str) -> Option<Self> {
        match segment {
            "user" => Some(Self::User),
            "org" => Some(Self::Org),
            "team" => Some(Self::Team),
            _ => None,
        }
    }

    /// Classifies the `type` label the remote service puts on an account.
    ///
    /// `Organization` (any case) and `org` map to [`PrincipalKind::Org`],
    /// `team` to [`PrincipalKind::Team`]; everything else, including an empty
    /// label, is treated as a user.
    #[must_use]
    pub fn from_remote_type(label: &str) -> Self {
        match label.to_ascii_lowercase().as_str() {
            "organization" | "org" => Self::Org,
            "team" => Self::Team,
            _ => Self::User,
        }
    }

    /// Returns the principal type this kind surfaces as.
    #[must_use]
    pub fn principal_type(&self) -> PrincipalType {
        match self {
            Self::User => PrincipalType::User,
            Self::Org | Self::Team => PrincipalType::Group,
        }
    }
}

impl fmt::Display for PrincipalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Principal type as seen by the access-control layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrincipalType {
    /// An individual user.
    User,
    /// An organization or team.
    Group,
}

impl PrincipalType {
    /// Returns the wire name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Group => "group",
        }
    }
}

/// The normalized identity record handed to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    /// Principal id, `<provider>_<kind>://<externalID>`.
    pub id: String,

    /// Display name (falls back to the login name).
    pub display_name: String,

    /// Login name.
    pub login_name: String,

    /// User or group.
    pub principal_type: PrincipalType,

    /// Provider that produced the principal.
    pub provider: String,

    /// Whether this is the requesting user.
    pub me: bool,

    /// Whether the requesting user is a member of this group.
    pub member_of: bool,

    /// Avatar URL.
    #[serde(default)]
    pub profile_picture: String,
}

impl Principal {
    /// Builds a principal from a normalized account, with no
    /// requester-relative flags set.
    #[must_use]
    pub fn from_account(kind: PrincipalKind, account: &Account) -> Self {
        let display_name = if account.name.is_empty() {
            account.login.clone()
        } else {
            account.name.clone()
        };

        Self {
            id: PrincipalId::encode(PROVIDER_NAME, kind, &account.id),
            display_name,
            login_name: account.login.clone(),
            principal_type: kind.principal_type(),
            provider: PROVIDER_NAME.to_string(),
            me: false,
            member_of: false,
            profile_picture: account.avatar_url.clone(),
        }
    }

    /// Returns `true` if both principals denote the same user.
    ///
    /// Id, login name and principal type must all match exactly.
    #[must_use]
    pub fn is_same_user(&self, other: &Principal) -> bool {
        self.id == other.id
            && self.login_name == other.login_name
            && self.principal_type == other.principal_type
    }
}

/// A decoded principal id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrincipalId<'a> {
    /// Provider name segment.
    pub provider: &'a str,
    /// Raw type segment (`user`, `org`, `team` for ids minted here).
    pub principal_type: &'a str,
    /// External id, possibly empty.
    pub external_id: &'a str,
}

impl<'a> PrincipalId<'a> {
    /// Encodes a principal id.
    #[must_use]
    pub fn encode(provider: &str, kind: PrincipalKind, external_id: &str) -> String {
        format!("{provider}_{kind}://{external_id}")
    }

    /// Decodes a principal id into its segments.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::InvalidPrincipalId`] when the id has no `:`,
    /// no `//` after it, or no `_` between provider and type.
    pub fn decode(id: &'a str) -> ProviderResult<Self> {
        let invalid = || ProviderError::InvalidPrincipalId(id.to_string());

        let (head, rest) = id.split_once(':').ok_or_else(invalid)?;
        let external_id = rest.strip_prefix("//").ok_or_else(invalid)?;
        let (provider, principal_type) = head.split_once('_').ok_or_else(invalid)?;

        Ok(Self {
            provider,
            principal_type,
            external_id,
        })
    }

    /// Resolves the type segment to a [`PrincipalKind`].
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::UnsupportedPrincipalType`] for unknown types.
    pub fn kind(&self) -> ProviderResult<PrincipalKind> {
        PrincipalKind::from_id_segment(self.principal_type)
            .ok_or_else(|| ProviderError::UnsupportedPrincipalType(self.principal_type.to_string()))
    }
}

/// The host's view of an issued login token.
///
/// Search and lookup calls receive it to resolve the remote access token and
/// to compute `me` / `member_of` relative to the requester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionToken {
    /// The token's user principal.
    pub user_principal: Principal,

    /// Group principals recorded when the token was issued.
    #[serde(default)]
    pub group_principals: Vec<Principal>,

    /// Provider metadata stored with the token.
    #[serde(default)]
    pub provider_info: HashMap<String, String>,
}

impl SessionToken {
    /// Key of the access token in [`SessionToken::provider_info`].
    pub const ACCESS_TOKEN_KEY: &'static str = "access_token";

    /// Creates a token for the given user.
    #[must_use]
    pub fn new(user_principal: Principal) -> Self {
        Self {
            user_principal,
            group_principals: Vec::new(),
            provider_info: HashMap::new(),
        }
    }

    /// Sets the group principals.
    #[must_use]
    pub fn with_groups(mut self, groups: Vec<Principal>) -> Self {
        self.group_principals = groups;
        self
    }

    /// Stores a remote access token in the provider metadata.
    #[must_use]
    pub fn with_access_token(mut self, access_token: impl Into<String>) -> Self {
        self.provider_info
            .insert(Self::ACCESS_TOKEN_KEY.to_string(), access_token.into());
        self
    }

    /// Returns the access token stored in the provider metadata.
    #[must_use]
    pub fn provider_access_token(&self) -> Option<&str> {
        self.provider_info
            .get(Self::ACCESS_TOKEN_KEY)
            .map(String::as_str)
            .filter(|t| !t.is_empty())
    }

    /// Returns `true` if the token's user is a member of the given group.
    #[must_use]
    pub fn is_member_of(&self, group: &Principal) -> bool {
        self.group_principals.iter().any(|g| g.id == group.id)
    }
}
