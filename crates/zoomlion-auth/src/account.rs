//! Remote resource shapes and their normalization into [`Account`].
//!
//! Users and organizations decode straight into [`Account`]. Teams arrive as
//! [`RawTeam`] and are projected with [`RawTeam::to_account`], which pulls the
//! avatar out of the nested organization object.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ProviderResult;
use crate::error::ProviderError;
use crate::principal::PrincipalKind;

/// A user, organization, or team on Zoomlion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Account {
    /// Provider-assigned id.
    pub id: String,

    /// Login name.
    #[serde(rename = "sub")]
    pub login: String,

    /// Display name.
    pub name: String,

    /// Avatar URL.
    pub avatar_url: String,

    /// Remote type label (`User`, `Organization`, ...).
    #[serde(rename = "type")]
    pub resource_type: String,
}

impl Account {
    /// Classifies the account by its remote type label.
    #[must_use]
    pub fn kind(&self) -> PrincipalKind {
        PrincipalKind::from_remote_type(&self.resource_type)
    }
}

/// Team record as returned by the teams endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawTeam {
    /// Provider-assigned team id.
    pub id: String,

    /// Organization the team belongs to, as an open JSON object.
    pub organization: Map<String, Value>,

    /// Team name.
    pub name: String,

    /// URL-safe team name.
    pub slug: String,
}

impl RawTeam {
    /// Projects the team into an [`Account`].
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::MalformedResponse`] if the organization
    /// object has no string `avatar_url`.
    pub fn to_account(&self) -> ProviderResult<Account> {
        let avatar_url = match self.organization.get("avatar_url") {
            Some(Value::String(url)) => url.clone(),
            Some(other) => {
                return Err(ProviderError::malformed(format!(
                    "team {} organization.avatar_url is not a string: {other}",
                    self.id
                )));
            }
            None => {
                return Err(ProviderError::malformed(format!(
                    "team {} is missing organization.avatar_url",
                    self.id
                )));
            }
        };

        Ok(Account {
            id: self.id.clone(),
            login: self.slug.clone(),
            name: self.name.clone(),
            avatar_url,
            resource_type: PrincipalKind::Team.as_str().to_string(),
        })
    }
}

/// Body of the user search endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct SearchResult {
    #[serde(default)]
    pub items: Vec<Account>,
}
