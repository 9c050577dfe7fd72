//! Endpoint URL construction.

use crate::config::ProviderConfig;

/// The remote endpoints this provider addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Bare API root.
    Api,
    /// OAuth2 token endpoint.
    Token,
    /// OAuth2 authorization endpoint the administrator is redirected to.
    Authorize,
    /// Users collection, followed by a login.
    Users,
    /// Organization by name, followed by the name.
    Orgs,
    /// Current user profile; `/<id>` addresses a user or org by id.
    UserInfo,
    /// Organizations of the current user.
    OrgInfo,
    /// User search, followed by the encoded query.
    UserSearch,
    /// Team by id, followed by the id.
    Team,
    /// Teams of the current user.
    Teams,
    /// Browser URL template of a team, `%s` for org and team slug.
    TeamProfile,
}

impl Endpoint {
    /// Maps an upper-case endpoint name to an [`Endpoint`].
    ///
    /// Unrecognised names resolve to [`Endpoint::Api`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "TOKEN" => Self::Token,
            "AUTHORIZE" => Self::Authorize,
            "USERS" => Self::Users,
            "ORGS" => Self::Orgs,
            "USER_INFO" => Self::UserInfo,
            "ORG_INFO" => Self::OrgInfo,
            "USER_SEARCH" => Self::UserSearch,
            "TEAM" => Self::Team,
            "TEAMS" => Self::Teams,
            "TEAM_PROFILE" => Self::TeamProfile,
            _ => Self::Api,
        }
    }

    fn path(&self) -> &'static str {
        match self {
            Self::Api => "",
            Self::Token => "/oauth2/token",
            Self::Authorize => "/oauth2/auth",
            Self::Users => "/users/",
            Self::Orgs => "/orgs/",
            Self::UserInfo => "/userinfo",
            Self::OrgInfo => "/user/orgs?per_page=1",
            Self::UserSearch => "/search/users?q=",
            Self::Team => "/teams/",
            Self::Teams => "/user/teams?per_page=100",
            Self::TeamProfile => "/orgs/%s/teams/%s",
        }
    }
}

/// Builds the URL of an endpoint for the given configuration.
#[must_use]
pub fn endpoint_url(endpoint: Endpoint, config: &ProviderConfig) -> String {
    format!("{}{}", config.host_root(), endpoint.path())
}
