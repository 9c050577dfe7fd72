//! HTTP client for the Zoomlion identity service.
//!
//! [`RemoteClient`] performs all network I/O of the provider: the OAuth2
//! authorization code exchange, authenticated GETs, `link` header pagination
//! and the resource fetches built on them. It holds no business logic and
//! never retries; every failure surfaces to the caller.

mod endpoint;
mod link;

use std::collections::HashSet;

use reqwest::Response;
use reqwest::header::{ACCEPT, LINK};
use serde_json::Value;
use url::Url;

pub use endpoint::{Endpoint, endpoint_url};
pub use link::next_link;

use crate::ProviderResult;
use crate::account::{Account, RawTeam, SearchResult};
use crate::config::{ClientSettings, ProviderConfig};
use crate::error::ProviderError;
use crate::principal::PrincipalKind;

/// One page of a paginated response.
struct Page {
    body: Vec<u8>,
    next: Option<String>,
}

/// Stateless transport wrapper around a shared [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct RemoteClient {
    http_client: reqwest::Client,
    settings: ClientSettings,
}

impl RemoteClient {
    /// Builds a client from transport settings.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Transport`] if the TLS backend cannot be
    /// initialised.
    pub fn new(settings: ClientSettings) -> ProviderResult<Self> {
        if settings.insecure_skip_tls_verify {
            tracing::warn!("TLS certificate verification is disabled for the zoomlion client");
        }

        let http_client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .user_agent(settings.user_agent.clone())
            .danger_accept_invalid_certs(settings.insecure_skip_tls_verify)
            .build()?;

        Ok(Self {
            http_client,
            settings,
        })
    }

    /// Creates a client around an existing [`reqwest::Client`] (for sharing
    /// a connection pool).
    #[must_use]
    pub fn with_http_client(http_client: reqwest::Client, settings: ClientSettings) -> Self {
        Self {
            http_client,
            settings,
        }
    }

    /// Returns the transport settings.
    #[must_use]
    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Exchanges an authorization code for an access token.
    pub async fn exchange_code(
        &self,
        code: &str,
        config: &ProviderConfig,
    ) -> ProviderResult<String> {
        let url = endpoint_url(Endpoint::Token, config);
        let form = [
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", self.settings.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ];

        tracing::debug!("Exchanging authorization code with token endpoint: {}", url);

        let response = self
            .http_client
            .post(&url)
            .header(ACCEPT, "application/json")
            .form(&form)
            .send()
            .await
            .inspect_err(|e| {
                tracing::error!("Zoomlion exchange_code: POST {} failed: {}", url, e);
            })?;
        let body = read_success_body(response).await?;

        let resp: Value = serde_json::from_slice(&body).map_err(|e| {
            tracing::error!("Zoomlion exchange_code: error decoding token response: {}", e);
            ProviderError::malformed(format!("token response is not JSON: {e}"))
        })?;

        if let Some(error) = resp.get("error").filter(|e| !e.is_null()) {
            let description = resp
                .get("error_description")
                .map(json_text)
                .unwrap_or_default();
            let error = json_text(error);
            tracing::error!(
                "Received error from zoomlion {}, description from zoomlion {}",
                error,
                description
            );
            return Err(ProviderError::remote_auth(error, description));
        }

        match resp.get("access_token") {
            Some(Value::String(token)) => Ok(token.clone()),
            _ => Err(ProviderError::malformed(
                "token response has no string access_token",
            )),
        }
    }

    /// Fetches the profile of the token's user.
    pub async fn fetch_user_profile(
        &self,
        access_token: &str,
        config: &ProviderConfig,
    ) -> ProviderResult<Account> {
        let url = endpoint_url(Endpoint::UserInfo, config);
        let body = self.get_logged("fetch_user_profile", access_token, &url).await?;
        decode(&body, "fetch_user_profile")
    }

    /// Fetches every organization of the token's user.
    pub async fn fetch_organizations(
        &self,
        access_token: &str,
        config: &ProviderConfig,
    ) -> ProviderResult<Vec<Account>> {
        let url = endpoint_url(Endpoint::OrgInfo, config);
        let pages = self.paged_logged("fetch_organizations", access_token, &url).await?;

        let mut orgs = Vec::new();
        for page in pages {
            let mut batch: Vec<Account> = decode(&page, "fetch_organizations")?;
            for org in &mut batch {
                org.resource_type = PrincipalKind::Org.as_str().to_string();
            }
            orgs.append(&mut batch);
        }
        Ok(orgs)
    }

    /// Fetches every team of the token's user, projected to accounts.
    pub async fn fetch_teams(
        &self,
        access_token: &str,
        config: &ProviderConfig,
    ) -> ProviderResult<Vec<Account>> {
        let url = endpoint_url(Endpoint::Teams, config);
        let pages = self.paged_logged("fetch_teams", access_token, &url).await?;

        let mut teams = Vec::new();
        for page in pages {
            let raw: Vec<RawTeam> = decode(&page, "fetch_teams")?;
            for team in &raw {
                teams.push(team.to_account()?);
            }
        }
        Ok(teams)
    }

    /// Fetches a team by id.
    pub async fn fetch_team_by_id(
        &self,
        id: &str,
        access_token: &str,
        config: &ProviderConfig,
    ) -> ProviderResult<Account> {
        let url = url_with_segment(&endpoint_url(Endpoint::Team, config), id)?;
        let body = self.get_logged("fetch_team_by_id", access_token, &url).await?;
        let team: RawTeam = decode(&body, "fetch_team_by_id")?;
        team.to_account()
    }

    /// Fetches an organization by name.
    pub async fn fetch_org_by_name(
        &self,
        name: &str,
        access_token: &str,
        config: &ProviderConfig,
    ) -> ProviderResult<Account> {
        let url = format!(
            "{}{}",
            endpoint_url(Endpoint::Orgs, config),
            encode_component(name)
        );
        let body = self.get_logged("fetch_org_by_name", access_token, &url).await?;
        let mut org: Account = decode(&body, "fetch_org_by_name")?;
        org.resource_type = PrincipalKind::Org.as_str().to_string();
        Ok(org)
    }

    /// Fetches a user or organization by id.
    pub async fn fetch_account_by_id(
        &self,
        id: &str,
        access_token: &str,
        config: &ProviderConfig,
    ) -> ProviderResult<Account> {
        let url = url_with_segment(&endpoint_url(Endpoint::UserInfo, config), id)?;
        let body = self.get_logged("fetch_account_by_id", access_token, &url).await?;
        decode(&body, "fetch_account_by_id")
    }

    /// Searches users and organizations.
    ///
    /// A `group` type hint is translated to the remote `org` type. The remote
    /// service signals "no match" with an error status, so any transport or
    /// HTTP failure yields an empty result.
    pub async fn search_users(
        &self,
        term: &str,
        type_hint: &str,
        access_token: &str,
        config: &ProviderConfig,
    ) -> ProviderResult<Vec<Account>> {
        let url = format!(
            "{}{}",
            endpoint_url(Endpoint::UserSearch, config),
            search_query(term, type_hint)
        );

        let body = match self.get(access_token, &url).await {
            Ok(page) => page.body,
            Err(_) => return Ok(Vec::new()),
        };

        let result: SearchResult = decode(&body, "search_users")?;
        Ok(result.items)
    }

    /// Fetches a collection, following `rel="next"` links.
    ///
    /// Returns the raw bodies in page order. The walk ends at a next link
    /// pointing back to a page that was already fetched, or at one leaving
    /// the origin of the first page.
    pub async fn fetch_paged(
        &self,
        access_token: &str,
        url: &str,
    ) -> ProviderResult<Vec<Vec<u8>>> {
        let start = Url::parse(url)?;
        let origin = start.origin();

        let mut bodies = Vec::new();
        let mut visited = HashSet::new();
        let mut next = Some(start);

        while let Some(current) = next.take() {
            visited.insert(current.as_str().to_string());
            let page = self.get(access_token, current.as_str()).await?;
            bodies.push(page.body);

            let Some(target) = page.next else {
                continue;
            };
            let resolved = current.join(&target)?;

            if resolved.origin() != origin {
                tracing::warn!(
                    "Pagination link leaves {} for {}, stopping after {} pages",
                    origin.ascii_serialization(),
                    resolved.origin().ascii_serialization(),
                    bodies.len()
                );
            } else if visited.contains(resolved.as_str()) {
                tracing::warn!(
                    "Pagination link cycles back to {}, stopping after {} pages",
                    strip_query(resolved.as_str()),
                    bodies.len()
                );
            } else {
                next = Some(resolved);
            }
        }

        Ok(bodies)
    }

    /// Authenticated GET of a single page.
    async fn get(&self, access_token: &str, url: &str) -> ProviderResult<Page> {
        let response = self
            .http_client
            .get(url)
            .bearer_auth(access_token)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let next = response
            .headers()
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .and_then(next_link);
        let body = read_success_body(response).await?;

        Ok(Page { body, next })
    }

    async fn get_logged(&self, op: &str, access_token: &str, url: &str) -> ProviderResult<Vec<u8>> {
        self.get(access_token, url)
            .await
            .map(|page| page.body)
            .inspect_err(|e| {
                tracing::error!(
                    "Zoomlion {}: GET url {} received error from zoomlion, err: {}",
                    op,
                    strip_query(url),
                    e
                );
            })
    }

    async fn paged_logged(
        &self,
        op: &str,
        access_token: &str,
        url: &str,
    ) -> ProviderResult<Vec<Vec<u8>>> {
        self.fetch_paged(access_token, url).await.inspect_err(|e| {
            tracing::error!(
                "Zoomlion {}: GET url {} received error from zoomlion, err: {}",
                op,
                strip_query(url),
                e
            );
        })
    }
}

/// Reads the body, failing with [`ProviderError::RemoteHttp`] on a non-2xx
/// status.
async fn read_success_body(response: Response) -> ProviderResult<Vec<u8>> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::RemoteHttp {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response.bytes().await?.to_vec())
}

fn decode<T: serde::de::DeserializeOwned>(body: &[u8], op: &str) -> ProviderResult<T> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::error!("Zoomlion {}: error decoding response, err: {}", op, e);
        ProviderError::malformed(format!("{op}: {e}"))
    })
}

/// Renders a JSON value as text without quoting strings.
fn json_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Builds the `q` parameter of the search endpoint.
fn search_query(term: &str, type_hint: &str) -> String {
    let type_hint = if type_hint == "group" {
        PrincipalKind::Org.as_str()
    } else {
        type_hint
    };

    let mut query = encode_component(term);
    if !type_hint.is_empty() {
        query.push_str("+type:");
        query.push_str(&encode_component(type_hint));
    }
    query
}

fn encode_component(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Appends `segment` to `base` as one percent-encoded path segment.
///
/// Empty, `.` and `..` segments are refused since URL resolution would
/// collapse them into a different resource.
fn url_with_segment(base: &str, segment: &str) -> ProviderResult<String> {
    if matches!(segment, "" | "." | "..") {
        return Err(ProviderError::InvalidPrincipalId(segment.to_string()));
    }

    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|()| ProviderError::configuration(format!("{base} cannot take a path segment")))?
        .pop_if_empty()
        .push(segment);
    Ok(url.to_string())
}

fn strip_query(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}
