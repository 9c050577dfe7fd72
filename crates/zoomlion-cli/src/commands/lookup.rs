use anyhow::{Context, Result};
use zoomlion_auth::provider::to_principal;
use zoomlion_auth::{AuthProvider, PrincipalKind, SessionToken, ZoomlionProvider};

use crate::cli::{OrgArgs, OutputFormat, PrincipalArgs, SearchArgs};
use crate::output::{print_principal, print_principals};

/// Builds the requester's session from a bare access token.
pub async fn session_for(
    provider: &ZoomlionProvider,
    access_token: &str,
) -> Result<SessionToken> {
    let config = provider.load_config().await?;
    let profile = provider
        .client()
        .fetch_user_profile(access_token, &config)
        .await
        .context("cannot resolve the user behind --token")?;

    let user = to_principal(PrincipalKind::User, &profile, None);
    Ok(SessionToken::new(user).with_access_token(access_token))
}

pub async fn search(
    provider: &ZoomlionProvider,
    args: &SearchArgs,
    format: OutputFormat,
) -> Result<()> {
    let session = session_for(provider, &args.token.token).await?;
    let principal_type = args.principal_type.map(|t| t.as_str()).unwrap_or_default();

    let principals = provider
        .search_principals(&args.key, principal_type, &session)
        .await?;
    print_principals(&principals, format)
}

pub async fn principal(
    provider: &ZoomlionProvider,
    args: &PrincipalArgs,
    format: OutputFormat,
) -> Result<()> {
    let session = session_for(provider, &args.token.token).await?;
    let principal = provider.get_principal(&args.id, &session).await?;
    print_principal(&principal, format)
}

pub async fn org(provider: &ZoomlionProvider, args: &OrgArgs, format: OutputFormat) -> Result<()> {
    let config = provider.load_config().await?;
    let account = provider
        .client()
        .fetch_org_by_name(&args.name, &args.token.token, &config)
        .await?;
    print_principal(&to_principal(PrincipalKind::Org, &account, None), format)
}
