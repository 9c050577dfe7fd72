use anyhow::{Context, Result};
use colored::Colorize;
use zoomlion_auth::{AuthProvider, ConfigApplyInput, ZoomlionProvider};

use crate::cli::{ApplyArgs, AuthorizeUrlArgs, LoginArgs, OutputFormat};
use crate::output::{outcome_json, print_json, print_principal, print_principals, print_success};
use crate::stores::read_provider_file;

pub async fn authorize_url(
    provider: &ZoomlionProvider,
    args: &AuthorizeUrlArgs,
    format: OutputFormat,
) -> Result<()> {
    let config = match &args.provider_file {
        Some(path) => read_provider_file(path).await?,
        None => provider
            .load_config()
            .await
            .context("no provider file given and no stored config")?,
    };

    let output = provider.configure_test(&config);
    match format {
        OutputFormat::Json => print_json(&output)?,
        OutputFormat::Table => {
            println!("Open this URL and pass the returned code to `zoomlion apply`:");
            println!("{}", output.redirect_url.cyan());
        }
    }
    Ok(())
}

pub async fn apply(
    provider: &ZoomlionProvider,
    args: &ApplyArgs,
    format: OutputFormat,
) -> Result<()> {
    let config = read_provider_file(&args.provider_file).await?;
    let outcome = provider
        .test_and_apply(ConfigApplyInput {
            config,
            code: args.code.clone(),
            enabled: !args.disabled,
        })
        .await
        .context("test and apply failed")?;

    match format {
        OutputFormat::Json => print_json(&outcome_json(&outcome)),
        OutputFormat::Table => {
            print_success(&format!(
                "Applied zoomlion config as {} ({})",
                outcome.user_principal.login_name.cyan(),
                outcome.user_principal.id
            ));
            print_principals(&outcome.group_principals, format)
        }
    }
}

pub async fn login(
    provider: &ZoomlionProvider,
    args: &LoginArgs,
    format: OutputFormat,
) -> Result<()> {
    let outcome = provider.login(&args.code).await.context("login failed")?;

    print_principal(&outcome.user_principal, format)?;
    if !outcome.group_principals.is_empty() {
        print_principals(&outcome.group_principals, format)?;
    }
    Ok(())
}

pub async fn describe(provider: &ZoomlionProvider) -> Result<()> {
    let descriptor = provider.descriptor().await?;
    print_json(&descriptor)
}
