use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "zoomlion")]
#[command(about = "Zoomlion auth provider: test, apply and query a Zoomlion configuration")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (defaults to ./zoomlion.toml when present)
    #[arg(short, long, global = true, env = "ZOOMLION_CONFIG")]
    pub config: Option<String>,

    /// Output format
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the authorization URL to obtain a code for a provider config
    AuthorizeUrl(AuthorizeUrlArgs),
    /// Log in with a candidate provider config and store it on success
    Apply(ApplyArgs),
    /// Log in with the stored provider config
    Login(LoginArgs),
    /// Search users and groups
    Search(SearchArgs),
    /// Look up a principal by id (e.g. zoomlion_team://42)
    Principal(PrincipalArgs),
    /// Look up an organization by name
    Org(OrgArgs),
    /// Show the public descriptor of the stored provider
    Describe,
}

#[derive(clap::Args)]
pub struct AuthorizeUrlArgs {
    /// Candidate provider config (TOML); the stored config is used if omitted
    #[arg(long)]
    pub provider_file: Option<PathBuf>,
}

#[derive(clap::Args)]
pub struct ApplyArgs {
    /// Candidate provider config (TOML)
    #[arg(long)]
    pub provider_file: PathBuf,
    /// Authorization code returned to the redirect URI
    #[arg(long)]
    pub code: String,
    /// Store the provider as disabled
    #[arg(long)]
    pub disabled: bool,
}

#[derive(clap::Args)]
pub struct LoginArgs {
    /// Authorization code returned to the redirect URI
    #[arg(long)]
    pub code: String,
}

#[derive(clap::Args)]
pub struct TokenArgs {
    /// Zoomlion access token of the requesting user
    #[arg(long, env = "ZOOMLION_TOKEN", hide_env_values = true)]
    pub token: String,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SearchType {
    User,
    Group,
}

impl SearchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Group => "group",
        }
    }
}

#[derive(clap::Args)]
pub struct SearchArgs {
    /// Search text
    pub key: String,
    /// Restrict results to users or groups
    #[arg(long = "type")]
    pub principal_type: Option<SearchType>,
    #[command(flatten)]
    pub token: TokenArgs,
}

#[derive(clap::Args)]
pub struct PrincipalArgs {
    /// Principal id
    pub id: String,
    #[command(flatten)]
    pub token: TokenArgs,
}

#[derive(clap::Args)]
pub struct OrgArgs {
    /// Organization login name
    pub name: String,
    #[command(flatten)]
    pub token: TokenArgs,
}
