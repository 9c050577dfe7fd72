use anyhow::Result;
use clap::Parser;

use zoomlion_cli::cli::{Cli, Commands};
use zoomlion_cli::output::print_error;
use zoomlion_cli::{build_provider, commands, config, observability};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let format = cli.format.unwrap_or_default();

    let app_config =
        config::loader::load_config(cli.config.as_deref()).map_err(anyhow::Error::msg)?;
    observability::init_tracing_with_level(&app_config.logging.level);
    tracing::debug!(
        store = %app_config.store.config_file.display(),
        include_groups = app_config.provider.include_groups,
        "configuration loaded"
    );

    let provider = build_provider(&app_config)?;

    match &cli.command {
        Commands::AuthorizeUrl(args) => {
            commands::provider::authorize_url(&provider, args, format).await?;
        }
        Commands::Apply(args) => {
            commands::provider::apply(&provider, args, format).await?;
        }
        Commands::Login(args) => {
            commands::provider::login(&provider, args, format).await?;
        }
        Commands::Describe => {
            commands::provider::describe(&provider).await?;
        }
        Commands::Search(args) => {
            commands::lookup::search(&provider, args, format).await?;
        }
        Commands::Principal(args) => {
            commands::lookup::principal(&provider, args, format).await?;
        }
        Commands::Org(args) => {
            commands::lookup::org(&provider, args, format).await?;
        }
    }

    Ok(())
}
