use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use uttar::app::AppContext;
use uttar::cli::{commands, Cli, Commands};
use uttar::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(base_url) = cli.base_url {
        config.api.base_url = base_url;
    }
    let ctx = AppContext::new(config, None)?;

    match cli.command {
        Commands::Login {
            token,
            username,
            role,
        } => {
            commands::login(&ctx, &token, &username, role.into())?;
        }
        Commands::Logout => {
            commands::logout(&ctx)?;
        }
        Commands::Whoami => {
            commands::whoami(&ctx)?;
        }
        Commands::Open { route } => {
            commands::open(&ctx, &route)?;
        }
        Commands::Toggle {
            kind,
            id,
            active,
            count,
            clicks,
        } => {
            commands::toggle(&ctx, kind.into(), &id, active, count, clicks).await?;
        }
    }

    Ok(())
}
