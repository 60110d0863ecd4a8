pub mod cli;
pub mod clients;
pub mod config;
pub mod constants;
pub mod domain;
pub mod models;
pub mod normalizer;
pub mod query;
pub mod services;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands};
pub use config::Config;
use services::{CatalogService, NotionCatalogService};
use tracing_subscriber::EnvFilter;

/// Installs the tracing subscriber: `RUST_LOG` if set, the configured level
/// otherwise.
pub fn init_tracing(config: &Config) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init();
}

pub async fn run(config: Config) -> anyhow::Result<()> {
    init_tracing(&config);

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        return Ok(());
    };

    if matches!(command, Commands::Init) {
        return cli::cmd_init();
    }

    config.validate()?;
    let service = NotionCatalogService::from_config(&config)
        .context("Failed to set up the upstream client")?;
    dispatch(&service, command).await
}

async fn dispatch(service: &dyn CatalogService, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::People(args) => cli::cmd_people(service, &args).await,
        Commands::Contents {
            listing,
            performer,
            uniform,
        } => {
            cli::cmd_contents(service, &listing, performer.as_deref(), uniform.as_deref()).await
        }
        Commands::Person { slug } => cli::cmd_person(service, &slug).await,
        Commands::Content { id } => cli::cmd_content(service, &id).await,
        Commands::Genres => cli::cmd_genres(service).await,
        Commands::Uniforms => cli::cmd_uniforms(service).await,
        Commands::Categories => cli::cmd_categories(service).await,
        Commands::Rankings => cli::cmd_rankings(service).await,
        Commands::Ranking { slug } => cli::cmd_ranking(service, &slug).await,
        Commands::Increment { id, person } => cli::cmd_increment(service, &id, person).await,
        Commands::Affiliates { placement } => cli::cmd_affiliates(service, &placement).await,
        Commands::Init => cli::cmd_init(),
    }
}
