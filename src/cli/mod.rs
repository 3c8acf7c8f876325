pub mod commands;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "htmxtodo")]
#[command(about = "Server-rendered to-do lists")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    #[command(about = "Run the web server (default)")]
    Serve {
        #[arg(long, help = "Address to bind, overrides HOST")]
        host: Option<std::net::IpAddr>,

        #[arg(long, help = "Port to bind, overrides PORT")]
        port: Option<u16>,
    },

    #[command(about = "Create the database tables and exit")]
    Migrate,
}

pub async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve { host: None, port: None }) {
        Commands::Serve { host, port } => commands::serve::handle(config, host, port).await,
        Commands::Migrate => commands::migrate::handle(config).await,
    }
}
