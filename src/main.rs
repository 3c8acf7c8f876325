use clap::Parser;
use htmxtodo::cli::Cli;
use htmxtodo::config::AppConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Load .env if present so DATABASE_URL, SESSION_SECRET etc. can live there
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    init_tracing(&config);

    if let Err(e) = htmxtodo::cli::run(cli, config).await {
        tracing::error!(error = ?e, "exiting");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn init_tracing(config: &AppConfig) {
    let default_filter = if config.is_development() {
        "htmxtodo=debug,tower_http=debug"
    } else {
        "htmxtodo=info,tower_http=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(!config.is_production())
        .init();
}
