use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use elevator_web::{build_state, create_router, ServerConfig, StartupError};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "elevator-server")]
#[command(about = "Serve the elevator alignment quiz")]
struct Cli {
    /// TOML config file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// TCP address to bind the web server
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// Scenario catalog (JSON, or TOML by extension)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// SQLite database for choice statistics, or ":memory:"
    #[arg(long)]
    database: Option<PathBuf>,

    /// Directory containing frontend assets
    #[arg(long)]
    static_dir: Option<PathBuf>,
}

impl Cli {
    fn into_config(self) -> Result<ServerConfig, StartupError> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::from_file(path)?,
            None => ServerConfig::default(),
        }
        .with_env_secret(|key| std::env::var(key).ok());

        if let Some(bind) = self.bind {
            config.bind = bind;
        }
        if let Some(catalog) = self.catalog {
            config.catalog_path = catalog;
        }
        if let Some(database) = self.database {
            config.database_path = database;
        }
        if let Some(static_dir) = self.static_dir {
            config.static_dir = static_dir;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "elevator_web=info,elevator_core=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(err) = run(Cli::parse()).await {
        error!("{err}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), StartupError> {
    let config = cli.into_config()?;
    let state = build_state(&config)?;
    let app = create_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|source| StartupError::Bind {
            addr: config.bind,
            source,
        })?;

    info!("Elevator quiz: http://{}", config.bind);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(StartupError::Serve)?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for Ctrl-C: {err}");
        std::future::pending::<()>().await;
    }
}
