use crate::errors::StorageError;
use crate::seed;
use crate::state::AppState;
use crate::storage::{self, DEFAULT_DB_PATH};
use clap::{Args, Parser, Subcommand};
use std::{net::SocketAddr, path::PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "demand_planner")]
#[command(about = "Demand forecast dashboard over a local SQLite store")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Args)]
pub struct GlobalArgs {
    /// Path to the SQLite database holding both tables
    #[arg(long, global = true, env = "DEMAND_DB_PATH", default_value = DEFAULT_DB_PATH)]
    pub db_path: PathBuf,

    /// Port the dashboard listens on
    #[arg(short, long, global = true, env = "PORT", default_value_t = 8080)]
    pub port: u16,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the dashboard (default)
    Serve,
    /// Create the tables and replace their contents with synthetic data
    Seed {
        /// Fixed RNG seed for reproducible data
        #[arg(long)]
        seed: Option<u64>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let GlobalArgs { db_path, port } = self.global;
        match self.command.unwrap_or(Commands::Serve) {
            Commands::Serve => serve(db_path, port).await,
            Commands::Seed { seed } => seed_database(db_path, seed).await,
        }
    }
}

async fn serve(db_path: PathBuf, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let app = crate::router(AppState::new(db_path.clone()));
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!(db = %db_path.display(), "listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}

async fn seed_database(db_path: PathBuf, rng_seed: Option<u64>) -> Result<(), Box<dyn std::error::Error>> {
    info!(db = %db_path.display(), "generating synthetic data");
    tokio::task::spawn_blocking(move || -> Result<(), StorageError> {
        let data = seed::generate(rng_seed);
        let mut conn = storage::open_for_write(&db_path)?;
        storage::init_schema(&conn)?;
        storage::replace_tables(&mut conn, &data.historical, &data.forecasts)?;
        Ok(())
    })
    .await??;
    info!("data load complete; run `demand_planner serve` to open the dashboard");
    Ok(())
}
