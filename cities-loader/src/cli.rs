//! Définition et implémentation des commandes CLI
//!
//! - `serve` (défaut) : serveur HTTP `/health` + `/process`
//! - `load` : chargement ponctuel d'un objet, sans serveur

use anyhow::{Context, Result};
use clap::Subcommand;
use tracing::info;

use cities_loader::{LoaderConfig, Pipeline, TableName};

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP service (default)
    Serve {
        /// Bind address (défaut : env HOST / 0.0.0.0)
        #[arg(long)]
        host: Option<String>,

        /// Listening port (défaut : env PORT / 5000)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Load a single GeoJSON object into the cities table and exit
    Load {
        /// Bucket containing the object
        #[arg(short, long)]
        bucket: String,

        /// Object key
        #[arg(short, long)]
        key: String,

        /// Target table (défaut : env CITIES_TABLE / cities)
        #[arg(long)]
        table: Option<String>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Charge la configuration depuis l'environnement
fn load_config() -> Result<LoaderConfig> {
    LoaderConfig::from_env().context("Invalid configuration")
}

/// Exécute la commande serve
pub async fn cmd_serve(host: Option<String>, port: Option<u16>) -> Result<()> {
    let mut config = load_config()?;
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    info!(
        database = %format!("{}@{}:{}/{}", config.database.user, config.database.host, config.database.port, config.database.dbname),
        ssl_mode = ?config.database.ssl_mode,
        table = %config.table,
        storage = ?config.storage,
        "Configuration loaded"
    );

    let pipeline = Pipeline::from_config(&config);
    cities_loader::server::start_server(pipeline, &config.server).await
}

/// Exécute la commande load
pub async fn cmd_load(bucket: &str, key: &str, table: Option<String>, json: bool) -> Result<()> {
    let mut config = load_config()?;
    if let Some(table) = table {
        config.table = table
            .parse::<TableName>()
            .map_err(|reason| anyhow::anyhow!(reason))?;
    }

    let pipeline = Pipeline::from_config(&config);
    let report = pipeline
        .process(bucket, key)
        .await
        .with_context(|| format!("Failed to load {}/{}", bucket, key))?;

    info!("{}", report.summary());

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        report.display();
    }

    Ok(())
}
