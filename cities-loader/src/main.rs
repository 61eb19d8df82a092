//! Point d'entrée CLI pour cities-loader

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

// Charger .env au démarrage
fn load_env() {
    // Chercher .env dans le répertoire courant ou parent
    if dotenvy::dotenv().is_err() {
        // Essayer depuis le répertoire du binaire
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let _ = dotenvy::from_path(dir.join(".env"));
            }
        }
    }
}

mod cli;

use cli::Commands;

/// Charger des points GeoJSON depuis S3 vers PostGIS
#[derive(Parser)]
#[command(name = "cities-loader")]
#[command(author, version)]
#[command(about = "Charger les points d'une FeatureCollection GeoJSON (S3) dans la table PostGIS cities")]
#[command(long_about = "Service HTTP qui lit un objet GeoJSON dans un bucket et insère ses points dans PostGIS, en une seule transaction.\n\nPar défaut, démarre le serveur HTTP. Utilisez 'load' pour un chargement ponctuel.")]
struct Cli {
    /// Augmenter la verbosité (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Sous-commande (défaut: serve)
    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Charger .env avant tout
    load_env();

    let cli = Cli::parse();

    // Configurer le logging
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Some(Commands::Load {
            bucket,
            key,
            table,
            json,
        }) => {
            cli::cmd_load(&bucket, &key, table, json).await?;
        }
        Some(Commands::Serve { host, port }) => {
            cli::cmd_serve(host, port).await?;
        }
        None => {
            cli::cmd_serve(None, None).await?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .init();
}
