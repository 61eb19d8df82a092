//! Connexion PostgreSQL (une connexion par chargement, pas de pool)

use std::fmt;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio_postgres::{Client, Connection, NoTls};
use tokio_postgres_rustls::MakeRustlsConnect;
use tracing::{debug, warn};

use crate::error::{ConfigError, LoadError};

/// Mode SSL pour la connexion PostgreSQL
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SslMode {
    /// Pas de SSL
    Disable,
    /// SSL préféré mais non requis
    Prefer,
    /// SSL requis (défaut)
    #[default]
    Require,
}

impl std::str::FromStr for SslMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "disable" | "off" | "false" | "no" => Ok(SslMode::Disable),
            "prefer" => Ok(SslMode::Prefer),
            "require" | "on" | "true" | "yes" => Ok(SslMode::Require),
            _ => Err(format!("Invalid SSL mode: {}. Use: disable, prefer, require", s)),
        }
    }
}

/// Configuration de la base de données
#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub user: String,
    pub password: String,
    pub ssl_mode: SslMode,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("dbname", &self.dbname)
            .field("user", &self.user)
            .field("password", &"***")
            .field("ssl_mode", &self.ssl_mode)
            .finish()
    }
}

impl DatabaseConfig {
    /// Charge la configuration depuis les variables d'environnement
    ///
    /// `DB_HOST`, `DB_USER` et `DB_PASSWORD` sont obligatoires.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Charge la configuration via une fonction de lecture des variables
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |var: &'static str| get(var).ok_or(ConfigError::Missing(var));

        let port = match get("DB_PORT") {
            Some(p) => p.parse::<u16>().map_err(|_| ConfigError::Invalid {
                var: "DB_PORT",
                reason: format!("'{}' is not a port number", p),
            })?,
            None => 5432,
        };

        let ssl_mode = match get("DB_SSLMODE") {
            Some(s) => s
                .parse::<SslMode>()
                .map_err(|reason| ConfigError::Invalid { var: "DB_SSLMODE", reason })?,
            None => SslMode::default(),
        };

        Ok(Self {
            host: required("DB_HOST")?,
            port,
            dbname: get("DB_NAME").unwrap_or_else(|| "postgres".into()),
            user: required("DB_USER")?,
            password: required("DB_PASSWORD")?,
            ssl_mode,
        })
    }

    fn to_pg_config(&self) -> tokio_postgres::Config {
        let mut cfg = tokio_postgres::Config::new();
        cfg.host(&self.host)
            .port(self.port)
            .dbname(&self.dbname)
            .user(&self.user)
            .password(&self.password)
            .ssl_mode(match self.ssl_mode {
                SslMode::Disable => tokio_postgres::config::SslMode::Disable,
                SslMode::Prefer => tokio_postgres::config::SslMode::Prefer,
                SslMode::Require => tokio_postgres::config::SslMode::Require,
            });
        cfg
    }
}

/// Crée la configuration TLS pour rustls
fn make_tls_connector() -> MakeRustlsConnect {
    let root_store = rustls::RootCertStore::from_iter(
        webpki_roots::TLS_SERVER_ROOTS.iter().cloned()
    );

    let config = rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    MakeRustlsConnect::new(config)
}

/// Ouvre une connexion dédiée
///
/// La tâche de connexion se termine quand le `Client` retourné est droppé.
pub async fn connect(config: &DatabaseConfig) -> Result<Client, LoadError> {
    let pg_config = config.to_pg_config();

    debug!(
        host = %config.host,
        port = config.port,
        dbname = %config.dbname,
        ssl_mode = ?config.ssl_mode,
        "Connecting to PostgreSQL"
    );

    match config.ssl_mode {
        SslMode::Disable => {
            let (client, connection) = pg_config
                .connect(NoTls)
                .await
                .map_err(|e| LoadError::persistence("Failed to connect to PostgreSQL", e))?;
            spawn_connection(connection);
            Ok(client)
        }
        SslMode::Prefer | SslMode::Require => {
            let (client, connection) = pg_config
                .connect(make_tls_connector())
                .await
                .map_err(|e| {
                    LoadError::persistence("Failed to connect to PostgreSQL with TLS", e)
                })?;
            spawn_connection(connection);
            Ok(client)
        }
    }
}

fn spawn_connection<S, T>(connection: Connection<S, T>)
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    T: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            warn!(error = %e, "PostgreSQL connection closed with error");
        }
    });
}
