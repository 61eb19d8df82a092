//! Configuration du service
//!
//! Lue une seule fois au démarrage depuis l'environnement (après `.env`),
//! immuable ensuite.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::ConfigError;
use crate::export::DatabaseConfig;
use crate::storage::StorageBackend;

/// Table cible par défaut
pub const DEFAULT_TABLE: &str = "cities";

/// Nom de table validé, éventuellement qualifié par un schéma (`schema.table`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableName(String);

fn table_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$")
            .expect("table name pattern is valid")
    })
}

impl FromStr for TableName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() <= 127 && table_name_regex().is_match(s) {
            Ok(TableName(s.to_string()))
        } else {
            Err(format!("Invalid table name: '{}'", s))
        }
    }
}

impl Default for TableName {
    fn default() -> Self {
        TableName(DEFAULT_TABLE.to_string())
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Adresse d'écoute HTTP
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 5000,
        }
    }
}

/// Configuration complète
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    pub database: DatabaseConfig,
    pub table: TableName,
    pub storage: StorageBackend,
    pub server: ServerConfig,
}

impl LoaderConfig {
    /// Charge la configuration depuis les variables d'environnement
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Charge la configuration via une fonction de lecture des variables
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database = DatabaseConfig::from_lookup(&get)?;

        let table = match get("CITIES_TABLE") {
            Some(t) => t
                .parse::<TableName>()
                .map_err(|reason| ConfigError::Invalid { var: "CITIES_TABLE", reason })?,
            None => TableName::default(),
        };

        let storage = match get("STORAGE_BACKEND").as_deref().map(str::to_lowercase).as_deref() {
            None | Some("s3") => StorageBackend::S3,
            Some("local") => StorageBackend::Local {
                root: get("STORAGE_ROOT")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(".")),
            },
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "STORAGE_BACKEND",
                    reason: format!("'{}' (use: s3, local)", other),
                })
            }
        };

        let defaults = ServerConfig::default();
        let port = match get("PORT") {
            Some(p) => p.parse::<u16>().map_err(|_| ConfigError::Invalid {
                var: "PORT",
                reason: format!("'{}' is not a port number", p),
            })?,
            None => defaults.port,
        };

        Ok(Self {
            database,
            table,
            storage,
            server: ServerConfig {
                host: get("HOST").unwrap_or(defaults.host),
                port,
            },
        })
    }
}
