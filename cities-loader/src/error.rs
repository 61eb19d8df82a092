//! Erreurs du pipeline de chargement

use thiserror::Error;

use geofeed::GeofeedError;

/// Erreur de lecture dans le stockage objet
#[derive(Debug, Error)]
pub enum FetchError {
    /// L'objet n'existe pas
    #[error("Object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    /// Erreur réseau, d'authentification ou de configuration du client
    #[error("Storage transport error: {0}")]
    Transport(String),
}

/// Erreur d'écriture dans PostGIS
///
/// Toute erreur annule la transaction en cours : aucune ligne n'est conservée.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl LoadError {
    /// Crée une erreur de persistance avec contexte
    pub fn persistence(context: &str, error: impl std::fmt::Display) -> Self {
        Self::Persistence(format!("{context}: {error}"))
    }
}

/// Erreur de configuration (variables d'environnement)
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Erreur d'exécution du pipeline, quelle que soit l'étape
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Document(#[from] GeofeedError),

    #[error(transparent)]
    Load(#[from] LoadError),
}

impl PipelineError {
    /// Étape du pipeline en échec, pour les logs
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Fetch(_) => "fetch",
            PipelineError::Document(_) => "parse",
            PipelineError::Load(_) => "load",
        }
    }
}
