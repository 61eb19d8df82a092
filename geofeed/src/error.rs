//! Types d'erreurs pour le crate geofeed

use thiserror::Error;

/// Erreurs pouvant survenir lors du parsing d'une FeatureCollection
#[derive(Debug, Error)]
pub enum GeofeedError {
    /// Les octets ne sont pas un JSON valide
    #[error("Malformed document: {0}")]
    MalformedDocument(#[from] serde_json::Error),

    /// Document JSON valide mais de forme inattendue
    #[error("Schema error: {0}")]
    Schema(String),

    /// Géométrie Point inexploitable
    #[error("Invalid geometry for feature #{index}: {reason}")]
    InvalidGeometry { index: usize, reason: String },

    /// Attribut présent mais non représentable dans la colonne cible
    #[error("Invalid attribute '{name}' for feature #{index}: {reason}")]
    InvalidAttribute {
        index: usize,
        name: &'static str,
        reason: String,
    },
}

impl GeofeedError {
    /// Crée une erreur de schéma
    pub fn schema(reason: impl Into<String>) -> Self {
        Self::Schema(reason.into())
    }

    /// Crée une erreur de géométrie invalide
    pub fn invalid_geometry(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            index,
            reason: reason.into(),
        }
    }

    /// Crée une erreur d'attribut invalide
    pub fn invalid_attribute(index: usize, name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidAttribute {
            index,
            name,
            reason: reason.into(),
        }
    }
}
