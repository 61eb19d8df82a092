//! # geofeed
//!
//! Parser de FeatureCollection GeoJSON et extraction des points vers des lignes
//! prêtes pour PostGIS.
//!
//! ## Features
//!
//! - Validation de la forme du document (`FeatureCollection`)
//! - Géométries typées via le crate `geojson`
//! - Filtrage des `Point` et rendu WKT avec `geozero`
//! - Attributs `name` / `population` avec valeurs par défaut explicites
//!
//! ## Usage
//!
//! ```rust,ignore
//! let outcome = geofeed::extract_rows(&bytes)?;
//! println!("{} points, {} ignorées", outcome.rows.len(), outcome.skipped);
//! ```

pub mod error;
pub mod filter;
pub mod parser;
pub mod types;

pub use error::GeofeedError;
pub use filter::{filter_points, point_to_wkt, FilterOutcome};
pub use parser::parse_feature_collection;
pub use types::{
    AttributeValue, Attributes, CityRow, Feature, GeometryKind, DEFAULT_NAME,
    DEFAULT_POPULATION, SRID,
};

/// Parse un document et retourne les lignes à insérer.
///
/// # Errors
///
/// Retourne `GeofeedError` si les octets ne sont pas du JSON, si le document
/// n'est pas une FeatureCollection, ou si un Point ou sa population est
/// inexploitable.
pub fn extract_rows(bytes: &[u8]) -> Result<ExtractResult, GeofeedError> {
    let features = parse_feature_collection(bytes)?;
    let features_read = features.len();
    let FilterOutcome { rows, skipped } = filter_points(features)?;

    Ok(ExtractResult {
        features_read,
        skipped,
        rows,
    })
}

/// Résultat de l'extraction d'un document
#[derive(Debug)]
pub struct ExtractResult {
    /// Nombre de features dans la collection
    pub features_read: usize,
    /// Nombre de features non-Point ignorées
    pub skipped: usize,
    /// Lignes à insérer, dans l'ordre du document
    pub rows: Vec<CityRow>,
}
