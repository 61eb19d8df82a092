//! Chargement des lignes vers PostgreSQL/PostGIS

pub mod connection;
pub mod postgres;
pub mod transaction;

use async_trait::async_trait;

use geofeed::CityRow;

use crate::error::LoadError;

pub use connection::{DatabaseConfig, SslMode};
pub use postgres::PostgresStore;
pub use transaction::LoadReport;

/// Destination des lignes `cities`
///
/// Une implémentation doit être atomique : en cas d'erreur, aucune ligne
/// de l'appel n'est conservée.
#[async_trait]
pub trait CityStore: Send + Sync {
    /// Insère toutes les lignes, dans l'ordre, en une seule transaction
    async fn load(&self, source: &str, rows: &[CityRow]) -> Result<LoadReport, LoadError>;
}
