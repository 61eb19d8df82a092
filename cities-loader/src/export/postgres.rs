//! Export vers PostgreSQL/PostGIS

use async_trait::async_trait;
use tracing::{debug, instrument};

use geofeed::CityRow;

use super::connection::{connect, DatabaseConfig};
use super::transaction::{load_rows, LoadReport};
use super::CityStore;
use crate::config::TableName;
use crate::error::LoadError;

/// Chargeur PostGIS : une connexion et une transaction par appel
#[derive(Debug, Clone)]
pub struct PostgresStore {
    config: DatabaseConfig,
    table: TableName,
}

impl PostgresStore {
    pub fn new(config: DatabaseConfig, table: TableName) -> Self {
        Self { config, table }
    }
}

#[async_trait]
impl CityStore for PostgresStore {
    #[instrument(skip(self, rows), fields(table = %self.table, rows = rows.len()))]
    async fn load(&self, source: &str, rows: &[CityRow]) -> Result<LoadReport, LoadError> {
        if rows.is_empty() {
            debug!("No rows to insert, skipping database");
            return Ok(LoadReport {
                source: source.to_string(),
                rows_inserted: 0,
            });
        }

        // Connexion fermée au drop du client, en succès comme en erreur
        let mut client = connect(&self.config).await?;
        load_rows(&mut client, &self.table, source, rows).await
    }
}
