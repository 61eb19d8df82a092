//! Transaction atomique pour le chargement d'un objet
//!
//! Garantit le rollback en cas d'erreur : soit toutes les lignes sont
//! commitées, soit aucune.

use tokio_postgres::{Client, Statement, Transaction};
use tracing::{debug, error, info};

use geofeed::{CityRow, SRID};

use crate::config::TableName;
use crate::error::LoadError;

/// Rapport de chargement, produit uniquement après un commit réussi
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    /// Objet source (`bucket/key`)
    pub source: String,
    /// Nombre de lignes commitées
    pub rows_inserted: usize,
}

/// Requête d'insertion paramétrée pour une table
pub fn insert_sql(table: &TableName) -> String {
    format!(
        "INSERT INTO {} (name, population, geom) VALUES ($1, $2, ST_GeomFromText($3, {}))",
        table, SRID
    )
}

/// Gestionnaire de transaction pour le chargement d'un objet
///
/// Encapsule une transaction PostgreSQL et l'insertion préparée.
/// Une transaction droppée sans commit est annulée par PostgreSQL.
pub struct CityImport<'a> {
    transaction: Transaction<'a>,
    statement: Statement,
    source: String,
    rows_inserted: usize,
}

impl<'a> CityImport<'a> {
    /// Démarre la transaction et prépare l'insertion
    ///
    /// # Errors
    /// Retourne une erreur si la transaction ne peut pas être démarrée
    /// ou si la table cible n'accepte pas la requête.
    pub async fn begin(
        client: &'a mut Client,
        table: &TableName,
        source: &str,
    ) -> Result<Self, LoadError> {
        let transaction = client
            .transaction()
            .await
            .map_err(|e| LoadError::persistence("Failed to begin transaction", e))?;

        let statement = transaction
            .prepare(&insert_sql(table))
            .await
            .map_err(|e| LoadError::persistence("Failed to prepare insert", e))?;

        info!(source = %source, table = %table, "Starting cities import transaction");

        Ok(Self {
            transaction,
            statement,
            source: source.to_string(),
            rows_inserted: 0,
        })
    }

    /// Insère une ligne dans la transaction
    pub async fn insert(&mut self, row: &CityRow) -> Result<(), LoadError> {
        self.transaction
            .execute(&self.statement, &[&row.name, &row.population, &row.wkt])
            .await
            .map_err(|e| {
                LoadError::persistence(
                    &format!("Failed to insert row {} ('{}')", self.rows_inserted, row.name),
                    e,
                )
            })?;

        self.rows_inserted += 1;
        debug!(row = self.rows_inserted, name = %row.name, "Row queued");
        Ok(())
    }

    /// Valide et commit la transaction
    ///
    /// # Errors
    /// Retourne une erreur si le commit échoue
    pub async fn commit(self) -> Result<LoadReport, LoadError> {
        self.transaction
            .commit()
            .await
            .map_err(|e| LoadError::persistence("Failed to commit transaction", e))?;

        info!(
            source = %self.source,
            rows = self.rows_inserted,
            "Cities import committed successfully"
        );

        Ok(LoadReport {
            source: self.source,
            rows_inserted: self.rows_inserted,
        })
    }

    /// Annule la transaction (rollback)
    ///
    /// La transaction est également annulée si droppée.
    pub async fn rollback(self, reason: &str) {
        error!(
            source = %self.source,
            reason = %reason,
            rows_attempted = self.rows_inserted,
            "Rolling back cities import"
        );

        if let Err(e) = self.transaction.rollback().await {
            error!(error = %e, "Explicit rollback failed (will rollback on drop anyway)");
        }
    }
}

/// Insère toutes les lignes dans une seule transaction
///
/// La première erreur annule la transaction et interrompt les insertions
/// restantes. Le compte retourné est celui des lignes commitées.
pub async fn load_rows(
    client: &mut Client,
    table: &TableName,
    source: &str,
    rows: &[CityRow],
) -> Result<LoadReport, LoadError> {
    let mut import = CityImport::begin(client, table, source).await?;

    for row in rows {
        if let Err(e) = import.insert(row).await {
            import.rollback(&e.to_string()).await;
            return Err(e);
        }
    }

    import.commit().await
}
