//! Pipeline de chargement : fetch → parse → filtre → insertion

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, instrument};

use crate::config::LoaderConfig;
use crate::error::PipelineError;
use crate::export::{CityStore, PostgresStore};
use crate::report::ImportReport;
use crate::storage::{ObjectFetcher, ObjectStoreFetcher};

/// Pipeline partagé entre les requêtes
///
/// Sans état mutable : chaque appel à `process` est indépendant.
#[derive(Clone)]
pub struct Pipeline {
    fetcher: Arc<dyn ObjectFetcher>,
    store: Arc<dyn CityStore>,
}

impl Pipeline {
    pub fn new(fetcher: Arc<dyn ObjectFetcher>, store: Arc<dyn CityStore>) -> Self {
        Self { fetcher, store }
    }

    /// Construit le pipeline de production depuis la configuration
    pub fn from_config(config: &LoaderConfig) -> Self {
        Self::new(
            Arc::new(ObjectStoreFetcher::new(config.storage.clone())),
            Arc::new(PostgresStore::new(
                config.database.clone(),
                config.table.clone(),
            )),
        )
    }

    /// Charge un objet dans la table
    ///
    /// Le nombre de lignes rapporté est celui des lignes commitées.
    ///
    /// # Errors
    /// Toute erreur d'une étape interrompt le chargement ; aucune ligne
    /// n'est alors conservée.
    #[instrument(skip(self))]
    pub async fn process(&self, bucket: &str, key: &str) -> Result<ImportReport, PipelineError> {
        let start = Instant::now();
        let mut report = ImportReport::new(bucket, key);

        info!("Downloading {}/{}", bucket, key);
        let bytes = self.fetcher.get_object(bucket, key).await?;

        let extracted = geofeed::extract_rows(&bytes)?;
        report.features_read = extracted.features_read;
        report.features_skipped = extracted.skipped;
        info!(
            features = extracted.features_read,
            points = extracted.rows.len(),
            skipped = extracted.skipped,
            "FeatureCollection parsed"
        );

        let load = self.store.load(&report.source, &extracted.rows).await?;
        report.rows_inserted = load.rows_inserted;
        report.set_duration(start.elapsed());

        info!("Inserted {} rows into cities", report.rows_inserted);
        Ok(report)
    }
}
