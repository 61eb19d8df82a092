//! Rapport de chargement d'un objet

use std::time::Duration;

use serde::Serialize;

/// Rapport complet d'un chargement réussi
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    /// Objet source (`bucket/key`)
    pub source: String,
    /// Nombre de features lues dans la collection
    pub features_read: usize,
    /// Nombre de features ignorées (non-Point)
    pub features_skipped: usize,
    /// Nombre de lignes commitées dans la table
    pub rows_inserted: usize,
    /// Durée du chargement
    pub duration_secs: f64,
}

impl ImportReport {
    /// Crée un nouveau rapport pour un objet
    pub fn new(bucket: &str, key: &str) -> Self {
        Self {
            source: format!("{}/{}", bucket, key),
            ..Default::default()
        }
    }

    /// Définit la durée du chargement
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("IMPORT REPORT - {}", self.source);
        println!("{}", "=".repeat(60));
        println!("Duration: {:.2}s", self.duration_secs);
        println!(
            "Features: {} read, {} skipped (non-point)",
            self.features_read, self.features_skipped
        );
        println!("Rows: {} inserted", self.rows_inserted);
        println!("{}", "=".repeat(60));
    }

    /// Affichage compact pour le résumé
    pub fn summary(&self) -> String {
        format!(
            "{}: {} inserted, {} skipped, {} read",
            self.source, self.rows_inserted, self.features_skipped, self.features_read
        )
    }
}
