//! # cities-loader
//!
//! Chargement de points GeoJSON depuis un stockage objet vers une table PostGIS.
//!
//! ## Features
//!
//! - Lecture d'un objet S3 (ou répertoire local) en une fois
//! - Validation FeatureCollection et filtrage des `Point`
//! - Insertion dans une transaction unique (tout ou rien)
//! - Service HTTP (`/health`, `/process`) et CLI
//!
//! ## Usage CLI
//!
//! ```bash
//! # Serveur HTTP (défaut)
//! cities-loader serve --port 5000
//!
//! # Chargement ponctuel
//! cities-loader load --bucket my-bucket --key path/to/file.geojson
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod report;
pub mod server;
pub mod storage;

pub use config::{LoaderConfig, ServerConfig, TableName};
pub use error::{ConfigError, FetchError, LoadError, PipelineError};
pub use export::{CityStore, DatabaseConfig, LoadReport, PostgresStore, SslMode};
pub use pipeline::Pipeline;
pub use report::ImportReport;
pub use server::{build_router, AppState};
pub use storage::{ObjectFetcher, ObjectStoreFetcher, StorageBackend};
