//! Tests d'intégration PostgreSQL
//!
//! Ces tests nécessitent une base PostgreSQL avec PostGIS.
//! Configuration via variables d'environnement:
//! - PGHOST, PGPORT, PGUSER, PGPASSWORD, PGDATABASE
//!
//! Exécution:
//! ```bash
//! # Avec PostgreSQL local
//! cargo test --test postgres_integration -- --ignored
//!
//! # Avec Docker
//! docker run -d --name postgres-test -e POSTGRES_PASSWORD=test -p 5432:5432 postgis/postgis
//! PGPASSWORD=test cargo test --test postgres_integration -- --ignored
//! ```

mod common;

use std::sync::Arc;

use anyhow::Result;
use axum::http::StatusCode;
use tokio_postgres::{Client, NoTls};

use cities_loader::{CityStore, DatabaseConfig, PostgresStore, SslMode, TableName};
use geofeed::CityRow;

use common::{memory_fetcher, send, SPRINGFIELD};

/// Configuration de test
fn test_config() -> DatabaseConfig {
    DatabaseConfig {
        host: std::env::var("PGHOST").unwrap_or_else(|_| "localhost".into()),
        port: std::env::var("PGPORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(5432),
        dbname: std::env::var("PGDATABASE").unwrap_or_else(|_| "postgres".into()),
        user: std::env::var("PGUSER").unwrap_or_else(|_| "postgres".into()),
        password: std::env::var("PGPASSWORD").unwrap_or_default(),
        ssl_mode: SslMode::Disable,
    }
}

/// Connexion directe pour préparer et vérifier la table
async fn test_client() -> Result<Client> {
    let cfg = test_config();
    let conn_str = format!(
        "host={} port={} dbname={} user={} password={}",
        cfg.host, cfg.port, cfg.dbname, cfg.user, cfg.password
    );
    let (client, connection) = tokio_postgres::connect(&conn_str, NoTls).await?;
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            eprintln!("connection error: {}", e);
        }
    });
    Ok(client)
}

/// Recrée une table `cities` dédiée au test
///
/// `population < 1000000` permet de provoquer une erreur d'insertion.
async fn setup_table(client: &Client, table: &str) -> Result<TableName> {
    client
        .batch_execute(&format!(
            r#"
            CREATE EXTENSION IF NOT EXISTS postgis;
            DROP TABLE IF EXISTS {table};
            CREATE TABLE {table} (
                id SERIAL PRIMARY KEY,
                name TEXT NOT NULL,
                population INTEGER NOT NULL CHECK (population < 1000000),
                geom geometry(Point, 4326) NOT NULL
            );
            "#
        ))
        .await?;
    table.parse::<TableName>().map_err(anyhow::Error::msg)
}

async fn count_rows(client: &Client, table: &str) -> Result<i64> {
    let row = client
        .query_one(&format!("SELECT COUNT(*) FROM {}", table), &[])
        .await?;
    Ok(row.get(0))
}

fn city(name: &str, population: i32, x: f64, y: f64) -> CityRow {
    CityRow {
        name: name.to_string(),
        population,
        wkt: format!("POINT({} {})", x, y),
    }
}

#[tokio::test]
#[ignore = "Requires PostgreSQL database"]
async fn test_load_commits_all_rows() -> Result<()> {
    let client = test_client().await?;
    let table = setup_table(&client, "cities_it_commit").await?;
    let store = PostgresStore::new(test_config(), table);

    let rows = vec![
        city("Nantes", 320000, -1.55, 47.22),
        city("Rennes", 220000, -1.68, 48.11),
    ];
    let report = store.load("b/k", &rows).await?;
    assert_eq!(report.rows_inserted, 2);
    assert_eq!(count_rows(&client, "cities_it_commit").await?, 2);

    let row = client
        .query_one(
            "SELECT name, population, ST_X(geom), ST_Y(geom), ST_SRID(geom) \
             FROM cities_it_commit WHERE name = 'Nantes'",
            &[],
        )
        .await?;
    assert_eq!(row.get::<_, String>(0), "Nantes");
    assert_eq!(row.get::<_, i32>(1), 320000);
    assert!((row.get::<_, f64>(2) - -1.55).abs() < 1e-9);
    assert!((row.get::<_, f64>(3) - 47.22).abs() < 1e-9);
    assert_eq!(row.get::<_, i32>(4), 4326);

    Ok(())
}

#[tokio::test]
#[ignore = "Requires PostgreSQL database"]
async fn test_load_rolls_back_on_failure() -> Result<()> {
    let client = test_client().await?;
    let table = setup_table(&client, "cities_it_rollback").await?;
    let store = PostgresStore::new(test_config(), table);

    let rows = vec![
        city("A", 10, 0.0, 0.0),
        city("B", 20, 1.0, 1.0),
        city("Too big", 5_000_000, 2.0, 2.0),
    ];
    let err = store.load("b/k", &rows).await.unwrap_err();
    assert!(err.to_string().starts_with("Persistence error"));
    assert_eq!(count_rows(&client, "cities_it_rollback").await?, 0);

    Ok(())
}

#[tokio::test]
#[ignore = "Requires PostgreSQL database"]
async fn test_load_appends_on_repeat() -> Result<()> {
    let client = test_client().await?;
    let table = setup_table(&client, "cities_it_append").await?;
    let store = PostgresStore::new(test_config(), table);

    let rows = vec![city("Springfield", 100, 1.0, 2.0)];
    store.load("b/k", &rows).await?;
    store.load("b/k", &rows).await?;
    assert_eq!(count_rows(&client, "cities_it_append").await?, 2);

    Ok(())
}

#[tokio::test]
#[ignore = "Requires PostgreSQL database"]
async fn test_load_empty_rows() -> Result<()> {
    let store = PostgresStore::new(test_config(), "cities_it_absent".parse().unwrap());
    let report = store.load("b/k", &[]).await?;
    assert_eq!(report.rows_inserted, 0);
    Ok(())
}

#[tokio::test]
#[ignore = "Requires PostgreSQL database"]
async fn test_process_end_to_end() -> Result<()> {
    let client = test_client().await?;
    let table = setup_table(&client, "cities_it_e2e").await?;

    let fetcher = memory_fetcher(&[("my-bucket", "cities.geojson", SPRINGFIELD)]).await;
    let store = Arc::new(PostgresStore::new(test_config(), table));
    let pipeline = cities_loader::Pipeline::new(fetcher, store);
    let app = cities_loader::build_router(Arc::new(cities_loader::AppState { pipeline }));

    let (status, body) = send(
        app,
        "POST",
        "/process",
        r#"{"bucket":"my-bucket","key":"cities.geojson"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["inserted"], 1);

    let row = client
        .query_one(
            "SELECT name, population, ST_AsText(geom) FROM cities_it_e2e",
            &[],
        )
        .await?;
    assert_eq!(row.get::<_, String>(0), "Springfield");
    assert_eq!(row.get::<_, i32>(1), 100);
    assert_eq!(row.get::<_, String>(2), "POINT(1 2)");

    Ok(())
}
