//! Filtrage des géométries et conversion en lignes `cities`
//!
//! Seuls les `Point` sont conservés. Les autres types (et les features sans
//! géométrie) sont ignorés silencieusement, ce n'est pas une erreur.

use geo::{Geometry, Point};
use geozero::wkt::WktWriter;
use geozero::GeozeroGeometry;
use tracing::{info, warn};

use crate::types::{
    AttributeValue, Attributes, CityRow, Feature, DEFAULT_NAME, DEFAULT_POPULATION,
};
use crate::GeofeedError;

/// Résultat du filtrage
#[derive(Debug, Default)]
pub struct FilterOutcome {
    /// Lignes à insérer, dans l'ordre d'entrée
    pub rows: Vec<CityRow>,
    /// Nombre de features ignorées (non-Point)
    pub skipped: usize,
}

/// Conserve les features Point et les convertit en lignes
pub fn filter_points(features: Vec<Feature>) -> Result<FilterOutcome, GeofeedError> {
    let mut outcome = FilterOutcome::default();

    for feature in features {
        let position = match feature.geometry.as_ref().map(|g| &g.value) {
            Some(geojson::Value::Point(position)) => position,
            Some(other) => {
                info!(
                    feature = feature.index,
                    geometry = %crate::GeometryKind::of(other),
                    "Skipping non-point feature"
                );
                outcome.skipped += 1;
                continue;
            }
            // `"geometry": null` est ignorée comme un type non-Point, sans erreur
            None => {
                info!(feature = feature.index, "Skipping feature without geometry");
                outcome.skipped += 1;
                continue;
            }
        };

        let point = position_to_point(feature.index, position)?;

        outcome.rows.push(CityRow {
            name: extract_name(feature.index, &feature.properties),
            population: extract_population(feature.index, &feature.properties)?,
            wkt: point_to_wkt(point)
                .map_err(|e| GeofeedError::invalid_geometry(feature.index, e.to_string()))?,
        });
    }

    Ok(outcome)
}

/// Convertit une position GeoJSON en point 2D (l'altitude éventuelle est ignorée)
fn position_to_point(index: usize, position: &[f64]) -> Result<Point<f64>, GeofeedError> {
    match position {
        [x, y, ..] if x.is_finite() && y.is_finite() => Ok(Point::new(*x, *y)),
        [_, _, ..] => Err(GeofeedError::invalid_geometry(
            index,
            "non-finite coordinate",
        )),
        _ => Err(GeofeedError::invalid_geometry(
            index,
            format!("position needs 2 ordinates, got {}", position.len()),
        )),
    }
}

/// Rend un point en WKT via geozero
pub fn point_to_wkt(point: Point<f64>) -> geozero::error::Result<String> {
    let mut wkt_buf = Vec::new();
    {
        let mut writer = WktWriter::new(&mut wkt_buf);
        Geometry::Point(point).process_geom(&mut writer)?;
    }
    Ok(String::from_utf8_lossy(&wkt_buf).into_owned())
}

/// Attribut `name`, `"unknown"` par défaut
pub fn extract_name(index: usize, properties: &Attributes) -> String {
    match properties.get("name") {
        Some(AttributeValue::Text(name)) => name.clone(),
        None | Some(AttributeValue::Null) => DEFAULT_NAME.to_string(),
        Some(other) => {
            warn!(
                feature = index,
                kind = other.kind(),
                "Attribute 'name' is not a string, using default"
            );
            DEFAULT_NAME.to_string()
        }
    }
}

/// Attribut `population`, 0 par défaut
///
/// Une valeur présente qui n'est pas un entier 32 bits fait échouer la
/// feature : elle n'est jamais remplacée par le défaut.
pub fn extract_population(index: usize, properties: &Attributes) -> Result<i32, GeofeedError> {
    let value = match properties.get("population") {
        None | Some(AttributeValue::Null) => return Ok(DEFAULT_POPULATION),
        Some(value) => value,
    };

    let population = match value {
        AttributeValue::Integer(i) => i32::try_from(*i).ok(),
        AttributeValue::Float(f)
            if f.fract() == 0.0 && *f >= f64::from(i32::MIN) && *f <= f64::from(i32::MAX) =>
        {
            Some(*f as i32)
        }
        _ => None,
    };

    population.ok_or_else(|| {
        let shown = match value {
            AttributeValue::Integer(i) => i.to_string(),
            AttributeValue::Float(f) => f.to_string(),
            other => other.kind().to_string(),
        };
        GeofeedError::invalid_attribute(
            index,
            "population",
            format!("{shown} is not a 32-bit integer"),
        )
    })
}
