//! Parsing d'une FeatureCollection GeoJSON
//!
//! Validation en deux temps : le document doit être un JSON valide
//! (`MalformedDocument`), puis avoir la forme d'une FeatureCollection (`Schema`).
//! Le membre `"type": "Feature"` n'est pas exigé sur chaque feature.

use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};
use tracing::debug;

use crate::types::{AttributeValue, Attributes, Feature};
use crate::GeofeedError;

const FEATURE_COLLECTION: &str = "FeatureCollection";

/// Feature brute telle que désérialisée
#[derive(Debug, Deserialize)]
struct RawFeature {
    #[serde(default)]
    geometry: Option<geojson::Geometry>,
    #[serde(default)]
    properties: Option<Map<String, JsonValue>>,
}

/// Parse des octets en liste ordonnée de features
pub fn parse_feature_collection(bytes: &[u8]) -> Result<Vec<Feature>, GeofeedError> {
    let document: JsonValue = serde_json::from_slice(bytes)?;
    parse_document(document)
}

/// Parse un document JSON déjà décodé
pub fn parse_document(document: JsonValue) -> Result<Vec<Feature>, GeofeedError> {
    let JsonValue::Object(mut root) = document else {
        return Err(GeofeedError::schema("GeoJSON must be a FeatureCollection"));
    };

    match root.get("type").and_then(JsonValue::as_str) {
        Some(FEATURE_COLLECTION) => {}
        Some(other) => {
            return Err(GeofeedError::schema(format!(
                "GeoJSON must be a FeatureCollection, got {other}"
            )))
        }
        None => return Err(GeofeedError::schema("GeoJSON must be a FeatureCollection")),
    }

    let raw_features = match root.remove("features") {
        Some(JsonValue::Array(features)) => features,
        Some(_) => return Err(GeofeedError::schema("'features' must be an array")),
        None => return Err(GeofeedError::schema("FeatureCollection has no 'features'")),
    };

    let features = raw_features
        .into_iter()
        .enumerate()
        .map(|(index, value)| parse_feature(index, value))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(count = features.len(), "FeatureCollection parsed");
    Ok(features)
}

fn parse_feature(index: usize, value: JsonValue) -> Result<Feature, GeofeedError> {
    if !value.is_object() {
        return Err(GeofeedError::schema(format!(
            "feature #{index} is not an object"
        )));
    }

    let raw: RawFeature = serde_json::from_value(value)
        .map_err(|e| GeofeedError::schema(format!("feature #{index}: {e}")))?;

    let properties: Attributes = raw
        .properties
        .unwrap_or_default()
        .into_iter()
        .map(|(k, v)| (k, AttributeValue::from(v)))
        .collect();

    Ok(Feature {
        index,
        geometry: raw.geometry,
        properties,
    })
}
