//! Types de données pour le crate geofeed

use std::collections::HashMap;
use std::fmt;

use serde_json::Value as JsonValue;

/// SRID des géométries chargées (WGS84)
pub const SRID: u32 = 4326;

/// Nom utilisé quand l'attribut `name` est absent
pub const DEFAULT_NAME: &str = "unknown";

/// Population utilisée quand l'attribut `population` est absent
pub const DEFAULT_POPULATION: i32 = 0;

/// Attributs d'une feature (clé -> valeur)
pub type Attributes = HashMap<String, AttributeValue>;

/// Valeur d'attribut GeoJSON
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    /// Tableaux et objets, conservés tels quels
    Nested(JsonValue),
}

impl AttributeValue {
    /// Nom court du type, pour les logs
    pub fn kind(&self) -> &'static str {
        match self {
            AttributeValue::Null => "null",
            AttributeValue::Bool(_) => "bool",
            AttributeValue::Integer(_) => "integer",
            AttributeValue::Float(_) => "float",
            AttributeValue::Text(_) => "text",
            AttributeValue::Nested(_) => "nested",
        }
    }
}

impl From<JsonValue> for AttributeValue {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => AttributeValue::Null,
            JsonValue::Bool(b) => AttributeValue::Bool(b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    AttributeValue::Integer(i)
                } else if let Some(f) = n.as_f64() {
                    AttributeValue::Float(f)
                } else {
                    AttributeValue::Nested(JsonValue::Number(n))
                }
            }
            JsonValue::String(s) => AttributeValue::Text(s),
            other => AttributeValue::Nested(other),
        }
    }
}

/// Type de géométrie GeoJSON
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryKind {
    Point,
    MultiPoint,
    LineString,
    MultiLineString,
    Polygon,
    MultiPolygon,
    GeometryCollection,
}

impl GeometryKind {
    pub fn of(value: &geojson::Value) -> Self {
        match value {
            geojson::Value::Point(_) => GeometryKind::Point,
            geojson::Value::MultiPoint(_) => GeometryKind::MultiPoint,
            geojson::Value::LineString(_) => GeometryKind::LineString,
            geojson::Value::MultiLineString(_) => GeometryKind::MultiLineString,
            geojson::Value::Polygon(_) => GeometryKind::Polygon,
            geojson::Value::MultiPolygon(_) => GeometryKind::MultiPolygon,
            geojson::Value::GeometryCollection(_) => GeometryKind::GeometryCollection,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GeometryKind::Point => "Point",
            GeometryKind::MultiPoint => "MultiPoint",
            GeometryKind::LineString => "LineString",
            GeometryKind::MultiLineString => "MultiLineString",
            GeometryKind::Polygon => "Polygon",
            GeometryKind::MultiPolygon => "MultiPolygon",
            GeometryKind::GeometryCollection => "GeometryCollection",
        }
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Une feature GeoJSON avec sa géométrie et ses attributs
///
/// N'existe que le temps d'une requête.
#[derive(Debug, Clone)]
pub struct Feature {
    /// Position dans la collection source
    pub index: usize,

    /// Géométrie typée (`None` si `"geometry": null`)
    pub geometry: Option<geojson::Geometry>,

    /// Attributs (vide si `properties` absent ou null)
    pub properties: Attributes,
}

impl Feature {
    /// Type de la géométrie, `None` pour une feature sans géométrie
    pub fn geometry_kind(&self) -> Option<GeometryKind> {
        self.geometry.as_ref().map(|g| GeometryKind::of(&g.value))
    }
}

/// Ligne à insérer dans la table `cities`
#[derive(Debug, Clone, PartialEq)]
pub struct CityRow {
    pub name: String,
    pub population: i32,
    /// Point en Well-Known Text, SRID 4326
    pub wkt: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_attribute_from_json() {
        assert_eq!(AttributeValue::from(json!(null)), AttributeValue::Null);
        assert_eq!(AttributeValue::from(json!(true)), AttributeValue::Bool(true));
        assert_eq!(AttributeValue::from(json!(42)), AttributeValue::Integer(42));
        assert_eq!(AttributeValue::from(json!(4.5)), AttributeValue::Float(4.5));
        assert_eq!(
            AttributeValue::from(json!("Lyon")),
            AttributeValue::Text("Lyon".to_string())
        );
        assert_eq!(AttributeValue::from(json!([1, 2])).kind(), "nested");
    }

    #[test]
    fn test_geometry_kind() {
        let point = geojson::Value::Point(vec![1.0, 2.0]);
        let line = geojson::Value::LineString(vec![vec![0.0, 0.0], vec![1.0, 1.0]]);

        assert_eq!(GeometryKind::of(&point), GeometryKind::Point);
        assert_eq!(GeometryKind::of(&line).to_string(), "LineString");
    }
}
