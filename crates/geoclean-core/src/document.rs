//! GeoJSON FeatureCollection held as loosely-typed JSON.
//!
//! Only the members the filters inspect (`features`, `properties`,
//! `geometry`) are given structure. Everything else, including foreign
//! members and geometry kinds the filters do not know, is carried through
//! untouched, so a feature no filter acts on serialises exactly as it was read.

use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::Path;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};
use tracing::info;

use crate::GeoError;
use crate::atomic::write_atomically;

const FEATURES: &str = "features";

/// A single GeoJSON feature.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(transparent)]
pub struct Feature(Map<String, Value>);

impl Feature {
    pub fn new(members: Map<String, Value>) -> Self {
        Self(members)
    }

    /// The `properties` object, if present and not null.
    pub fn properties(&self) -> Option<&Map<String, Value>> {
        self.0.get("properties").and_then(Value::as_object)
    }

    pub fn properties_mut(&mut self) -> Option<&mut Map<String, Value>> {
        self.0.get_mut("properties").and_then(Value::as_object_mut)
    }

    /// A property rendered as text. Strings are returned as-is and numbers in
    /// their JSON form; other kinds (and missing keys) yield `None`.
    pub fn property_text(&self, key: &str) -> Option<String> {
        match self.properties()?.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// The `geometry` object. A missing or null geometry is `None`.
    pub fn geometry(&self) -> Option<&Map<String, Value>> {
        self.0.get("geometry").and_then(Value::as_object)
    }

    pub fn geometry_mut(&mut self) -> Option<&mut Map<String, Value>> {
        self.0.get_mut("geometry").and_then(Value::as_object_mut)
    }

    /// Display label: `name`, falling back to `admin`.
    pub fn label(&self) -> Option<String> {
        self.property_text("name")
            .filter(|s| !s.is_empty())
            .or_else(|| self.property_text("admin").filter(|s| !s.is_empty()))
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

/// A GeoJSON FeatureCollection.
///
/// Top-level members other than `features` are kept in their original order
/// and written back unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureCollection {
    root: Map<String, Value>,
    features: Vec<Feature>,
}

impl FeatureCollection {
    /// Build a collection from a parsed JSON document.
    ///
    /// Fails with [`GeoError::InvalidDocument`] unless the document is an
    /// object whose `features` member is an array of objects.
    pub fn from_value(value: Value) -> Result<Self, GeoError> {
        let Value::Object(mut root) = value else {
            return Err(GeoError::InvalidDocument(
                "top-level value is not an object".into(),
            ));
        };

        let raw = match root.get_mut(FEATURES) {
            Some(Value::Array(items)) => std::mem::take(items),
            Some(_) => {
                return Err(GeoError::InvalidDocument(
                    "'features' is not an array".into(),
                ));
            }
            None => {
                return Err(GeoError::InvalidDocument(
                    "missing 'features' key".into(),
                ));
            }
        };

        let features = raw
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::Object(members) => Ok(Feature(members)),
                _ => Err(GeoError::InvalidDocument(format!(
                    "feature {i} is not an object"
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { root, features })
    }

    pub fn from_json_str(s: &str) -> Result<Self, GeoError> {
        Self::from_value(serde_json::from_str(s)?)
    }

    /// Read and parse a collection from disk.
    pub fn load(path: &Path) -> Result<Self, GeoError> {
        let file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => GeoError::FileNotFound(path.to_path_buf()),
            _ => GeoError::Io {
                path: path.to_path_buf(),
                source: e,
            },
        })?;
        let value: Value = serde_json::from_reader(BufReader::new(file))?;
        let collection = Self::from_value(value)?;
        info!(path = %path.display(), features = collection.len(), "loaded feature collection");
        Ok(collection)
    }

    /// Serialise to `path`, replacing any existing file only once the whole
    /// document has been written.
    pub fn save(&self, path: &Path, pretty: bool) -> Result<(), GeoError> {
        write_atomically(path, |out| {
            if pretty {
                serde_json::to_writer_pretty(out, self)?;
            } else {
                serde_json::to_writer(out, self)?;
            }
            Ok(())
        })
        .map_err(|source| GeoError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), features = self.len(), "saved feature collection");
        Ok(())
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn features_mut(&mut self) -> &mut [Feature] {
        &mut self.features
    }

    /// Swap in a new feature list, returning the old one.
    pub fn replace_features(&mut self, features: Vec<Feature>) -> Vec<Feature> {
        std::mem::replace(&mut self.features, features)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn to_value(&self) -> Value {
        let mut root = self.root.clone();
        root.insert(
            FEATURES.to_string(),
            Value::Array(self.features.iter().cloned().map(Feature::into_value).collect()),
        );
        Value::Object(root)
    }
}

impl Serialize for FeatureCollection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.root.len()))?;
        for (key, value) in &self.root {
            if key == FEATURES {
                map.serialize_entry(key, &self.features)?;
            } else {
                map.serialize_entry(key, value)?;
            }
        }
        map.end()
    }
}
