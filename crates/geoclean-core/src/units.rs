//! Drop administrative units (e.g. the constituent countries of the UK) by name.

use tracing::info;

use crate::document::FeatureCollection;

/// Features whose `field` property equals one of `units` are removed.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitFilter {
    pub field: String,
    pub units: Vec<String>,
}

impl Default for UnitFilter {
    fn default() -> Self {
        Self {
            field: "geonunit".to_string(),
            units: ["Scotland", "Wales", "Northern Ireland"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl UnitFilter {
    pub fn new(field: impl Into<String>, units: Vec<String>) -> Self {
        Self {
            field: field.into(),
            units,
        }
    }
}

/// Remove matching features in place, returning how many were removed.
///
/// Comparison is exact and case-sensitive. Features without the field keep.
pub fn drop_units(collection: &mut FeatureCollection, filter: &UnitFilter) -> usize {
    let before = collection.len();
    let features = collection.replace_features(Vec::new());
    let kept: Vec<_> = features
        .into_iter()
        .filter(|feature| {
            let unit = feature
                .properties()
                .and_then(|p| p.get(&filter.field))
                .and_then(|v| v.as_str());
            !unit.is_some_and(|u| filter.units.iter().any(|name| name == u))
        })
        .collect();
    collection.replace_features(kept);

    let removed = before - collection.len();
    info!(field = %filter.field, removed, remaining = collection.len(), "dropped units");
    removed
}
