//! Strip translated `name_xx` properties, keeping English and structural name keys.

use serde_json::{Map, Value};
use tracing::info;

use crate::document::FeatureCollection;

const KEEP: &[&str] = &["name_en", "name_alt", "name_len", "name_local"];

/// `name_` followed by two or three lowercase ASCII letters, e.g. `name_fr`, `name_zht`.
fn is_translated_name(key: &str) -> bool {
    key.strip_prefix("name_").is_some_and(|code| {
        (2..=3).contains(&code.len()) && code.bytes().all(|b| b.is_ascii_lowercase())
    })
}

/// Whether `key` would be removed by [`strip_language_names`].
pub fn is_removable(key: &str) -> bool {
    is_translated_name(key) && !KEEP.contains(&key)
}

/// Remove translated name keys from one properties object; returns the count removed.
pub fn strip_language_names(properties: &mut Map<String, Value>) -> usize {
    let before = properties.len();
    properties.retain(|key, _| !is_removable(key));
    before - properties.len()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StripReport {
    pub features_touched: usize,
    pub keys_removed: usize,
}

/// Apply [`strip_language_names`] to every feature with properties.
pub fn strip_collection(collection: &mut FeatureCollection) -> StripReport {
    let mut report = StripReport::default();
    for feature in collection.features_mut() {
        if let Some(properties) = feature.properties_mut() {
            let removed = strip_language_names(properties);
            if removed > 0 {
                report.features_touched += 1;
                report.keys_removed += removed;
            }
        }
    }
    info!(
        features = report.features_touched,
        keys = report.keys_removed,
        "stripped translated names"
    );
    report
}
