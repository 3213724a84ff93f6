use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeoError {
    #[error("input file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("not a GeoJSON FeatureCollection: {0}")]
    InvalidDocument(String),

    #[error("invalid region rules: {0}")]
    InvalidRules(String),

    #[error("malformed geometry in feature {feature}: {reason} (coordinates: {snapshot})")]
    MalformedGeometry {
        feature: usize,
        reason: String,
        snapshot: String,
    },
}
