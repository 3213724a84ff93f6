//! Region rules: which features a threshold applies to, and the threshold itself.
//!
//! A [`RuleSet`] is an ordered list of [`RegionRule`]s. Each feature is
//! matched against the rules in order and the first match wins. Matching
//! looks at a fixed list of name-like properties; by default an entity
//! matches when its identifier occurs anywhere in the space-joined names
//! (`admin name name_en geounit`). That is loose on purpose, e.g. "Niger"
//! also matches "Nigeria"; [`MatchStrategy::Exact`] requires one of the
//! name fields to equal the identifier instead.

use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::document::Feature;
use crate::geometry::Coord;
use crate::GeoError;

pub const DEFAULT_NAME_FIELDS: &[&str] = &["admin", "name", "name_en", "geounit"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStrategy {
    /// Identifier occurs as a substring of the joined name fields.
    #[default]
    Substring,
    /// Identifier equals one of the name fields.
    Exact,
}

/// Which threshold a dropped coordinate failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// At or west of the minimum longitude.
    Longitude,
    /// At or south of the minimum latitude.
    Latitude,
}

/// A target entity and the strict lower bounds a coordinate must exceed to be kept.
///
/// An unset bound always passes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionRule {
    pub entity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_latitude: Option<f64>,
}

impl RegionRule {
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            min_longitude: None,
            min_latitude: None,
        }
    }

    pub fn with_min_longitude(mut self, lon: f64) -> Self {
        self.min_longitude = Some(lon);
        self
    }

    pub fn with_min_latitude(mut self, lat: f64) -> Self {
        self.min_latitude = Some(lat);
        self
    }

    /// `None` keeps the coordinate. Longitude is checked before latitude.
    pub fn evaluate(&self, coord: Coord) -> Option<DropReason> {
        if let Some(min) = self.min_longitude
            && coord.lon <= min
        {
            return Some(DropReason::Longitude);
        }
        if let Some(min) = self.min_latitude
            && coord.lat <= min
        {
            return Some(DropReason::Latitude);
        }
        None
    }

    pub fn keeps(&self, coord: Coord) -> bool {
        self.evaluate(coord).is_none()
    }
}

/// Ordered rules plus the matching configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    pub strategy: MatchStrategy,
    #[serde(default = "default_name_fields")]
    pub name_fields: Vec<String>,
    pub rules: Vec<RegionRule>,
}

fn default_name_fields() -> Vec<String> {
    DEFAULT_NAME_FIELDS.iter().map(|s| s.to_string()).collect()
}

impl Default for RuleSet {
    /// Outlying island groups trimmed from Natural Earth country shapes:
    /// the Prince Edward Islands, the Caribbean Netherlands, and the Chatham
    /// and sub-Antarctic islands of New Zealand.
    fn default() -> Self {
        Self {
            strategy: MatchStrategy::Substring,
            name_fields: default_name_fields(),
            rules: vec![
                RegionRule::new("South Africa").with_min_latitude(-40.0),
                RegionRule::new("Netherlands").with_min_latitude(40.0),
                RegionRule::new("New Zealand")
                    .with_min_longitude(0.0)
                    .with_min_latitude(-47.5),
            ],
        }
    }
}

impl RuleSet {
    /// Load a rule set from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, GeoError> {
        let file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => GeoError::FileNotFound(path.to_path_buf()),
            _ => GeoError::Io {
                path: path.to_path_buf(),
                source: e,
            },
        })?;
        let rules: RuleSet = serde_json::from_reader(BufReader::new(file))?;
        rules.validate()?;
        Ok(rules)
    }

    /// Reject rule sets that would match every feature or compare against NaN.
    pub fn validate(&self) -> Result<(), GeoError> {
        if self.name_fields.is_empty() {
            return Err(GeoError::InvalidRules("no name fields configured".into()));
        }
        for rule in &self.rules {
            if rule.entity.trim().is_empty() {
                return Err(GeoError::InvalidRules("rule with empty entity".into()));
            }
            let bounds = [rule.min_longitude, rule.min_latitude];
            if bounds.iter().flatten().any(|b| !b.is_finite()) {
                return Err(GeoError::InvalidRules(format!(
                    "non-finite threshold for '{}'",
                    rule.entity
                )));
            }
        }
        Ok(())
    }

    pub fn with_strategy(mut self, strategy: MatchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// The name fields of `feature` joined by single spaces; absent fields
    /// contribute an empty string.
    pub fn search_text(&self, feature: &Feature) -> String {
        self.name_fields
            .iter()
            .map(|field| feature.property_text(field).unwrap_or_default())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// First rule whose entity matches `feature`.
    pub fn match_feature(&self, feature: &Feature) -> Option<&RegionRule> {
        match self.strategy {
            MatchStrategy::Substring => {
                let haystack = self.search_text(feature);
                self.rules
                    .iter()
                    .find(|rule| haystack.contains(rule.entity.as_str()))
            }
            MatchStrategy::Exact => {
                let names: Vec<String> = self
                    .name_fields
                    .iter()
                    .filter_map(|field| feature.property_text(field))
                    .collect();
                self.rules
                    .iter()
                    .find(|rule| names.iter().any(|n| *n == rule.entity))
            }
        }
    }
}
