//! Geometry region filter: trims outlying parts of matched features.
//!
//! For a feature matched by a [`RegionRule`]:
//!
//! - `MultiPolygon`: each polygon block is kept or dropped on its
//!   representative coordinate. Dropping some blocks rewrites the coordinate
//!   list; dropping all of them removes the feature.
//! - `Polygon`: the feature is kept or removed as a whole.
//! - Any other kind, or no geometry: passed through.
//!
//! Unmatched features are never inspected.

use std::collections::BTreeSet;

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::document::FeatureCollection;
use crate::geometry::{Coord, GeometryKind, representative_coord, snapshot};
use crate::rules::{DropReason, RegionRule, RuleSet};
use crate::GeoError;

/// What to do with a matched feature whose coordinates cannot be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedPolicy {
    /// Fail the whole run.
    #[default]
    Abort,
    /// Log it and pass the feature through unchanged.
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalScope {
    /// One block of a MultiPolygon.
    Part,
    /// A whole Polygon feature.
    Feature,
}

/// One dropped block or feature.
#[derive(Debug, Clone, PartialEq)]
pub struct Removal {
    pub entity: String,
    pub scope: RemovalScope,
    pub coord: Coord,
    pub reason: DropReason,
}

/// Counts and events from one pass. Informational only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrimReport {
    /// Features that lost at least one part but survived.
    pub modified: usize,
    /// Features removed entirely.
    pub removed: usize,
    /// Malformed features passed through under [`MalformedPolicy::Skip`].
    pub skipped: usize,
    /// Labels of features any rule matched.
    pub encountered: BTreeSet<String>,
    pub removals: Vec<Removal>,
}

impl TrimReport {
    pub fn changed(&self) -> bool {
        self.modified > 0 || self.removed > 0
    }
}

enum Outcome {
    Unchanged,
    Trimmed,
    Removed,
}

/// Apply `rules` to every feature of `collection`.
///
/// Returns the filtered collection; relative feature order is preserved.
/// Under [`MalformedPolicy::Abort`] the first malformed matched feature
/// fails the call with [`GeoError::MalformedGeometry`].
pub fn trim_regions(
    mut collection: FeatureCollection,
    rules: &RuleSet,
    policy: MalformedPolicy,
) -> Result<(FeatureCollection, TrimReport), GeoError> {
    let mut report = TrimReport::default();
    let features = collection.replace_features(Vec::new());
    let mut kept = Vec::with_capacity(features.len());

    for (index, mut feature) in features.into_iter().enumerate() {
        let Some(rule) = rules.match_feature(&feature) else {
            kept.push(feature);
            continue;
        };
        let label = feature.label();

        let outcome = match feature.geometry_mut() {
            Some(geometry) => apply_rule(index, geometry, rule, &mut report.removals),
            None => Ok(Outcome::Unchanged),
        };

        if feature.geometry().is_some()
            && let Some(label) = label
        {
            report.encountered.insert(label);
        }

        match outcome {
            Ok(Outcome::Unchanged) => kept.push(feature),
            Ok(Outcome::Trimmed) => {
                report.modified += 1;
                kept.push(feature);
            }
            Ok(Outcome::Removed) => report.removed += 1,
            Err(err) => match policy {
                MalformedPolicy::Abort => return Err(err),
                MalformedPolicy::Skip => {
                    warn!(error = %err, "skipping malformed feature");
                    report.skipped += 1;
                    kept.push(feature);
                }
            },
        }
    }

    collection.replace_features(kept);
    info!(
        modified = report.modified,
        removed = report.removed,
        skipped = report.skipped,
        "region trim complete"
    );
    Ok((collection, report))
}

fn apply_rule(
    index: usize,
    geometry: &mut Map<String, Value>,
    rule: &RegionRule,
    removals: &mut Vec<Removal>,
) -> Result<Outcome, GeoError> {
    match GeometryKind::of(geometry) {
        GeometryKind::MultiPolygon => {
            let Some(Value::Array(blocks)) = geometry.get_mut("coordinates") else {
                return Err(malformed(
                    index,
                    "MultiPolygon has no coordinate array",
                    geometry.get("coordinates"),
                ));
            };

            // Read every block before touching any, so a failure leaves the
            // geometry as it was.
            let verdicts = blocks
                .iter()
                .map(|block| {
                    representative_coord(block)
                        .map(|coord| (coord, rule.evaluate(coord)))
                        .map_err(|reason| malformed(index, reason, Some(block)))
                })
                .collect::<Result<Vec<_>, _>>()?;

            if verdicts.iter().all(|(_, drop)| drop.is_none()) {
                return Ok(Outcome::Unchanged);
            }

            let mut retained = Vec::with_capacity(blocks.len());
            for (block, (coord, drop)) in blocks.drain(..).zip(verdicts) {
                match drop {
                    None => retained.push(block),
                    Some(reason) => {
                        debug!(entity = %rule.entity, %coord, ?reason, "dropping polygon part");
                        removals.push(Removal {
                            entity: rule.entity.clone(),
                            scope: RemovalScope::Part,
                            coord,
                            reason,
                        });
                    }
                }
            }

            if retained.is_empty() {
                Ok(Outcome::Removed)
            } else {
                *blocks = retained;
                Ok(Outcome::Trimmed)
            }
        }
        GeometryKind::Polygon => {
            let coords = geometry.get("coordinates");
            let coord = coords
                .ok_or("Polygon has no coordinates")
                .and_then(representative_coord)
                .map_err(|reason| malformed(index, reason, coords))?;

            match rule.evaluate(coord) {
                None => Ok(Outcome::Unchanged),
                Some(reason) => {
                    debug!(entity = %rule.entity, %coord, ?reason, "dropping polygon feature");
                    removals.push(Removal {
                        entity: rule.entity.clone(),
                        scope: RemovalScope::Feature,
                        coord,
                        reason,
                    });
                    Ok(Outcome::Removed)
                }
            }
        }
        GeometryKind::Other => Ok(Outcome::Unchanged),
    }
}

fn malformed(index: usize, reason: &str, coords: Option<&Value>) -> GeoError {
    GeoError::MalformedGeometry {
        feature: index,
        reason: reason.to_string(),
        snapshot: snapshot(coords),
    }
}
