//! GeoJSON cleaning: region trimming, unit removal, and property stripping.

pub mod atomic;
pub mod document;
mod error;
pub mod geometry;
pub mod names;
pub mod postal;
pub mod rules;
pub mod trim;
pub mod units;

pub use document::{Feature, FeatureCollection};
pub use error::GeoError;
pub use geometry::Coord;
pub use postal::{Assignment, PostalError, PostalTable};
pub use rules::{DropReason, MatchStrategy, RegionRule, RuleSet};
pub use trim::{MalformedPolicy, Removal, RemovalScope, TrimReport, trim_regions};
pub use units::{UnitFilter, drop_units};
