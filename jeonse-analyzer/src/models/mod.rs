//! Data models for the analysis pipeline

pub mod heatmap;
pub mod property;
pub mod transaction;

pub use heatmap::{catalogue_points, HeatmapEntry, RegionPoint, DEFAULT_CATALOGUE};
pub use property::{LeaseMatch, MatchedProperty, RiskLevel};
pub use transaction::{AdministrativeCode, Period, RentTransaction, SaleTransaction};
