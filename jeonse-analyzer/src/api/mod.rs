//! HTTP API handlers

pub mod analysis;
pub mod health;
pub mod heatmap;
pub mod history;

pub use analysis::analysis_routes;
pub use health::health_routes;
pub use heatmap::heatmap_routes;
pub use history::history_routes;
