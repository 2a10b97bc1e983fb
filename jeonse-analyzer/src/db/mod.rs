//! Database access for jeonse-analyzer
//!
//! Schema creation lives in `jeonse_common::db`; this module holds the
//! queries the analyzer runs against it.

pub mod heatmap;
pub mod notifications;
pub mod purge;
pub mod search_history;
pub mod transactions;

pub use heatmap::{HeatmapRepository, SqliteHeatmapRepository};
pub use transactions::{SqliteTransactionStore, TransactionStore};
