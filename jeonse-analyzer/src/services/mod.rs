//! Analysis pipeline services

pub mod heatmap_aggregator;
pub mod neighborhood_filter;
pub mod notifications;
pub mod property_filter;
pub mod property_matcher;
pub mod region_resolver;
pub mod registry_client;
pub mod registry_parser;
pub mod retrieval_orchestrator;
pub mod risk_advisor;
pub mod search_history;

pub use heatmap_aggregator::HeatmapAggregator;
pub use notifications::NotificationService;
pub use property_filter::PropertyFilter;
pub use property_matcher::PropertyMatcher;
pub use region_resolver::{RegionResolver, Resolution};
pub use registry_client::{MolitRegistryClient, RegistryError, TransactionRegistry};
pub use retrieval_orchestrator::{Analysis, AnalysisError, RetrievalOrchestrator};
pub use risk_advisor::RiskAdvisor;
pub use search_history::SearchHistoryService;
