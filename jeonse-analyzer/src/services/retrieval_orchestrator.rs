//! Region analysis: resolve, gather, match
//!
//! For each period of the rolling window, cached sales are served from the
//! store and missing sales are fetched from the registry. Leases are never
//! cached and are fetched every time. All registry calls of one request run
//! concurrently up to the configured limit; a failed call only means fewer
//! records.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use futures::stream::{self, StreamExt};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::neighborhood_filter::{filter_or_all, filter_strict};
use super::property_matcher::PropertyMatcher;
use super::region_resolver::{district_stems_in_text, RegionResolver, Resolution};
use super::registry_client::{RegistryError, TransactionRegistry};
use super::risk_advisor::RiskAdvisor;
use crate::db::transactions::TransactionStore;
use crate::models::{AdministrativeCode, MatchedProperty, Period, RentTransaction, SaleTransaction};

/// Leases with a deposit below this (만원) are treated as data errors
pub const MIN_PLAUSIBLE_DEPOSIT: i64 = 1_000;

/// Caller-visible analysis failures
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Region must not be empty")]
    EmptyRegion,
}

/// Result of analysing one region
#[derive(Debug, Clone)]
pub struct Analysis {
    pub resolution: Resolution,
    /// Code actually queried (may differ from `resolution.code`)
    pub code: AdministrativeCode,
    pub properties: Vec<MatchedProperty>,
}

impl Analysis {
    /// Mean of the positive jeonse rates, if any
    pub fn average_rate(&self) -> Option<f64> {
        average_positive_rate(&self.properties)
    }
}

pub fn average_positive_rate(properties: &[MatchedProperty]) -> Option<f64> {
    let rates: Vec<f64> = properties
        .iter()
        .filter_map(|p| p.jeonse_rate)
        .filter(|r| *r > 0.0)
        .collect();
    if rates.is_empty() {
        None
    } else {
        Some(rates.iter().sum::<f64>() / rates.len() as f64)
    }
}

#[derive(Debug, Clone, Copy)]
enum FetchTask {
    Sale { slot: usize, period: Period },
    Rent { period: Period },
}

enum FetchOutcome {
    Sales { slot: usize, records: Vec<SaleTransaction> },
    Rents(Vec<RentTransaction>),
    Failed,
}

/// Gathers transactions for a region and hands them to the matcher
pub struct RetrievalOrchestrator {
    resolver: RegionResolver,
    registry: Arc<dyn TransactionRegistry>,
    store: Arc<dyn TransactionStore>,
    page_size: u32,
    max_concurrent_fetches: usize,
}

impl RetrievalOrchestrator {
    pub fn new(
        resolver: RegionResolver,
        registry: Arc<dyn TransactionRegistry>,
        store: Arc<dyn TransactionStore>,
    ) -> Self {
        Self {
            resolver,
            registry,
            store,
            page_size: 100,
            max_concurrent_fetches: 6,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_max_concurrent_fetches(mut self, max: usize) -> Self {
        self.max_concurrent_fetches = max.max(1);
        self
    }

    pub fn resolver(&self) -> &RegionResolver {
        &self.resolver
    }

    /// Resolve a region, preferring a district named without its suffix
    /// when regular resolution fell back
    pub fn resolve_target(&self, region: &str) -> (Resolution, AdministrativeCode) {
        let resolution = self.resolver.resolve(region);
        let mut code = resolution.code.clone();

        if resolution.was_fallback() {
            let stems = district_stems_in_text(region);
            if let [only] = stems.as_slice() {
                info!(region = %region, code = %only, "Using district named in region text");
                code = AdministrativeCode::new(*only);
            }
        }

        (resolution, code)
    }

    /// Analyse a region as of today (KST)
    pub async fn fetch_properties(&self, region: &str) -> Result<Vec<MatchedProperty>, AnalysisError> {
        Ok(self.analyze(region).await?.properties)
    }

    pub async fn analyze(&self, region: &str) -> Result<Analysis, AnalysisError> {
        self.analyze_at(region, jeonse_common::time::kst_today()).await
    }

    /// Analyse a region with an explicit reference date
    pub async fn analyze_at(&self, region: &str, today: NaiveDate) -> Result<Analysis, AnalysisError> {
        let region = region.trim();
        if region.is_empty() {
            return Err(AnalysisError::EmptyRegion);
        }

        let (resolution, code) = self.resolve_target(region);
        let neighborhood = resolution.neighborhood_filter();
        let window = Period::rolling_window(today);

        let mut sale_slots: Vec<Option<Vec<SaleTransaction>>> = vec![None; window.len()];
        let mut tasks = Vec::new();
        for (slot, period) in window.iter().copied().enumerate() {
            match self.store.load(&code, period, neighborhood).await {
                Ok(Some(cached)) => {
                    debug!(code = %code, period = %period, count = cached.len(), "Sale cache hit");
                    sale_slots[slot] = Some(cached);
                }
                Ok(None) => tasks.push(FetchTask::Sale { slot, period }),
                Err(e) => {
                    warn!(code = %code, period = %period, error = %e, "Sale cache read failed, fetching");
                    tasks.push(FetchTask::Sale { slot, period });
                }
            }
            tasks.push(FetchTask::Rent { period });
        }

        let task_count = tasks.len();
        let outcomes: Vec<FetchOutcome> = stream::iter(tasks)
            .map(|task| self.run_task(task, region, &resolution, &code))
            .buffer_unordered(self.max_concurrent_fetches)
            .collect()
            .await;

        let mut rents = Vec::new();
        let mut failed = 0;
        for outcome in outcomes {
            match outcome {
                FetchOutcome::Sales { slot, records } => sale_slots[slot] = Some(records),
                FetchOutcome::Rents(records) => rents.extend(records),
                FetchOutcome::Failed => failed += 1,
            }
        }
        let sales: Vec<SaleTransaction> = sale_slots.into_iter().flatten().flatten().collect();
        let rents = plausible_rents(rents);

        info!(
            region = %region,
            code = %code,
            tasks = task_count,
            failed,
            sales = sales.len(),
            rents = rents.len(),
            "Collected transactions"
        );

        let matcher = PropertyMatcher::new(RiskAdvisor::new(today.year()));
        let properties = matcher.match_properties(region, &sales, &rents);

        Ok(Analysis {
            resolution,
            code,
            properties,
        })
    }

    async fn run_task(
        &self,
        task: FetchTask,
        region: &str,
        resolution: &Resolution,
        code: &AdministrativeCode,
    ) -> FetchOutcome {
        let neighborhood = resolution.neighborhood_filter();
        match task {
            FetchTask::Sale { slot, period } => {
                match self.registry.fetch_sales(code, period, 1, self.page_size).await {
                    Ok(records) => {
                        if let Err(e) = self
                            .store
                            .save(code, period, region, &resolution.neighborhood, &records)
                            .await
                        {
                            warn!(code = %code, period = %period, error = %e, "Sale cache write failed");
                        }
                        FetchOutcome::Sales {
                            slot,
                            records: filter_or_all(records, neighborhood),
                        }
                    }
                    Err(e) => {
                        warn!(code = %code, period = %period, error = %e, "Sale fetch failed");
                        FetchOutcome::Failed
                    }
                }
            }
            FetchTask::Rent { period } => {
                match self.registry.fetch_rents(code, period, 1, self.page_size).await {
                    Ok(records) => FetchOutcome::Rents(filter_strict(&records, neighborhood)),
                    Err(e) => {
                        warn!(code = %code, period = %period, error = %e, "Rent fetch failed");
                        FetchOutcome::Failed
                    }
                }
            }
        }
    }

    /// Cached or freshly fetched sale records for one district and month
    ///
    /// Unlike [`analyze`](Self::analyze), registry failures are returned.
    pub async fn real_transactions(
        &self,
        region: &str,
        code: Option<AdministrativeCode>,
        period: Option<Period>,
        page: u32,
        rows: u32,
    ) -> Result<Vec<SaleTransaction>, RegistryError> {
        let region = region.trim();
        let target = (!region.is_empty()).then(|| self.resolve_target(region));
        let resolution = target.as_ref().map(|(resolution, _)| resolution);
        let neighborhood = resolution.and_then(|r| r.neighborhood_filter());
        let code = code
            .or_else(|| target.as_ref().map(|(_, code)| code.clone()))
            .unwrap_or_else(|| self.resolver.default_code().clone());
        let period =
            period.unwrap_or_else(|| Period::containing(jeonse_common::time::kst_today()));
        let rows = rows.max(1);

        match self.store.load(&code, period, neighborhood).await {
            Ok(Some(mut cached)) => {
                cached.truncate(rows as usize);
                return Ok(cached);
            }
            Ok(None) => {}
            Err(e) => warn!(code = %code, period = %period, error = %e, "Sale cache read failed"),
        }

        let records = self.registry.fetch_sales(&code, period, page.max(1), rows).await?;
        let records = filter_or_all(records, neighborhood);
        let neighborhood_label = resolution.map(|r| r.neighborhood.as_str()).unwrap_or("");
        if let Err(e) = self
            .store
            .save(&code, period, region, neighborhood_label, &records)
            .await
        {
            warn!(code = %code, period = %period, error = %e, "Sale cache write failed");
        }
        Ok(records)
    }
}

/// Drop leases whose deposit is present but implausibly small
fn plausible_rents(rents: Vec<RentTransaction>) -> Vec<RentTransaction> {
    rents
        .into_iter()
        .filter(|r| match r.deposit {
            Some(d) if d > 0 && d < MIN_PLAUSIBLE_DEPOSIT => {
                warn!(apt = %r.apt_name, deposit = d, "Deposit implausibly low, dropping lease");
                false
            }
            _ => r.is_usable(),
        })
        .collect()
}
