//! Shared fixtures for jeonse-analyzer integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sqlx::SqlitePool;

use jeonse_analyzer::db::{SqliteTransactionStore, TransactionStore};
use jeonse_analyzer::models::{AdministrativeCode, Period, RentTransaction, SaleTransaction};
use jeonse_analyzer::services::{
    RegionResolver, RegistryError, RetrievalOrchestrator, TransactionRegistry,
};

/// In-process registry serving canned records per period
#[derive(Default)]
pub struct FakeRegistry {
    pub sales: HashMap<String, Vec<SaleTransaction>>,
    pub rents: HashMap<String, Vec<RentTransaction>>,
    pub fail_sales: bool,
    pub fail_rents: bool,
    pub sale_calls: AtomicUsize,
    pub rent_calls: AtomicUsize,
    /// District codes of every sale fetch, in call order
    pub sale_codes: Mutex<Vec<String>>,
}

impl FakeRegistry {
    pub fn with_sales(mut self, period: &str, records: Vec<SaleTransaction>) -> Self {
        self.sales.insert(period.to_string(), records);
        self
    }

    pub fn with_rents(mut self, period: &str, records: Vec<RentTransaction>) -> Self {
        self.rents.insert(period.to_string(), records);
        self
    }

    pub fn sale_calls(&self) -> usize {
        self.sale_calls.load(Ordering::SeqCst)
    }

    pub fn rent_calls(&self) -> usize {
        self.rent_calls.load(Ordering::SeqCst)
    }

    pub fn sale_codes(&self) -> Vec<String> {
        self.sale_codes.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl TransactionRegistry for FakeRegistry {
    async fn fetch_sales(
        &self,
        code: &AdministrativeCode,
        period: Period,
        _page: u32,
        _page_size: u32,
    ) -> Result<Vec<SaleTransaction>, RegistryError> {
        self.sale_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut codes) = self.sale_codes.lock() {
            codes.push(code.to_string());
        }
        if self.fail_sales {
            return Err(RegistryError::Http {
                status: 503,
                body: "Service Unavailable".to_string(),
            });
        }
        Ok(self.sales.get(&period.to_string()).cloned().unwrap_or_default())
    }

    async fn fetch_rents(
        &self,
        _code: &AdministrativeCode,
        period: Period,
        _page: u32,
        _page_size: u32,
    ) -> Result<Vec<RentTransaction>, RegistryError> {
        self.rent_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_rents {
            return Err(RegistryError::Timeout);
        }
        Ok(self.rents.get(&period.to_string()).cloned().unwrap_or_default())
    }
}

pub fn sale(apt: &str, dong: &str, jibun: &str, price: i64, deal_date: &str) -> SaleTransaction {
    SaleTransaction {
        apt_name: apt.to_string(),
        dong_name: dong.to_string(),
        jibun: jibun.to_string(),
        area: "84.97".to_string(),
        floor: "12".to_string(),
        build_year: "2010".to_string(),
        deal_date: deal_date.to_string(),
        price: Some(price),
        price_raw: price.to_string(),
        region_code: "11680".to_string(),
    }
}

pub fn rent(apt: &str, dong: &str, jibun: &str, deposit: i64, deal_date: &str) -> RentTransaction {
    RentTransaction {
        apt_name: apt.to_string(),
        dong_name: dong.to_string(),
        jibun: jibun.to_string(),
        area: "84.97".to_string(),
        floor: "12".to_string(),
        build_year: "2010".to_string(),
        deal_date: deal_date.to_string(),
        deposit: Some(deposit),
        monthly_rent: Some(0),
        region_code: "11680".to_string(),
    }
}

/// Orchestrator over the fake registry and a SQLite-backed cache
pub fn orchestrator(pool: &SqlitePool, registry: Arc<FakeRegistry>) -> RetrievalOrchestrator {
    RetrievalOrchestrator::new(
        RegionResolver::new("11110"),
        registry,
        Arc::new(SqliteTransactionStore::new(pool.clone())),
    )
}

/// Cache whose every read and write fails
#[derive(Default)]
pub struct BrokenStore {
    pub loads: AtomicUsize,
    pub saves: AtomicUsize,
}

#[async_trait]
impl TransactionStore for BrokenStore {
    async fn load(
        &self,
        _code: &AdministrativeCode,
        _period: Period,
        _neighborhood: Option<&str>,
    ) -> jeonse_common::Result<Option<Vec<SaleTransaction>>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Err(sqlx::Error::PoolClosed.into())
    }

    async fn save(
        &self,
        _code: &AdministrativeCode,
        _period: Period,
        _region: &str,
        _neighborhood: &str,
        _records: &[SaleTransaction],
    ) -> jeonse_common::Result<usize> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        Err(sqlx::Error::PoolClosed.into())
    }
}

/// Orchestrator over the fake registry and an arbitrary cache
pub fn orchestrator_with_store(
    registry: Arc<FakeRegistry>,
    store: Arc<dyn TransactionStore>,
) -> RetrievalOrchestrator {
    RetrievalOrchestrator::new(RegionResolver::new("11110"), registry, store)
}
