//! Government transaction registry (MOLIT RTMS) client
//!
//! One request fetches one page of sale or rent records for a district and
//! month. Failures are classified so callers can decide whether to degrade
//! (the orchestrator) or report them (raw transaction lookups).

use super::registry_parser::{parse_rents, parse_sales};
use crate::config::{encode_service_key, RegistrySettings};
use crate::models::{AdministrativeCode, Period, RentTransaction, SaleTransaction};
use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

/// Longest response excerpt kept in an HTTP error
const ERROR_BODY_LIMIT: usize = 500;

/// Registry client errors
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Registry request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Registry error {code}: {message}")]
    Service { code: String, message: String },

    #[error("Registry credential is missing")]
    MissingCredential,
}

impl RegistryError {
    /// HTTP status a caller-facing surface should report
    pub fn status_code(&self) -> u16 {
        match self {
            RegistryError::Timeout => 504,
            RegistryError::Network(_) | RegistryError::Service { .. } => 502,
            RegistryError::Http { status, .. } => *status,
            RegistryError::Parse(_) | RegistryError::MissingCredential => 500,
        }
    }
}

/// Source of sale and rent transaction batches
#[async_trait]
pub trait TransactionRegistry: Send + Sync {
    async fn fetch_sales(
        &self,
        code: &AdministrativeCode,
        period: Period,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<SaleTransaction>, RegistryError>;

    async fn fetch_rents(
        &self,
        code: &AdministrativeCode,
        period: Period,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<RentTransaction>, RegistryError>;
}

/// HTTP client for the MOLIT registry
pub struct MolitRegistryClient {
    http_client: reqwest::Client,
    sale_url: String,
    rent_url: String,
    sale_key: String,
    rent_key: String,
}

impl MolitRegistryClient {
    pub fn new(settings: &RegistrySettings) -> Result<Self, RegistryError> {
        let http_client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| RegistryError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            sale_url: settings.sale_url.clone(),
            rent_url: settings.rent_url.clone(),
            sale_key: settings.sale_key.clone(),
            rent_key: settings.rent_key.clone(),
        })
    }

    /// Build the query URL by hand; the service key must not be re-encoded
    fn request_url(
        base: &str,
        key: &str,
        code: &AdministrativeCode,
        period: Period,
        page: u32,
        page_size: u32,
    ) -> Result<String, RegistryError> {
        if key.trim().is_empty() {
            return Err(RegistryError::MissingCredential);
        }
        let separator = if base.contains('?') { '&' } else { '?' };
        Ok(format!(
            "{}{}serviceKey={}&LAWD_CD={}&DEAL_YMD={}&pageNo={}&numOfRows={}",
            base,
            separator,
            encode_service_key(key),
            code,
            period,
            page,
            page_size
        ))
    }

    async fn get_body(&self, url: &str) -> Result<String, RegistryError> {
        let response = self.http_client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                RegistryError::Timeout
            } else {
                RegistryError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(RegistryError::Http {
                status: status.as_u16(),
                body: text.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        response.text().await.map_err(|e| {
            if e.is_timeout() {
                RegistryError::Timeout
            } else {
                RegistryError::Parse(format!("Unreadable body: {}", e))
            }
        })
    }
}

#[async_trait]
impl TransactionRegistry for MolitRegistryClient {
    async fn fetch_sales(
        &self,
        code: &AdministrativeCode,
        period: Period,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<SaleTransaction>, RegistryError> {
        let url = Self::request_url(&self.sale_url, &self.sale_key, code, period, page, page_size)?;
        let body = self.get_body(&url).await?;
        let sales = parse_sales(&body)?;
        debug!(code = %code, period = %period, count = sales.len(), "Fetched sale records");
        Ok(sales)
    }

    async fn fetch_rents(
        &self,
        code: &AdministrativeCode,
        period: Period,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<RentTransaction>, RegistryError> {
        let url = Self::request_url(&self.rent_url, &self.rent_key, code, period, page, page_size)?;
        let body = self.get_body(&url).await?;
        let rents = parse_rents(&body)?;
        debug!(code = %code, period = %period, count = rents.len(), "Fetched rent records");
        Ok(rents)
    }
}
