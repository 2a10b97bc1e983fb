//! Analyzer configuration
//!
//! Combines the TOML file with environment overrides for the registry
//! credentials. Credential priority: environment variable, then the TOML
//! key, then the built-in placeholder. The rent credential falls back to the
//! sale credential chain when neither of its own sources is set.

use jeonse_common::config::{RegistrySection, TomlConfig};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable holding the sale registry credential
pub const SALE_KEY_ENV: &str = "MOLIT_API_KEY";

/// Environment variable holding the rent registry credential
pub const RENT_KEY_ENV: &str = "MOLIT_RENT_API_KEY";

/// Placeholder used when no credential is configured anywhere
///
/// The registry rejects it with a service error, which the pipeline treats
/// like any other failed fetch.
pub const BUILTIN_SERVICE_KEY: &str = "DEMO_SERVICE_KEY";

/// Where a credential came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Environment,
    ConfigFile,
    BuiltIn,
}

/// Fully resolved registry settings
#[derive(Debug, Clone)]
pub struct RegistrySettings {
    pub sale_url: String,
    pub rent_url: String,
    pub timeout: Duration,
    pub page_size: u32,
    pub max_concurrent_fetches: usize,
    pub sale_key: String,
    pub rent_key: String,
}

impl RegistrySettings {
    /// Resolve settings from the TOML config and the process environment
    pub fn resolve(config: &TomlConfig) -> Self {
        let env = |name: &str| std::env::var(name).ok();
        Self::resolve_with(config, env)
    }

    /// Resolve with an injectable environment lookup
    pub fn resolve_with<F>(config: &TomlConfig, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let (sale_key, sale_source) = resolve_sale_key(config, &env);
        let (rent_key, rent_source) = match own_credential(
            env(RENT_KEY_ENV),
            config.molit_rent_api_key.clone(),
        ) {
            Some(found) => found,
            None => (sale_key.clone(), sale_source),
        };

        if sale_source == CredentialSource::BuiltIn {
            warn!(
                "No registry credential configured; set {} or molit_api_key in the config file",
                SALE_KEY_ENV
            );
        }
        info!(sale = ?sale_source, rent = ?rent_source, "Registry credentials resolved");

        Self::from_section(&config.registry, sale_key, rent_key)
    }

    pub fn from_section(section: &RegistrySection, sale_key: String, rent_key: String) -> Self {
        Self {
            sale_url: section.sale_url.clone(),
            rent_url: section.rent_url.clone(),
            timeout: Duration::from_secs(section.timeout_secs.max(1)),
            page_size: section.page_size.max(1),
            max_concurrent_fetches: section.max_concurrent_fetches.max(1),
            sale_key,
            rent_key,
        }
    }
}

fn resolve_sale_key<F>(config: &TomlConfig, env: &F) -> (String, CredentialSource)
where
    F: Fn(&str) -> Option<String>,
{
    own_credential(env(SALE_KEY_ENV), config.molit_api_key.clone())
        .unwrap_or_else(|| (BUILTIN_SERVICE_KEY.to_string(), CredentialSource::BuiltIn))
}

fn own_credential(
    from_env: Option<String>,
    from_file: Option<String>,
) -> Option<(String, CredentialSource)> {
    let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
    non_empty(from_env)
        .map(|k| (k, CredentialSource::Environment))
        .or_else(|| non_empty(from_file).map(|k| (k, CredentialSource::ConfigFile)))
}

/// Encode a service key for the query string
///
/// Keys copied from the portal are often already percent-encoded; those are
/// passed through untouched.
pub fn encode_service_key(key: &str) -> String {
    if key.contains('%') {
        key.to_string()
    } else {
        urlencoding::encode(key).into_owned()
    }
}
