//! Configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, bail};

use crate::discovery::{DiscoveryConfig, EnrichmentFailurePolicy};

/// Where venues and reviews are read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryBackend {
    Postgres,
    /// In-process store loaded from `DISCOVERY_SEED_FILE`. For local development.
    Memory,
}

impl FromStr for DiscoveryBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(DiscoveryBackend::Postgres),
            "memory" => Ok(DiscoveryBackend::Memory),
            other => bail!("unknown discovery backend: {other}"),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 3000).
    pub port: u16,

    /// Gateway backend (default: postgres).
    pub backend: DiscoveryBackend,

    /// PostgreSQL connection URL. Required for the postgres backend.
    pub database_url: Option<String>,

    /// JSON venues and reviews loaded by the memory backend.
    pub seed_file: Option<PathBuf>,

    /// Maximum database connections in pool (default: 10).
    pub database_max_connections: u32,

    /// CORS allowed origins (comma-separated, default: "*").
    pub cors_allowed_origins: Vec<String>,

    /// Pipeline defaults and limits.
    pub discovery: DiscoveryConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port = parse_or(&lookup, "PORT", 3000u16)?;

        let backend = match lookup("DISCOVERY_BACKEND") {
            Some(v) => v.parse()?,
            None => DiscoveryBackend::Postgres,
        };

        let database_url = lookup("DATABASE_URL");
        if backend == DiscoveryBackend::Postgres && database_url.is_none() {
            bail!("DATABASE_URL environment variable is required for the postgres backend");
        }

        let seed_file = lookup("DISCOVERY_SEED_FILE")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        if backend == DiscoveryBackend::Memory && seed_file.is_none() {
            bail!("DISCOVERY_SEED_FILE is required for the memory backend");
        }

        let database_max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10u32)?;

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| vec!["*".to_string()]);

        let defaults = DiscoveryConfig::default();

        let default_page_size =
            parse_or(&lookup, "DISCOVERY_DEFAULT_PAGE_SIZE", defaults.default_page_size)?;
        let max_page_size = parse_or(&lookup, "DISCOVERY_MAX_PAGE_SIZE", defaults.max_page_size)?;
        if default_page_size == 0 || max_page_size == 0 {
            bail!("DISCOVERY_DEFAULT_PAGE_SIZE and DISCOVERY_MAX_PAGE_SIZE must be positive");
        }
        if default_page_size > max_page_size {
            bail!(
                "DISCOVERY_DEFAULT_PAGE_SIZE ({default_page_size}) exceeds DISCOVERY_MAX_PAGE_SIZE ({max_page_size})"
            );
        }

        let enrichment_concurrency = parse_or(
            &lookup,
            "DISCOVERY_ENRICHMENT_CONCURRENCY",
            defaults.enrichment_concurrency,
        )?;

        let lookup_timeout = Duration::from_millis(parse_or(
            &lookup,
            "DISCOVERY_LOOKUP_TIMEOUT_MS",
            millis(defaults.lookup_timeout),
        )?);

        let query_timeout = Duration::from_millis(parse_or(
            &lookup,
            "DISCOVERY_QUERY_TIMEOUT_MS",
            millis(defaults.query_timeout),
        )?);

        let failure_policy = match lookup("DISCOVERY_ENRICHMENT_FAILURE_POLICY") {
            Some(v) => v
                .parse::<EnrichmentFailurePolicy>()
                .map_err(anyhow::Error::msg)
                .context("DISCOVERY_ENRICHMENT_FAILURE_POLICY must be `zero` or `fail`")?,
            None => defaults.failure_policy,
        };

        Ok(Self {
            port,
            backend,
            database_url,
            seed_file,
            database_max_connections,
            cors_allowed_origins,
            discovery: DiscoveryConfig {
                default_page_size,
                max_page_size,
                enrichment_concurrency: enrichment_concurrency.max(1),
                lookup_timeout,
                query_timeout,
                failure_policy,
            },
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(name) {
        Some(v) => v
            .trim()
            .parse()
            .with_context(|| format!("{name} must be a valid number")),
        None => Ok(default),
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
