use serde::{Deserialize, Serialize};
use strata_query::PaginationConfig;

use crate::error::GatewayError;

pub const SERVER_ADDRESS_ENV: &str = "STRATA_SERVER_ADDRESS";
pub const DEFAULT_LIMIT_ENV: &str = "STRATA_DEFAULT_LIMIT";
pub const MAX_LIMIT_ENV: &str = "STRATA_MAX_LIMIT";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Address of the backend service the routes forward to.
    pub server_address: String,
    pub dial: DialOptions,
    pub mux: MuxOptions,
    pub pagination: PaginationConfig,
}

/// Options handed to each endpoint registration when it connects to the
/// backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialOptions {
    pub insecure: bool,
    pub connect_timeout_ms: u64,
    /// Install the interceptor that turns query-string operators into
    /// collection operations.
    pub collection_operators: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MuxOptions {
    /// Headers with this prefix are forwarded as call metadata, prefix
    /// stripped.
    pub metadata_prefix: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            server_address: "0.0.0.0:9090".into(),
            dial: DialOptions::default(),
            mux: MuxOptions::default(),
            pagination: PaginationConfig::default(),
        }
    }
}

impl Default for DialOptions {
    fn default() -> Self {
        Self {
            insecure: false,
            connect_timeout_ms: 5000,
            collection_operators: true,
        }
    }
}

impl Default for MuxOptions {
    fn default() -> Self {
        Self {
            metadata_prefix: "x-meta-".into(),
        }
    }
}

impl GatewayConfig {
    /// Defaults overridden by `STRATA_*` environment variables.
    pub fn from_env() -> Result<Self, GatewayError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, GatewayError> {
        let mut config = Self::default();
        if let Some(addr) = lookup(SERVER_ADDRESS_ENV) {
            config.server_address = addr;
        }
        if let Some(limit) = parse_u32(&lookup, DEFAULT_LIMIT_ENV)? {
            config.pagination.default_limit = limit;
        }
        if let Some(limit) = parse_u32(&lookup, MAX_LIMIT_ENV)? {
            config.pagination.max_limit = limit;
        }
        Ok(config)
    }
}

fn parse_u32(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<u32>, GatewayError> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| GatewayError::Config { key, value: raw }),
    }
}
