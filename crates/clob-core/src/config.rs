//! Configuration for CLOB authentication and order signing.
//!
//! [`ClobConfig`] is built once at startup and passed explicitly to the
//! credential manager, order signer and session. Nothing reads ambient
//! globals after that.

use alloy_primitives::Address;
use serde::Deserialize;
use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use crate::signing::domain::{
    Eip712Domain, SignatureType, AMOY_CTF_EXCHANGE_ADDRESS, AMOY_NEG_RISK_CTF_EXCHANGE_ADDRESS,
    CTF_EXCHANGE_ADDRESS, NEG_RISK_CTF_EXCHANGE_ADDRESS, POLYGON_AMOY_CHAIN_ID, POLYGON_CHAIN_ID,
};
use crate::{Error, Result};

/// Default CLOB API base URL.
pub const DEFAULT_CLOB_URL: &str = "https://clob.polymarket.com";

/// 0.5%
pub const DEFAULT_FEE_RATE_BPS: u32 = 50;

/// Orders expire a year after signing unless told otherwise.
pub const DEFAULT_EXPIRATION_SECS: u64 = 365 * 24 * 60 * 60;

pub const DEFAULT_CREDENTIAL_TTL_SECS: u64 = 60;

pub const DEFAULT_CREDENTIAL_CACHE_CAPACITY: u64 = 10;

/// Immutable settings shared by every signing component.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClobConfig {
    /// CLOB API base URL.
    pub host: String,
    pub chain_id: u64,
    /// Verifying contract for standard markets.
    pub exchange_address: Address,
    /// Verifying contract for neg-risk markets.
    pub neg_risk_exchange_address: Address,
    pub default_fee_rate_bps: u32,
    /// Seconds from signing until an order expires.
    pub default_expiration_secs: u64,
    pub signature_type: SignatureType,
    /// Address holding funds when it differs from the signing key.
    pub funder: Option<Address>,
    pub credential_ttl_secs: u64,
    /// Distinct wallets kept in the credential cache.
    pub credential_cache_capacity: u64,
}

impl Default for ClobConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_CLOB_URL.to_string(),
            chain_id: POLYGON_CHAIN_ID,
            exchange_address: CTF_EXCHANGE_ADDRESS,
            neg_risk_exchange_address: NEG_RISK_CTF_EXCHANGE_ADDRESS,
            default_fee_rate_bps: DEFAULT_FEE_RATE_BPS,
            default_expiration_secs: DEFAULT_EXPIRATION_SECS,
            signature_type: SignatureType::default(),
            funder: None,
            credential_ttl_secs: DEFAULT_CREDENTIAL_TTL_SECS,
            credential_cache_capacity: DEFAULT_CREDENTIAL_CACHE_CAPACITY,
        }
    }
}

impl ClobConfig {
    /// Polygon Amoy testnet contracts.
    pub fn amoy() -> Self {
        Self {
            chain_id: POLYGON_AMOY_CHAIN_ID,
            exchange_address: AMOY_CTF_EXCHANGE_ADDRESS,
            neg_risk_exchange_address: AMOY_NEG_RISK_CTF_EXCHANGE_ADDRESS,
            ..Self::default()
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Unset variables keep their defaults; a set but malformed variable is
    /// an error.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let chain_id = parse_env("POLY_CHAIN_ID")?.unwrap_or(POLYGON_CHAIN_ID);
        let mut config = if chain_id == POLYGON_AMOY_CHAIN_ID {
            Self::amoy()
        } else {
            Self {
                chain_id,
                ..Self::default()
            }
        };

        if let Ok(host) = env::var("POLYMARKET_CLOB_URL") {
            config.host = host;
        }
        if let Some(signature_type) = parse_env::<u8>("POLY_SIGNATURE_TYPE")? {
            config.signature_type = SignatureType::try_from(signature_type)?;
        }
        if let Some(funder) = parse_env("POLY_FUNDER")? {
            config.funder = Some(funder);
        }
        if let Some(fee) = parse_env("POLY_FEE_RATE_BPS")? {
            config.default_fee_rate_bps = fee;
        }
        if let Some(secs) = parse_env("POLY_ORDER_EXPIRATION_SECS")? {
            config.default_expiration_secs = secs;
        }
        if let Some(ttl) = parse_env("POLY_CREDENTIAL_TTL_SECS")? {
            config.credential_ttl_secs = ttl;
        }
        if let Some(capacity) = parse_env("POLY_CREDENTIAL_CACHE_CAPACITY")? {
            config.credential_cache_capacity = capacity;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load from a config file layered under `CLOB_*` environment variables.
    pub fn from_file(path: &str) -> Result<Self> {
        let config: Self = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("CLOB"))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Reject settings no signer could work with.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::config("CLOB host must not be empty"));
        }
        if self.chain_id == 0 {
            return Err(Error::config("chain_id must be non-zero"));
        }
        if self.credential_cache_capacity == 0 {
            return Err(Error::config("credential_cache_capacity must be at least 1"));
        }
        if self.exchange_address == self.neg_risk_exchange_address {
            return Err(Error::config(
                "Standard and neg-risk exchange addresses must differ",
            ));
        }
        Ok(())
    }

    /// Order-signing domain for a standard or neg-risk market.
    pub fn exchange_domain(&self, neg_risk: bool) -> Eip712Domain {
        let contract = if neg_risk {
            self.neg_risk_exchange_address
        } else {
            self.exchange_address
        };
        Eip712Domain::exchange(self.chain_id, contract)
    }

    pub fn credential_ttl(&self) -> Duration {
        Duration::from_secs(self.credential_ttl_secs)
    }

    /// Base URL joined with an API path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.host.trim_end_matches('/'), path)
    }
}

fn parse_env<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| Error::config(format!("Invalid {name}={raw:?}: {e}"))),
        Err(_) => Ok(None),
    }
}
