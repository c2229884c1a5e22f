//! API credential lifecycle: create, fall back to derive, cache.
//!
//! Credentials are minted with an L1 attestation and cached per wallet
//! address for a short window. Concurrent callers asking for the same
//! uncached address share one remote derivation.

use alloy_primitives::Address;
use moka::future::Cache;
use moka::policy::EvictionPolicy;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::transport::{HttpMethod, HttpRequest, Transport};
use crate::config::ClobConfig;
use crate::signing::l1::L1Attestation;
use crate::signing::l2::ApiCredentials;
use crate::wallet::WalletSigner;
use crate::{Error, Result};

/// Mints new credentials. Fails if the wallet already has some.
pub const CREATE_API_KEY_PATH: &str = "/auth/api-key";

/// Retrieves the wallet's existing credentials.
pub const DERIVE_API_KEY_PATH: &str = "/auth/derive-api-key";

/// Process-wide credential store shared by every session.
pub struct CredentialManager {
    config: ClobConfig,
    transport: Arc<dyn Transport>,
    cache: Cache<Address, ApiCredentials>,
}

impl CredentialManager {
    pub fn new(config: ClobConfig, transport: Arc<dyn Transport>) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.credential_cache_capacity)
            .time_to_live(config.credential_ttl())
            .eviction_policy(EvictionPolicy::lru())
            .build();

        Self {
            config,
            transport,
            cache,
        }
    }

    /// Credentials for `signer`, from cache or the remote service.
    ///
    /// Tries create first and falls back to derive on any create failure.
    /// Errors are not cached; the next call tries again.
    pub async fn create_or_derive(&self, signer: &WalletSigner) -> Result<ApiCredentials> {
        let address = signer.address()?;

        self.cache
            .try_get_with(address, self.fetch(signer, address))
            .await
            .map_err(Error::Shared)
    }

    /// Create new credentials via `POST /auth/api-key`. Bypasses the cache.
    pub async fn create_api_key(&self, signer: &WalletSigner) -> Result<ApiCredentials> {
        let credentials = self
            .request_credentials(signer, HttpMethod::Post, CREATE_API_KEY_PATH)
            .await?;
        info!(address = %signer.address()?, "Created API credentials");
        Ok(credentials)
    }

    /// Derive existing credentials via `GET /auth/derive-api-key`. Bypasses the cache.
    pub async fn derive_api_key(&self, signer: &WalletSigner) -> Result<ApiCredentials> {
        let credentials = self
            .request_credentials(signer, HttpMethod::Get, DERIVE_API_KEY_PATH)
            .await?;
        info!(address = %signer.address()?, "Derived API credentials");
        Ok(credentials)
    }

    /// Drop cached credentials, e.g. after the API rejects them.
    pub async fn invalidate(&self, address: &Address) {
        self.cache.invalidate(address).await;
        debug!(address = %address, "Invalidated cached credentials");
    }

    /// Cached credentials for `address`, without network I/O.
    pub async fn cached(&self, address: &Address) -> Option<ApiCredentials> {
        self.cache.get(address).await
    }

    pub fn config(&self) -> &ClobConfig {
        &self.config
    }

    /// Runs once per uncached address, however many callers are waiting.
    async fn fetch(&self, signer: &WalletSigner, address: Address) -> Result<ApiCredentials> {
        debug!(address = %address, "Credential cache miss");

        match self.create_api_key(signer).await {
            Ok(credentials) => Ok(credentials),
            Err(create_err) => {
                warn!(address = %address, error = %create_err, "create_api_key failed, trying derive");
                self.derive_api_key(signer).await.map_err(|derive_err| match derive_err {
                    Error::Api { message, .. } => Error::Auth {
                        message: format!(
                            "No API credentials for {address}: create failed ({create_err}), derive failed ({message})"
                        ),
                    },
                    other => other,
                })
            }
        }
    }

    async fn request_credentials(
        &self,
        signer: &WalletSigner,
        method: HttpMethod,
        path: &str,
    ) -> Result<ApiCredentials> {
        let attestation = L1Attestation::generate(signer, self.config.chain_id).await?;
        let request =
            HttpRequest::new(method, self.config.url(path)).with_headers(attestation.headers());

        let response = self.transport.send(request).await?;
        response.json(&format!("{method} {path} failed"))
    }
}

impl std::fmt::Debug for CredentialManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialManager")
            .field("host", &self.config.host)
            .field("cached_wallets", &self.cache.entry_count())
            .finish()
    }
}
