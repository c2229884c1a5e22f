//! Wallet-signing capability.
//!
//! Everything that signs on behalf of a wallet goes through [`WalletSigner`]:
//! either a private key held in-process or a remote wallet connection
//! (browser extension, WalletConnect bridge, KMS) that signs typed data on
//! request.

use alloy_primitives::{Address, Signature};
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use std::str::FromStr;
use std::sync::Arc;

use crate::signing::TypedData;
use crate::{Error, Result};

/// A wallet that lives outside this process.
#[async_trait]
pub trait RemoteWallet: Send + Sync {
    /// The connected account, if any.
    fn address(&self) -> Option<Address>;

    /// Sign a typed-data payload.
    ///
    /// Implementations forward `payload.to_json()` to the wallet; the digest
    /// is available as `payload.signing_hash()` for signers that take raw
    /// hashes.
    async fn sign_typed_data(&self, payload: &TypedData) -> Result<Signature>;
}

/// Key holder able to attest wallet control and sign orders.
#[derive(Clone)]
pub enum WalletSigner {
    /// Private key held in-process.
    Local(PrivateKeySigner),
    /// Remote wallet connection.
    Remote(Arc<dyn RemoteWallet>),
}

impl WalletSigner {
    /// Load a local key from the `WALLET_PRIVATE_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let private_key = std::env::var("WALLET_PRIVATE_KEY")
            .map_err(|_| Error::config("WALLET_PRIVATE_KEY environment variable not set"))?;

        Self::from_private_key(&private_key)
    }

    /// Create a local signer from a hex-encoded private key.
    ///
    /// Accepts 64 hex characters, optionally prefixed with "0x".
    pub fn from_private_key(key: &str) -> Result<Self> {
        let key_clean = key.trim().trim_start_matches("0x");

        let signer = PrivateKeySigner::from_str(key_clean).map_err(|_| {
            Error::config("Invalid private key format - expected 64 hex characters")
        })?;

        Ok(WalletSigner::Local(signer))
    }

    /// Wrap a remote wallet connection.
    pub fn remote(wallet: Arc<dyn RemoteWallet>) -> Self {
        WalletSigner::Remote(wallet)
    }

    /// The wallet's address.
    ///
    /// A remote wallet without a connected account cannot sign anything
    /// meaningful, so this is a configuration error.
    pub fn address(&self) -> Result<Address> {
        match self {
            WalletSigner::Local(signer) => Ok(signer.address()),
            WalletSigner::Remote(wallet) => wallet
                .address()
                .ok_or_else(|| Error::config("Remote wallet has no connected account")),
        }
    }

    /// Sign a typed-data payload and return the 65-byte signature as 0x-hex.
    pub async fn sign_typed_data(&self, payload: &TypedData) -> Result<String> {
        let signature = match self {
            WalletSigner::Local(signer) => signer
                .sign_hash(&payload.signing_hash())
                .await
                .map_err(|e| Error::signing(format!("Failed to sign {}: {e}", payload.primary_type)))?,
            WalletSigner::Remote(wallet) => wallet.sign_typed_data(payload).await?,
        };

        Ok(format!("0x{}", hex::encode(signature.as_bytes())))
    }
}

impl std::fmt::Debug for WalletSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never expose the private key in debug output
        let (kind, address) = match self {
            WalletSigner::Local(signer) => ("local", Some(signer.address())),
            WalletSigner::Remote(wallet) => ("remote", wallet.address()),
        };
        f.debug_struct("WalletSigner")
            .field("kind", &kind)
            .field("address", &address.map(|a| a.to_string()))
            .finish()
    }
}
