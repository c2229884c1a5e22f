//! Signing module for Polymarket CLOB.
//!
//! Covers both authentication layers and order signing:
//!
//! ```text
//! WalletSigner ── L1 (ClobAuth, EIP-712) ──► CredentialManager ──► ApiCredentials
//!      │                                                               │
//!      │                                                   L2 (HMAC-SHA256 per request)
//!      │                                                               │
//!      └── OrderSigner (Order, EIP-712) ──► SignedOrder ──► ClobSession ──► CLOB API
//! ```
//!
//! # Example
//!
//! ```ignore
//! use clob_core::signing::{OrderArgs, OrderOptions, OrderSigner, Side, TickSize};
//! use clob_core::{ClobConfig, WalletSigner};
//! use rust_decimal_macros::dec;
//!
//! let wallet = WalletSigner::from_env()?;
//! let signer = OrderSigner::new(ClobConfig::from_env()?);
//!
//! let order = signer
//!     .build_order(
//!         &wallet,
//!         &OrderArgs {
//!             token_id: U256::from(12345),
//!             price: dec!(0.50),
//!             size: dec!(100),
//!             side: Side::Buy,
//!         },
//!         TickSize::Hundredth,
//!         &OrderOptions::default(),
//!     )
//!     .await?;
//! ```

pub mod amounts;
pub mod domain;
pub mod l1;
pub mod l2;
pub mod order_types;
pub mod signer;
pub mod typed_data;

pub use amounts::{OrderAmounts, TickSize, USDC_DECIMALS};
pub use domain::{
    Eip712Domain, Side, SignatureType, AMOY_CTF_EXCHANGE_ADDRESS,
    AMOY_NEG_RISK_CTF_EXCHANGE_ADDRESS, CTF_EXCHANGE_ADDRESS, NEG_RISK_CTF_EXCHANGE_ADDRESS,
    POLYGON_AMOY_CHAIN_ID, POLYGON_CHAIN_ID,
};
pub use l1::L1Attestation;
pub use l2::{sign_request, ApiCredentials, L2Signature};
pub use order_types::{MarketOrderArgs, OrderArgs, OrderData, OrderOptions, SignedOrder};
pub use signer::OrderSigner;
pub use typed_data::TypedData;
