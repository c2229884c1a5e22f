//! Polymarket CLOB order construction and authentication.
//!
//! Two authentication layers sit in front of the CLOB: an EIP-712 wallet
//! attestation (L1) that mints API credentials, and an HMAC over every
//! request (L2) that spends them. Orders are EIP-712 records signed against
//! the exchange contract that settles the market.

pub mod api;
pub mod config;
pub mod error;
pub mod signing;
pub mod wallet;

pub use api::{ClobSession, CredentialManager, OrderType, ReqwestTransport, Transport};
pub use config::ClobConfig;
pub use error::{Error, Result};
pub use signing::{
    ApiCredentials, L1Attestation, L2Signature, MarketOrderArgs, OrderArgs, OrderOptions,
    OrderSigner, Side, SignatureType, SignedOrder, TickSize,
};
pub use wallet::{RemoteWallet, WalletSigner};
