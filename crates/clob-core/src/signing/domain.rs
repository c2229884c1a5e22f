//! EIP-712 domain separators for Polymarket CLOB.
//!
//! Two domains are in play: the `ClobAuthDomain` used to attest wallet
//! ownership (no verifying contract) and the CTF Exchange domain used for
//! orders, whose verifying contract differs between standard and neg-risk
//! markets.

use alloy_primitives::{address, keccak256, Address, B256, U256};
use alloy_sol_types::SolValue;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::{Error, Result};

/// Chain ID for Polygon mainnet.
pub const POLYGON_CHAIN_ID: u64 = 137;

/// Chain ID for Polygon Amoy testnet.
pub const POLYGON_AMOY_CHAIN_ID: u64 = 80002;

/// CTF Exchange contract address on Polygon mainnet.
pub const CTF_EXCHANGE_ADDRESS: Address = address!("4bFb41d5B3570DeFd03C39a9A4D8dE6Bd8B8982E");

/// Neg Risk CTF Exchange contract address on Polygon mainnet.
pub const NEG_RISK_CTF_EXCHANGE_ADDRESS: Address =
    address!("C5d563A36AE78145C45a50134d48A1215220f80a");

/// CTF Exchange contract address on Polygon Amoy.
pub const AMOY_CTF_EXCHANGE_ADDRESS: Address =
    address!("dFE02Eb6733538f8Ea35D585af8DE5958AD99E40");

/// Neg Risk CTF Exchange contract address on Polygon Amoy.
pub const AMOY_NEG_RISK_CTF_EXCHANGE_ADDRESS: Address =
    address!("d91E80cF2E7be2e162c6513ceD06f1dD0dA35296");

/// Domain name for wallet-ownership attestations.
pub const CLOB_AUTH_DOMAIN_NAME: &str = "ClobAuthDomain";

/// Domain name shared by both exchange contracts.
pub const EXCHANGE_DOMAIN_NAME: &str = "Polymarket CTF Exchange";

/// Version shared by every domain.
pub const DOMAIN_VERSION: &str = "1";

/// EIP-712 domain separator.
///
/// `verifying_contract` is absent for the auth domain, which changes the
/// `EIP712Domain` type string and therefore the separator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eip712Domain {
    /// Domain name.
    pub name: String,
    /// Domain version.
    pub version: String,
    /// Chain ID.
    pub chain_id: U256,
    /// Verifying contract address.
    pub verifying_contract: Option<Address>,
}

impl Eip712Domain {
    /// Domain for L1 wallet-ownership attestations.
    pub fn clob_auth(chain_id: u64) -> Self {
        Self {
            name: CLOB_AUTH_DOMAIN_NAME.to_string(),
            version: DOMAIN_VERSION.to_string(),
            chain_id: U256::from(chain_id),
            verifying_contract: None,
        }
    }

    /// Domain for orders settled by the given exchange contract.
    pub fn exchange(chain_id: u64, verifying_contract: Address) -> Self {
        Self {
            name: EXCHANGE_DOMAIN_NAME.to_string(),
            version: DOMAIN_VERSION.to_string(),
            chain_id: U256::from(chain_id),
            verifying_contract: Some(verifying_contract),
        }
    }

    /// Create domain for CTF Exchange on Polygon mainnet.
    pub fn ctf_exchange() -> Self {
        Self::exchange(POLYGON_CHAIN_ID, CTF_EXCHANGE_ADDRESS)
    }

    /// Create domain for Neg Risk CTF Exchange on Polygon mainnet.
    pub fn neg_risk_ctf_exchange() -> Self {
        Self::exchange(POLYGON_CHAIN_ID, NEG_RISK_CTF_EXCHANGE_ADDRESS)
    }

    /// The `EIP712Domain(...)` type string for this domain.
    pub fn type_string(&self) -> &'static str {
        match self.verifying_contract {
            Some(_) => {
                "EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)"
            }
            None => "EIP712Domain(string name,string version,uint256 chainId)",
        }
    }

    /// Compute the EIP-712 domain separator hash.
    pub fn separator(&self) -> B256 {
        let domain_type_hash = keccak256(self.type_string().as_bytes());
        let name_hash = keccak256(self.name.as_bytes());
        let version_hash = keccak256(self.version.as_bytes());

        // Every member is a 32-byte word, so packed encoding equals encodeData.
        let encoded = match self.verifying_contract {
            Some(contract) => (
                domain_type_hash,
                name_hash,
                version_hash,
                self.chain_id,
                B256::left_padding_from(contract.as_slice()),
            )
                .abi_encode_packed(),
            None => (domain_type_hash, name_hash, version_hash, self.chain_id).abi_encode_packed(),
        };

        keccak256(&encoded)
    }
}

/// Order side (buy/sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy = 0,
    Sell = 1,
}

impl Side {
    /// Get the numeric value for signing.
    pub fn as_u8(&self) -> u8 {
        match self {
            Side::Buy => 0,
            Side::Sell => 1,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

impl FromStr for Side {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(Side::Buy),
            "SELL" => Ok(Side::Sell),
            other => Err(Error::order(format!("Unknown order side: {other}"))),
        }
    }
}

/// Selects the exchange contract's signature-verification path.
///
/// Carried in the order record; it never changes how the order is signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SignatureType {
    /// Browser wallet signing for itself.
    BrowserWallet = 0,
    /// Magic / email login, funds held by a proxy.
    #[default]
    MagicEmail = 1,
}

impl SignatureType {
    /// Get the numeric value for signing.
    pub fn as_u8(&self) -> u8 {
        match self {
            SignatureType::BrowserWallet => 0,
            SignatureType::MagicEmail => 1,
        }
    }
}

impl From<SignatureType> for u8 {
    fn from(value: SignatureType) -> Self {
        value.as_u8()
    }
}

impl TryFrom<u8> for SignatureType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(SignatureType::BrowserWallet),
            1 => Ok(SignatureType::MagicEmail),
            other => Err(Error::config(format!("Unsupported signature type: {other}"))),
        }
    }
}
