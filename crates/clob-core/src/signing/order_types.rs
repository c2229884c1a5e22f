//! Order types for Polymarket CLOB signing.
//!
//! Defines the order data structures used for EIP-712 signing and
//! submission to the Polymarket CLOB API.

use alloy_primitives::{keccak256, Address, B256, U256};
use alloy_sol_types::SolValue;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map};

use super::domain::{Eip712Domain, Side, SignatureType};
use super::typed_data::TypedData;
use crate::{Error, Result};

const ORDER_FIELDS: &[(&str, &str)] = &[
    ("salt", "uint256"),
    ("maker", "address"),
    ("signer", "address"),
    ("taker", "address"),
    ("tokenId", "uint256"),
    ("makerAmount", "uint256"),
    ("takerAmount", "uint256"),
    ("expiration", "uint256"),
    ("nonce", "uint256"),
    ("feeRateBps", "uint256"),
    ("side", "uint8"),
    ("signatureType", "uint8"),
];

/// Raw order data for EIP-712 signing.
///
/// This matches the struct used by the CTF Exchange contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderData {
    /// Random salt for uniqueness.
    pub salt: U256,
    /// Address whose funds back the order.
    pub maker: Address,
    /// Address whose key authorizes the order.
    pub signer: Address,
    /// Taker address (zero for any taker).
    pub taker: Address,
    /// Token ID of the outcome being traded.
    pub token_id: U256,
    /// Maker amount in base units.
    pub maker_amount: U256,
    /// Taker amount in base units.
    pub taker_amount: U256,
    /// Order expiration timestamp (unix seconds).
    pub expiration: U256,
    pub nonce: U256,
    /// Fee rate in basis points.
    pub fee_rate_bps: U256,
    pub side: Side,
    pub signature_type: SignatureType,
}

impl OrderData {
    /// Compute the EIP-712 struct hash for this order.
    pub fn struct_hash(&self) -> B256 {
        let order_type_hash = keccak256(
            b"Order(uint256 salt,address maker,address signer,address taker,uint256 tokenId,uint256 makerAmount,uint256 takerAmount,uint256 expiration,uint256 nonce,uint256 feeRateBps,uint8 side,uint8 signatureType)",
        );

        // EIP-712 encodeData: all values must be padded to 32 bytes.
        // Addresses are left-padded from 20 bytes to 32 bytes.
        let maker_padded = B256::left_padding_from(self.maker.as_slice());
        let signer_padded = B256::left_padding_from(self.signer.as_slice());
        let taker_padded = B256::left_padding_from(self.taker.as_slice());

        let encoded = (
            order_type_hash,
            self.salt,
            maker_padded,
            signer_padded,
            taker_padded,
            self.token_id,
            self.maker_amount,
            self.taker_amount,
            self.expiration,
            self.nonce,
            self.fee_rate_bps,
            U256::from(self.side.as_u8()),
            U256::from(self.signature_type.as_u8()),
        )
            .abi_encode_packed();

        keccak256(&encoded)
    }

    /// The exact payload a wallet signs for this order under `domain`.
    pub fn typed_data(&self, domain: Eip712Domain) -> TypedData {
        let mut message = Map::new();
        message.insert("salt".to_string(), json!(self.salt.to_string()));
        message.insert("maker".to_string(), json!(self.maker.to_string()));
        message.insert("signer".to_string(), json!(self.signer.to_string()));
        message.insert("taker".to_string(), json!(self.taker.to_string()));
        message.insert("tokenId".to_string(), json!(self.token_id.to_string()));
        message.insert("makerAmount".to_string(), json!(self.maker_amount.to_string()));
        message.insert("takerAmount".to_string(), json!(self.taker_amount.to_string()));
        message.insert("expiration".to_string(), json!(self.expiration.to_string()));
        message.insert("nonce".to_string(), json!(self.nonce.to_string()));
        message.insert("feeRateBps".to_string(), json!(self.fee_rate_bps.to_string()));
        message.insert("side".to_string(), json!(self.side.as_u8()));
        message.insert(
            "signatureType".to_string(),
            json!(self.signature_type.as_u8()),
        );

        TypedData {
            domain,
            primary_type: "Order",
            fields: ORDER_FIELDS,
            message,
            struct_hash: self.struct_hash(),
        }
    }

    /// Recover the address that produced `signature` over this order.
    pub fn recover_signer(&self, domain: Eip712Domain, signature: &str) -> Result<Address> {
        self.typed_data(domain).recover_signer(signature)
    }
}

/// A signed order ready for submission.
///
/// Integer fields are decimal strings; on-chain values exceed what JSON
/// numbers carry safely. Any change requires rebuilding and re-signing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedOrder {
    pub salt: String,
    /// Maker address as hex string.
    pub maker: String,
    /// Signer address as hex string.
    pub signer: String,
    /// Taker address as hex string.
    pub taker: String,
    pub token_id: String,
    pub maker_amount: String,
    pub taker_amount: String,
    /// Expiration timestamp as string.
    pub expiration: String,
    pub nonce: String,
    pub fee_rate_bps: String,
    /// Side ("BUY" or "SELL").
    pub side: Side,
    pub signature_type: u8,
    /// EIP-712 signature as hex string.
    pub signature: String,
}

impl SignedOrder {
    /// Create from order data and signature.
    pub fn from_order_data(order: &OrderData, signature: String) -> Self {
        Self {
            salt: order.salt.to_string(),
            maker: order.maker.to_string(),
            signer: order.signer.to_string(),
            taker: order.taker.to_string(),
            token_id: order.token_id.to_string(),
            maker_amount: order.maker_amount.to_string(),
            taker_amount: order.taker_amount.to_string(),
            expiration: order.expiration.to_string(),
            nonce: order.nonce.to_string(),
            fee_rate_bps: order.fee_rate_bps.to_string(),
            side: order.side,
            signature_type: order.signature_type.as_u8(),
            signature,
        }
    }

    /// Parse the wire fields back into the record that was signed.
    pub fn to_order_data(&self) -> Result<OrderData> {
        fn field<T: std::str::FromStr>(name: &str, value: &str) -> Result<T>
        where
            T::Err: std::fmt::Display,
        {
            value
                .parse()
                .map_err(|e| Error::order(format!("Invalid {name} {value:?}: {e}")))
        }

        Ok(OrderData {
            salt: field("salt", &self.salt)?,
            maker: field("maker", &self.maker)?,
            signer: field("signer", &self.signer)?,
            taker: field("taker", &self.taker)?,
            token_id: field("tokenId", &self.token_id)?,
            maker_amount: field("makerAmount", &self.maker_amount)?,
            taker_amount: field("takerAmount", &self.taker_amount)?,
            expiration: field("expiration", &self.expiration)?,
            nonce: field("nonce", &self.nonce)?,
            fee_rate_bps: field("feeRateBps", &self.fee_rate_bps)?,
            side: self.side,
            signature_type: SignatureType::try_from(self.signature_type)?,
        })
    }
}

/// Economic terms of a limit order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderArgs {
    pub token_id: U256,
    /// Price per share, 0.0 to 1.0.
    pub price: Decimal,
    /// Number of shares.
    pub size: Decimal,
    pub side: Side,
}

/// Economic terms of a market order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketOrderArgs {
    pub token_id: U256,
    /// USDC to spend for BUY, shares to sell for SELL.
    pub amount: Decimal,
    /// Observed price the order is sized against.
    pub price: Decimal,
    pub side: Side,
}

/// Overrides for everything an order takes from configuration or chance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderOptions {
    /// Settle through the neg-risk exchange.
    pub neg_risk: bool,
    /// Funding address; overrides the configured funder.
    pub funder: Option<Address>,
    /// Restrict the order to one counter-party.
    pub taker: Option<Address>,
    /// Fresh random nonce when unset.
    pub nonce: Option<U256>,
    /// Absolute expiration (unix seconds).
    pub expiration: Option<u64>,
    pub fee_rate_bps: Option<u32>,
    pub signature_type: Option<SignatureType>,
}
