//! Order signing for Polymarket CLOB.
//!
//! [`OrderSigner`] turns economic terms (token, price, size, side) into a
//! fully populated [`OrderData`], signs it against the exchange domain the
//! market settles through and returns the wire-ready [`SignedOrder`].

use alloy_primitives::{Address, U256};
use chrono::Utc;
use tracing::debug;

use super::amounts::{self, OrderAmounts, TickSize};
use super::domain::Side;
use super::order_types::{MarketOrderArgs, OrderArgs, OrderData, OrderOptions, SignedOrder};
use crate::config::ClobConfig;
use crate::wallet::WalletSigner;
use crate::{Error, Result};

/// Order builder and signer for Polymarket CLOB.
///
/// Holds only configuration; the key is supplied per call so one builder
/// can serve many wallets.
#[derive(Clone)]
pub struct OrderSigner {
    config: ClobConfig,
}

impl OrderSigner {
    pub fn new(config: ClobConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClobConfig {
        &self.config
    }

    /// Build and sign a limit order.
    pub async fn build_order(
        &self,
        signer: &WalletSigner,
        args: &OrderArgs,
        tick: TickSize,
        options: &OrderOptions,
    ) -> Result<SignedOrder> {
        amounts::validate_price_and_size(args.price, args.size)?;
        let legs = amounts::limit_amounts(args.side, args.size, args.price, tick)?;
        self.sign(signer, args.token_id, args.side, legs, tick, options)
            .await
    }

    /// Build and sign a market order.
    ///
    /// `args.amount` is the USDC budget for a BUY and the share count for a
    /// SELL.
    pub async fn build_market_order(
        &self,
        signer: &WalletSigner,
        args: &MarketOrderArgs,
        tick: TickSize,
        options: &OrderOptions,
    ) -> Result<SignedOrder> {
        amounts::validate_price_and_size(args.price, args.amount)?;
        let legs = amounts::market_amounts(args.side, args.amount, args.price, tick)?;
        self.sign(signer, args.token_id, args.side, legs, tick, options)
            .await
    }

    /// Assemble the full order record without signing it.
    pub fn assemble(
        &self,
        signer_address: Address,
        token_id: U256,
        side: Side,
        legs: &OrderAmounts,
        options: &OrderOptions,
    ) -> Result<OrderData> {
        // Funds may sit with a proxy; the key holder always signs.
        let maker = options
            .funder
            .or(self.config.funder)
            .unwrap_or(signer_address);

        let expiration = match options.expiration {
            Some(expiration) => expiration,
            None => self.default_expiration(),
        };

        Ok(OrderData {
            salt: random_u256(),
            maker,
            signer: signer_address,
            taker: options.taker.unwrap_or(Address::ZERO),
            token_id,
            maker_amount: parse_base_units("makerAmount", &legs.maker_amount)?,
            taker_amount: parse_base_units("takerAmount", &legs.taker_amount)?,
            expiration: U256::from(expiration),
            nonce: options.nonce.unwrap_or_else(random_u256),
            fee_rate_bps: U256::from(
                options
                    .fee_rate_bps
                    .unwrap_or(self.config.default_fee_rate_bps),
            ),
            side,
            signature_type: options
                .signature_type
                .unwrap_or(self.config.signature_type),
        })
    }

    async fn sign(
        &self,
        signer: &WalletSigner,
        token_id: U256,
        side: Side,
        legs: OrderAmounts,
        tick: TickSize,
        options: &OrderOptions,
    ) -> Result<SignedOrder> {
        let signer_address = signer.address()?;
        let order = self.assemble(signer_address, token_id, side, &legs, options)?;
        let domain = self.config.exchange_domain(options.neg_risk);

        let signature = signer.sign_typed_data(&order.typed_data(domain)).await?;

        debug!(
            signer = %signer_address,
            maker = %order.maker,
            token_id = %token_id,
            side = %side,
            maker_amount = %legs.maker_amount,
            taker_amount = %legs.taker_amount,
            price = ?legs.implied_price(side, tick.decimals()),
            neg_risk = options.neg_risk,
            "Signed order"
        );

        Ok(SignedOrder::from_order_data(&order, signature))
    }

    fn default_expiration(&self) -> u64 {
        let now = u64::try_from(Utc::now().timestamp()).unwrap_or_default();
        now.saturating_add(self.config.default_expiration_secs)
    }
}

impl std::fmt::Debug for OrderSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderSigner")
            .field("chain_id", &self.config.chain_id)
            .field("funder", &self.config.funder)
            .field("signature_type", &self.config.signature_type)
            .finish()
    }
}

/// 256 bits from the thread-local CSPRNG.
fn random_u256() -> U256 {
    U256::from_be_bytes(rand::random::<[u8; 32]>())
}

fn parse_base_units(field: &str, value: &str) -> Result<U256> {
    value
        .parse::<U256>()
        .map_err(|e| Error::order(format!("{field} {value:?} is not a base-unit integer: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signing::domain::{Eip712Domain, SignatureType};
    use crate::wallet::tests::{test_signer, KeyBackedRemote, TEST_PRIVATE_KEY};
    use alloy_signer_local::PrivateKeySigner;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use std::sync::Arc;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn buy_args() -> OrderArgs {
        OrderArgs {
            token_id: U256::from(12345u64),
            price: d("0.65"),
            size: d("100"),
            side: Side::Buy,
        }
    }

    fn order_signer() -> OrderSigner {
        OrderSigner::new(ClobConfig::default())
    }

    #[tokio::test]
    async fn test_build_limit_buy() {
        let signed = order_signer()
            .build_order(
                &test_signer(),
                &buy_args(),
                TickSize::Hundredth,
                &OrderOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!(signed.maker_amount, "65000000");
        assert_eq!(signed.taker_amount, "100000000");
        assert_eq!(signed.token_id, "12345");
        assert_eq!(signed.side, Side::Buy);
        assert_eq!(signed.fee_rate_bps, "50");
        assert_eq!(signed.signature_type, 1);
        assert_eq!(signed.maker, signed.signer);
        assert_eq!(signed.taker, Address::ZERO.to_string());
        assert!(signed.signature.starts_with("0x"));
        assert_eq!(signed.signature.len(), 132);
    }

    #[tokio::test]
    async fn test_default_expiration_is_a_year_out() {
        let before = u64::try_from(Utc::now().timestamp()).unwrap();
        let signed = order_signer()
            .build_order(
                &test_signer(),
                &buy_args(),
                TickSize::Hundredth,
                &OrderOptions::default(),
            )
            .await
            .unwrap();

        let expiration: u64 = signed.expiration.parse().unwrap();
        assert!(expiration >= before + 365 * 24 * 60 * 60);
        assert!(expiration <= before + 365 * 24 * 60 * 60 + 60);
    }

    #[tokio::test]
    async fn test_identical_terms_get_fresh_salt_and_signature() {
        let signer = order_signer();
        let wallet = test_signer();
        let a = signer
            .build_order(&wallet, &buy_args(), TickSize::Hundredth, &OrderOptions::default())
            .await
            .unwrap();
        let b = signer
            .build_order(&wallet, &buy_args(), TickSize::Hundredth, &OrderOptions::default())
            .await
            .unwrap();

        assert_ne!(a.salt, b.salt);
        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a.signature, b.signature);
    }

    #[tokio::test]
    async fn test_funder_changes_maker_not_signer() {
        let funder: Address = "0x1111111111111111111111111111111111111111".parse().unwrap();
        let wallet = test_signer();
        let options = OrderOptions {
            funder: Some(funder),
            ..OrderOptions::default()
        };

        let signed = order_signer()
            .build_order(&wallet, &buy_args(), TickSize::Hundredth, &options)
            .await
            .unwrap();

        assert_eq!(signed.maker, funder.to_string());
        assert_eq!(signed.signer, wallet.address().unwrap().to_string());
    }

    #[tokio::test]
    async fn test_configured_funder_is_used_without_override() {
        let funder: Address = "0x2222222222222222222222222222222222222222".parse().unwrap();
        let signer = OrderSigner::new(ClobConfig {
            funder: Some(funder),
            ..ClobConfig::default()
        });

        let signed = signer
            .build_order(&test_signer(), &buy_args(), TickSize::Hundredth, &OrderOptions::default())
            .await
            .unwrap();
        assert_eq!(signed.maker, funder.to_string());
    }

    #[tokio::test]
    async fn test_neg_risk_signs_against_other_contract() {
        let signer = order_signer();
        let wallet = test_signer();
        let address = wallet.address().unwrap();
        let options = OrderOptions {
            nonce: Some(U256::ZERO),
            expiration: Some(1_900_000_000),
            ..OrderOptions::default()
        };
        let legs =
            amounts::limit_amounts(Side::Buy, d("100"), d("0.65"), TickSize::Hundredth).unwrap();
        let order = signer
            .assemble(address, U256::from(1u64), Side::Buy, &legs, &options)
            .unwrap();

        let standard = wallet
            .sign_typed_data(&order.typed_data(signer.config().exchange_domain(false)))
            .await
            .unwrap();
        let neg_risk = wallet
            .sign_typed_data(&order.typed_data(signer.config().exchange_domain(true)))
            .await
            .unwrap();

        assert_ne!(standard, neg_risk);
        assert_eq!(
            order
                .recover_signer(Eip712Domain::neg_risk_ctf_exchange(), &neg_risk)
                .unwrap(),
            address
        );
        assert_ne!(
            order
                .recover_signer(Eip712Domain::ctf_exchange(), &neg_risk)
                .unwrap(),
            address
        );
    }

    #[tokio::test]
    async fn test_signature_recovers_to_signer() {
        let wallet = test_signer();
        let options = OrderOptions {
            neg_risk: true,
            ..OrderOptions::default()
        };
        let signed = order_signer()
            .build_order(&wallet, &buy_args(), TickSize::Hundredth, &options)
            .await
            .unwrap();

        let order = signed.to_order_data().unwrap();
        let recovered = order
            .recover_signer(Eip712Domain::neg_risk_ctf_exchange(), &signed.signature)
            .unwrap();
        assert_eq!(recovered, wallet.address().unwrap());
    }

    #[tokio::test]
    async fn test_overrides_are_applied() {
        let taker: Address = "0x3333333333333333333333333333333333333333".parse().unwrap();
        let options = OrderOptions {
            taker: Some(taker),
            nonce: Some(U256::from(7u64)),
            expiration: Some(1_900_000_000),
            fee_rate_bps: Some(0),
            signature_type: Some(SignatureType::BrowserWallet),
            ..OrderOptions::default()
        };
        let signed = order_signer()
            .build_order(&test_signer(), &buy_args(), TickSize::Hundredth, &options)
            .await
            .unwrap();

        assert_eq!(signed.taker, taker.to_string());
        assert_eq!(signed.nonce, "7");
        assert_eq!(signed.expiration, "1900000000");
        assert_eq!(signed.fee_rate_bps, "0");
        assert_eq!(signed.signature_type, 0);
    }

    #[tokio::test]
    async fn test_market_orders() {
        let signer = order_signer();
        let wallet = test_signer();

        let buy = signer
            .build_market_order(
                &wallet,
                &MarketOrderArgs {
                    token_id: U256::from(1u64),
                    amount: d("10"),
                    price: d("0.3"),
                    side: Side::Buy,
                },
                TickSize::Hundredth,
                &OrderOptions::default(),
            )
            .await
            .unwrap();
        assert_eq!(buy.maker_amount, "10000000");
        assert_eq!(buy.taker_amount, "33330000");

        let sell = signer
            .build_market_order(
                &wallet,
                &MarketOrderArgs {
                    token_id: U256::from(1u64),
                    amount: d("50"),
                    price: d("0.42"),
                    side: Side::Sell,
                },
                TickSize::Hundredth,
                &OrderOptions::default(),
            )
            .await
            .unwrap();
        assert_eq!(sell.maker_amount, "50000000");
        assert_eq!(sell.taker_amount, "21000000");
    }

    #[tokio::test]
    async fn test_rejects_out_of_range_inputs() {
        let signer = order_signer();
        let wallet = test_signer();

        let mut args = buy_args();
        args.price = d("1.5");
        let err = signer
            .build_order(&wallet, &args, TickSize::Hundredth, &OrderOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Order { .. }));

        let mut args = buy_args();
        args.size = d("-1");
        assert!(signer
            .build_order(&wallet, &args, TickSize::Hundredth, &OrderOptions::default())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_unrepresentable_amounts_are_order_errors() {
        let signer = order_signer();
        let wallet = test_signer();

        let mut args = buy_args();
        args.size = d("100000000000000000000000");
        let err = signer
            .build_order(&wallet, &args, TickSize::Hundredth, &OrderOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Order { .. }));

        let market = MarketOrderArgs {
            token_id: U256::from(12345u64),
            amount: d("1000000000"),
            price: d("0.0000000000000000001"),
            side: Side::Buy,
        };
        let err = signer
            .build_market_order(&wallet, &market, TickSize::Hundredth, &OrderOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Order { .. }));
    }

    #[tokio::test]
    async fn test_remote_wallet_without_account_is_config_error() {
        let wallet = WalletSigner::remote(Arc::new(KeyBackedRemote { key: None }));
        let err = order_signer()
            .build_order(&wallet, &buy_args(), TickSize::Hundredth, &OrderOptions::default())
            .await
            .unwrap_err();
        assert!(err.is_config());
    }

    #[tokio::test]
    async fn test_remote_and_local_wallets_agree() {
        let key = PrivateKeySigner::from_str(TEST_PRIVATE_KEY.trim_start_matches("0x")).unwrap();
        let remote = WalletSigner::remote(Arc::new(KeyBackedRemote { key: Some(key) }));
        let local = test_signer();
        let signer = order_signer();

        let legs = amounts::limit_amounts(Side::Sell, d("10"), d("0.5"), TickSize::Tenth).unwrap();
        let order = signer
            .assemble(
                local.address().unwrap(),
                U256::from(9u64),
                Side::Sell,
                &legs,
                &OrderOptions::default(),
            )
            .unwrap();
        let payload = order.typed_data(signer.config().exchange_domain(false));

        assert_eq!(
            local.sign_typed_data(&payload).await.unwrap(),
            remote.sign_typed_data(&payload).await.unwrap()
        );
    }

    #[test]
    fn test_parse_base_units_rejects_fractions() {
        assert!(parse_base_units("makerAmount", "1.5").is_err());
        assert!(parse_base_units("makerAmount", "-1").is_err());
        assert_eq!(parse_base_units("makerAmount", "42").unwrap(), U256::from(42u64));
    }

    #[test]
    fn test_debug_shows_no_key_material() {
        let debug_str = format!("{:?}", order_signer());
        assert!(debug_str.contains("OrderSigner"));
        assert!(debug_str.contains("chain_id"));
    }
}
