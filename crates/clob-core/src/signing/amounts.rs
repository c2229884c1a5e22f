//! Conversion of human-facing order parameters into on-chain amounts.
//!
//! All arithmetic is exact decimal fixed point. Payment legs are always
//! rounded down so a signed order never asks the counter-party for more than
//! the literal size and price produce.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::domain::Side;
use crate::{Error, Result};

/// USDC and outcome tokens both use 6 decimals.
pub const USDC_DECIMALS: u32 = 6;

/// Minimum price increment a market accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TickSize {
    /// 0.1
    Tenth,
    /// 0.01
    Hundredth,
    /// 0.001
    Thousandth,
    /// 0.0001
    TenThousandth,
}

impl TickSize {
    pub const ALL: [TickSize; 4] = [
        TickSize::Tenth,
        TickSize::Hundredth,
        TickSize::Thousandth,
        TickSize::TenThousandth,
    ];

    /// Number of decimals prices and payment legs are rounded to.
    pub fn decimals(&self) -> u32 {
        match self {
            TickSize::Tenth => 1,
            TickSize::Hundredth => 2,
            TickSize::Thousandth => 3,
            TickSize::TenThousandth => 4,
        }
    }

    pub fn as_decimal(&self) -> Decimal {
        Decimal::new(1, self.decimals())
    }
}

impl std::fmt::Display for TickSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_decimal())
    }
}

impl FromStr for TickSize {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let value = Decimal::from_str(s.trim())
            .map_err(|e| Error::order(format!("Invalid tick size {s:?}: {e}")))?;
        TickSize::ALL
            .into_iter()
            .find(|tick| tick.as_decimal() == value)
            .ok_or_else(|| Error::order(format!("Unsupported tick size: {s}")))
    }
}

impl TryFrom<String> for TickSize {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<TickSize> for String {
    fn from(tick: TickSize) -> Self {
        tick.to_string()
    }
}

/// Maker and taker legs in base units, as decimal-integer strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderAmounts {
    pub maker_amount: String,
    pub taker_amount: String,
}

impl OrderAmounts {
    fn new(maker: Decimal, taker: Decimal) -> Result<Self> {
        Ok(Self {
            maker_amount: to_base_units(maker)?,
            taker_amount: to_base_units(taker)?,
        })
    }

    /// USDC per share implied by the two legs, rounded to `decimals`.
    ///
    /// For display and logging only; `None` when the share leg is zero.
    pub fn implied_price(&self, side: Side, decimals: u32) -> Option<Decimal> {
        let maker = Decimal::from_str(&self.maker_amount).ok()?;
        let taker = Decimal::from_str(&self.taker_amount).ok()?;
        let (usdc, shares) = match side {
            Side::Buy => (maker, taker),
            Side::Sell => (taker, maker),
        };
        if shares.is_zero() {
            return None;
        }
        usdc.checked_div(shares)
            .map(|price| round_normal(price, decimals))
    }
}

/// Floor `value` to `decimals` places. Never rounds up.
pub fn round_down(value: Decimal, decimals: u32) -> Decimal {
    value.round_dp_with_strategy(decimals, RoundingStrategy::ToNegativeInfinity)
}

/// Round half away from zero. Not for payment legs.
pub fn round_normal(value: Decimal, decimals: u32) -> Decimal {
    value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero)
}

/// Ceil `value` to `decimals` places. Not for payment legs.
pub fn round_up(value: Decimal, decimals: u32) -> Decimal {
    value.round_dp_with_strategy(decimals, RoundingStrategy::ToPositiveInfinity)
}

/// Align a price down onto the tick grid.
///
/// Ticks are powers of ten, so the grid is the tick's decimal places.
pub fn align_price(price: Decimal, tick: TickSize) -> Decimal {
    round_down(price, tick.decimals())
}

/// Scale a human amount to base units, truncating anything finer than 10^-6.
///
/// Fails when the scaled value no longer fits a `Decimal`.
pub fn to_base_units(amount: Decimal) -> Result<String> {
    let scaled = amount
        .checked_mul(Decimal::from(10u64.pow(USDC_DECIMALS)))
        .ok_or_else(|| Error::order(format!("Amount {amount} is too large for base units")))?
        .trunc();
    if scaled.is_zero() {
        return Ok("0".to_string());
    }
    Ok(scaled.normalize().to_string())
}

fn notional(shares: Decimal, price: Decimal) -> Result<Decimal> {
    shares
        .checked_mul(price)
        .ok_or_else(|| Error::order(format!("{shares} shares at {price} overflows")))
}

/// Limit BUY: pay `size * price` USDC (rounded down), receive `size` shares.
pub fn limit_buy_amounts(size: Decimal, price: Decimal, tick: TickSize) -> Result<OrderAmounts> {
    let price = align_price(price, tick);
    let usdc = round_down(notional(size, price)?, tick.decimals());
    OrderAmounts::new(usdc, size)
}

/// Limit SELL: give `size` shares, receive `size * price` USDC (rounded down).
pub fn limit_sell_amounts(size: Decimal, price: Decimal, tick: TickSize) -> Result<OrderAmounts> {
    let price = align_price(price, tick);
    let usdc = round_down(notional(size, price)?, tick.decimals());
    OrderAmounts::new(size, usdc)
}

/// Market BUY: spend `budget` USDC, receive `budget / price` shares (rounded down).
///
/// A zero price buys nothing rather than failing.
pub fn market_buy_amounts(budget: Decimal, price: Decimal, tick: TickSize) -> Result<OrderAmounts> {
    let shares = if price.is_zero() {
        Decimal::ZERO
    } else {
        let shares = budget.checked_div(price).ok_or_else(|| {
            Error::order(format!("Budget {budget} at price {price} overflows"))
        })?;
        round_down(shares, tick.decimals())
    };
    OrderAmounts::new(budget, shares)
}

/// Market SELL: give `shares`, receive `shares * price` USDC (rounded down).
pub fn market_sell_amounts(shares: Decimal, price: Decimal, tick: TickSize) -> Result<OrderAmounts> {
    let usdc = round_down(notional(shares, price)?, tick.decimals());
    OrderAmounts::new(shares, usdc)
}

/// Limit order legs for either side.
pub fn limit_amounts(
    side: Side,
    size: Decimal,
    price: Decimal,
    tick: TickSize,
) -> Result<OrderAmounts> {
    match side {
        Side::Buy => limit_buy_amounts(size, price, tick),
        Side::Sell => limit_sell_amounts(size, price, tick),
    }
}

/// Market order legs; `amount` is USDC for BUY and shares for SELL.
pub fn market_amounts(
    side: Side,
    amount: Decimal,
    price: Decimal,
    tick: TickSize,
) -> Result<OrderAmounts> {
    match side {
        Side::Buy => market_buy_amounts(amount, price, tick),
        Side::Sell => market_sell_amounts(amount, price, tick),
    }
}

/// Reject inputs the calculator is not defined for.
pub fn validate_price_and_size(price: Decimal, size: Decimal) -> Result<()> {
    if price < Decimal::ZERO || price > Decimal::ONE {
        return Err(Error::order(format!(
            "Price {price} is outside the valid range [0, 1]"
        )));
    }
    if size < Decimal::ZERO {
        return Err(Error::order(format!("Size {size} must not be negative")));
    }
    Ok(())
}
