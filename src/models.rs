use std::collections::BTreeMap;
use std::fmt;

use num_bigint::{BigInt, Sign};
use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::math::fixed_point::{FixedPointAmount, ScaledAmount};
use crate::math::spacing::{TickIndex, TickSpacing};
use crate::math::tick_math::SqrtPrice;

/// Decimal places of on-chain liquidity values.
pub const LIQUIDITY_SCALE: u32 = 6;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(pub String);

impl TokenId {
    pub fn new(address: impl Into<String>) -> Self {
        TokenId(address.into())
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub address: TokenId,
    pub symbol: String,
    pub decimals: u8,
}

/// Sparse on-chain tick record: liquidity added (`sign = true`) or removed
/// when the price crosses `index` upwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawTick {
    pub index: TickIndex,
    pub liquidity_change: FixedPointAmount,
    pub sign: bool,
}

impl RawTick {
    pub fn new(index: i32, liquidity_change: FixedPointAmount, sign: bool) -> Self {
        Self { index: TickIndex(index), liquidity_change, sign }
    }

    /// Signed liquidity delta in raw units.
    pub fn liquidity_net(&self) -> BigInt {
        let sign = if self.sign { Sign::Plus } else { Sign::Minus };
        BigInt::from_biguint(sign, self.liquidity_change.value.clone())
    }
}

/// Pool snapshot, owned by the data source and only read here.
#[derive(Clone, Debug)]
pub struct Pool {
    pub token_x: TokenId,
    pub token_y: TokenId,
    pub fee: Decimal,
    pub tick_spacing: TickSpacing,
    pub sqrt_price: SqrtPrice,
    pub current_tick: TickIndex,
    pub liquidity: FixedPointAmount,
    pub ticks: BTreeMap<TickIndex, RawTick>,
}

impl Pool {
    /// Whether the pool trades `a` against `b` in either order.
    pub fn quotes_pair(&self, a: &TokenId, b: &TokenId) -> bool {
        (self.token_x == *a && self.token_y == *b) || (self.token_x == *b && self.token_y == *a)
    }

    /// Fee in parts per million.
    pub fn fee_ppm(&self) -> u32 {
        (self.fee * Decimal::from(1_000_000u32)).round().to_u32().unwrap_or(u32::MAX)
    }

    pub fn raw_ticks(&self) -> Vec<RawTick> {
        self.ticks.values().cloned().collect()
    }
}

/// One vertex of the liquidity step chart.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlotPoint {
    pub x: f64,
    pub y: f64,
    pub index: i32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimulationResult {
    pub amount_out: ScaledAmount,
    pub succeeded: bool,
    /// Index into the candidate pool slice; `None` unless `succeeded`.
    pub pool_index: Option<usize>,
}

impl SimulationResult {
    pub fn failed(scale: u32) -> Self {
        Self { amount_out: FixedPointAmount::zero(scale), succeeded: false, pool_index: None }
    }
}
