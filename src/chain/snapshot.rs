// snapshot.rs
// Read-only pool/tick snapshot loaded from a JSON file. Big numbers travel as
// decimal strings so nothing is lost to f64.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::MathError;
use crate::math::fixed_point::FixedPointAmount;
use crate::math::spacing::{ProtocolConstants, TickIndex, TickSpacing};
use crate::math::tick_math::{sqrt_price_at_tick, tick_at_sqrt_price, SqrtPrice};
use crate::models::{Pool, RawTick, TokenId, TokenInfo, LIQUIDITY_SCALE};

#[derive(Debug, Deserialize)]
struct SnapshotFile {
    tokens: Vec<TokenInfo>,
    pools: Vec<PoolRecord>,
}

#[derive(Debug, Deserialize)]
struct PoolRecord {
    token_x: TokenId,
    token_y: TokenId,
    fee: String,
    tick_spacing: i32,
    sqrt_price: String,
    #[serde(default)]
    current_tick: Option<i32>,
    liquidity: String,
    #[serde(default)]
    ticks: Vec<TickRecord>,
}

#[derive(Debug, Deserialize)]
struct TickRecord {
    index: i32,
    liquidity_change: String,
    sign: bool,
}

/// Tokens and pools as seen at one point in time.
#[derive(Clone, Debug, Default)]
pub struct MarketSnapshot {
    pub tokens: HashMap<TokenId, TokenInfo>,
    pub pools: Vec<Pool>,
}

impl MarketSnapshot {
    pub fn token(&self, id: &TokenId) -> Option<&TokenInfo> {
        self.tokens.get(id)
    }

    pub fn pool(&self, index: usize) -> Option<&Pool> {
        self.pools.get(index)
    }
}

/// The tick implied by the sqrt price. On an exact tick boundary the tick
/// below is accepted too, as left behind by a downward cross.
fn resolve_current_tick(sqrt_price: &SqrtPrice, given: Option<i32>) -> Result<TickIndex, MathError> {
    let derived = tick_at_sqrt_price(sqrt_price);
    match given {
        None => Ok(derived),
        Some(t) if t == derived.0 => Ok(derived),
        Some(t) if t == derived.0 - 1 && sqrt_price_at_tick(derived) == *sqrt_price => Ok(TickIndex(t)),
        Some(t) => Err(MathError::CurrentTickMismatch { given: t, derived: derived.0 }),
    }
}

fn convert_pool(constants: &ProtocolConstants, record: PoolRecord) -> Result<Pool, MathError> {
    let tick_spacing = TickSpacing::new(record.tick_spacing)?;
    let fee = Decimal::from_str(record.fee.trim()).map_err(|_| MathError::InvalidDecimal(record.fee.clone()))?;
    if fee.is_sign_negative() || fee >= Decimal::ONE {
        return Err(MathError::InvalidFee(record.fee));
    }
    let sqrt_price = SqrtPrice::parse(&record.sqrt_price)?;
    let current_tick = resolve_current_tick(&sqrt_price, record.current_tick)?;
    if !constants.contains(current_tick) {
        return Err(MathError::TickOutOfRange { tick: current_tick.0, min: constants.min_tick, max: constants.max_tick });
    }
    let liquidity = FixedPointAmount::parse(&record.liquidity, LIQUIDITY_SCALE)?;

    let mut ticks = BTreeMap::new();
    for t in record.ticks {
        let change = FixedPointAmount::parse(&t.liquidity_change, LIQUIDITY_SCALE)?;
        let tick = RawTick::new(t.index, change, t.sign);
        if ticks.insert(tick.index, tick).is_some() {
            return Err(MathError::DuplicateTick(t.index));
        }
    }

    Ok(Pool {
        token_x: record.token_x,
        token_y: record.token_y,
        fee,
        tick_spacing,
        sqrt_price,
        current_tick,
        liquidity,
        ticks,
    })
}

/// Parses snapshot JSON. Every pool must reference known tokens.
pub fn parse_snapshot(json: &str, constants: &ProtocolConstants) -> Result<MarketSnapshot> {
    let file: SnapshotFile = serde_json::from_str(json).context("Malformed pool snapshot JSON")?;

    let mut tokens = HashMap::with_capacity(file.tokens.len());
    for token in file.tokens {
        if tokens.insert(token.address.clone(), token.clone()).is_some() {
            bail!("Token {} listed twice", token.address);
        }
    }

    let mut pools = Vec::with_capacity(file.pools.len());
    for (i, record) in file.pools.into_iter().enumerate() {
        for id in [&record.token_x, &record.token_y] {
            if !tokens.contains_key(id) {
                bail!("Pool {} references unknown token {}", i, id);
            }
        }
        if record.token_x == record.token_y {
            bail!("Pool {} trades {} against itself", i, record.token_x);
        }
        let pool = convert_pool(constants, record).with_context(|| format!("Invalid pool {}", i))?;
        pools.push(pool);
    }

    Ok(MarketSnapshot { tokens, pools })
}

pub fn load_snapshot(path: &Path, constants: &ProtocolConstants) -> Result<MarketSnapshot> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read pool snapshot {}", path.display()))?;
    parse_snapshot(&json, constants).with_context(|| format!("Failed to load pool snapshot {}", path.display()))
}
