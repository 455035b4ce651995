use std::sync::Arc;

use rust_decimal::Decimal;

use crate::bootstrap::AppState;
use crate::engine::liquidity_plot::{build_liquidity_plot, placeholder_liquidity_plot};
use crate::engine::router::{simulate_route, ClmmSimulator, RouteRequest};
use crate::error::{Error, MathError, Result};
use crate::math::fixed_point::FixedPointAmount;
use crate::math::spacing::TickIndex;
use crate::math::tick_math::{price_at_tick, tick_at_price, Price, QuoteDirection};
use crate::models::{PlotPoint, Pool, SimulationResult, TokenId, TokenInfo};

pub struct PriceQuote {
    pub pool_index: usize,
    pub tick: TickIndex,
    pub price: Price,
    pub direction: QuoteDirection,
}

pub struct LiquidityPlot {
    pub pool_index: usize,
    pub direction: QuoteDirection,
    pub placeholder: bool,
    pub points: Vec<PlotPoint>,
}

pub struct RouteQuote {
    pub timestamp_utc: String,
    pub from: TokenInfo,
    pub to: TokenInfo,
    pub amount_in: FixedPointAmount,
    pub slippage: Decimal,
    pub result: SimulationResult,
}

fn pool_with_decimals(state: &AppState, pool_index: usize) -> Result<(&Pool, u8, u8)> {
    let pool = state.snapshot.pool(pool_index).ok_or(Error::UnknownPool(pool_index))?;
    let x = token(state, &pool.token_x)?;
    let y = token(state, &pool.token_y)?;
    Ok((pool, x.decimals, y.decimals))
}

fn token<'a>(state: &'a AppState, id: &TokenId) -> Result<&'a TokenInfo> {
    state.snapshot.token(id).ok_or_else(|| Error::UnknownToken(id.to_string()))
}

/// Human price at `tick` in the pool's token units.
pub fn price_for_tick(state: &AppState, pool_index: usize, tick: i32, x_to_y: bool) -> Result<PriceQuote> {
    let (_, dx, dy) = pool_with_decimals(state, pool_index)?;
    let direction = QuoteDirection::from_x_to_y(x_to_y);
    let tick = TickIndex(tick);
    if !state.constants.contains(tick) {
        return Err(MathError::TickOutOfRange {
            tick: tick.0,
            min: state.constants.min_tick,
            max: state.constants.max_tick,
        }
        .into());
    }
    Ok(PriceQuote { pool_index, tick, price: price_at_tick(tick, direction, dx, dy), direction })
}

/// Valid tick of the pool's grid closest to a human price.
pub fn tick_for_price(state: &AppState, pool_index: usize, price: f64, x_to_y: bool) -> Result<PriceQuote> {
    let (pool, dx, dy) = pool_with_decimals(state, pool_index)?;
    let direction = QuoteDirection::from_x_to_y(x_to_y);
    let tick = tick_at_price(&state.constants, Price(price), pool.tick_spacing, direction, dx, dy)?;
    Ok(PriceQuote { pool_index, tick, price: price_at_tick(tick, direction, dx, dy), direction })
}

/// Step chart of the pool's liquidity. Pools without tick data get the flat
/// placeholder when `placeholder` is given.
pub fn liquidity_plot(state: &AppState, pool_index: usize, x_to_y: bool, placeholder: Option<f64>) -> Result<LiquidityPlot> {
    let (pool, dx, dy) = pool_with_decimals(state, pool_index)?;
    let direction = QuoteDirection::from_x_to_y(x_to_y);

    let (points, placeholder) = match placeholder {
        Some(value) if pool.ticks.is_empty() => (
            placeholder_liquidity_plot(&state.constants, value, pool.tick_spacing, direction, dx, dy),
            true,
        ),
        _ => (
            build_liquidity_plot(&state.constants, &pool.raw_ticks(), pool.tick_spacing, direction, dx, dy)?,
            false,
        ),
    };
    Ok(LiquidityPlot { pool_index, direction, placeholder, points })
}

/// Best pool for swapping `amount` (in `from` units) into `to`.
pub fn quote_route(state: &AppState, from: &TokenId, to: &TokenId, amount: &str, slippage: Option<Decimal>) -> Result<RouteQuote> {
    let from_info = token(state, from)?.clone();
    let to_info = token(state, to)?.clone();
    let amount_in = FixedPointAmount::parse(amount, from_info.decimals as u32)?;
    let slippage = slippage.unwrap_or(state.default_slippage);

    let simulator = ClmmSimulator::new(state.constants);
    let request = RouteRequest {
        from,
        to,
        amount: &amount_in,
        slippage,
        price_hint: None,
        out_scale: to_info.decimals as u32,
    };
    let result = simulate_route(&simulator, &state.snapshot.pools, &request);
    log::info!(
        "Route {} {} -> {}: succeeded={} out={} pool={:?}",
        amount_in,
        from_info.symbol,
        to_info.symbol,
        result.succeeded,
        result.amount_out,
        result.pool_index
    );

    Ok(RouteQuote {
        timestamp_utc: chrono::Utc::now().to_rfc3339(),
        from: from_info,
        to: to_info,
        amount_in,
        slippage,
        result,
    })
}

/// Runs [`quote_route`] on the blocking pool; tick walks over deep pools are
/// CPU-bound.
pub async fn simulate_swap_route(
    state: Arc<AppState>,
    from: TokenId,
    to: TokenId,
    amount: String,
    slippage: Option<Decimal>,
) -> Result<RouteQuote> {
    tokio::task::spawn_blocking(move || quote_route(&state, &from, &to, &amount, slippage))
        .await
        .map_err(|e| Error::Internal(format!("route simulation task failed: {}", e)))?
}
