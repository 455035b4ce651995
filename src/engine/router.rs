// router.rs
// Best-output pool selection across every pool quoting a token pair.

use num_bigint::BigUint;
use num_traits::Zero;
use rust_decimal::Decimal;

use crate::error::SimulationError;
use crate::math::clmm_swap::simulate_exact_in;
use crate::math::fixed_point::{FixedPointAmount, ScaledAmount};
use crate::math::spacing::ProtocolConstants;
use crate::math::tick_math::SqrtPrice;
use crate::models::{Pool, SimulationResult, TokenId};

/// Per-pool exact-input quote. Implementations must not mutate the pool.
pub trait SwapSimulator {
    fn amount_out(
        &self,
        pool: &Pool,
        x_to_y: bool,
        amount_in: &BigUint,
        slippage: Decimal,
        price_hint: Option<&SqrtPrice>,
    ) -> Result<BigUint, SimulationError>;
}

/// Tick-walking simulator over the pool snapshot.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClmmSimulator {
    pub constants: ProtocolConstants,
}

impl ClmmSimulator {
    pub fn new(constants: ProtocolConstants) -> Self {
        Self { constants }
    }
}

impl SwapSimulator for ClmmSimulator {
    fn amount_out(
        &self,
        pool: &Pool,
        x_to_y: bool,
        amount_in: &BigUint,
        slippage: Decimal,
        price_hint: Option<&SqrtPrice>,
    ) -> Result<BigUint, SimulationError> {
        simulate_exact_in(&self.constants, pool, x_to_y, amount_in, slippage, price_hint).map(|r| r.amount_out)
    }
}

#[derive(Clone, Debug)]
pub struct RouteRequest<'a> {
    pub from: &'a TokenId,
    pub to: &'a TokenId,
    /// Input in `from` token units.
    pub amount: &'a ScaledAmount,
    pub slippage: Decimal,
    pub price_hint: Option<&'a SqrtPrice>,
    /// Decimals of the `to` token.
    pub out_scale: u32,
}

/// Positions in `pools` of every pool trading `from` against `to`, in order.
pub fn candidate_pools(pools: &[Pool], from: &TokenId, to: &TokenId) -> Vec<usize> {
    pools
        .iter()
        .enumerate()
        .filter(|(_, p)| p.quotes_pair(from, to))
        .map(|(i, _)| i)
        .collect()
}

/// Simulates the request in every candidate pool and keeps the largest
/// output. Failing candidates are skipped; on equal outputs the earlier pool
/// is kept.
pub fn simulate_route<S: SwapSimulator + ?Sized>(
    simulator: &S,
    pools: &[Pool],
    request: &RouteRequest<'_>,
) -> SimulationResult {
    let candidates = candidate_pools(pools, request.from, request.to);
    if candidates.is_empty() {
        log::warn!("No pool quotes {} -> {}", request.from, request.to);
        return SimulationResult::failed(request.out_scale);
    }
    if request.amount.is_zero() {
        return SimulationResult::failed(request.out_scale);
    }

    let mut best: Option<(usize, BigUint)> = None;
    for index in candidates {
        let pool = &pools[index];
        let x_to_y = pool.token_x == *request.from;
        match simulator.amount_out(pool, x_to_y, &request.amount.value, request.slippage, request.price_hint) {
            Ok(out) => {
                log::debug!("Pool {} quoted {} for {} in", index, out, request.amount.value);
                match &best {
                    Some((_, best_out)) if out <= *best_out => {}
                    _ => best = Some((index, out)),
                }
            }
            Err(e) => {
                log::warn!("Skipping pool {} ({} -> {}): {}", index, request.from, request.to, e);
            }
        }
    }

    match best {
        Some((index, out)) => SimulationResult {
            amount_out: FixedPointAmount::new(out, request.out_scale),
            succeeded: true,
            pool_index: Some(index),
        },
        None => SimulationResult::failed(request.out_scale),
    }
}

/// Whether a route result carries a usable quote.
pub fn is_quotable(result: &SimulationResult) -> bool {
    result.succeeded && result.pool_index.is_some() && !result.amount_out.value.is_zero()
}
