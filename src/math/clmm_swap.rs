// Exact-input concentrated-liquidity swap simulator over a pool snapshot.
// ----------------------------------------------------------------------------
// Square-root prices are PRICE_SCALE fixed-point integers, liquidity carries
// the pool's liquidity scale, token amounts are raw smallest units. Rounding
// always favours the pool: input is rounded up, output down.

use num_bigint::{BigInt, BigUint};
use num_integer::Roots;
use num_traits::Zero;
use rust_decimal::Decimal;

use crate::error::{MathError, SimulationError};
use crate::math::fixed_point::{ceil_div, pow10};
use crate::math::spacing::{ProtocolConstants, TickIndex};
use crate::math::tick_math::{sqrt_price_at_tick, tick_at_sqrt_price, SqrtPrice, PRICE_SCALE};
use crate::models::Pool;

const FEE_DENOMINATOR_PPM: u32 = 1_000_000;

#[derive(Clone, Debug)]
pub struct SwapParams {
    pub x_to_y: bool,
    pub amount_in: BigUint,
    pub sqrt_price_limit: SqrtPrice,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwapResult {
    pub amount_in: BigUint,
    pub amount_out: BigUint,
    pub fee: BigUint,
    pub sqrt_price: SqrtPrice,
    pub tick: TickIndex,
    pub liquidity: BigUint,
    pub crossed_ticks: usize,
}

// --------------------------------- Helpers ---------------------------------

#[inline]
fn price_denominator() -> BigUint {
    pow10(PRICE_SCALE)
}

#[inline]
fn div_up(a: &BigUint, b: &BigUint) -> Result<BigUint, MathError> {
    ceil_div(a, b)
}

#[inline]
fn div_down(a: &BigUint, b: &BigUint) -> Result<BigUint, MathError> {
    if b.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    Ok(a / b)
}

#[inline]
fn ordered<'a>(a: &'a BigUint, b: &'a BigUint) -> (&'a BigUint, &'a BigUint) {
    if a < b { (a, b) } else { (b, a) }
}

// --------------------------- Amount deltas -----------------------------------

/// Token X between two square-root prices:
/// `L * (sb - sa) / (sa * sb)`, with L = liquidity / D.
pub fn amount_x_delta(
    sqrt_a: &BigUint,
    sqrt_b: &BigUint,
    liquidity: &BigUint,
    liquidity_denominator: &BigUint,
    round_up: bool,
) -> Result<BigUint, MathError> {
    let (sa, sb) = ordered(sqrt_a, sqrt_b);
    if liquidity.is_zero() || sa.is_zero() || sa == sb {
        return Ok(BigUint::zero());
    }
    let numerator = liquidity * price_denominator() * (sb - sa);
    let denominator = liquidity_denominator * sa * sb;
    if round_up { div_up(&numerator, &denominator) } else { div_down(&numerator, &denominator) }
}

/// Token Y between two square-root prices: `L * (sb - sa)`.
pub fn amount_y_delta(
    sqrt_a: &BigUint,
    sqrt_b: &BigUint,
    liquidity: &BigUint,
    liquidity_denominator: &BigUint,
    round_up: bool,
) -> Result<BigUint, MathError> {
    let (sa, sb) = ordered(sqrt_a, sqrt_b);
    if liquidity.is_zero() || sa == sb {
        return Ok(BigUint::zero());
    }
    let numerator = liquidity * (sb - sa);
    let denominator = price_denominator() * liquidity_denominator;
    if round_up { div_up(&numerator, &denominator) } else { div_down(&numerator, &denominator) }
}

// ----------------------------- Next price helpers -----------------------------

/// Price after adding X: `ceil(L * sp / (L + amount * sp))`.
fn next_sqrt_from_x_input(
    liquidity: &BigUint,
    sqrt_price: &BigUint,
    amount: &BigUint,
    denominator: &BigUint,
) -> Result<BigUint, MathError> {
    if amount.is_zero() || liquidity.is_zero() {
        return Ok(sqrt_price.clone());
    }
    let scaled_liquidity = liquidity * price_denominator();
    let numerator = &scaled_liquidity * sqrt_price;
    let divisor = scaled_liquidity + amount * sqrt_price * denominator;
    div_up(&numerator, &divisor)
}

/// Price after adding Y: `sp + floor(amount / L)`.
fn next_sqrt_from_y_input(
    liquidity: &BigUint,
    sqrt_price: &BigUint,
    amount: &BigUint,
    denominator: &BigUint,
) -> Result<BigUint, MathError> {
    if amount.is_zero() || liquidity.is_zero() {
        return Ok(sqrt_price.clone());
    }
    Ok(sqrt_price + div_down(&(amount * price_denominator() * denominator), liquidity)?)
}

// ------------------------------- Swap math step -------------------------------

struct SwapStep {
    next_sqrt_price: BigUint,
    amount_in: BigUint,
    amount_out: BigUint,
    fee: BigUint,
}

fn compute_swap_step(
    sqrt_price: &BigUint,
    sqrt_price_target: &BigUint,
    liquidity: &BigUint,
    liquidity_denominator: &BigUint,
    amount_remaining: &BigUint,
    fee_ppm: u32,
    x_to_y: bool,
) -> Result<SwapStep, MathError> {
    let denom = BigUint::from(FEE_DENOMINATOR_PPM);
    let fee_complement = BigUint::from(FEE_DENOMINATOR_PPM - fee_ppm);

    let amount_in_to_target = if x_to_y {
        amount_x_delta(sqrt_price_target, sqrt_price, liquidity, liquidity_denominator, true)?
    } else {
        amount_y_delta(sqrt_price, sqrt_price_target, liquidity, liquidity_denominator, true)?
    };
    let gross_to_target = div_up(&(&amount_in_to_target * &denom), &fee_complement)?;

    if gross_to_target <= *amount_remaining {
        let amount_out = if x_to_y {
            amount_y_delta(sqrt_price_target, sqrt_price, liquidity, liquidity_denominator, false)?
        } else {
            amount_x_delta(sqrt_price, sqrt_price_target, liquidity, liquidity_denominator, false)?
        };
        let fee = &gross_to_target - &amount_in_to_target;
        return Ok(SwapStep { next_sqrt_price: sqrt_price_target.clone(), amount_in: amount_in_to_target, amount_out, fee });
    }

    // partial move: the rest of the input is consumed inside this range
    let amount_less_fee = (amount_remaining * &fee_complement) / &denom;
    let next = if x_to_y {
        next_sqrt_from_x_input(liquidity, sqrt_price, &amount_less_fee, liquidity_denominator)?
    } else {
        next_sqrt_from_y_input(liquidity, sqrt_price, &amount_less_fee, liquidity_denominator)?
    };
    let (mut amount_in, amount_out) = if x_to_y {
        (
            amount_x_delta(&next, sqrt_price, liquidity, liquidity_denominator, true)?,
            amount_y_delta(&next, sqrt_price, liquidity, liquidity_denominator, false)?,
        )
    } else {
        (
            amount_y_delta(sqrt_price, &next, liquidity, liquidity_denominator, true)?,
            amount_x_delta(sqrt_price, &next, liquidity, liquidity_denominator, false)?,
        )
    };
    if amount_in > *amount_remaining {
        amount_in = amount_remaining.clone();
    }
    let fee = amount_remaining - &amount_in;
    Ok(SwapStep { next_sqrt_price: next, amount_in, amount_out, fee })
}

// ------------------------------- Price limit ---------------------------------

/// Square-root price limit for a swap that may move the price by at most
/// `slippage` (a fraction) away from `hint`.
pub fn price_limit_after_slippage(hint: &SqrtPrice, slippage: Decimal, x_to_y: bool) -> Result<SqrtPrice, MathError> {
    if slippage.is_sign_negative() || slippage >= Decimal::ONE {
        return Err(MathError::InvalidSlippage(slippage.to_string()));
    }
    let scale_denominator = pow10(slippage.scale());
    let mantissa = BigUint::from(slippage.mantissa().unsigned_abs());
    let factor = if x_to_y { &scale_denominator - &mantissa } else { &scale_denominator + &mantissa };

    // price carries 2 * PRICE_SCALE decimals, its root PRICE_SCALE again
    let price = hint.value() * hint.value() * factor / scale_denominator;
    Ok(SqrtPrice(Roots::sqrt(&price)))
}

// -------------------------------- Simulator ---------------------------------

fn validate_tick_map(constants: &ProtocolConstants, pool: &Pool) -> Result<(), SimulationError> {
    for (index, tick) in &pool.ticks {
        if tick.index != *index || !constants.is_valid_tick(*index, pool.tick_spacing) {
            return Err(SimulationError::MalformedTickMap(index.0));
        }
        if tick.liquidity_change.scale != pool.liquidity.scale {
            return Err(MathError::ScaleMismatch { left: pool.liquidity.scale, right: tick.liquidity_change.scale }.into());
        }
    }
    Ok(())
}

fn next_initialized_tick(pool: &Pool, current_tick: TickIndex, x_to_y: bool) -> Option<TickIndex> {
    if x_to_y {
        pool.ticks.range(..=current_tick).next_back().map(|(&t, _)| t)
    } else {
        pool.ticks.range(TickIndex(current_tick.0.saturating_add(1))..).next().map(|(&t, _)| t)
    }
}

fn cross_tick(pool: &Pool, liquidity: &BigUint, tick: TickIndex, x_to_y: bool) -> Result<BigUint, SimulationError> {
    let Some(info) = pool.ticks.get(&tick) else {
        return Ok(liquidity.clone());
    };
    let net = info.liquidity_net();
    // moving left removes what crossing rightwards would add
    let next = if x_to_y { BigInt::from(liquidity.clone()) - net } else { BigInt::from(liquidity.clone()) + net };
    next.to_biguint().ok_or(SimulationError::MalformedTickMap(tick.0))
}

/// Exact-input swap against one pool snapshot. The snapshot is not modified.
pub fn simulate_swap(constants: &ProtocolConstants, pool: &Pool, params: &SwapParams) -> Result<SwapResult, SimulationError> {
    if params.amount_in.is_zero() {
        return Err(SimulationError::ZeroAmount);
    }
    validate_tick_map(constants, pool)?;

    let limit = params.sqrt_price_limit.value();
    let x_to_y = params.x_to_y;
    if (x_to_y && *limit >= pool.sqrt_price.0) || (!x_to_y && *limit <= pool.sqrt_price.0) {
        return Err(SimulationError::InvalidPriceLimit);
    }

    let liquidity_denominator = pow10(pool.liquidity.scale);
    let fee_ppm = pool.fee_ppm().min(FEE_DENOMINATOR_PPM - 1);

    let mut amount_remaining = params.amount_in.clone();
    let mut amount_out = BigUint::zero();
    let mut fee_total = BigUint::zero();
    let mut sqrt_price = pool.sqrt_price.0.clone();
    let mut liquidity = pool.liquidity.value.clone();
    let mut current_tick = pool.current_tick;
    let mut crossed_ticks = 0usize;

    while !amount_remaining.is_zero() {
        let next_tick = next_initialized_tick(pool, current_tick, x_to_y);
        if next_tick.is_none() && liquidity.is_zero() {
            return Err(SimulationError::InsufficientLiquidity);
        }

        let tick_sqrt = next_tick.map(|t| sqrt_price_at_tick(t).0);
        let target = match &tick_sqrt {
            Some(s) if x_to_y => s.max(limit).clone(),
            Some(s) => s.min(limit).clone(),
            None => limit.clone(),
        };

        let step = compute_swap_step(
            &sqrt_price,
            &target,
            &liquidity,
            &liquidity_denominator,
            &amount_remaining,
            fee_ppm,
            x_to_y,
        )?;
        amount_remaining -= &step.amount_in + &step.fee;
        amount_out += &step.amount_out;
        fee_total += &step.fee;
        sqrt_price = step.next_sqrt_price;

        match (next_tick, tick_sqrt) {
            (Some(tick), Some(ts)) if sqrt_price == ts => {
                liquidity = cross_tick(pool, &liquidity, tick, x_to_y)?;
                crossed_ticks += 1;
                current_tick = if x_to_y { TickIndex(tick.0 - 1) } else { tick };
            }
            _ if sqrt_price == *limit && !amount_remaining.is_zero() => {
                return Err(SimulationError::PriceLimitReached);
            }
            _ => {
                current_tick = tick_at_sqrt_price(&SqrtPrice(sqrt_price.clone()));
            }
        }
    }

    Ok(SwapResult {
        amount_in: &params.amount_in - &amount_remaining,
        amount_out,
        fee: fee_total,
        sqrt_price: SqrtPrice(sqrt_price),
        tick: current_tick,
        liquidity,
        crossed_ticks,
    })
}

/// Convenience wrapper: derives the price limit from a hint (defaulting to
/// the pool's own price) and a slippage tolerance.
pub fn simulate_exact_in(
    constants: &ProtocolConstants,
    pool: &Pool,
    x_to_y: bool,
    amount_in: &BigUint,
    slippage: Decimal,
    price_hint: Option<&SqrtPrice>,
) -> Result<SwapResult, SimulationError> {
    let hint = price_hint.unwrap_or(&pool.sqrt_price);
    let sqrt_price_limit = price_limit_after_slippage(hint, slippage, x_to_y)?;
    let params = SwapParams { x_to_y, amount_in: amount_in.clone(), sqrt_price_limit };
    simulate_swap(constants, pool, &params)
}
