// liquidity_plot.rs
// Sparse on-chain ticks -> dense liquidity step series for charting.

use num_bigint::{BigInt, BigUint};
use num_traits::Zero;

use crate::error::MathError;
use crate::math::fixed_point::FixedPointAmount;
use crate::math::spacing::{ProtocolConstants, TickIndex, TickSpacing};
use crate::math::tick_math::{price_at_tick, QuoteDirection};
use crate::models::{PlotPoint, RawTick};

/// A tick together with the pool liquidity active just above it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CumulativeTick {
    pub index: TickIndex,
    pub liquidity: FixedPointAmount,
}

/// Running sum of signed liquidity deltas over `ticks` in ascending order.
/// Duplicate indices, mixed scales and a negative running sum are rejected.
pub fn cumulative_liquidity(ticks: &[RawTick]) -> Result<Vec<CumulativeTick>, MathError> {
    let mut sorted: Vec<&RawTick> = ticks.iter().collect();
    sorted.sort_by_key(|t| t.index);

    let scale = sorted.first().map(|t| t.liquidity_change.scale).unwrap_or_default();
    let mut running = BigInt::zero();
    let mut out = Vec::with_capacity(sorted.len());
    let mut previous: Option<TickIndex> = None;

    for tick in sorted {
        if previous == Some(tick.index) {
            return Err(MathError::DuplicateTick(tick.index.0));
        }
        if tick.liquidity_change.scale != scale {
            return Err(MathError::ScaleMismatch { left: scale, right: tick.liquidity_change.scale });
        }
        running += tick.liquidity_net();
        let value: BigUint = running.to_biguint().ok_or(MathError::NegativeLiquidity(tick.index.0))?;
        out.push(CumulativeTick { index: tick.index, liquidity: FixedPointAmount::new(value, scale) });
        previous = Some(tick.index);
    }
    Ok(out)
}

fn point(index: TickIndex, liquidity: f64, direction: QuoteDirection, decimals_x: u8, decimals_y: u8) -> PlotPoint {
    PlotPoint {
        x: price_at_tick(index, direction, decimals_x, decimals_y).get(),
        y: liquidity,
        index: index.0,
    }
}

/// Builds the step chart for one pool. Output `x` is ascending for either
/// direction; shelves between recorded ticks sit one spacing above the
/// previous tick and carry its liquidity.
pub fn build_liquidity_plot(
    constants: &ProtocolConstants,
    ticks: &[RawTick],
    spacing: TickSpacing,
    direction: QuoteDirection,
    decimals_x: u8,
    decimals_y: u8,
) -> Result<Vec<PlotPoint>, MathError> {
    let min = constants.min_spacing_multiplicity(spacing);
    let max = constants.max_spacing_multiplicity(spacing);

    let cumulative = cumulative_liquidity(ticks)?;
    if let Some(bad) = cumulative.iter().find(|t| t.index < min || t.index > max) {
        return Err(MathError::TickOutOfRange { tick: bad.index.0, min: min.0, max: max.0 });
    }

    if cumulative.is_empty() {
        return Ok(placeholder_liquidity_plot(constants, 0.0, spacing, direction, decimals_x, decimals_y));
    }

    let step = spacing.get() as i64;
    let mut indices: Vec<(TickIndex, f64)> = Vec::with_capacity(cumulative.len() * 2 + 3);

    let mut previous = match cumulative.first() {
        Some(first) if first.index == min => None,
        _ => {
            indices.push((min, 0.0));
            Some((min, 0.0))
        }
    };

    for tick in &cumulative {
        let liquidity = tick.liquidity.to_f64();
        if let Some((prev_index, prev_liquidity)) = previous {
            if tick.index.0 as i64 - prev_index.0 as i64 > step {
                indices.push((TickIndex(prev_index.0 + spacing.get()), prev_liquidity));
            }
        }
        indices.push((tick.index, liquidity));
        previous = Some((tick.index, liquidity));
    }

    if let Some((last, last_liquidity)) = previous.filter(|(last, _)| *last != max) {
        if max.0 as i64 - last.0 as i64 > step {
            indices.push((TickIndex(last.0 + spacing.get()), last_liquidity));
        }
        indices.push((max, 0.0));
    }

    let mut plot: Vec<PlotPoint> = indices
        .into_iter()
        .map(|(index, liquidity)| point(index, liquidity, direction, decimals_x, decimals_y))
        .collect();
    if !direction.is_x_to_y() {
        plot.reverse();
    }
    Ok(plot)
}

/// Two-point plot for a pool with no tick data yet, flat at `liquidity`.
pub fn placeholder_liquidity_plot(
    constants: &ProtocolConstants,
    liquidity: f64,
    spacing: TickSpacing,
    direction: QuoteDirection,
    decimals_x: u8,
    decimals_y: u8,
) -> Vec<PlotPoint> {
    let min = constants.min_spacing_multiplicity(spacing);
    let max = constants.max_spacing_multiplicity(spacing);
    let mut plot = vec![
        point(min, liquidity, direction, decimals_x, decimals_y),
        point(max, liquidity, direction, decimals_x, decimals_y),
    ];
    if !direction.is_x_to_y() {
        plot.reverse();
    }
    plot
}

/// Position of the plot point whose price is closest to `price`; the first
/// one wins on ties. Returns 0 for an empty plot.
pub fn nearest_price_index(price: f64, points: &[PlotPoint]) -> usize {
    let mut nearest = 0;
    for (i, p) in points.iter().enumerate().skip(1) {
        if (p.x - price).abs() < (points[nearest].x - price).abs() {
            nearest = i;
        }
    }
    nearest
}
