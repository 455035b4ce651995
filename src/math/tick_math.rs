// Tick <-> price conversion.
//
// Square-root prices are fixed-point integers with PRICE_SCALE decimals,
// derived from the exact Q128.128 sqrt(1.0001)^tick table. Human prices are
// f64 quotes of token Y per token X (or the reciprocal), adjusted for the
// tokens' decimal places.

use num_bigint::BigUint;
use num_traits::One;
use serde::{Deserialize, Serialize};

use crate::error::MathError;
use crate::math::fixed_point::{pow10, FixedPointAmount};
use crate::math::spacing::{ProtocolConstants, TickIndex, TickSpacing};

pub const TICK_BASE: f64 = 1.0001;
/// Decimal places of on-chain square-root prices.
pub const PRICE_SCALE: u32 = 24;
/// Largest |tick| the square-root table can represent.
pub const SQRT_TABLE_MAX_TICK: i32 = 887_272;

/// sqrt(1.0001)^-(bit) in Q128.128 for bits 0x2 through 0x80000. Bit 0x1
/// seeds the product.
const SQRT_RATIO_FACTORS: [(u32, u128); 19] = [
    (0x2, 0xfff97272373d413259a46990580e213a),
    (0x4, 0xfff2e50f5f656932ef12357cf3c7fdcc),
    (0x8, 0xffe5caca7e10e4e61c3624eaa0941cd0),
    (0x10, 0xffcb9843d60f6159c9db58835c926644),
    (0x20, 0xff973b41fa98c081472e6896dfb254c0),
    (0x40, 0xff2ea16466c96a3843ec78b326b52861),
    (0x80, 0xfe5dee046a99a2a811c461f1969c3053),
    (0x100, 0xfcbe86c7900a88aedcffc83b479aa3a4),
    (0x200, 0xf987a7253ac413176f2b074cf7815e54),
    (0x400, 0xf3392b0822b70005940c7a398e4b70f3),
    (0x800, 0xe7159475a2c29b7443b29c7fa6e889d9),
    (0x1000, 0xd097f3bdfd2022b8845ad8f792aa5825),
    (0x2000, 0xa9f746462d870fdf8a65dc1f90e061e5),
    (0x4000, 0x70d869a156d2a1b890bb3df62baf32f7),
    (0x8000, 0x31be135f97d08fd981231505542fcfa6),
    (0x10000, 0x09aa508b5b7a84e1c677de54f3e99bc9),
    (0x20000, 0x05d6af8dedb81196699c329225ee604),
    (0x40000, 0x01dcdc6f2d7c3395a2ed4f8b7feaf38),
    (0x80000, 0x48a170391f7dc42444e8fa2),
];
const SQRT_RATIO_FACTOR_0X1: u128 = 0xfffcb933bd6fad37aa2d162d1a594001;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuoteDirection {
    /// Price quoted as token Y per token X, as stored on chain.
    XToY,
    /// Reciprocal quote.
    YToX,
}

impl QuoteDirection {
    pub fn from_x_to_y(x_to_y: bool) -> Self {
        if x_to_y { QuoteDirection::XToY } else { QuoteDirection::YToX }
    }

    pub fn is_x_to_y(self) -> bool {
        matches!(self, QuoteDirection::XToY)
    }
}

/// Human-readable price, already adjusted for token decimals.
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(pub f64);

impl Price {
    /// Returned instead of an infinite reciprocal.
    pub const SATURATED: Price = Price(9_007_199_254_740_991.0);

    pub fn get(self) -> f64 {
        self.0
    }
}

/// On-chain square-root price, `value / 10^PRICE_SCALE`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SqrtPrice(pub BigUint);

impl SqrtPrice {
    pub fn new(value: BigUint) -> Self {
        SqrtPrice(value)
    }

    /// sqrt price of exactly 1.
    pub fn one() -> Self {
        SqrtPrice(pow10(PRICE_SCALE))
    }

    pub fn value(&self) -> &BigUint {
        &self.0
    }

    pub fn parse(text: &str) -> Result<Self, MathError> {
        Ok(SqrtPrice(FixedPointAmount::parse(text, PRICE_SCALE)?.value))
    }

    pub fn as_amount(&self) -> FixedPointAmount {
        FixedPointAmount::new(self.0.clone(), PRICE_SCALE)
    }

    pub fn to_f64(&self) -> f64 {
        self.as_amount().to_f64()
    }
}

// ------------------------------ Sqrt price table ------------------------------

/// Exact sqrt(1.0001^tick) in Q128.128. `tick` must lie in the table range.
fn sqrt_ratio_q128(tick: i32) -> BigUint {
    let abs_tick = tick.unsigned_abs();

    let mut ratio = if abs_tick & 0x1 != 0 {
        BigUint::from(SQRT_RATIO_FACTOR_0X1)
    } else {
        BigUint::one() << 128
    };

    for (bit, factor) in SQRT_RATIO_FACTORS {
        if abs_tick & bit != 0 {
            ratio = (ratio * BigUint::from(factor)) >> 128;
        }
    }

    if tick > 0 {
        let max = (BigUint::one() << 256) - 1u32;
        ratio = max / ratio;
    }
    ratio
}

/// Square-root price at `tick`, clamped into the table range.
pub fn sqrt_price_at_tick(tick: TickIndex) -> SqrtPrice {
    let tick = tick.0.clamp(-SQRT_TABLE_MAX_TICK, SQRT_TABLE_MAX_TICK);
    SqrtPrice((sqrt_ratio_q128(tick) * pow10(PRICE_SCALE)) >> 128)
}

/// Greatest tick whose square-root price does not exceed `sqrt_price`.
pub fn tick_at_sqrt_price(sqrt_price: &SqrtPrice) -> TickIndex {
    let mut lo = -SQRT_TABLE_MAX_TICK;
    let mut hi = SQRT_TABLE_MAX_TICK;
    while lo < hi {
        let mid = lo + (hi - lo + 1) / 2;
        if sqrt_price_at_tick(TickIndex(mid)) <= *sqrt_price {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    TickIndex(lo)
}

// ------------------------------- Human prices --------------------------------

#[inline]
fn decimal_shift(decimals_x: u8, decimals_y: u8) -> f64 {
    10f64.powi(decimals_y as i32 - decimals_x as i32)
}

/// Y-per-X human price for a square-root price.
pub fn sqrt_price_to_price(sqrt_price: &SqrtPrice, decimals_x: u8, decimals_y: u8) -> Price {
    let sqrt = sqrt_price.to_f64();
    Price(sqrt * sqrt / decimal_shift(decimals_x, decimals_y))
}

/// Human price at `tick` in the requested quote direction.
pub fn price_at_tick(tick: TickIndex, direction: QuoteDirection, decimals_x: u8, decimals_y: u8) -> Price {
    let price = sqrt_price_to_price(&sqrt_price_at_tick(tick), decimals_x, decimals_y);
    match direction {
        QuoteDirection::XToY => price,
        QuoteDirection::YToX if price.0 != 0.0 => Price(1.0 / price.0),
        QuoteDirection::YToX => Price::SATURATED,
    }
}

/// Converts a human price back into the raw Y-per-X ratio in smallest units.
pub fn primary_units_price(price: Price, direction: QuoteDirection, decimals_x: u8, decimals_y: u8) -> f64 {
    let x_to_y = match direction {
        QuoteDirection::XToY => price.0,
        QuoteDirection::YToX => 1.0 / price.0,
    };
    x_to_y * decimal_shift(decimals_x, decimals_y)
}

#[inline]
fn log_base(x: f64, base: f64) -> f64 {
    x.ln() / base.ln()
}

fn validate_price(price: Price) -> Result<(), MathError> {
    if !price.0.is_finite() || price.0 < 0.0 {
        return Err(MathError::InvalidPrice);
    }
    Ok(())
}

/// Nearest valid tick for a human price. Prices below the lowest representable
/// price are clamped up to it; the logarithm rounds half away from zero.
pub fn tick_at_price(
    constants: &ProtocolConstants,
    price: Price,
    spacing: TickSpacing,
    direction: QuoteDirection,
    decimals_x: u8,
    decimals_y: u8,
) -> Result<TickIndex, MathError> {
    validate_price(price)?;

    let bound = match direction {
        QuoteDirection::XToY => constants.min_tick,
        QuoteDirection::YToX => constants.max_tick,
    };
    let floor_price = price_at_tick(TickIndex(bound), direction, decimals_x, decimals_y);
    let base = Price(price.0.max(floor_price.0));

    let primary = primary_units_price(base, direction, decimals_x, decimals_y);
    let log = log_base(primary, TICK_BASE).round();
    let tick = log.clamp(i32::MIN as f64, i32::MAX as f64) as i32;

    Ok(constants.nearest_spacing_multiplicity(TickIndex(tick), spacing))
}

/// Number of spacing steps needed to cover `[min, max]`, rounded up.
pub fn ticks_amount_in_range(
    min: Price,
    max: Price,
    spacing: TickSpacing,
    direction: QuoteDirection,
    decimals_x: u8,
    decimals_y: u8,
) -> Result<u64, MathError> {
    for price in [min, max] {
        validate_price(price)?;
        if price.0 == 0.0 {
            return Err(MathError::InvalidPrice);
        }
    }
    let min_index = log_base(primary_units_price(min, direction, decimals_x, decimals_y), TICK_BASE);
    let max_index = log_base(primary_units_price(max, direction, decimals_x, decimals_y), TICK_BASE);

    Ok(((max_index - min_index).abs() / spacing.get() as f64).ceil() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, rel: f64) -> bool {
        ((a - b) / b).abs() < rel
    }

    #[test]
    fn sqrt_price_at_zero_is_one() {
        assert_eq!(sqrt_price_at_tick(TickIndex(0)), SqrtPrice::one());
    }

    #[test]
    fn sqrt_price_matches_float_reference() {
        for tick in [1, -1, 10, -250, 4_321, -99_999, 221_818, -221_818] {
            let expected = TICK_BASE.powi(tick).sqrt();
            let got = sqrt_price_at_tick(TickIndex(tick)).to_f64();
            assert!(close(got, expected, 1e-9), "tick {tick}: {got} vs {expected}");
        }
    }

    #[test]
    fn sqrt_price_is_clamped_to_table() {
        assert_eq!(sqrt_price_at_tick(TickIndex(1_000_000)), sqrt_price_at_tick(TickIndex(SQRT_TABLE_MAX_TICK)));
    }

    #[test]
    fn tick_at_sqrt_price_inverts_table() {
        for tick in [-221_818, -12_345, -1, 0, 1, 777, 221_818] {
            let sqrt = sqrt_price_at_tick(TickIndex(tick));
            assert_eq!(tick_at_sqrt_price(&sqrt), TickIndex(tick));
            let just_above = SqrtPrice(sqrt.0 + 1u32);
            assert_eq!(tick_at_sqrt_price(&just_above), TickIndex(tick));
        }
    }

    #[test]
    fn decimal_adjustment() {
        let p = price_at_tick(TickIndex(0), QuoteDirection::XToY, 9, 6);
        assert!(close(p.0, 1_000.0, 1e-12), "{}", p.0);
        let p = price_at_tick(TickIndex(0), QuoteDirection::XToY, 6, 9);
        assert!(close(p.0, 0.001, 1e-12), "{}", p.0);
        let p = price_at_tick(TickIndex(0), QuoteDirection::YToX, 6, 9);
        assert!(close(p.0, 1_000.0, 1e-12), "{}", p.0);
    }

    #[test]
    fn price_monotonic_in_tick() {
        for (dx, dy) in [(6, 6), (9, 6), (6, 9)] {
            let mut prev_up = price_at_tick(TickIndex(-221_818), QuoteDirection::XToY, dx, dy).0;
            let mut prev_down = price_at_tick(TickIndex(-221_818), QuoteDirection::YToX, dx, dy).0;
            for tick in (-221_817..=221_818).step_by(613) {
                let up = price_at_tick(TickIndex(tick), QuoteDirection::XToY, dx, dy).0;
                let down = price_at_tick(TickIndex(tick), QuoteDirection::YToX, dx, dy).0;
                assert!(up > prev_up, "tick {tick}");
                assert!(down < prev_down, "tick {tick}");
                prev_up = up;
                prev_down = down;
            }
        }
        let a = price_at_tick(TickIndex(100), QuoteDirection::XToY, 6, 6).0;
        let b = price_at_tick(TickIndex(101), QuoteDirection::XToY, 6, 6).0;
        assert!(b > a);
    }

    #[test]
    fn tick_price_round_trip() {
        let constants = ProtocolConstants::default();
        for spacing in [1, 10, 100] {
            let sp = TickSpacing::new(spacing).unwrap();
            let min = constants.min_spacing_multiplicity(sp).0;
            let max = constants.max_spacing_multiplicity(sp).0;
            for (dx, dy) in [(6, 6), (9, 6), (6, 9), (0, 12)] {
                for direction in [QuoteDirection::XToY, QuoteDirection::YToX] {
                    let step = (spacing * 37) as usize;
                    for tick in (min..=max).step_by(step).chain([min, 0, max]) {
                        let price = price_at_tick(TickIndex(tick), direction, dx, dy);
                        let back = tick_at_price(&constants, price, sp, direction, dx, dy).unwrap();
                        assert_eq!(back, TickIndex(tick), "spacing {spacing} {direction:?} ({dx},{dy})");
                    }
                }
            }
        }
    }

    #[test]
    fn tick_at_price_snaps_to_spacing() {
        let constants = ProtocolConstants::default();
        let sp = TickSpacing::new(10).unwrap();
        let price = price_at_tick(TickIndex(1_234), QuoteDirection::XToY, 6, 6);
        assert_eq!(tick_at_price(&constants, price, sp, QuoteDirection::XToY, 6, 6).unwrap(), TickIndex(1_230));
        let price = price_at_tick(TickIndex(1_236), QuoteDirection::XToY, 6, 6);
        assert_eq!(tick_at_price(&constants, price, sp, QuoteDirection::XToY, 6, 6).unwrap(), TickIndex(1_240));
    }

    #[test]
    fn tick_at_price_clamps_tiny_prices() {
        let constants = ProtocolConstants::default();
        let sp = TickSpacing::new(10).unwrap();
        let min = constants.min_spacing_multiplicity(sp);
        assert_eq!(tick_at_price(&constants, Price(0.0), sp, QuoteDirection::XToY, 6, 6).unwrap(), min);
        let max = constants.max_spacing_multiplicity(sp);
        assert_eq!(tick_at_price(&constants, Price(1e300), sp, QuoteDirection::XToY, 6, 6).unwrap(), max);
        // inverted quote: a tiny inverted price is a huge raw price
        assert_eq!(tick_at_price(&constants, Price(0.0), sp, QuoteDirection::YToX, 6, 6).unwrap(), max);
    }

    #[test]
    fn tick_at_price_rejects_bad_input() {
        let constants = ProtocolConstants::default();
        let sp = TickSpacing::new(10).unwrap();
        for bad in [f64::NAN, f64::INFINITY, -1.0] {
            assert_eq!(
                tick_at_price(&constants, Price(bad), sp, QuoteDirection::XToY, 6, 6),
                Err(MathError::InvalidPrice)
            );
        }
    }

    #[test]
    fn ticks_in_range_rounds_up() {
        let sp = TickSpacing::new(7).unwrap();
        let min = Price(1.0);
        let max = Price(TICK_BASE.powi(100));
        assert_eq!(ticks_amount_in_range(min, max, sp, QuoteDirection::XToY, 6, 6).unwrap(), 15);
        assert_eq!(ticks_amount_in_range(max, min, sp, QuoteDirection::XToY, 6, 6).unwrap(), 15);
        assert!(ticks_amount_in_range(Price(0.0), max, sp, QuoteDirection::XToY, 6, 6).is_err());
    }
}
