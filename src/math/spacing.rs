// Tick-spacing normalizer: snapping arbitrary tick indices onto a pool's
// spacing grid and the protocol-wide bounds of that grid.

use serde::{Deserialize, Serialize};

use crate::error::MathError;
use crate::math::tick_math::SQRT_TABLE_MAX_TICK;

/// Default minimum tick index.
pub const MIN_TICK: i32 = -221_818;
/// Default maximum tick index.
pub const MAX_TICK: i32 = 221_818;
/// Number of addressable slots in the on-chain tick bitmap.
pub const TICK_LIMIT: i32 = 44_364;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TickIndex(pub i32);

impl TickIndex {
    pub fn get(self) -> i32 {
        self.0
    }
}

impl From<i32> for TickIndex {
    fn from(value: i32) -> Self {
        TickIndex(value)
    }
}

/// A strictly positive grid step.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct TickSpacing(i32);

impl TickSpacing {
    pub fn new(spacing: i32) -> Result<Self, MathError> {
        if spacing <= 0 {
            return Err(MathError::InvalidTickSpacing(spacing));
        }
        Ok(TickSpacing(spacing))
    }

    pub fn get(self) -> i32 {
        self.0
    }
}

impl TryFrom<i32> for TickSpacing {
    type Error = MathError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        TickSpacing::new(value)
    }
}

impl From<TickSpacing> for i32 {
    fn from(spacing: TickSpacing) -> Self {
        spacing.0
    }
}

#[inline]
fn saturate(v: i64) -> TickIndex {
    TickIndex(v.clamp(i32::MIN as i64, i32::MAX as i64) as i32)
}

#[inline]
fn floor_i64(tick: i64, spacing: i64) -> i64 {
    tick.div_euclid(spacing) * spacing
}

#[inline]
fn ceil_i64(tick: i64, spacing: i64) -> i64 {
    let floor = floor_i64(tick, spacing);
    if floor == tick { floor } else { floor + spacing }
}

/// Largest multiple of `spacing` at or below `tick`.
pub fn floor_to_spacing(tick: TickIndex, spacing: TickSpacing) -> TickIndex {
    saturate(floor_i64(tick.0 as i64, spacing.0 as i64))
}

/// Smallest multiple of `spacing` at or above `tick`.
pub fn ceil_to_spacing(tick: TickIndex, spacing: TickSpacing) -> TickIndex {
    saturate(ceil_i64(tick.0 as i64, spacing.0 as i64))
}

/// Protocol-wide tick bounds. The tick-limit cap is independent of the price
/// range because the on-chain tick bitmap has a fixed capacity.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ProtocolConstants {
    pub min_tick: i32,
    pub max_tick: i32,
    pub tick_limit: i32,
}

impl Default for ProtocolConstants {
    fn default() -> Self {
        Self { min_tick: MIN_TICK, max_tick: MAX_TICK, tick_limit: TICK_LIMIT }
    }
}

impl ProtocolConstants {
    pub fn new(min_tick: i32, max_tick: i32, tick_limit: i32) -> Result<Self, MathError> {
        if min_tick > 0 || max_tick < 0 {
            return Err(MathError::InvalidProtocolConstants(format!(
                "bounds [{}, {}] must contain tick 0",
                min_tick, max_tick
            )));
        }
        if min_tick < -SQRT_TABLE_MAX_TICK || max_tick > SQRT_TABLE_MAX_TICK {
            return Err(MathError::InvalidProtocolConstants(format!(
                "bounds [{}, {}] exceed the supported range ±{}",
                min_tick, max_tick, SQRT_TABLE_MAX_TICK
            )));
        }
        if tick_limit <= 2 {
            return Err(MathError::InvalidProtocolConstants(format!("tick limit {} must exceed 2", tick_limit)));
        }
        Ok(Self { min_tick, max_tick, tick_limit })
    }

    pub fn contains(&self, tick: TickIndex) -> bool {
        (self.min_tick..=self.max_tick).contains(&tick.0)
    }

    /// Lowest valid tick for pools with this spacing.
    pub fn min_spacing_multiplicity(&self, spacing: TickSpacing) -> TickIndex {
        let s = spacing.0 as i64;
        let by_range = ceil_i64(self.min_tick as i64, s);
        let by_limit = -((self.tick_limit as i64 - 2) * s);
        saturate(by_range.max(by_limit))
    }

    /// Highest valid tick for pools with this spacing.
    pub fn max_spacing_multiplicity(&self, spacing: TickSpacing) -> TickIndex {
        let s = spacing.0 as i64;
        let by_range = floor_i64(self.max_tick as i64, s);
        let by_limit = (self.tick_limit as i64 - 2) * s;
        saturate(by_range.min(by_limit))
    }

    /// Closest grid point to `tick`, clamped into the spacing bounds.
    /// Equidistant ticks resolve to the ceiling multiple.
    pub fn nearest_spacing_multiplicity(&self, tick: TickIndex, spacing: TickSpacing) -> TickIndex {
        let s = spacing.0 as i64;
        let t = tick.0 as i64;
        let lower = floor_i64(t, s);
        let greater = ceil_i64(t, s);
        let nearest = if greater - t <= t - lower { greater } else { lower };

        let min = self.min_spacing_multiplicity(spacing).0 as i64;
        let max = self.max_spacing_multiplicity(spacing).0 as i64;
        saturate(nearest.clamp(min, max))
    }

    /// Whether `tick` is a grid point inside the spacing bounds.
    pub fn is_valid_tick(&self, tick: TickIndex, spacing: TickSpacing) -> bool {
        tick.0 % spacing.0 == 0
            && tick >= self.min_spacing_multiplicity(spacing)
            && tick <= self.max_spacing_multiplicity(spacing)
    }
}
