use thiserror::Error;

/// Malformed input or out-of-range values in the pure math helpers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MathError {
    #[error("Input error - invalid decimal string: {0:?}")]
    InvalidDecimal(String),
    #[error("Input error - {digits} fractional digits exceed precision of {decimals}")]
    PrecisionExceeded { digits: usize, decimals: u32 },
    #[error("Input error - tick spacing must be positive, got {0}")]
    InvalidTickSpacing(i32),
    #[error("Input error - price must be a positive finite number")]
    InvalidPrice,
    #[error("Input error - division by zero")]
    DivisionByZero,
    #[error("Input error - cannot combine amounts with scales {left} and {right}")]
    ScaleMismatch { left: u32, right: u32 },
    #[error("Input error - slippage tolerance {0} outside [0, 1)")]
    InvalidSlippage(String),
    #[error("Input error - fee {0} outside [0, 1)")]
    InvalidFee(String),
    #[error("Input error - current tick {given} does not match sqrt price tick {derived}")]
    CurrentTickMismatch { given: i32, derived: i32 },
    #[error("Input error - duplicate tick index {0}")]
    DuplicateTick(i32),
    #[error("Input error - invalid protocol constants: {0}")]
    InvalidProtocolConstants(String),
    #[error("Range error - tick {tick} outside [{min}, {max}]")]
    TickOutOfRange { tick: i32, min: i32, max: i32 },
    #[error("Range error - cumulative liquidity negative at tick {0}")]
    NegativeLiquidity(i32),
}

/// Failure of a single pool's swap simulation. The route simulator recovers
/// from these locally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulationError {
    #[error("Simulation error - zero swap amount")]
    ZeroAmount,
    #[error("Simulation error - price limit is on the wrong side of the current price")]
    InvalidPriceLimit,
    #[error("Simulation error - price limit reached before the amount was filled")]
    PriceLimitReached,
    #[error("Simulation error - insufficient liquidity to fill the amount")]
    InsufficientLiquidity,
    #[error("Simulation error - malformed tick map at tick {0}")]
    MalformedTickMap(i32),
    #[error(transparent)]
    Math(#[from] MathError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Math(#[from] MathError),

    #[error(transparent)]
    Simulation(#[from] SimulationError),

    #[error("Lookup error - no pool at index {0}")]
    UnknownPool(usize),

    #[error("Lookup error - unknown token {0}")]
    UnknownToken(String),

    #[error("Internal error - {0}")]
    Internal(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
