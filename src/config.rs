use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use rust_decimal::Decimal;

use crate::math::spacing::{ProtocolConstants, MAX_TICK, MIN_TICK, TICK_LIMIT};

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub pool_snapshot_path: PathBuf,

    // Protocol bounds
    pub min_tick: i32,
    pub max_tick: i32,
    pub tick_limit: i32,

    /// Fraction, `0.01` = 1%.
    pub default_slippage: Decimal,
}

fn parsed_or<T: FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|e| anyhow::anyhow!("{} has invalid value {:?}: {}", key, raw, e)),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Public defaults first, local overrides after
        dotenv::from_filename("config/quoter.env").ok();
        dotenv::dotenv().ok();

        Ok(Config {
            port: parsed_or("PORT", 8000)?,
            pool_snapshot_path: env::var("POOL_SNAPSHOT_PATH")
                .map(PathBuf::from)
                .context("POOL_SNAPSHOT_PATH must be set")?,

            min_tick: parsed_or("MIN_TICK", MIN_TICK)?,
            max_tick: parsed_or("MAX_TICK", MAX_TICK)?,
            tick_limit: parsed_or("TICK_LIMIT", TICK_LIMIT)?,

            default_slippage: parsed_or("DEFAULT_SLIPPAGE", Decimal::new(1, 2))?,
        })
    }

    pub fn protocol_constants(&self) -> Result<ProtocolConstants> {
        ProtocolConstants::new(self.min_tick, self.max_tick, self.tick_limit).context("Invalid MIN_TICK/MAX_TICK/TICK_LIMIT")
    }
}
