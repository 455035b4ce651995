use anyhow::{Context, Result};
use rust_decimal::Decimal;

use crate::chain::snapshot::{load_snapshot, MarketSnapshot};
use crate::config::Config;
use crate::math::spacing::ProtocolConstants;

pub struct AppState {
    pub constants: ProtocolConstants,
    pub snapshot: MarketSnapshot,
    pub default_slippage: Decimal,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self> {
        let constants = config.protocol_constants()?;
        let snapshot = load_snapshot(&config.pool_snapshot_path, &constants)
            .context("Failed to initialize pool snapshot")?;

        log::info!(
            "Loaded {} pools over {} tokens from {}",
            snapshot.pools.len(),
            snapshot.tokens.len(),
            config.pool_snapshot_path.display()
        );
        if snapshot.pools.is_empty() {
            log::warn!("Pool snapshot is empty; every route will fail");
        }

        Ok(Self::from_snapshot(constants, snapshot, config.default_slippage))
    }

    pub fn from_snapshot(constants: ProtocolConstants, snapshot: MarketSnapshot, default_slippage: Decimal) -> Self {
        AppState { constants, snapshot, default_slippage }
    }
}
