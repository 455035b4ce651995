// tests/swap_router_integration.rs
// ===================================
// Route selection over the bundled sample snapshot with the tick-walking
// simulator.

use clmm_quoter::chain::snapshot::{parse_snapshot, MarketSnapshot};
use clmm_quoter::engine::router::{candidate_pools, simulate_route, ClmmSimulator, RouteRequest};
use clmm_quoter::math::clmm_swap::simulate_exact_in;
use clmm_quoter::math::fixed_point::FixedPointAmount;
use clmm_quoter::math::spacing::{ProtocolConstants, TickIndex};
use clmm_quoter::math::tick_math::SqrtPrice;
use clmm_quoter::models::{RawTick, TokenId};
use clmm_quoter::SimulationError;
use num_bigint::BigUint;
use rust_decimal::Decimal;
use std::str::FromStr;

const SNAPSHOT: &str = include_str!("../config/pools.example.json");
const USDC: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";
const SOL: &str = "So11111111111111111111111111111111111111112";
const USDT: &str = "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB";

fn snapshot() -> MarketSnapshot {
    parse_snapshot(SNAPSHOT, &ProtocolConstants::default()).expect("sample snapshot parses")
}

fn slippage(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn route(snapshot: &MarketSnapshot, from: &str, to: &str, amount: &str) -> clmm_quoter::models::SimulationResult {
    let (from, to) = (TokenId::new(from), TokenId::new(to));
    let from_decimals = snapshot.token(&from).unwrap().decimals as u32;
    let to_decimals = snapshot.token(&to).unwrap().decimals as u32;
    let amount = FixedPointAmount::parse(amount, from_decimals).unwrap();
    let request = RouteRequest {
        from: &from,
        to: &to,
        amount: &amount,
        slippage: slippage("0.01"),
        price_hint: None,
        out_scale: to_decimals,
    };
    simulate_route(&ClmmSimulator::default(), &snapshot.pools, &request)
}

#[test]
fn test_small_swap_prefers_low_fee_pool() {
    let snapshot = snapshot();
    let result = route(&snapshot, USDC, SOL, "1");
    println!("1 USDC -> {} SOL via pool {:?}", result.amount_out, result.pool_index);

    assert!(result.succeeded);
    assert_eq!(result.pool_index, Some(0));
    assert_eq!(result.amount_out.scale, 9);
    // spot 0.00625 SOL per USDC, 1bp fee, 2.5bp impact
    let out = result.amount_out.to_f64();
    assert!(out > 0.006245 && out < 0.00625, "{out}");
}

#[test]
fn test_large_swap_skips_shallow_pool() {
    let snapshot = snapshot();
    let constants = ProtocolConstants::default();
    let amount = BigUint::from(100_000_000u64);

    let shallow = simulate_exact_in(&constants, &snapshot.pools[0], true, &amount, slippage("0.01"), None);
    assert_eq!(shallow.unwrap_err(), SimulationError::PriceLimitReached);

    let result = route(&snapshot, USDC, SOL, "100");
    println!("100 USDC -> {} SOL via pool {:?}", result.amount_out, result.pool_index);
    assert!(result.succeeded);
    assert_eq!(result.pool_index, Some(1));
    let out = result.amount_out.to_f64();
    assert!(out > 0.62 && out < 0.625, "{out}");
}

#[test]
fn test_reverse_direction() {
    let snapshot = snapshot();
    let result = route(&snapshot, SOL, USDC, "1");
    println!("1 SOL -> {} USDC via pool {:?}", result.amount_out, result.pool_index);
    assert!(result.succeeded);
    assert_eq!(result.pool_index, Some(1));
    assert_eq!(result.amount_out.scale, 6);
    let out = result.amount_out.to_f64();
    assert!(out > 159.0 && out < 160.0, "{out}");
}

#[test]
fn test_empty_pool_fails_without_panic() {
    let snapshot = snapshot();
    let result = route(&snapshot, USDT, USDC, "10");
    assert!(!result.succeeded);
    assert!(result.amount_out.is_zero());
    assert_eq!(result.pool_index, None);
}

#[test]
fn test_zero_amount_and_unknown_pair() {
    let snapshot = snapshot();
    let zero = route(&snapshot, USDC, SOL, "0");
    assert!(!zero.succeeded && zero.amount_out.is_zero());

    let no_pair = route(&snapshot, SOL, USDT, "1");
    assert!(!no_pair.succeeded);
    assert!(candidate_pools(&snapshot.pools, &TokenId::new(SOL), &TokenId::new(USDT)).is_empty());
}

#[test]
fn test_malformed_pool_does_not_abort_route() {
    let mut snapshot = snapshot();
    // an off-grid tick breaks only the deep pool
    let bogus = RawTick::new(18_005, FixedPointAmount::from_u128(1, 6), true);
    snapshot.pools[1].ticks.insert(TickIndex(18_005), bogus);

    let result = route(&snapshot, USDC, SOL, "1");
    assert!(result.succeeded);
    assert_eq!(result.pool_index, Some(0));

    let large = route(&snapshot, USDC, SOL, "100");
    assert!(!large.succeeded, "both candidates fail for 100 USDC");
}

#[test]
fn test_price_hint_tightens_limit() {
    let snapshot = snapshot();
    let constants = ProtocolConstants::default();
    let pool = &snapshot.pools[1];
    let amount = BigUint::from(1_000_000u64);

    // a hint above the pool price puts an x-to-y limit above the current price
    let stale_hint = SqrtPrice::parse("2.6").unwrap();
    let err = simulate_exact_in(&constants, pool, true, &amount, slippage("0.01"), Some(&stale_hint)).unwrap_err();
    assert_eq!(err, SimulationError::InvalidPriceLimit);

    let fresh = simulate_exact_in(&constants, pool, true, &amount, slippage("0.01"), Some(&pool.sqrt_price)).unwrap();
    assert_eq!(fresh.amount_in, amount);
    assert!(fresh.sqrt_price < pool.sqrt_price);
}
