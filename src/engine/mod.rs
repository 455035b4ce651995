pub mod liquidity_plot;
pub mod router;
pub mod subscriptions;
pub mod service;
