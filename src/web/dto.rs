use rocket::serde::{Deserialize, Serialize};

use crate::models::PlotPoint;

#[derive(Deserialize, rocket::FromForm)]
pub struct PriceQuery {
    pub pool: usize,
    pub tick: i32,
    pub x_to_y: Option<bool>,
}

#[derive(Deserialize, rocket::FromForm)]
pub struct TickQuery {
    pub pool: usize,
    pub price: f64,
    pub x_to_y: Option<bool>,
}

#[derive(Deserialize, rocket::FromForm)]
pub struct LiquidityPlotQuery {
    pub pool: usize,
    pub x_to_y: Option<bool>,
    pub placeholder: Option<f64>,
}

#[derive(Deserialize, rocket::FromForm)]
pub struct SimulateQuery {
    pub from: String,
    pub to: String,
    pub amount: String,     // decimal string in `from` token units
    pub slippage: Option<String>, // fraction, e.g. "0.01"
}

#[derive(Serialize, Deserialize)]
pub struct PriceResponse {
    pub timestamp_utc: String,
    pub pool_index: usize,
    pub tick: i32,
    pub price: f64,
    pub x_to_y: bool,
}

#[derive(Serialize, Deserialize)]
pub struct LiquidityPlotResponse {
    pub timestamp_utc: String,
    pub pool_index: usize,
    pub x_to_y: bool,
    pub placeholder: bool,
    pub points: Vec<PlotPoint>,
}

#[derive(Serialize, Deserialize)]
pub struct SimulateResponse {
    pub timestamp_utc: String,
    pub from: String,
    pub to: String,
    pub amount_in: String,
    pub amount_out: String,
    pub slippage: String,
    pub succeeded: bool,
    pub pool_index: Option<usize>,
}

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub timestamp_utc: String,
    pub error: String,
}
