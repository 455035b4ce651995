use rocket::figment::Figment;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{get, routes, Build, Rocket, State};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;

use crate::bootstrap::AppState;
use crate::engine::service::{liquidity_plot, price_for_tick, simulate_swap_route, tick_for_price, PriceQuote};
use crate::error::Error;
use crate::models::TokenId;
use crate::web::dto::{
    ErrorResponse, LiquidityPlotQuery, LiquidityPlotResponse, PriceQuery, PriceResponse, SimulateQuery,
    SimulateResponse, TickQuery,
};

type ApiResult<T> = Result<Json<T>, (Status, Json<ErrorResponse>)>;

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn reject(status: Status, message: String) -> (Status, Json<ErrorResponse>) {
    (status, Json(ErrorResponse { timestamp_utc: now(), error: message }))
}

fn api_error(context: &str, e: Error) -> (Status, Json<ErrorResponse>) {
    let status = match e {
        Error::UnknownPool(_) | Error::UnknownToken(_) => Status::NotFound,
        Error::Internal(_) => Status::InternalServerError,
        Error::Math(_) | Error::Simulation(_) => Status::BadRequest,
    };
    if status == Status::InternalServerError {
        log::error!("{}: {}", context, e);
    } else {
        log::warn!("{}: {}", context, e);
    }
    reject(status, e.to_string())
}

fn price_response(quote: PriceQuote) -> Json<PriceResponse> {
    Json(PriceResponse {
        timestamp_utc: now(),
        pool_index: quote.pool_index,
        tick: quote.tick.get(),
        price: quote.price.get(),
        x_to_y: quote.direction.is_x_to_y(),
    })
}

#[get("/api/v1/price?<query..>")]
pub async fn price(query: PriceQuery, app_state: &State<Arc<AppState>>) -> ApiResult<PriceResponse> {
    price_for_tick(app_state, query.pool, query.tick, query.x_to_y.unwrap_or(true))
        .map(price_response)
        .map_err(|e| api_error("Failed to compute price", e))
}

#[get("/api/v1/tick?<query..>")]
pub async fn tick(query: TickQuery, app_state: &State<Arc<AppState>>) -> ApiResult<PriceResponse> {
    tick_for_price(app_state, query.pool, query.price, query.x_to_y.unwrap_or(true))
        .map(price_response)
        .map_err(|e| api_error("Failed to compute tick", e))
}

#[get("/api/v1/liquidity-plot?<query..>")]
pub async fn plot(query: LiquidityPlotQuery, app_state: &State<Arc<AppState>>) -> ApiResult<LiquidityPlotResponse> {
    let plot = liquidity_plot(app_state, query.pool, query.x_to_y.unwrap_or(true), query.placeholder)
        .map_err(|e| api_error("Failed to build liquidity plot", e))?;

    Ok(Json(LiquidityPlotResponse {
        timestamp_utc: now(),
        pool_index: plot.pool_index,
        x_to_y: plot.direction.is_x_to_y(),
        placeholder: plot.placeholder,
        points: plot.points,
    }))
}

#[get("/api/v1/simulate?<query..>")]
pub async fn simulate(query: SimulateQuery, app_state: &State<Arc<AppState>>) -> ApiResult<SimulateResponse> {
    let slippage = match query.slippage.as_deref() {
        Some(raw) => Some(
            Decimal::from_str(raw.trim())
                .map_err(|_| reject(Status::BadRequest, format!("Invalid slippage {:?}", raw)))?,
        ),
        None => None,
    };

    let quote = simulate_swap_route(
        app_state.inner().clone(),
        TokenId::new(query.from),
        TokenId::new(query.to),
        query.amount,
        slippage,
    )
    .await
    .map_err(|e| api_error("Failed to simulate swap", e))?;

    Ok(Json(SimulateResponse {
        timestamp_utc: quote.timestamp_utc,
        from: quote.from.address.to_string(),
        to: quote.to.address.to_string(),
        amount_in: quote.amount_in.to_display_string(),
        amount_out: quote.result.amount_out.to_display_string(),
        slippage: quote.slippage.to_string(),
        succeeded: quote.result.succeeded,
        pool_index: quote.result.pool_index,
    }))
}

#[get("/health")]
pub fn health() -> &'static str {
    "OK"
}

/// Rocket instance with state and every route mounted.
pub fn build_rocket(figment: Figment, app_state: Arc<AppState>) -> Rocket<Build> {
    rocket::custom(figment)
        .manage(app_state)
        .mount("/", routes![price, tick, plot, simulate, health])
}
