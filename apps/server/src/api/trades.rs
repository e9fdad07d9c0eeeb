use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use coinfolio_core::trades::{TradeAcknowledgement, TradeOrder};

use crate::{error::ApiResult, main_lib::AppState};

/// Forwards an order. The ledger reflects it only once the trade server has
/// processed it, so callers re-fetch the portfolio afterwards.
async fn submit_trade(
    State(state): State<Arc<AppState>>,
    Path(account_id): Path<String>,
    Json(order): Json<TradeOrder>,
) -> ApiResult<(StatusCode, Json<TradeAcknowledgement>)> {
    let ack = state.trade_service.submit_trade(&account_id, order).await?;
    Ok((StatusCode::ACCEPTED, Json(ack)))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/accounts/{account_id}/trades", post(submit_trade))
}
