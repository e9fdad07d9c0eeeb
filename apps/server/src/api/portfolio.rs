use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use coinfolio_core::portfolio::PortfolioSnapshot;
use coinfolio_market_data::Timeframe;
use serde::Deserialize;

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

async fn get_portfolio(
    State(state): State<Arc<AppState>>,
    Path(account_id): Path<String>,
) -> ApiResult<Json<PortfolioSnapshot>> {
    let snapshot = state
        .portfolio_service
        .get_portfolio_snapshot(&account_id)
        .await?;
    Ok(Json(snapshot))
}

#[derive(Deserialize)]
struct ChartQuery {
    timeframe: Option<String>,
}

/// Chart for the largest holding. `204` when a newer chart request for the
/// same account replaced this one.
async fn get_chart(
    State(state): State<Arc<AppState>>,
    Path(account_id): Path<String>,
    Query(query): Query<ChartQuery>,
) -> ApiResult<Response> {
    let timeframe = match query.timeframe.as_deref() {
        Some(raw) => raw
            .parse::<Timeframe>()
            .map_err(|e| ApiError::bad_request("INVALID_TIMEFRAME", e))?,
        None => Timeframe::default(),
    };

    let series = state
        .portfolio_service
        .get_chart_series(&account_id, timeframe)
        .await?;
    Ok(match series {
        Some(series) => Json(series).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/accounts/{account_id}/portfolio", get(get_portfolio))
        .route("/accounts/{account_id}/chart", get(get_chart))
}
