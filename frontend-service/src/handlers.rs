use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use bourse_base::{Error, Kind};
use bourse_wire::{
    DataEnvelope, ErrorBody, ErrorEnvelope, Instrument, LeaderInfo, OrderLookupData,
    SuccessEnvelope, TransactionNumberBody, TxnType,
};

use crate::state::FrontendState;

pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0.kind() {
            Kind::NotFound => StatusCode::NOT_FOUND,
            Kind::Rejected | Kind::Upstream | Kind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorEnvelope {
            error: ErrorBody { code: status.as_u16(), message: self.0.message() },
        };
        (status, Json(body)).into_response()
    }
}

pub async fn fetch_stock(
    State(state): State<Arc<FrontendState>>,
    Path(name): Path<String>,
) -> Result<Json<DataEnvelope<Instrument>>, ApiError> {
    let instrument = state.fetch_stock(&name).await?;
    Ok(Json(DataEnvelope { data: instrument }))
}

/// `POST /orders` request body, with `type` left as a raw string: an
/// unrecognized trade type must surface as a 500 domain error (§6), not the
/// generic 400 axum's `Json` extractor would produce if `type` were typed
/// directly as `TxnType`.
#[derive(Debug, Deserialize)]
struct RawTradeRequest {
    name: String,
    quantity: i64,
    #[serde(rename = "type")]
    kind: String,
}

pub async fn place_order(
    State(state): State<Arc<FrontendState>>,
    Json(req): Json<RawTradeRequest>,
) -> Result<Json<DataEnvelope<TransactionNumberBody>>, ApiError> {
    let kind = match req.kind.as_str() {
        "buy" => TxnType::Buy,
        "sell" => TxnType::Sell,
        _ => return Err(Error::rejected("unknown trade type").into()),
    };
    let transaction_number = state.trade(kind, &req.name, req.quantity).await?;
    Ok(Json(DataEnvelope { data: TransactionNumberBody { transaction_number } }))
}

pub async fn lookup_order(
    State(state): State<Arc<FrontendState>>,
    Path(id): Path<i64>,
) -> Result<Json<DataEnvelope<OrderLookupData>>, ApiError> {
    let entry = state.lookup_order(id).await?;
    Ok(Json(DataEnvelope {
        data: OrderLookupData { number: id, name: entry.name, quantity: entry.quantity, kind: entry.kind },
    }))
}

pub async fn invalidate(
    State(state): State<Arc<FrontendState>>,
    Path(name): Path<String>,
) -> Response {
    if state.invalidate(&name) {
        (StatusCode::OK, Json(SuccessEnvelope::new(200, "successfully removed stock")))
            .into_response()
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorEnvelope::new(500, "failed to remove stock")),
        )
            .into_response()
    }
}

pub async fn leader(State(state): State<Arc<FrontendState>>) -> Result<Json<LeaderInfo>, ApiError> {
    let (_, addr) = state
        .leader_info()
        .ok_or_else(|| Error::upstream("no order replica leader available"))?;
    Ok(Json(LeaderInfo { leader_host: addr.host, leader_port: addr.port }))
}

pub async fn dump_cache(State(state): State<Arc<FrontendState>>) -> Json<Vec<Instrument>> {
    Json(state.dump_cache())
}
