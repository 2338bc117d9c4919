use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use bourse_base::{Error, Kind};
use bourse_wire::{
    ErrorBody, ErrorEnvelope, LeaderBroadcastRequest, OrderEntryBody, OrderRequest, PingBody,
    PingEnvelope, PushRequest, SuccessEnvelope, SyncRequest, SyncResponse, TransactionNumberBody,
    TxnType,
};

use crate::state::ReplicaState;

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

pub async fn buy(
    State(state): State<Arc<ReplicaState>>,
    Json(req): Json<OrderRequest>,
) -> Result<Json<TransactionNumberBody>, ApiError> {
    let id = state.trade(TxnType::Buy, &req.name, req.quantity).await?;
    Ok(Json(TransactionNumberBody { transaction_number: id }))
}

pub async fn sell(
    State(state): State<Arc<ReplicaState>>,
    Json(req): Json<OrderRequest>,
) -> Result<Json<TransactionNumberBody>, ApiError> {
    let id = state.trade(TxnType::Sell, &req.name, req.quantity).await?;
    Ok(Json(TransactionNumberBody { transaction_number: id }))
}

pub async fn lookup_order(
    State(state): State<Arc<ReplicaState>>,
    Path(id): Path<i64>,
) -> Result<Json<OrderEntryBody>, ApiError> {
    let entry = state.lookup_order(id).await?;
    Ok(Json(OrderEntryBody { name: entry.name, quantity: entry.quantity, kind: entry.kind }))
}

pub async fn ping(State(state): State<Arc<ReplicaState>>) -> Json<PingEnvelope> {
    let id = state.on_ping();
    Json(PingEnvelope { success: PingBody { code: 200, server_id: id.0, message: "pong".into() } })
}

pub async fn leader_broadcast(
    State(state): State<Arc<ReplicaState>>,
    Json(req): Json<LeaderBroadcastRequest>,
) -> Json<SuccessEnvelope> {
    state.on_leader_broadcast(bourse_wire::ReplicaId(req.leader_id as u8));
    Json(SuccessEnvelope::new(200, "acknowledge new leader"))
}

pub async fn push(
    State(state): State<Arc<ReplicaState>>,
    Json(req): Json<PushRequest>,
) -> Result<Json<SuccessEnvelope>, ApiError> {
    state.apply_push(req.next_id, req.entry).await?;
    Ok(Json(SuccessEnvelope::new(200, "pushed entry to database")))
}

pub async fn sync(
    State(state): State<Arc<ReplicaState>>,
    Json(req): Json<SyncRequest>,
) -> Json<SyncResponse> {
    let (leader_id, transactions) = state.serve_sync(req.last_id).await;
    Json(SyncResponse { leader_id, transactions })
}

pub async fn shutdown(State(_state): State<Arc<ReplicaState>>) -> &'static str {
    tokio::spawn(async {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        std::process::exit(0);
    });
    "Shutting down server..."
}

pub async fn dump_database(State(state): State<Arc<ReplicaState>>) -> Json<serde_json::Value> {
    Json(state.dump_database().await)
}

pub async fn reset_database(
    State(state): State<Arc<ReplicaState>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.reset_database().await?;
    Ok(Json(state.dump_database().await))
}
