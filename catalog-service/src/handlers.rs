use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use bourse_base::{Error, Kind};
use bourse_wire::{ErrorBody, ErrorEnvelope, Instrument, SuccessEnvelope, UpdateRequest};

use crate::state::CatalogState;

/// Maps a `bourse_base::Error` to the catalog's `{error:{code,message}}`
/// envelope. Only this boundary inspects `Kind` — everything upstream of it
/// just propagates `Result`.
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

pub async fn lookup(
    State(state): State<Arc<CatalogState>>,
    Path(name): Path<String>,
) -> Result<Json<Instrument>, ApiError> {
    Ok(Json(state.lookup(&name)?))
}

pub async fn update(
    State(state): State<Arc<CatalogState>>,
    Json(req): Json<UpdateRequest>,
) -> Result<Json<SuccessEnvelope>, ApiError> {
    state.update(&req.name, req.quantity, req.kind).await?;
    Ok(Json(SuccessEnvelope::new(200, "updated stock successfully")))
}
