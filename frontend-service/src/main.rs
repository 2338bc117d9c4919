mod config;
mod handlers;
mod state;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use clap::Parser;
use tracing::{info, warn};

use bourse_base::{init_tracing, Result};
use bourse_wire::{Addr, CatalogClient, ReplicaClient, ReplicaId};

use config::Config;
use state::FrontendState;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let config = Config::parse();

    let http = reqwest::Client::new();
    let catalog =
        CatalogClient::new(http.clone(), Addr::new(config.catalog_host.clone(), config.catalog_port));
    let replicas: Vec<(ReplicaId, ReplicaClient)> = config
        .replicas()
        .into_iter()
        .map(|(id, addr)| (ReplicaId(id), ReplicaClient::new(http.clone(), addr)))
        .collect();

    let state = Arc::new(FrontendState::new(
        catalog,
        replicas,
        config.cache_capacity,
        config.cache_mode,
    ));

    info!("electing an order replica leader before serving");
    if !state.elect_leader().await {
        warn!("no order replica answered at startup; the first trade request will retry election");
    }

    let app = build_router(state);
    let addr = format!("0.0.0.0:{}", config.front_port);
    info!(%addr, cache_mode = config.cache_mode, "front-end listening");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| bourse_base::err(e.to_string()))?;
    axum::serve(listener, app)
        .await
        .map_err(|e| bourse_base::err(e.to_string()))?;
    Ok(())
}

fn build_router(state: Arc<FrontendState>) -> Router {
    Router::new()
        .route("/stocks/:name", get(handlers::fetch_stock))
        .route("/orders", post(handlers::place_order))
        .route("/orders/:id", get(handlers::lookup_order))
        .route("/invalidate/:name", post(handlers::invalidate))
        .route("/leader", get(handlers::leader))
        .route("/dump-cache", get(handlers::dump_cache))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use test_log::test;
    use tower::ServiceExt;

    fn test_state() -> Arc<FrontendState> {
        let http = reqwest::Client::new();
        let catalog = CatalogClient::new(http.clone(), Addr::new("127.0.0.1", 1));
        let replicas = vec![
            (ReplicaId(1), ReplicaClient::new(http.clone(), Addr::new("127.0.0.1", 2))),
            (ReplicaId(2), ReplicaClient::new(http.clone(), Addr::new("127.0.0.1", 3))),
            (ReplicaId(3), ReplicaClient::new(http.clone(), Addr::new("127.0.0.1", 4))),
        ];
        Arc::new(FrontendState::new(catalog, replicas, 3, true))
    }

    #[test(tokio::test)]
    async fn orders_with_unknown_trade_type_is_rejected() {
        let app = build_router(test_state());
        let body = serde_json::json!({"name": "AAA", "quantity": 1, "type": "short"});
        let req = Request::post("/orders")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test(tokio::test)]
    async fn invalidate_on_an_empty_cache_returns_500() {
        let app = build_router(test_state());
        let req = Request::post("/invalidate/AAA").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test(tokio::test)]
    async fn leader_with_no_election_yet_is_a_500() {
        let app = build_router(test_state());
        let req = Request::get("/leader").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test(tokio::test)]
    async fn dump_cache_starts_empty() {
        let app = build_router(test_state());
        let req = Request::get("/dump-cache").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let entries: Vec<bourse_wire::Instrument> = serde_json::from_slice(&bytes).unwrap();
        assert!(entries.is_empty());
    }

    #[test(tokio::test)]
    async fn fetch_stock_with_catalog_unreachable_is_upstream_failure() {
        let app = build_router(test_state());
        let req = Request::get("/stocks/AAA").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
