mod config;
mod handlers;
mod state;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use clap::Parser;
use tracing::info;

use bourse_base::{init_tracing, Result};
use bourse_store::FileStore;
use bourse_wire::{Addr, CatalogClient, ReplicaId};

use config::Config;
use state::ReplicaState;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let config = Config::parse();

    let http = reqwest::Client::new();
    let catalog = CatalogClient::new(http.clone(), Addr::new(config.catalog_host.clone(), config.catalog_port));
    let store = FileStore::new(config.store_path_or_default());
    let state = Arc::new(ReplicaState::new(
        ReplicaId(config.server_id),
        store,
        catalog,
        config.peers(),
        http,
    )?);

    info!(server_id = config.server_id, "syncing with peers before serving");
    state.sync_on_boot().await;

    let app = build_router(state);
    let addr = format!("0.0.0.0:{}", config.own_port());
    info!(%addr, server_id = config.server_id, "order replica listening");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| bourse_base::err(e.to_string()))?;
    axum::serve(listener, app)
        .await
        .map_err(|e| bourse_base::err(e.to_string()))?;
    Ok(())
}

fn build_router(state: Arc<ReplicaState>) -> Router {
    Router::new()
        .route("/buy", post(handlers::buy))
        .route("/sell", post(handlers::sell))
        .route("/lookup-order/:id", get(handlers::lookup_order))
        .route("/ping", get(handlers::ping))
        .route("/leader-broadcast", post(handlers::leader_broadcast))
        .route("/push", post(handlers::push))
        .route("/sync", get(handlers::sync))
        .route("/shutdown", post(handlers::shutdown))
        .route("/dump-database", get(handlers::dump_database))
        .route("/reset-database", post(handlers::reset_database))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use test_log::test;
    use tower::ServiceExt;

    fn test_state() -> Arc<ReplicaState> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("order1.db");
        std::mem::forget(dir);
        let http = reqwest::Client::new();
        let catalog = CatalogClient::new(http.clone(), Addr::new("127.0.0.1", 1));
        let store = FileStore::new(path);
        Arc::new(
            ReplicaState::new(
                ReplicaId(1),
                store,
                catalog,
                vec![(2, Addr::new("127.0.0.1", 2)), (3, Addr::new("127.0.0.1", 3))],
                http,
            )
            .unwrap(),
        )
    }

    #[test(tokio::test)]
    async fn ping_promotes_replica_to_leader() {
        let app = build_router(test_state());
        let req = Request::get("/ping").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[test(tokio::test)]
    async fn leader_broadcast_is_acknowledged() {
        let app = build_router(test_state());
        let body = serde_json::json!({"leader-id": 3});
        let req = Request::post("/leader-broadcast")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[test(tokio::test)]
    async fn push_then_lookup_order_round_trips() {
        let app = build_router(test_state());
        let body = serde_json::json!({"nextID": 0, "entry": {"name": "AAA", "quantity": 5, "type": "buy"}});
        let req = Request::post("/push")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let req = Request::get("/lookup-order/0").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[test(tokio::test)]
    async fn lookup_unknown_order_returns_404() {
        let app = build_router(test_state());
        let req = Request::get("/lookup-order/999").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test(tokio::test)]
    async fn sync_returns_empty_map_when_caller_is_ahead() {
        let app = build_router(test_state());
        let body = serde_json::json!({"lastID": 100});
        let req = Request::get("/sync")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[test(tokio::test)]
    async fn buy_of_zero_quantity_is_rejected() {
        let app = build_router(test_state());
        let body = serde_json::json!({"name": "AAA", "quantity": 0});
        let req = Request::post("/buy")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
