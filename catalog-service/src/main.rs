mod config;
mod handlers;
mod state;

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use clap::Parser;
use tracing::info;

use bourse_base::{init_tracing, Result};
use bourse_store::FileStore;
use bourse_wire::{Addr, FrontendClient, Instrument};

use config::Config;
use state::CatalogState;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let config = Config::parse();

    let store: FileStore<BTreeMap<String, Instrument>> = FileStore::new(&config.store_path);
    let initial = load_initial(&store, config.seed_file.as_deref())?;

    let front = FrontendClient::new(
        reqwest::Client::new(),
        Addr::new(config.front_host.clone(), config.front_port),
    );
    let state = Arc::new(CatalogState::new(initial, store, front, config.cache_mode));

    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", config.catalog_port);
    info!(%addr, cache_mode = config.cache_mode, "catalog listening");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| bourse_base::err(e.to_string()))?;
    axum::serve(listener, app)
        .await
        .map_err(|e| bourse_base::err(e.to_string()))?;
    Ok(())
}

fn build_router(state: Arc<CatalogState>) -> Router {
    Router::new()
        .route("/lookup/:name", get(handlers::lookup))
        .route("/update", post(handlers::update))
        .with_state(state)
}

fn load_initial(
    store: &FileStore<BTreeMap<String, Instrument>>,
    seed_file: Option<&std::path::Path>,
) -> Result<BTreeMap<String, Instrument>> {
    let existing = store.load_or_default()?;
    if !existing.is_empty() {
        return Ok(existing);
    }
    let Some(seed_file) = seed_file else {
        return Ok(existing);
    };
    let bytes = std::fs::read(seed_file).map_err(|e| bourse_base::err(e.to_string()))?;
    let seeded: BTreeMap<String, Instrument> =
        serde_json::from_slice(&bytes).map_err(|e| bourse_base::err(e.to_string()))?;
    store.save(&seeded)?;
    Ok(seeded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use test_log::test;
    use tower::ServiceExt;

    fn test_state() -> Arc<CatalogState> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.db");
        std::mem::forget(dir);
        let store: FileStore<BTreeMap<String, Instrument>> = FileStore::new(path);
        let mut table = BTreeMap::new();
        table.insert(
            "GameStart".to_string(),
            Instrument { name: "GameStart".to_string(), price: 15.99, quantity: 100 },
        );
        let front = FrontendClient::new(reqwest::Client::new(), Addr::new("127.0.0.1", 1));
        Arc::new(CatalogState::new(table, store, front, false))
    }

    #[test(tokio::test)]
    async fn lookup_known_instrument_returns_its_snapshot() {
        let app = build_router(test_state());
        let req = Request::get("/lookup/GameStart").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[test(tokio::test)]
    async fn lookup_unknown_instrument_returns_404() {
        let app = build_router(test_state());
        let req = Request::get("/lookup/Pear").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test(tokio::test)]
    async fn update_sell_increases_quantity_and_persists() {
        let state = test_state();
        let app = build_router(state.clone());
        let body = serde_json::json!({"name": "GameStart", "quantity": 10, "type": "sell"});
        let req = Request::post("/update")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(state.lookup("GameStart").unwrap().quantity, 110);
    }

    #[test(tokio::test)]
    async fn update_buy_past_available_quantity_is_rejected() {
        let app = build_router(test_state());
        let body = serde_json::json!({"name": "GameStart", "quantity": 1000, "type": "buy"});
        let req = Request::post("/update")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test(tokio::test)]
    async fn update_unknown_instrument_returns_404() {
        let app = build_router(test_state());
        let body = serde_json::json!({"name": "Pear", "quantity": 1, "type": "buy"});
        let req = Request::post("/update")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
