// reqwest-based clients for every cross-component call the spec names in
// §4 and §6. One `Client` struct per peer role (catalog, order replica,
// front-end), all sharing the response-classification helpers below.

use std::collections::BTreeMap;
use reqwest::StatusCode;
use tracing::debug;

use bourse_base::{Error, Result};

use crate::envelopes::{
    ErrorEnvelope, LeaderBroadcastRequest, OrderEntryBody, OrderRequest, PingEnvelope,
    PushRequest, SyncRequest, SyncResponse, TransactionNumberBody, UpdateRequest,
};
use crate::types::{Addr, Instrument, LedgerEntry, ReplicaId, TxnType};

/// Distinguishes "the leader is reachable and said no" from "the leader is
/// unreachable" — the two cases the front-end's forward-with-failover logic
/// (§4.3) must tell apart: only the latter triggers an election.
#[derive(Debug)]
pub enum ForwardError {
    Domain(Error),
    Transport(reqwest::Error),
}

impl std::fmt::Display for ForwardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ForwardError::Domain(e) => write!(f, "{e}"),
            ForwardError::Transport(e) => write!(f, "{e}"),
        }
    }
}
impl std::error::Error for ForwardError {}

async fn error_from_response(resp: reqwest::Response) -> Error {
    let status = resp.status();
    match resp.json::<ErrorEnvelope>().await {
        Ok(body) => classify(status, body.error.message),
        Err(_) => classify(status, format!("upstream returned {status}")),
    }
}

fn classify(status: StatusCode, message: String) -> Error {
    if status == StatusCode::NOT_FOUND {
        Error::not_found(message)
    } else {
        Error::upstream(message)
    }
}

/// Calls against the Catalog (C).
#[derive(Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    addr: Addr,
}

impl CatalogClient {
    pub fn new(http: reqwest::Client, addr: Addr) -> Self {
        CatalogClient { http, addr }
    }

    pub async fn lookup(&self, name: &str) -> Result<Instrument> {
        let url = format!("{}/lookup/{}", self.addr.base_url(), name);
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| Error::upstream(e.to_string()))?;
        if resp.status().is_success() {
            resp.json::<Instrument>()
                .await
                .map_err(|e| Error::internal(e.to_string()))
        } else {
            Err(error_from_response(resp).await)
        }
    }

    pub async fn update(&self, name: &str, quantity: i64, kind: TxnType) -> Result<()> {
        let url = format!("{}/update", self.addr.base_url());
        let body = UpdateRequest { name: name.to_string(), quantity, kind };
        let resp = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::upstream(e.to_string()))?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(error_from_response(resp).await)
        }
    }
}

/// Calls against a single Order replica (O1/O2/O3), addressed by `addr`.
#[derive(Clone)]
pub struct ReplicaClient {
    http: reqwest::Client,
    addr: Addr,
}

impl ReplicaClient {
    pub fn new(http: reqwest::Client, addr: Addr) -> Self {
        ReplicaClient { http, addr }
    }

    pub fn addr(&self) -> &Addr {
        &self.addr
    }

    /// `POST /buy` or `POST /sell`, used by the front-end to forward a
    /// client's trade to whichever replica it currently believes is leader.
    /// Distinguishes transport failure from a reachable-but-erroring leader
    /// so the caller can decide whether to run an election.
    pub async fn forward_trade(
        &self,
        kind: TxnType,
        name: &str,
        quantity: i64,
    ) -> std::result::Result<TransactionNumberBody, ForwardError> {
        let route = match kind {
            TxnType::Buy => "buy",
            TxnType::Sell => "sell",
        };
        let url = format!("{}/{route}", self.addr.base_url());
        let body = OrderRequest { name: name.to_string(), quantity };
        let resp = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(ForwardError::Transport)?;
        if resp.status().is_success() {
            resp.json::<TransactionNumberBody>()
                .await
                .map_err(|e| ForwardError::Domain(Error::internal(e.to_string())))
        } else {
            Err(ForwardError::Domain(error_from_response(resp).await))
        }
    }

    /// `GET /lookup-order/<id>`, also forwarded through the current leader.
    pub async fn forward_lookup_order(
        &self,
        id: i64,
    ) -> std::result::Result<OrderEntryBody, ForwardError> {
        let url = format!("{}/lookup-order/{id}", self.addr.base_url());
        let resp = self.http.get(url).send().await.map_err(ForwardError::Transport)?;
        if resp.status().is_success() {
            resp.json::<OrderEntryBody>()
                .await
                .map_err(|e| ForwardError::Domain(Error::internal(e.to_string())))
        } else {
            Err(ForwardError::Domain(error_from_response(resp).await))
        }
    }

    /// `GET /ping`. Returns the replying replica's own id on success; any
    /// failure (transport or otherwise) just means "try the next
    /// candidate" to an election driver, so it collapses to `Result`.
    pub async fn ping(&self) -> Result<ReplicaId> {
        let url = format!("{}/ping", self.addr.base_url());
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| Error::upstream(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }
        let body: PingEnvelope = resp.json().await.map_err(|e| Error::internal(e.to_string()))?;
        Ok(ReplicaId(body.success.server_id))
    }

    /// `POST /leader-broadcast`. Fire-and-forget from the caller's point of
    /// view — failures are logged and swallowed, matching the original's
    /// bare `try/except: continue`.
    pub async fn broadcast_leader(&self, leader_id: ReplicaId) {
        let url = format!("{}/leader-broadcast", self.addr.base_url());
        let body = LeaderBroadcastRequest { leader_id: leader_id.0 as i64 };
        if let Err(e) = self.http.post(url).json(&body).send().await {
            debug!(addr = %self.addr, error = %e, "leader-broadcast delivery failed, ignoring");
        }
    }

    /// `POST /push`. Best-effort; the caller (the leader's broadcast
    /// fan-out) swallows the failure and relies on sync to repair it.
    pub async fn push(&self, next_id: i64, entry: &LedgerEntry) -> Result<()> {
        let url = format!("{}/push", self.addr.base_url());
        let body = PushRequest { next_id, entry: entry.clone() };
        let resp = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::upstream(e.to_string()))?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(error_from_response(resp).await)
        }
    }

    /// `GET /sync`. Used at boot to catch up on missed entries and to
    /// adopt whatever leader a peer already knows about.
    pub async fn sync(&self, last_id: i64) -> Result<(i64, BTreeMap<String, LedgerEntry>)> {
        let url = format!("{}/sync", self.addr.base_url());
        let body = SyncRequest { last_id };
        let resp = self
            .http
            .get(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::upstream(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }
        let body: SyncResponse = resp.json().await.map_err(|e| Error::internal(e.to_string()))?;
        Ok((body.leader_id, body.transactions))
    }

    /// Test-only: terminate the replica process.
    pub async fn shutdown(&self) -> Result<()> {
        let url = format!("{}/shutdown", self.addr.base_url());
        self.http
            .post(url)
            .send()
            .await
            .map_err(|e| Error::upstream(e.to_string()))?;
        Ok(())
    }

    /// Test-only: dump the full on-disk ledger state.
    pub async fn dump_database(&self) -> Result<serde_json::Value> {
        let url = format!("{}/dump-database", self.addr.base_url());
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| Error::upstream(e.to_string()))?;
        resp.json().await.map_err(|e| Error::internal(e.to_string()))
    }

    /// Test-only: reset the ledger to empty.
    pub async fn reset_database(&self) -> Result<()> {
        let url = format!("{}/reset-database", self.addr.base_url());
        self.http
            .post(url)
            .send()
            .await
            .map_err(|e| Error::upstream(e.to_string()))?;
        Ok(())
    }
}

/// Calls against the Front-end (F); currently just the invalidation hook
/// the catalog fires after a successful update.
#[derive(Clone)]
pub struct FrontendClient {
    http: reqwest::Client,
    addr: Addr,
}

impl FrontendClient {
    pub fn new(http: reqwest::Client, addr: Addr) -> Self {
        FrontendClient { http, addr }
    }

    /// `POST /invalidate/<name>`. Fire-and-forget: the spec requires this
    /// not block or fail the catalog update that triggered it (§4.4).
    pub async fn invalidate(&self, name: &str) {
        let url = format!("{}/invalidate/{name}", self.addr.base_url());
        match self.http.post(url).send().await {
            Ok(resp) if !resp.status().is_success() => {
                debug!(name, status = %resp.status(), "front-end invalidate returned an error, ignoring");
            }
            Err(e) => debug!(name, error = %e, "front-end invalidate unreachable, ignoring"),
            Ok(_) => {}
        }
    }
}
