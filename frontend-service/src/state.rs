// The front-end gateway: a bounded lookup cache in front of the catalog, and
// a forward-with-failover driver in front of the order replicas. Holds no
// ledger or instrument state of its own — everything here is either cached
// acceleration (§4.4) or routing (§4.3).

use std::sync::Mutex;

use tracing::{info, warn};

use bourse_base::{Error, Result};
use bourse_cache::StockCache;
use bourse_wire::{
    Addr, CatalogClient, ForwardError, Instrument, OrderEntryBody, ReplicaClient, ReplicaId,
    TxnType,
};

/// Full rounds through the descending-id probe order the election driver
/// tries before giving up, matching the original's `pingLimit = 5` (read as
/// rounds through the 3-element probe order, per SPEC_FULL §2).
const ELECTION_ROUNDS: u32 = 5;

pub struct FrontendState {
    catalog: CatalogClient,
    replicas: Vec<(ReplicaId, ReplicaClient)>,
    cache: StockCache,
    cache_mode: bool,
    leader: Mutex<Option<(ReplicaId, Addr)>>,
}

impl FrontendState {
    pub fn new(
        catalog: CatalogClient,
        replicas: Vec<(ReplicaId, ReplicaClient)>,
        cache_capacity: usize,
        cache_mode: bool,
    ) -> Self {
        FrontendState {
            catalog,
            replicas,
            cache: StockCache::new(cache_capacity),
            cache_mode,
            leader: Mutex::new(None),
        }
    }

    /// `GET /stocks/<name>`: cache first, catalog on miss. Caching the
    /// fetched snapshot is skipped when cache mode is off, so a disabled
    /// cache never silently re-enables itself via lookups (§4.1).
    pub async fn fetch_stock(&self, name: &str) -> Result<Instrument> {
        if let Some(cached) = self.cache.fetch(name) {
            return Ok(cached);
        }
        let instrument = self.catalog.lookup(name).await?;
        if self.cache_mode {
            self.cache.insert(name.to_string(), instrument.clone());
        }
        Ok(instrument)
    }

    /// `POST /invalidate/<name>`: the catalog's fire-and-forget
    /// notification. Returns whether anything was actually evicted, which
    /// the handler maps to 200/500 per §6.
    pub fn invalidate(&self, name: &str) -> bool {
        self.cache.invalidate(name)
    }

    pub fn dump_cache(&self) -> Vec<Instrument> {
        self.cache.dump_lru_to_mru()
    }

    pub fn leader_info(&self) -> Option<(ReplicaId, Addr)> {
        self.leader.lock().unwrap().clone()
    }

    /// `POST /orders`: forwards a trade to the current leader, electing one
    /// first if none is known yet.
    pub async fn trade(&self, kind: TxnType, name: &str, quantity: i64) -> Result<i64> {
        let body = self
            .forward_with_failover(|client| {
                let name = name.to_string();
                async move { client.forward_trade(kind, &name, quantity).await }
            })
            .await?;
        Ok(body.transaction_number)
    }

    /// `GET /orders/<id>`: forwards an order lookup to the current leader,
    /// under the same failover discipline as a trade.
    pub async fn lookup_order(&self, id: i64) -> Result<OrderEntryBody> {
        self.forward_with_failover(|client| async move { client.forward_lookup_order(id).await })
            .await
    }

    /// Forwards an operation to whichever replica the front-end currently
    /// believes is leader, running an election (and retrying once) on
    /// transport failure. A domain error from a reachable leader (404, or
    /// any other non-2xx) is returned as-is — only unreachability triggers
    /// failover, per §4.3.
    async fn forward_with_failover<F, Fut, T>(&self, op: F) -> Result<T>
    where
        F: Fn(ReplicaClient) -> Fut,
        Fut: std::future::Future<Output = std::result::Result<T, ForwardError>>,
    {
        loop {
            let (leader_id, client) = match self.leader_client() {
                Some(pair) => pair,
                None => {
                    if !self.elect_leader().await {
                        return Err(Error::upstream("no order replica leader available"));
                    }
                    continue;
                }
            };
            match op(client).await {
                Ok(value) => return Ok(value),
                Err(ForwardError::Domain(e)) => return Err(e),
                Err(ForwardError::Transport(e)) => {
                    warn!(leader = %leader_id, error = %e, "leader unreachable, electing a new one");
                    self.leader.lock().unwrap().take();
                    if !self.elect_leader().await {
                        return Err(Error::upstream("no order replica leader available"));
                    }
                }
            }
        }
    }

    fn leader_client(&self) -> Option<(ReplicaId, ReplicaClient)> {
        let leader = self.leader.lock().unwrap();
        let (id, _) = leader.as_ref()?;
        let id = *id;
        let client = self.replicas.iter().find(|(rid, _)| *rid == id)?.1.clone();
        Some((id, client))
    }

    /// The election driver (§4.3, §9): probes replicas in strict descending
    /// id order, bounded by `ELECTION_ROUNDS` full passes. The first replica
    /// to answer `/ping` is elected; the rest are notified by
    /// `/leader-broadcast`, fire-and-forget.
    pub async fn elect_leader(&self) -> bool {
        for round in 0..ELECTION_ROUNDS {
            for probe_id in ReplicaId::PROBE_ORDER {
                let Some((_, client)) = self.replicas.iter().find(|(id, _)| *id == probe_id)
                else {
                    continue;
                };
                match client.ping().await {
                    Ok(leader_id) => {
                        *self.leader.lock().unwrap() = Some((leader_id, client.addr().clone()));
                        info!(leader = %leader_id, round, "elected order replica leader");
                        self.broadcast_leader(leader_id).await;
                        return true;
                    }
                    Err(e) => {
                        warn!(replica = %probe_id, round, error = %e, "ping failed, trying next candidate");
                    }
                }
            }
        }
        warn!(rounds = ELECTION_ROUNDS, "election exhausted its retry budget, no leader found");
        false
    }

    /// Notifies every replica but the new leader, in parallel. Each
    /// broadcast is individually fire-and-forget (`ReplicaClient::
    /// broadcast_leader` swallows its own failures), so one unreachable
    /// follower never blocks notifying the others.
    async fn broadcast_leader(&self, leader_id: ReplicaId) {
        let handles: Vec<_> = self
            .replicas
            .iter()
            .filter(|(id, _)| *id != leader_id)
            .map(|(_, client)| {
                let client = client.clone();
                tokio::spawn(async move { client.broadcast_leader(leader_id).await })
            })
            .collect();
        for handle in handles {
            let _ = handle.await;
        }
    }
}
