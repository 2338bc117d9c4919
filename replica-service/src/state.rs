use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex as AsyncMutex, Semaphore};
use tracing::debug;

use bourse_base::{Error, Result};
use bourse_store::FileStore;
use bourse_txn::{Ledger, ReplicaRole, Role};
use bourse_wire::{Addr, CatalogClient, LedgerEntry, ReplicaClient, ReplicaId, TxnType};

const MAX_PUSH_FANOUT: usize = 32;

#[derive(Debug, Default, Serialize, Deserialize)]
struct LedgerSnapshot {
    #[serde(rename = "nextID")]
    next_id: i64,
    ledger: BTreeMap<i64, LedgerEntry>,
}

impl LedgerSnapshot {
    fn from_ledger(ledger: &Ledger) -> Self {
        LedgerSnapshot { next_id: ledger.next_id(), ledger: ledger.entries().clone() }
    }
}

pub struct ReplicaState {
    id: ReplicaId,
    ledger: AsyncMutex<Ledger>,
    role: Mutex<ReplicaRole>,
    store: FileStore<LedgerSnapshot>,
    catalog: CatalogClient,
    peers: Vec<(ReplicaId, ReplicaClient)>,
    push_permits: Arc<Semaphore>,
}

impl ReplicaState {
    pub fn new(
        id: ReplicaId,
        store: FileStore<LedgerSnapshot>,
        catalog: CatalogClient,
        peer_addrs: Vec<(u8, Addr)>,
        http: reqwest::Client,
    ) -> Result<Self> {
        let snapshot = store.load_or_default()?;
        let ledger = Ledger::from_entries(snapshot.ledger);
        let peers = peer_addrs
            .into_iter()
            .map(|(peer_id, addr)| (ReplicaId(peer_id), ReplicaClient::new(http.clone(), addr)))
            .collect();
        Ok(ReplicaState {
            id,
            ledger: AsyncMutex::new(ledger),
            role: Mutex::new(ReplicaRole::new(id)),
            store,
            catalog,
            peers,
            push_permits: Arc::new(Semaphore::new(MAX_PUSH_FANOUT)),
        })
    }

    fn persist(&self, ledger: &Ledger) -> Result<()> {
        self.store.save(&LedgerSnapshot::from_ledger(ledger))
    }

    /// Executes a buy or sell as the leader. Holds the ledger lock across
    /// the catalog `update` call, the one exception the concurrency model
    /// allows, to keep id assignment in lock-step with the instrument
    /// mutation; the push broadcast happens only after the lock is released.
    pub async fn trade(&self, kind: TxnType, name: &str, quantity: i64) -> Result<i64> {
        if quantity <= 0 {
            return Err(Error::rejected("trade quantity must be positive"));
        }
        let snapshot = self.catalog.lookup(name).await?;

        let id = {
            let mut ledger = self.ledger.lock().await;
            if kind == TxnType::Buy && quantity > snapshot.quantity {
                return Err(Error::rejected("insufficient shares for buy"));
            }
            self.catalog.update(name, quantity, kind).await?;

            let entry = LedgerEntry { name: name.to_string(), quantity, kind };
            let id = ledger.append_next(entry);
            self.persist(&ledger)?;
            id
        };

        let entry = LedgerEntry { name: name.to_string(), quantity, kind };
        self.spawn_broadcast_push(id, entry);
        Ok(id)
    }

    fn spawn_broadcast_push(&self, id: i64, entry: LedgerEntry) {
        for (peer_id, client) in self.peers.clone() {
            let entry = entry.clone();
            let permits = Arc::clone(&self.push_permits);
            tokio::spawn(async move {
                let _permit = permits.acquire_owned().await;
                if let Err(e) = client.push(id, &entry).await {
                    debug!(peer = %peer_id, error = %e, "push delivery failed, leaving repair to sync");
                }
            });
        }
    }

    pub async fn lookup_order(&self, id: i64) -> Result<LedgerEntry> {
        let ledger = self.ledger.lock().await;
        ledger
            .get(id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("could not find order with number {id}")))
    }

    /// Follower-side `/push`: idempotent by id, see `Ledger::apply_push`.
    pub async fn apply_push(&self, id: i64, entry: LedgerEntry) -> Result<()> {
        let mut ledger = self.ledger.lock().await;
        ledger.apply_push(id, entry);
        self.persist(&ledger)
    }

    /// Answers a peer's `/sync`: every entry since `last_id`, plus this
    /// replica's current view of who's leader.
    pub async fn serve_sync(&self, last_id: i64) -> (i64, BTreeMap<String, LedgerEntry>) {
        let ledger = self.ledger.lock().await;
        let leader_id = self.leader_id_or_unknown();
        (leader_id, ledger.since(last_id))
    }

    fn leader_id_or_unknown(&self) -> i64 {
        match self.role.lock().unwrap().role() {
            Role::Leader => self.id.0 as i64,
            Role::Follower(id) => id.0 as i64,
            Role::UnknownLeader => -1,
        }
    }

    /// `/ping`: receiving a ping is how a replica learns it's been elected.
    pub fn on_ping(&self) -> ReplicaId {
        self.role.lock().unwrap().on_leader_broadcast(self.id);
        self.id
    }

    /// `/leader-broadcast`.
    pub fn on_leader_broadcast(&self, leader_id: ReplicaId) {
        self.role.lock().unwrap().on_leader_broadcast(leader_id);
    }

    /// Boot-time catch-up: queries every peer's `/sync`, applies any newly
    /// observed entries, and adopts the highest leader id any peer reports.
    pub async fn sync_on_boot(&self) {
        let last_id = self.ledger.lock().await.next_id();
        for (peer_id, client) in &self.peers {
            match client.sync(last_id).await {
                Ok((leader_id, transactions)) => {
                    if leader_id > 0 {
                        self.role
                            .lock()
                            .unwrap()
                            .adopt_sync_leader(ReplicaId(leader_id as u8));
                    }
                    let mut ledger = self.ledger.lock().await;
                    for (id_str, entry) in transactions {
                        if let Ok(id) = id_str.parse::<i64>() {
                            ledger.apply_push(id, entry);
                        }
                    }
                    if let Err(e) = self.persist(&ledger) {
                        debug!(peer = %peer_id, error = %e, "failed to persist sync catch-up");
                    }
                }
                Err(e) => debug!(peer = %peer_id, error = %e, "sync with peer failed, continuing"),
            }
        }
    }

    /// Test-only: full ledger dump.
    pub async fn dump_database(&self) -> serde_json::Value {
        let ledger = self.ledger.lock().await;
        serde_json::json!({
            "nextID": ledger.next_id(),
            "ledger": ledger.entries(),
        })
    }

    /// Test-only: resets the ledger to empty.
    pub async fn reset_database(&self) -> Result<()> {
        let mut ledger = self.ledger.lock().await;
        *ledger = Ledger::new();
        self.persist(&ledger)
    }
}
