// Shared domain and wire types. These are the JSON shapes every component
// speaks on the network (§6 of the spec); they replace the teacher's binary
// `Msg`/`NodeID` framing (`submerge-net`) with the HTTP+JSON framing the
// spec treats as an external collaborator rather than something to
// redesign — the record shapes and id discipline are the part that's ours.

use serde::{Deserialize, Serialize};

/// One of the three static order replicas, numbered as in the spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ReplicaId(pub u8);

impl ReplicaId {
    pub const ALL: [ReplicaId; 3] = [ReplicaId(1), ReplicaId(2), ReplicaId(3)];

    /// Probe order for leader election: descending, per spec §4.3 and the
    /// original's `pingOrder = [3, 2, 1]`.
    pub const PROBE_ORDER: [ReplicaId; 3] = [ReplicaId(3), ReplicaId(2), ReplicaId(1)];
}

impl std::fmt::Display for ReplicaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A `host:port` pair for any of the five processes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Addr {
    pub host: String,
    pub port: u16,
}

impl Addr {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Addr { host: host.into(), port }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl std::fmt::Display for Addr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// buy or sell, the only two transaction types the protocol knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxnType {
    Buy,
    Sell,
}

impl std::fmt::Display for TxnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TxnType::Buy => write!(f, "buy"),
            TxnType::Sell => write!(f, "sell"),
        }
    }
}

/// A catalog-owned instrument snapshot, as returned by `lookup` and cached
/// by the front-end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub name: String,
    pub price: f64,
    pub quantity: i64,
}

/// The part of a ledger entry that doesn't include its id: what a `push`
/// carries, and what's stored at each ledger position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub name: String,
    pub quantity: i64,
    #[serde(rename = "type")]
    pub kind: TxnType,
}

