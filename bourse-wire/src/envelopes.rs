// The literal JSON envelopes named in spec §6, lifted from
// `examples/original_source/` where the distilled spec left a shape
// implicit (e.g. the nested `{"error": {...}}` / `{"success": {...}}`
// wrapper every component uses).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{LedgerEntry, TxnType};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: u16,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

impl ErrorEnvelope {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        ErrorEnvelope { error: ErrorBody { code, message: message.into() } }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessBody {
    pub code: u16,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessEnvelope {
    pub success: SuccessBody,
}

impl SuccessEnvelope {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        SuccessEnvelope { success: SuccessBody { code, message: message.into() } }
    }
}

/// `GET /ping`'s success body additionally carries the replica's own id, so
/// it gets its own shape rather than reusing `SuccessBody`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PingBody {
    pub code: u16,
    #[serde(rename = "server-id")]
    pub server_id: u8,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PingEnvelope {
    pub success: PingBody,
}

/// `POST /update` request body, also reused for `POST /buy` and
/// `POST /sell` bodies forwarded from the front-end (which only set
/// `name`/`quantity`; `kind` is implied by the route there).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRequest {
    pub name: String,
    pub quantity: i64,
    #[serde(rename = "type")]
    pub kind: TxnType,
}

/// `POST /buy` / `POST /sell` request body at the order replica.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRequest {
    pub name: String,
    pub quantity: i64,
}

/// The `{"transaction-number": N}` body a successful trade returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionNumberBody {
    #[serde(rename = "transaction-number")]
    pub transaction_number: i64,
}

/// `GET /lookup-order/<id>` success body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderEntryBody {
    pub name: String,
    pub quantity: i64,
    #[serde(rename = "type")]
    pub kind: TxnType,
}

/// `POST /push` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushRequest {
    #[serde(rename = "nextID")]
    pub next_id: i64,
    pub entry: LedgerEntry,
}

/// `GET /sync` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncRequest {
    #[serde(rename = "lastID")]
    pub last_id: i64,
}

/// `GET /sync` response body. Transaction ids are serialized as JSON object
/// keys, hence strings — the spec's idempotence/empty-map laws (§8) operate
/// on this shape directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncResponse {
    #[serde(rename = "leader-id")]
    pub leader_id: i64,
    pub transactions: BTreeMap<String, LedgerEntry>,
}

/// `POST /leader-broadcast` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderBroadcastRequest {
    #[serde(rename = "leader-id")]
    pub leader_id: i64,
}

/// Front-end `GET /leader` diagnostic response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderInfo {
    #[serde(rename = "leader-host")]
    pub leader_host: String,
    #[serde(rename = "leader-port")]
    pub leader_port: u16,
}

/// Generic `{"data": T}` envelope the front-end wraps successful responses
/// in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

/// `GET /orders/<id>` success payload at the front-end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLookupData {
    pub number: i64,
    pub name: String,
    pub quantity: i64,
    #[serde(rename = "type")]
    pub kind: TxnType,
}
