mod client;
mod envelopes;
mod types;

pub use client::{
    CatalogClient, ForwardError, FrontendClient, ReplicaClient,
};
pub use envelopes::{
    DataEnvelope, ErrorBody, ErrorEnvelope, LeaderBroadcastRequest, LeaderInfo, OrderEntryBody,
    OrderLookupData, OrderRequest, PingBody, PingEnvelope, PushRequest, SuccessBody,
    SuccessEnvelope, SyncRequest, SyncResponse, TransactionNumberBody, UpdateRequest,
};
pub use types::{Addr, Instrument, LedgerEntry, ReplicaId, TxnType};
